use thermolog::{Device, DeviceVariant, SweepConfiguration};

fn main() -> thermolog::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_micros()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut config = SweepConfiguration::default();
    if let Some(name) = std::env::args().nth(1) {
        config.variant = DeviceVariant::from_name(&name).ok_or_else(||
            thermolog::Error::Other(format!("unknown device {:?}, expected U3, U6 or UE9", name).into()))?;
    }

    let mut device = Device::simulated(config.variant);
    let steps = thermolog::sweep(&mut device, &config)?;
    println!("swept {} duty cycle steps on {}", steps.len(), config.variant.name());
    Ok(())
}
