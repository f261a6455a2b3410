use std::io::{BufRead, Write};
use std::path::Path;
use std::thread;

use thermolog::{CsvLog, Device, DeviceVariant, LoggerConfiguration, SensorLogger};
use thermolog::{Timestamp, TerminalDisplay, stop_signal};

fn prompt_label() -> std::io::Result<String> {
    print!("Enter Load Name: ");
    std::io::stdout().flush()?;
    let mut label = String::new();
    std::io::stdin().lock().read_line(&mut label)?;
    Ok(label.trim().to_owned())
}

fn main() -> thermolog::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_secs()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let label = match std::env::args().nth(1) {
        Some(label) => label,
        None => prompt_label()?,
    };
    let session_start: Timestamp = chrono::Local::now().naive_local().into();
    let (mut output, path) = CsvLog::create(Path::new("."), &label, &session_start)?;

    let mut device = Device::simulated(DeviceVariant::U6);
    for (input, volts) in [(3, 1.2), (0, 0.8), (1, 1.5)] {
        device.driver_mut().set_analog_input(input, volts);
    }
    device.driver_mut().set_internal_temperature(300.0);

    // enter `q` or close stdin to end the session
    let (stop_handle, stop_token) = stop_signal();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim() != "q" => continue,
                _ => break,
            }
        }
        stop_handle.stop();
    });

    let mut display = TerminalDisplay::default();
    let mut logger = SensorLogger::new(LoggerConfiguration::default());
    let summary = logger.run(&mut device, &mut output, &mut display, &stop_token)?;
    println!("saved {} readings to {} ({} skipped)", summary.recorded, path.display(), summary.skipped);
    Ok(())
}
