use crate::{Error, Result};
use crate::sys::{Driver, SimDriver};
use crate::regs::labjack as regs;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceVariant {
    U3,
    U6,
    UE9,
}

impl DeviceVariant {
    pub const ALL: [DeviceVariant; 3] = [DeviceVariant::U3, DeviceVariant::U6, DeviceVariant::UE9];

    pub fn from_name(name: &str) -> Option<DeviceVariant> {
        Self::ALL.into_iter().find(|variant| variant.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::U3  => "U3",
            Self::U6  => "U6",
            Self::UE9 => "UE9",
        }
    }

    /// The UE9 runs its timers from the system clock; the others from the 4 MHz base.
    pub fn timer_clock_base(self) -> u16 {
        match self {
            Self::UE9 => regs::TIMER_CLOCK_BASE_SYSTEM,
            Self::U3 | Self::U6 => regs::TIMER_CLOCK_BASE_4MHZ,
        }
    }
}

/// Analog inputs and the internal temperature sensor.
pub trait AnalogSource {
    fn internal_temperature_kelvin(&mut self) -> Result<f64>;
    fn analog_input(&mut self, channel: u8) -> Result<f64>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub clock_divisor: u16,
    pub mode: u16,
    pub initial_value: u16,
}

/// A single hardware timer driven in PWM mode.
pub trait PwmTimer {
    fn write_timer_config(&mut self, config: &TimerConfig) -> Result<()>;
    /// Sets the timer value; the high time is `65536 - value` out of 65536 clocks.
    fn write_duty_cycle(&mut self, value: u16) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}

#[derive(Debug)]
pub struct Device<D: Driver> {
    variant: DeviceVariant,
    driver: D,
}

impl Device<SimDriver> {
    pub fn simulated(variant: DeviceVariant) -> Device<SimDriver> {
        log::info!("opening simulated {}", variant.name());
        Device::with_driver(variant, SimDriver::new())
    }
}

impl<D: Driver> Device<D> {
    pub fn with_driver(variant: DeviceVariant, driver: D) -> Device<D> {
        Device { variant, driver }
    }

    pub fn variant(&self) -> DeviceVariant {
        self.variant
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    fn read_f32(&mut self, addr: u16) -> Result<f32> {
        let mut words = [0u16; 2];
        self.driver.read_registers(addr, &mut words[..]).map_err(|error| match error {
            Error::Other(error) => Error::DeviceRead(format!("register {}: {}", addr, error)),
            error => error,
        })?;
        let value = regs::words_to_f32(words);
        log::trace!("read_f32({}) = {}", addr, value);
        Ok(value)
    }

    fn write_u16(&mut self, addr: u16, value: u16) -> Result<()> {
        log::trace!("write_u16({}, {})", addr, value);
        self.driver.write_registers(addr, &[value])
    }
}

impl<D: Driver> AnalogSource for Device<D> {
    fn internal_temperature_kelvin(&mut self) -> Result<f64> {
        let value = self.read_f32(regs::ADDR_TEMPERATURE_DEVICE_K)?;
        log::debug!("internal_temperature_kelvin() = {}", value);
        Ok(value as f64)
    }

    fn analog_input(&mut self, channel: u8) -> Result<f64> {
        let addr = regs::ain_address(channel).ok_or_else(||
            Error::DeviceRead(format!("no analog input AIN{}", channel)))?;
        let value = self.read_f32(addr)?;
        log::debug!("analog_input({}) = {}", channel, value);
        Ok(value as f64)
    }
}

impl<D: Driver> PwmTimer for Device<D> {
    fn write_timer_config(&mut self, config: &TimerConfig) -> Result<()> {
        log::debug!("write_timer_config({:?})", config);
        self.write_u16(regs::ADDR_TIMER_CLOCK_BASE, self.variant.timer_clock_base())?;
        self.write_u16(regs::ADDR_TIMER_CLOCK_DIVISOR, config.clock_divisor)?;
        self.write_u16(regs::ADDR_NUM_TIMERS_ENABLED, 1)?;
        self.driver.write_registers(regs::ADDR_TIMER0_CONFIG, &[config.mode, config.initial_value])
    }

    fn write_duty_cycle(&mut self, value: u16) -> Result<()> {
        log::debug!("write_duty_cycle({})", value);
        self.write_u16(regs::ADDR_TIMER0_VALUE, value)
    }

    fn close(&mut self) -> Result<()> {
        log::debug!("closing {}", self.variant.name());
        self.driver.close()
    }
}
