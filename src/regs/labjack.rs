//! Modbus register map of the LabJack U3/U6/UE9 family, limited to what the tools use.

/// Analog input 0, FLOAT32 volts. Input `n` lives at `ADDR_AIN0 + 2 * n`.
pub const ADDR_AIN0: u16 = 0;
pub const AIN_COUNT: u8 = 14;

/// Device temperature sensor, FLOAT32 kelvin.
pub const ADDR_TEMPERATURE_DEVICE_K: u16 = 60052;

pub const ADDR_TIMER_CLOCK_BASE: u16 = 7000;
pub const ADDR_TIMER_CLOCK_DIVISOR: u16 = 7002;
pub const ADDR_NUM_TIMERS_ENABLED: u16 = 50501;
/// Timer 0 configuration: `[mode, value]`.
pub const ADDR_TIMER0_CONFIG: u16 = 7100;
pub const ADDR_TIMER0_VALUE: u16 = 7200;

/// Timer clock sources.
pub const TIMER_CLOCK_BASE_SYSTEM: u16 = 1;
pub const TIMER_CLOCK_BASE_4MHZ: u16 = 4;

/// 16-bit PWM, rising edges.
pub const TIMER_MODE_PWM16: u16 = 0;

pub fn ain_address(channel: u8) -> Option<u16> {
    if channel < AIN_COUNT {
        Some(ADDR_AIN0 + 2 * channel as u16)
    } else {
        None
    }
}

pub fn f32_to_words(value: f32) -> [u16; 2] {
    let bits = value.to_bits();
    [(bits >> 16) as u16, (bits >> 0) as u16]
}

pub fn words_to_f32(words: [u16; 2]) -> f32 {
    f32::from_bits((words[0] as u32) << 16 | words[1] as u32)
}
