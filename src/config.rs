//! Calibration constants and session settings, expressed in physical quantities.

use std::time::Duration;

use crate::device::DeviceVariant;

/// Steinhart-Hart coefficients shared by the LNA and SP4T thermistors.
const F1: f64 = 0.00129675;
const F2: f64 = 0.000197374;
const F3: f64 = 0.000000304;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Lna,
    Sp4t,
    Load,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Lna, Channel::Sp4t, Channel::Load];

    pub fn name(self) -> &'static str {
        match self {
            Self::Lna  => "LNA",
            Self::Sp4t => "SP4T",
            Self::Load => "Load",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureCurve {
    /// `T = 1 / (f1 + f2·ln(R) + f3·ln(R)³) - 273`
    SteinhartHart { f1: f64, f2: f64, f3: f64 },
    /// `T = a·ln(R) + b`
    LinearLog { a: f64, b: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelCalibration {
    pub channel: Channel,
    /// Analog input the thermistor divider is wired to.
    pub input: u8,
    /// Divider reference resistance.
    pub r_ref: f64,
    /// Divider supply voltage. Readings at or above it have no finite resistance.
    pub v_ref: f64,
    pub curve: TemperatureCurve,
}

impl ChannelCalibration {
    pub fn for_channel(channel: Channel) -> Self {
        let steinhart_hart = TemperatureCurve::SteinhartHart { f1: F1, f2: F2, f3: F3 };
        match channel {
            Channel::Lna => ChannelCalibration {
                channel, input: 3, r_ref: 9918.0, v_ref: 5.05, curve: steinhart_hart,
            },
            Channel::Sp4t => ChannelCalibration {
                channel, input: 0, r_ref: 9960.0, v_ref: 4.9262, curve: steinhart_hart,
            },
            Channel::Load => ChannelCalibration {
                channel, input: 1, r_ref: 9923.0, v_ref: 4.9262,
                curve: TemperatureCurve::LinearLog { a: -24.19, b: 260.81 },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfiguration {
    /// In column order: LNA, SP4T, Load.
    pub channels: [ChannelCalibration; 3],
    /// Wait between iterations. Interrupted by a stop request.
    pub settle_delay: Duration,
    /// Second-of-minute at which the plot is cleared.
    pub plot_reset_second: u32,
    /// Ends the session after this many iterations, successful or not.
    pub sample_limit: Option<usize>,
}

impl Default for LoggerConfiguration {
    fn default() -> Self {
        LoggerConfiguration {
            channels: Channel::ALL.map(ChannelCalibration::for_channel),
            settle_delay: Duration::from_secs(1),
            plot_reset_second: 30,
            sample_limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfiguration {
    pub variant: DeviceVariant,
    pub clock_divisor: u16,
    /// Timer value at the start of the sweep; `65535` is the smallest nonzero duty cycle.
    pub base_value: u16,
    pub step: u16,
    pub step_count: u16,
    pub step_delay: Duration,
}

impl Default for SweepConfiguration {
    fn default() -> Self {
        SweepConfiguration {
            variant: DeviceVariant::UE9,
            clock_divisor: 15,
            base_value: 65535,
            step: 1000,
            step_count: 65,
            step_delay: Duration::from_millis(300),
        }
    }
}
