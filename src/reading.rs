use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::Result;
use crate::config::{Channel, ChannelCalibration};
use crate::convert;

/// Local wall-clock time truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(datetime: NaiveDateTime) -> Timestamp {
        Timestamp(datetime.with_nanosecond(0).unwrap_or(datetime))
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    /// `M/D/YYYY`, unpadded.
    pub fn date_field(&self) -> String {
        format!("{}/{}/{}", self.0.month(), self.0.day(), self.0.year())
    }

    /// `H:M:S`, unpadded.
    pub fn time_field(&self) -> String {
        format!("{}:{}:{}", self.0.hour(), self.0.minute(), self.0.second())
    }

    /// `M_D_YYYY_H_M_S`, for file names.
    pub fn file_stamp(&self) -> String {
        format!("{}_{}_{}_{}_{}_{}",
            self.0.month(), self.0.day(), self.0.year(),
            self.0.hour(), self.0.minute(), self.0.second())
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Timestamp::new(datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.date_field(), self.time_field())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSample {
    pub channel: Channel,
    pub voltage: f64,
    pub resistance: f64,
    pub celsius: f64,
}

impl ChannelSample {
    pub fn convert(calibration: &ChannelCalibration, voltage: f64) -> Result<ChannelSample> {
        let resistance = convert::resistance(calibration, voltage)?;
        let celsius = convert::temperature(&calibration.curve, resistance)?;
        Ok(ChannelSample { channel: calibration.channel, voltage, resistance, celsius })
    }
}

/// One acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: Timestamp,
    /// In column order: LNA, SP4T, Load.
    pub channels: [ChannelSample; 3],
    pub internal_celsius: f64,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.timestamp)?;
        for sample in self.channels.iter() {
            write!(f, " {:.3} {:.0} {:.1}", sample.voltage, sample.resistance, sample.celsius)?;
        }
        write!(f, " {}", self.internal_celsius)
    }
}
