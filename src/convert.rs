//! Conversion of raw divider voltages into thermistor resistance and temperature.

use std::fmt;

use crate::config::{ChannelCalibration, TemperatureCurve};

/// Kelvin offset used throughout; the calibration curves were fitted against 273, not 273.15.
const KELVIN_OFFSET: f64 = 273.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomainError {
    NegativeVoltage { raw: f64 },
    NonFiniteVoltage { raw: f64 },
    /// The divider would need an infinite (or negative) thermistor resistance.
    ReferenceVoltageReached { raw: f64, v_ref: f64 },
    NonPositiveResistance { resistance: f64 },
    NonFiniteTemperature { resistance: f64 },
    NonFiniteInternalTemperature { kelvin: f64 },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeVoltage { raw } =>
                write!(f, "negative input voltage {raw} V"),
            Self::NonFiniteVoltage { raw } =>
                write!(f, "input voltage {raw} is not a number"),
            Self::ReferenceVoltageReached { raw, v_ref } =>
                write!(f, "input voltage {raw} V at or above reference {v_ref} V"),
            Self::NonPositiveResistance { resistance } =>
                write!(f, "resistance {resistance} is not positive"),
            Self::NonFiniteTemperature { resistance } =>
                write!(f, "no finite temperature for resistance {resistance}"),
            Self::NonFiniteInternalTemperature { kelvin } =>
                write!(f, "device reported internal temperature {kelvin} K"),
        }
    }
}

impl std::error::Error for DomainError {}

pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Internal sensor reading in degrees Celsius; rejects readings that are not finite.
pub fn internal_temperature(kelvin: f64) -> Result<f64, DomainError> {
    if kelvin.is_finite() {
        Ok(kelvin_to_celsius(kelvin))
    } else {
        Err(DomainError::NonFiniteInternalTemperature { kelvin })
    }
}

/// Thermistor resistance of a divider reading: `raw * r_ref / (v_ref - raw)`.
pub fn resistance(calibration: &ChannelCalibration, raw: f64) -> Result<f64, DomainError> {
    if raw.is_nan() {
        return Err(DomainError::NonFiniteVoltage { raw })
    }
    if raw < 0.0 {
        return Err(DomainError::NegativeVoltage { raw })
    }
    if raw >= calibration.v_ref {
        return Err(DomainError::ReferenceVoltageReached { raw, v_ref: calibration.v_ref })
    }
    Ok(raw * calibration.r_ref / (calibration.v_ref - raw))
}

pub fn temperature(curve: &TemperatureCurve, resistance: f64) -> Result<f64, DomainError> {
    if !(resistance > 0.0) || !resistance.is_finite() {
        return Err(DomainError::NonPositiveResistance { resistance })
    }
    let ln_r = resistance.ln();
    let celsius = match *curve {
        TemperatureCurve::SteinhartHart { f1, f2, f3 } =>
            1.0 / (f1 + f2 * ln_r + f3 * ln_r.powi(3)) - KELVIN_OFFSET,
        TemperatureCurve::LinearLog { a, b } =>
            a * ln_r + b,
    };
    if celsius.is_finite() {
        Ok(celsius)
    } else {
        Err(DomainError::NonFiniteTemperature { resistance })
    }
}
