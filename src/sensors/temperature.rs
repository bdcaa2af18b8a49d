//! Temperature channel with a factory two-point calibration.
//!
//! The part ships with the raw ADC value measured at 30 °C and at 85 °C.
//! Celsius is linear interpolation (or extrapolation) through those two
//! points.  The reading only drives a status LED; it never actuates.

use serde::{Deserialize, Serialize};

/// Reference temperatures the factory calibration pair was taken at.
const CAL_LOW_C: f32 = 30.0;
const CAL_HIGH_C: f32 = 85.0;

/// Factory calibration constants, supplied through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemperatureCalibration {
    pub raw_at_30c: u16,
    pub raw_at_85c: u16,
}

impl TemperatureCalibration {
    pub fn celsius(&self, raw: u16) -> f32 {
        let span = f32::from(self.raw_at_85c) - f32::from(self.raw_at_30c);
        if span.abs() < f32::EPSILON {
            return CAL_LOW_C;
        }
        (f32::from(raw) - f32::from(self.raw_at_30c)) * (CAL_HIGH_C - CAL_LOW_C) / span
            + CAL_LOW_C
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub raw: u16,
    pub celsius: f32,
}

impl TemperatureReading {
    pub fn from_raw(raw: u16, cal: &TemperatureCalibration) -> Self {
        Self {
            raw,
            celsius: cal.celsius(raw),
        }
    }
}
