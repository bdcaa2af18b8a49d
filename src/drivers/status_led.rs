//! Status indicators: low-reservoir and high-temperature LEDs.
//!
//! Both are plain on/off outputs.  The driver remembers what it last wrote
//! so the adapter only touches the pins on a change.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct StatusLeds<L> {
    low_reservoir: L,
    high_temperature: L,
    current: (bool, bool),
}

impl<L: OutputPin> StatusLeds<L> {
    pub fn new(low_reservoir: L, high_temperature: L) -> Self {
        Self {
            low_reservoir,
            high_temperature,
            current: (false, false),
        }
    }

    /// Drive both LEDs off.
    pub fn reset(&mut self) -> Result<(), ActuatorError> {
        self.low_reservoir
            .set_low()
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.high_temperature
            .set_low()
            .map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.current = (false, false);
        Ok(())
    }

    pub fn set_low_reservoir(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.current.0 != on {
            drive(&mut self.low_reservoir, on)?;
            self.current.0 = on;
        }
        Ok(())
    }

    pub fn set_high_temperature(&mut self, on: bool) -> Result<(), ActuatorError> {
        if self.current.1 != on {
            drive(&mut self.high_temperature, on)?;
            self.current.1 = on;
        }
        Ok(())
    }

    /// `(low_reservoir, high_temperature)`.
    pub fn current(&self) -> (bool, bool) {
        self.current
    }
}

fn drive<L: OutputPin>(pin: &mut L, on: bool) -> Result<(), ActuatorError> {
    let result = if on { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| ActuatorError::GpioWriteFailed)
}
