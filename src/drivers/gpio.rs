//! `embedded-hal` digital pins over the raw GPIO helpers in hw_init.
//!
//! Lets the button and LED drivers stay generic over `InputPin`/`OutputPin`
//! while the board build talks to the pads directly.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::drivers::hw_init;

/// An input pad configured in `hw_init::init_peripherals`.
#[derive(Debug, Clone, Copy)]
pub struct GpioInput(pub i32);

impl ErrorType for GpioInput {
    type Error = Infallible;
}

impl InputPin for GpioInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(hw_init::gpio_read(self.0))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!hw_init::gpio_read(self.0))
    }
}

/// An output pad configured in `hw_init::init_peripherals`.
#[derive(Debug, Clone, Copy)]
pub struct GpioOutput(pub i32);

impl ErrorType for GpioOutput {
    type Error = Infallible;
}

impl OutputPin for GpioOutput {
    fn set_low(&mut self) -> Result<(), Infallible> {
        hw_init::gpio_write(self.0, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        hw_init::gpio_write(self.0, true);
        Ok(())
    }
}
