//! Peripheral drivers, hardware initialisation, and ISR plumbing.

pub mod button;
pub mod gpio;
pub mod hw_init;
pub mod hw_timer;
pub mod servo;
pub mod status_led;
pub mod uart;
pub mod watchdog;
