//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`Sampler`], the valve [`ServoDriver`] and the [`StatusLeds`],
//! exposing them through [`SensorPort`] and [`ActuatorPort`].  On
//! non-espidf targets the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::drivers::servo::{ServoDriver, ValveMotion};
use crate::drivers::status_led::StatusLeds;
use crate::error::{ActuatorError, SensorError};
use crate::sensors::temperature::TemperatureReading;
use crate::sensors::{AdcDriver, MoistureReading, Sampler};

pub struct HardwareAdapter<A, P, D, L> {
    sampler: Sampler<A, D>,
    servo: ServoDriver<P, D>,
    leds: StatusLeds<L>,
}

impl<A, P, D, L> HardwareAdapter<A, P, D, L>
where
    A: AdcDriver,
    P: SetDutyCycle,
    D: DelayNs,
    L: OutputPin,
{
    pub fn new(sampler: Sampler<A, D>, servo: ServoDriver<P, D>, leds: StatusLeds<L>) -> Self {
        Self {
            sampler,
            servo,
            leds,
        }
    }

    /// Park the servo at the closed end-stop and turn both LEDs off.
    /// Call once before the control loop starts.
    pub fn home(&mut self) -> Result<(), ActuatorError> {
        self.servo.home()?;
        self.leds.reset()
    }

    /// Last pulse written to the servo.
    pub fn servo_pulse_us(&self) -> u16 {
        self.servo.pulse_us()
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<A, P, D, L> SensorPort for HardwareAdapter<A, P, D, L>
where
    A: AdcDriver,
    D: DelayNs,
{
    fn read_moisture(&mut self) -> Result<MoistureReading, SensorError> {
        self.sampler.read_moisture()
    }

    fn read_temperature(&mut self) -> Option<Result<TemperatureReading, SensorError>> {
        self.sampler.read_temperature()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<A, P, D, L> ActuatorPort for HardwareAdapter<A, P, D, L>
where
    P: SetDutyCycle,
    D: DelayNs,
    L: OutputPin,
{
    fn open_valve(&mut self) -> Result<(), ActuatorError> {
        if self.servo.open()? != ValveMotion::Opening {
            warn!("hardware: open request swept the valve closed, servo out of step");
        }
        Ok(())
    }

    fn close_valve(&mut self) -> Result<(), ActuatorError> {
        if self.servo.close()? != ValveMotion::Closing {
            warn!("hardware: close request swept the valve open, servo out of step");
        }
        Ok(())
    }

    fn set_low_reservoir_led(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.leds.set_low_reservoir(on)
    }

    fn set_high_temperature_led(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.leds.set_high_temperature(on)
    }
}
