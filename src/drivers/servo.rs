//! Valve servo driver.
//!
//! A hobby servo rotates the valve between two mechanical end-stops.  The
//! hardware has no position feedback, so the driver infers which way to go
//! from the last pulse it commanded:
//!
//! | Last pulse        | Sweep                                   |
//! |-------------------|-----------------------------------------|
//! | `> midpoint_us`   | `open_pulse_us` down to `closed_pulse_us` |
//! | `<= midpoint_us`  | `open_sweep_from_us` up to `open_pulse_us` |
//!
//! The sweep moves one microsecond of pulse width per step with a fixed
//! delay between steps, so a full rotation takes a bounded, predictable
//! time (about one second with the default geometry).
//!
//! ## Hazard
//!
//! `open()` and `close()` are the same `toggle()`: the driver will move the
//! servo on every call whatever the valve's real position.  Callers must
//! track the logical valve state themselves and only call on a change.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::config::ServoConfig;
use crate::error::ActuatorError;

/// Which way a toggle actually moved the servo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveMotion {
    Opening,
    Closing,
}

pub struct ServoDriver<P, D> {
    pwm: P,
    delay: D,
    cfg: ServoConfig,
    /// Last pulse written; the only direction information there is.
    pulse_us: u16,
}

impl<P: SetDutyCycle, D: DelayNs> ServoDriver<P, D> {
    pub fn new(pwm: P, delay: D, cfg: ServoConfig) -> Self {
        Self {
            pwm,
            delay,
            cfg,
            pulse_us: 0,
        }
    }

    /// Jump straight to the closed end-stop (no sweep).  Used once at
    /// start-up so the inferred direction agrees with a closed valve.
    pub fn home(&mut self) -> Result<(), ActuatorError> {
        self.write_pulse(self.cfg.closed_pulse_us)
    }

    pub fn open(&mut self) -> Result<ValveMotion, ActuatorError> {
        self.toggle()
    }

    pub fn close(&mut self) -> Result<ValveMotion, ActuatorError> {
        self.toggle()
    }

    /// Sweep to the opposite end-stop from the one last commanded.
    pub fn toggle(&mut self) -> Result<ValveMotion, ActuatorError> {
        if self.pulse_us > self.cfg.midpoint_us {
            self.sweep(self.cfg.open_pulse_us, self.cfg.closed_pulse_us)?;
            Ok(ValveMotion::Closing)
        } else {
            self.sweep(self.cfg.open_sweep_from_us, self.cfg.open_pulse_us)?;
            Ok(ValveMotion::Opening)
        }
    }

    pub fn pulse_us(&self) -> u16 {
        self.pulse_us
    }

    fn sweep(&mut self, from: u16, to: u16) -> Result<(), ActuatorError> {
        let mut pulse = from;
        while pulse != to {
            self.write_pulse(pulse)?;
            self.delay.delay_us(self.cfg.step_delay_us);
            if pulse < to {
                pulse += 1;
            } else {
                pulse -= 1;
            }
        }
        self.write_pulse(to)
    }

    fn write_pulse(&mut self, pulse_us: u16) -> Result<(), ActuatorError> {
        let duty = pulse_to_duty(pulse_us, self.cfg.pwm_period_us, self.pwm.max_duty_cycle());
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.pulse_us = pulse_us;
        Ok(())
    }
}

/// Convert a pulse width to a duty value for a PWM with `max_duty` counts
/// per `period_us` frame.
pub fn pulse_to_duty(pulse_us: u16, period_us: u32, max_duty: u16) -> u16 {
    if period_us == 0 {
        return 0;
    }
    let duty = u64::from(pulse_us) * u64::from(max_duty) / u64::from(period_us);
    duty.min(u64::from(max_duty)) as u16
}

// ---------------------------------------------------------------------------
// LEDC-backed PWM channel
// ---------------------------------------------------------------------------

/// The servo's LEDC channel behind the `embedded-hal` PWM trait.
///
/// On ESP-IDF: writes the LEDC duty register via hw_init.
/// On host/test: discards the duty.
pub struct LedcServoPwm;

impl LedcServoPwm {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LedcServoPwm {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorType for LedcServoPwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for LedcServoPwm {
    fn max_duty_cycle(&self) -> u16 {
        ((1u32 << crate::pins::SERVO_PWM_RESOLUTION_BITS) - 1) as u16
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        crate::drivers::hw_init::ledc_set(crate::drivers::hw_init::LEDC_CH_SERVO, u32::from(duty));
        Ok(())
    }
}
