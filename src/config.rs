//! System configuration parameters
//!
//! All tunable parameters for the PlantWater controller.  Values are fixed
//! for the life of the device; a JSON override can be baked into the image
//! at build time (see [`crate::adapters::config_source`]).  Nothing is ever
//! persisted.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins::SERVO_PWM_PERIOD_US;
use crate::sensors::MOISTURE_ADC_MAX;
use crate::sensors::temperature::TemperatureCalibration;
use crate::telemetry::FRAME_DIGITS_MAX;

/// Reset the device if the control task stalls this long.
pub const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

/// Longest allowed single valve sweep.  Half the watchdog leaves room for
/// the two ADC waits and the rest of the iteration.
pub const MAX_SWEEP_US: u64 = WATCHDOG_TIMEOUT_MS as u64 * 1_000 / 2;

/// Upper bound on one ADC conversion wait.
pub const MAX_ADC_TIMEOUT_US: u32 = 1_000_000;

/// What, besides an explicit refill, zeroes the dry-reservoir counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservoirResetPolicy {
    /// Only the refill button resets the counter.  The counter then tracks
    /// cumulative open-and-dry iterations since the reservoir was last filled.
    /// Departs from "the counter resets whenever the soil is wet again",
    /// which is [`Self::CloseOrRefill`].
    RefillOnly,
    /// The counter also resets whenever the valve closes because the soil is
    /// wet again.  The counter then tracks the current watering run only.
    CloseOrRefill,
}

/// Valve servo sweep geometry, in microseconds of pulse width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoConfig {
    /// PWM frame period.  Must match the LEDC frame
    /// ([`SERVO_PWM_PERIOD_US`]) or every pulse comes out scaled.
    pub pwm_period_us: u32,
    /// End-stop for the closed valve.  Kept short of the mechanical limit
    /// because the horn jams there.
    pub closed_pulse_us: u16,
    /// End-stop for the open valve.
    pub open_pulse_us: u16,
    /// Pulse the opening sweep starts from.
    pub open_sweep_from_us: u16,
    /// Last pulse above this is taken to mean "currently open".
    pub midpoint_us: u16,
    /// Delay between one-microsecond sweep steps (sets rotation speed).
    pub step_delay_us: u32,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            pwm_period_us: SERVO_PWM_PERIOD_US,
            closed_pulse_us: 550,
            open_pulse_us: 2600,
            open_sweep_from_us: 350,
            midpoint_us: 2000,
            step_delay_us: 500,
        }
    }
}

impl ServoConfig {
    /// Duration of the longer of the two sweeps.
    pub fn longest_sweep_us(&self) -> u64 {
        let from = self.closed_pulse_us.min(self.open_sweep_from_us);
        u64::from(self.open_pulse_us.saturating_sub(from)) * u64::from(self.step_delay_us)
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Moisture ---
    /// Power-on threshold; readings strictly above it mean "too dry".
    pub moisture_threshold: u16,

    // --- Dry reservoir ---
    /// Open-and-dry iterations tolerated before the low-reservoir alarm.
    /// At the default loop period, 30 iterations is eight minutes.
    pub dry_reservoir_limit: u32,
    pub reservoir_reset_policy: ReservoirResetPolicy,

    // --- Timing ---
    /// Control loop period (milliseconds).
    pub control_loop_interval_ms: u32,
    /// Upper bound on one ADC conversion (microseconds).
    pub adc_timeout_us: u32,
    /// Button debounce hold time (milliseconds).
    pub debounce_ms: u32,

    // --- Valve ---
    pub servo: ServoConfig,

    // --- Temperature (optional channel) ---
    /// Factory calibration pair; `None` when no temperature channel is fitted.
    pub temperature: Option<TemperatureCalibration>,
    /// High-temperature LED lights strictly above this (Celsius).
    pub high_temperature_c: f32,

    // --- Telemetry ---
    pub telemetry_base: u32,
    /// Zero-padded field width; `0` emits minimal-width digits.
    pub telemetry_digits: u8,
    pub telemetry_separator: u8,
    pub uart_baud: u32,
    /// Transmit-ready polls per byte before the frame is abandoned.
    pub uart_tx_spin_limit: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Moisture
            moisture_threshold: 2000,

            // Dry reservoir
            dry_reservoir_limit: 30,
            reservoir_reset_policy: ReservoirResetPolicy::RefillOnly,

            // Timing
            control_loop_interval_ms: 16_000, // 65535 ticks of ACLK/8
            adc_timeout_us: 10_000,
            debounce_ms: 50,

            // Valve
            servo: ServoConfig::default(),

            // Temperature
            temperature: None,
            high_temperature_c: 35.0,

            // Telemetry
            telemetry_base: 10,
            telemetry_digits: 4,
            telemetry_separator: b';',
            uart_baud: 115_200,
            uart_tx_spin_limit: 10_000,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.moisture_threshold > MOISTURE_ADC_MAX {
            return Err(ConfigError::ValidationFailed("moisture_threshold above ADC range"));
        }
        if self.dry_reservoir_limit == 0 {
            return Err(ConfigError::ValidationFailed("dry_reservoir_limit must be non-zero"));
        }
        if self.control_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("control_loop_interval_ms must be non-zero"));
        }
        if self.adc_timeout_us == 0 || self.adc_timeout_us > MAX_ADC_TIMEOUT_US {
            return Err(ConfigError::ValidationFailed("adc_timeout_us outside 1..=1s"));
        }

        let s = &self.servo;
        if !(s.closed_pulse_us < s.midpoint_us && s.midpoint_us < s.open_pulse_us) {
            return Err(ConfigError::ValidationFailed(
                "servo pulses must satisfy closed < midpoint < open",
            ));
        }
        if s.open_sweep_from_us > s.midpoint_us {
            return Err(ConfigError::ValidationFailed("servo open_sweep_from_us above midpoint"));
        }
        if s.pwm_period_us != SERVO_PWM_PERIOD_US {
            return Err(ConfigError::ValidationFailed("servo pwm_period_us differs from LEDC frame"));
        }
        if u32::from(s.open_pulse_us) >= s.pwm_period_us {
            return Err(ConfigError::ValidationFailed("servo open pulse exceeds PWM period"));
        }
        if s.longest_sweep_us() > MAX_SWEEP_US {
            return Err(ConfigError::ValidationFailed("servo sweep outlasts the watchdog"));
        }

        if let Some(cal) = &self.temperature {
            if cal.raw_at_30c == cal.raw_at_85c {
                return Err(ConfigError::ValidationFailed(
                    "temperature calibration points must differ",
                ));
            }
        }

        if !(2..=36).contains(&self.telemetry_base) {
            return Err(ConfigError::ValidationFailed("telemetry_base outside 2..=36"));
        }
        if usize::from(self.telemetry_digits) > FRAME_DIGITS_MAX {
            return Err(ConfigError::ValidationFailed("telemetry_digits too wide"));
        }
        if self.telemetry_separator.is_ascii_alphanumeric() || self.telemetry_separator == b'-' {
            return Err(ConfigError::ValidationFailed(
                "telemetry_separator collides with digit alphabet",
            ));
        }
        if self.uart_tx_spin_limit == 0 {
            return Err(ConfigError::ValidationFailed("uart_tx_spin_limit must be non-zero"));
        }
        Ok(())
    }
}
