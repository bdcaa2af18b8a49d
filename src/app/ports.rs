//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sampler, servo, LEDs, UART, logger, build-time config)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::config::SystemConfig;
use crate::error::{ActuatorError, EncodeError, SensorError};
use crate::sensors::MoistureReading;
use crate::sensors::temperature::TemperatureReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port.  Every call is one fresh conversion.
pub trait SensorPort {
    fn read_moisture(&mut self) -> Result<MoistureReading, SensorError>;

    /// `None` when no temperature channel is fitted.
    fn read_temperature(&mut self) -> Option<Result<TemperatureReading, SensorError>>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.
///
/// `open_valve`/`close_valve` are not idempotent on real hardware: the
/// caller must only issue them on an actual state change.
pub trait ActuatorPort {
    fn open_valve(&mut self) -> Result<(), ActuatorError>;

    fn close_valve(&mut self) -> Result<(), ActuatorError>;

    fn set_low_reservoir_led(&mut self, on: bool) -> Result<(), ActuatorError>;

    fn set_high_temperature_led(&mut self, on: bool) -> Result<(), ActuatorError>;
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain → serial link)
// ───────────────────────────────────────────────────────────────

/// What happened to one telemetry frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Sent,
    /// The link stopped accepting bytes; only `written` bytes went out.
    Truncated { written: usize },
}

pub trait TelemetryPort {
    fn send_reading(&mut self, reading: MoistureReading) -> Result<FrameStatus, EncodeError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Supplies the configuration the device runs with.
///
/// Implementations MUST run [`SystemConfig::validate`] and reject invalid
/// ranges with [`ConfigError::ValidationFailed`], never clamp them.
/// Configuration is read once at boot and never written back.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored override failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}
