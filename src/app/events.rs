//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::error::Error;
use crate::fsm::ValveState;
use crate::sensors::MoistureReading;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Per-iteration snapshot.
    Telemetry(TelemetryData),

    /// The servo completed a sweep.
    ValveChanged {
        from: ValveState,
        to: ValveState,
        reading: MoistureReading,
    },

    /// Threshold replaced by a calibration press.
    Calibrated {
        previous: MoistureReading,
        threshold: MoistureReading,
    },

    /// Low-reservoir indicator latched.
    LowReservoir { count: u32 },

    /// Refill acknowledged; `count` is the dry counter before reset.
    ReservoirRefilled { count: u32 },

    /// High-temperature indicator changed.
    HighTemperature { celsius: f32, active: bool },

    /// Telemetry link stalled mid-frame.
    TelemetryTruncated { written: usize },

    /// Something in the iteration failed; the loop carries on.
    Fault(Error),

    /// The application service has started.
    Started {
        state: ValveState,
        threshold: MoistureReading,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub state: ValveState,
    pub reading: MoistureReading,
    pub threshold: MoistureReading,
    pub dry_count: u32,
    pub low_reservoir: bool,
    pub temperature_c: Option<f32>,
}
