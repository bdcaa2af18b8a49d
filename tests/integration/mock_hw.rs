//! Mock adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history without touching real GPIO/PWM registers.

use std::collections::VecDeque;

use plantwater::app::events::AppEvent;
use plantwater::app::ports::{ActuatorPort, EventSink, FrameStatus, SensorPort, TelemetryPort};
use plantwater::error::{ActuatorError, EncodeError, SensorError};
use plantwater::sensors::temperature::TemperatureReading;
use plantwater::sensors::{AnalogInput, MoistureReading};
use plantwater::telemetry::FrameEncoder;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    OpenValve,
    CloseValve,
    LowReservoirLed(bool),
    HighTemperatureLed(bool),
}

// ── MockHardware ──────────────────────────────────────────────

/// Serves scripted moisture readings; `None` in the script is a
/// conversion timeout.  Once the script runs out the last value repeats.
pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    readings: VecDeque<Option<u16>>,
    last: u16,
    pub temperature_c: Option<f32>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            readings: VecDeque::new(),
            last: 0,
            temperature_c: None,
        }
    }

    pub fn with_readings(readings: &[u16]) -> Self {
        let mut hw = Self::new();
        hw.script(readings);
        hw
    }

    pub fn script(&mut self, readings: &[u16]) {
        self.readings.extend(readings.iter().copied().map(Some));
    }

    pub fn script_timeout(&mut self) {
        self.readings.push_back(None);
    }

    pub fn valve_moves(&self) -> Vec<ActuatorCall> {
        self.calls
            .iter()
            .copied()
            .filter(|c| matches!(c, ActuatorCall::OpenValve | ActuatorCall::CloseValve))
            .collect()
    }

    /// Level of the low-reservoir LED after the most recent write.
    pub fn low_reservoir_led(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::LowReservoirLed(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn high_temperature_led(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::HighTemperatureLed(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_moisture(&mut self) -> Result<MoistureReading, SensorError> {
        match self.readings.pop_front() {
            Some(Some(raw)) => {
                self.last = raw;
                Ok(MoistureReading::new(raw))
            }
            Some(None) => Err(SensorError::Timeout(AnalogInput::Moisture)),
            None => Ok(MoistureReading::new(self.last)),
        }
    }

    fn read_temperature(&mut self) -> Option<Result<TemperatureReading, SensorError>> {
        self.temperature_c
            .map(|celsius| Ok(TemperatureReading { raw: 0, celsius }))
    }
}

impl ActuatorPort for MockHardware {
    fn open_valve(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::OpenValve);
        Ok(())
    }

    fn close_valve(&mut self) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::CloseValve);
        Ok(())
    }

    fn set_low_reservoir_led(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::LowReservoirLed(on));
        Ok(())
    }

    fn set_high_temperature_led(&mut self, on: bool) -> Result<(), ActuatorError> {
        self.calls.push(ActuatorCall::HighTemperatureLed(on));
        Ok(())
    }
}

// ── Telemetry capture ─────────────────────────────────────────

/// Collects the exact bytes a UART would have carried.
pub struct CaptureTelemetry {
    encoder: FrameEncoder,
    pub wire: Vec<u8>,
}

#[allow(dead_code)]
impl CaptureTelemetry {
    pub fn new(encoder: FrameEncoder) -> Self {
        Self {
            encoder,
            wire: Vec::new(),
        }
    }

    pub fn wire_str(&self) -> &str {
        core::str::from_utf8(&self.wire).unwrap()
    }
}

impl TelemetryPort for CaptureTelemetry {
    fn send_reading(&mut self, reading: MoistureReading) -> Result<FrameStatus, EncodeError> {
        let frame = self.encoder.frame(i32::from(reading.value()))?;
        self.wire.extend_from_slice(&frame);
        Ok(FrameStatus::Sent)
    }
}

// ── Event recorder ────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
