//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to the console UART in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let reservoir = if t.low_reservoir { "LOW" } else { "OK" };
                match t.temperature_c {
                    Some(c) => info!(
                        "TELEM | valve={:?} | moisture={}/{} | dry={} reservoir={} | T={:.1}\u{00b0}C",
                        t.state, t.reading, t.threshold, t.dry_count, reservoir, c,
                    ),
                    None => info!(
                        "TELEM | valve={:?} | moisture={}/{} | dry={} reservoir={}",
                        t.state, t.reading, t.threshold, t.dry_count, reservoir,
                    ),
                }
            }
            AppEvent::ValveChanged { from, to, reading } => {
                info!("VALVE | {from:?} -> {to:?} at moisture {reading}");
            }
            AppEvent::Calibrated { previous, threshold } => {
                info!("CAL | threshold {previous} -> {threshold}");
            }
            AppEvent::LowReservoir { count } => {
                warn!("RESERVOIR | low after {count} dry iterations");
            }
            AppEvent::ReservoirRefilled { count } => {
                info!("RESERVOIR | refilled, counter was {count}");
            }
            AppEvent::HighTemperature { celsius, active } => {
                info!(
                    "TEMP | {celsius:.1}\u{00b0}C, high-temperature {}",
                    if *active { "on" } else { "off" }
                );
            }
            AppEvent::TelemetryTruncated { written } => {
                warn!("TELEM | link stalled after {written} bytes");
            }
            AppEvent::Fault(e) => {
                warn!("FAULT | {e}");
            }
            AppEvent::Started { state, threshold } => {
                info!("START | valve={state:?} threshold={threshold}");
            }
        }
    }
}
