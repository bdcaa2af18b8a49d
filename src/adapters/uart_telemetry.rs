//! UART telemetry adapter.
//!
//! Implements [`TelemetryPort`] by encoding each reading as a
//! separator-prefixed frame and writing it to a [`SerialTx`] with a
//! bounded wait per byte.  A stalled link loses the rest of that frame
//! only; the next iteration starts a fresh one.

use log::warn;

use crate::app::ports::{FrameStatus, TelemetryPort};
use crate::config::SystemConfig;
use crate::drivers::uart::{SerialTx, write_bounded};
use crate::error::EncodeError;
use crate::sensors::MoistureReading;
use crate::telemetry::FrameEncoder;

pub struct UartTelemetry<T> {
    tx: T,
    encoder: FrameEncoder,
    spin_limit: u32,
}

impl<T: SerialTx> UartTelemetry<T> {
    pub fn new(tx: T, config: &SystemConfig) -> Self {
        Self {
            tx,
            encoder: FrameEncoder::from_config(config),
            spin_limit: config.uart_tx_spin_limit,
        }
    }
}

impl<T: SerialTx> TelemetryPort for UartTelemetry<T> {
    fn send_reading(&mut self, reading: MoistureReading) -> Result<FrameStatus, EncodeError> {
        let frame = self.encoder.frame(i32::from(reading.value()))?;
        let written = write_bounded(&mut self.tx, &frame, self.spin_limit);
        if written < frame.len() {
            warn!(
                "telemetry: link stalled, {written}/{} bytes of frame sent",
                frame.len()
            );
            return Ok(FrameStatus::Truncated { written });
        }
        Ok(FrameStatus::Sent)
    }
}
