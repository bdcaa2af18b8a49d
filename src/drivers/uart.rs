//! Telemetry UART, transmit side only.
//!
//! The link is written one byte at a time.  Before each byte the driver
//! polls the transmitter for room, at most `spin_limit` times; a link that
//! stays busy ends the write early instead of hanging the control loop.

use crate::drivers::hw_init;

/// A byte sink with a non-blocking "room for one more" check.
pub trait SerialTx {
    /// Queue `byte` if the transmitter can take it now.
    fn try_write(&mut self, byte: u8) -> bool;
}

/// Write `bytes` in order, spinning at most `spin_limit` polls per byte.
/// Returns how many bytes were accepted.
pub fn write_bounded<T: SerialTx>(tx: &mut T, bytes: &[u8], spin_limit: u32) -> usize {
    for (i, &byte) in bytes.iter().enumerate() {
        let mut spins = 0;
        while !tx.try_write(byte) {
            spins += 1;
            if spins >= spin_limit {
                return i;
            }
            core::hint::spin_loop();
        }
    }
    bytes.len()
}

/// The board's telemetry UART (configured in hw_init).
///
/// On ESP-IDF: pushes into the hardware TX FIFO.
/// On host/test: accepts and discards every byte.
#[derive(Debug, Default)]
pub struct EspUartTx;

impl SerialTx for EspUartTx {
    fn try_write(&mut self, byte: u8) -> bool {
        hw_init::uart_try_write(byte)
    }
}
