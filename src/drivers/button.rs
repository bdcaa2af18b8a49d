//! ISR-latched, debounced push buttons (calibrate and refill).
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  Each GPIO fires on the
//! falling edge; the ISR only records the edge timestamp into that button's
//! [`ButtonLatch`].  `tick()` (called from the main loop) runs the debounce
//! state machine:
//!
//! | State     | Leaves when                                  | Emits   |
//! |-----------|----------------------------------------------|---------|
//! | `Idle`    | an edge is latched                            | –       |
//! | `Settling`| `debounce_ms` after the edge, pin still low   | press   |
//! | `Settling`| `debounce_ms` after the edge, pin released    | – (glitch) |
//! | `Held`    | pin released                                  | –       |
//!
//! Edges latched while `Held` are contact bounce and are discarded, so one
//! physical press yields exactly one event however much the contacts chatter.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embedded_hal::digital::InputPin;
use log::debug;

use crate::events::Event;

/// Single-slot edge mailbox written by a button ISR.
pub struct ButtonLatch {
    edge_ms: AtomicU32,
    pending: AtomicBool,
}

impl ButtonLatch {
    pub const fn new() -> Self {
        Self {
            edge_ms: AtomicU32::new(0),
            pending: AtomicBool::new(false),
        }
    }

    /// Record a falling edge.  Safe to call from interrupt context; a later
    /// edge overwrites an unconsumed earlier one.
    pub fn record(&self, now_ms: u32) {
        self.edge_ms.store(now_ms, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
    }

    /// Consume the latched edge timestamp, if any.
    pub fn take(&self) -> Option<u32> {
        if self.pending.swap(false, Ordering::Acquire) {
            Some(self.edge_ms.load(Ordering::Relaxed))
        } else {
            None
        }
    }
}

impl Default for ButtonLatch {
    fn default() -> Self {
        Self::new()
    }
}

pub static CALIBRATE_LATCH: ButtonLatch = ButtonLatch::new();
pub static REFILL_LATCH: ButtonLatch = ButtonLatch::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Idle,
    Settling { edge_ms: u32 },
    Held,
}

pub struct ButtonDriver<P> {
    pin: P,
    latch: &'static ButtonLatch,
    event: Event,
    debounce_ms: u32,
    state: DebounceState,
}

impl<P: InputPin> ButtonDriver<P> {
    /// `event` is what a confirmed press of this button produces.
    pub fn new(pin: P, latch: &'static ButtonLatch, event: Event, debounce_ms: u32) -> Self {
        Self {
            pin,
            latch,
            event,
            debounce_ms,
            state: DebounceState::Idle,
        }
    }

    /// Advance the debounce state machine.  `now_ms` is monotonic time on the
    /// same clock the ISR stamps edges with.
    pub fn tick(&mut self, now_ms: u32) -> Option<Event> {
        if self.state == DebounceState::Idle {
            match self.latch.take() {
                Some(edge_ms) => self.state = DebounceState::Settling { edge_ms },
                None => return None,
            }
        }

        match self.state {
            DebounceState::Idle => None,

            DebounceState::Settling { edge_ms } => {
                if now_ms.wrapping_sub(edge_ms) < self.debounce_ms {
                    return None;
                }
                // Bounce during the settle window is the same press.
                let _ = self.latch.take();
                if self.is_pressed() {
                    self.state = DebounceState::Held;
                    Some(self.event)
                } else {
                    debug!("button: {:?} edge rejected as glitch", self.event);
                    self.state = DebounceState::Idle;
                    None
                }
            }

            DebounceState::Held => {
                let _ = self.latch.take();
                if !self.is_pressed() {
                    self.state = DebounceState::Idle;
                }
                None
            }
        }
    }

    /// Active low.  A pin read error counts as released.
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low().unwrap_or(false)
    }
}

/// ISR body for the calibrate button's falling edge.
pub fn calibrate_isr_handler(now_ms: u32) {
    CALIBRATE_LATCH.record(now_ms);
}

/// ISR body for the refill button's falling edge.
pub fn refill_isr_handler(now_ms: u32) {
    REFILL_LATCH.record(now_ms);
}
