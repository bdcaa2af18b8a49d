//! Interrupt-driven event system.
//!
//! Events are produced by:
//! - The periodic control timer (one `ControlTick` per loop period)
//! - Button drivers, once a press survives debounce
//!
//! Events are consumed by the main loop, which drains the queue on every
//! poll pass.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Timer cb     │────▶│              │     │              │
//! │ Button tick  │────▶│  Event Queue │────▶│  Main Loop   │
//! │              │     │  (lock-free) │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

use heapless::mpmc::Q16;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Control loop period elapsed.
    ControlTick,
    /// Debounced press of the calibrate button.
    CalibratePressed,
    /// Debounced press of the refill button.
    RefillPressed,
}

// ── Lock-free MPMC queue ──────────────────────────────────────
//
// The esp_timer task and the main loop both produce; the main loop
// consumes.  A producer preempted mid-enqueue only delays its slot, it
// never shares it with another producer.

pub struct EventQueue {
    inner: Q16<Event>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self { inner: Q16::new() }
    }

    /// Push an event.  Safe to call from any task or timer callback.
    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        self.inner.enqueue(event).is_ok()
    }

    /// Pop the oldest event.
    pub fn pop(&self) -> Option<Event> {
        self.inner.dequeue()
    }

    /// Drain all pending events into a callback, FIFO.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The queue timer callbacks and button ticks publish into.
pub static EVENTS: EventQueue = EventQueue::new();

pub fn push_event(event: Event) -> bool {
    EVENTS.push(event)
}
