//! Inbound commands to the application service.
//!
//! Produced by the main loop from debounced button events.  Both are
//! deferred: the service records them and applies them at fixed points in
//! the next control iteration.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Take the next fresh reading as the new moisture threshold.
    Calibrate,

    /// The reservoir has been refilled: zero the dry counter, clear the
    /// low-reservoir indicator.
    Refill,
}
