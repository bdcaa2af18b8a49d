//! Concrete state handler functions and table builder.
//!
//! ```text
//!  CLOSED ──[reading > threshold]──▶ OPEN
//!    ▲                                 │
//!    └────[reading <= threshold]───────┘
//! ```
//!
//! The hysteresis comes from the valve itself: once open it stays open
//! for the whole period until the next sample, and the probe responds
//! slowly to the water it lets through.

use super::context::ControlContext;
use super::{StateDescriptor, ValveState};
use log::info;

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; ValveState::COUNT] {
    [
        // Index 0 — Closed
        StateDescriptor {
            id: ValveState::Closed,
            name: "Closed",
            on_enter: Some(closed_enter),
            on_exit: None,
            on_update: closed_update,
        },
        // Index 1 — Open
        StateDescriptor {
            id: ValveState::Open,
            name: "Open",
            on_enter: Some(open_enter),
            on_exit: Some(open_exit),
            on_update: open_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  CLOSED
// ═══════════════════════════════════════════════════════════════════════════

fn closed_enter(ctx: &mut ControlContext) {
    ctx.commands.valve_open = false;
    info!(
        "CLOSED: soil at {} (threshold {}), valve shut",
        ctx.reading, ctx.threshold
    );
}

fn closed_update(ctx: &mut ControlContext) -> Option<ValveState> {
    if ctx.soil_dry() {
        return Some(ValveState::Open);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPEN — watering
// ═══════════════════════════════════════════════════════════════════════════

fn open_enter(ctx: &mut ControlContext) {
    ctx.commands.valve_open = true;
    info!(
        "OPEN: soil at {} above threshold {}, watering",
        ctx.reading, ctx.threshold
    );
}

fn open_exit(ctx: &mut ControlContext) {
    info!("OPEN: watered for {} iterations", ctx.ticks_in_state);
}

fn open_update(ctx: &mut ControlContext) -> Option<ValveState> {
    if !ctx.soil_dry() {
        return Some(ValveState::Closed);
    }
    None
}
