//! Shared mutable context threaded through every FSM handler.
//!
//! `ControlContext` is the blackboard state handlers read from and write
//! to: the reading taken this iteration, the active threshold, and the
//! valve request the handlers leave for the application service.

use crate::sensors::MoistureReading;

/// Requests written by state handlers; applied by `AppService` after the tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValveCommands {
    pub valve_open: bool,
}

pub struct ControlContext {
    // -- Timing --
    /// Iterations since the current state was entered.
    pub ticks_in_state: u64,
    pub total_ticks: u64,

    // -- Inputs --
    /// Reading taken in the current iteration.
    pub reading: MoistureReading,
    /// Readings strictly above this mean "too dry".
    pub threshold: MoistureReading,

    // -- Outputs --
    pub commands: ValveCommands,
}

impl ControlContext {
    pub fn new(threshold: MoistureReading) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            reading: MoistureReading::default(),
            threshold,
            commands: ValveCommands::default(),
        }
    }

    /// `true` when this iteration's reading calls for water.
    pub fn soil_dry(&self) -> bool {
        self.reading > self.threshold
    }
}
