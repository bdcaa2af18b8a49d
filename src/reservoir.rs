//! Dry-reservoir monitor.
//!
//! The monitor runs **every iteration after the FSM** and counts how long
//! the valve has been open without the soil getting wetter.  A valve that
//! stays open that long means the reservoir has run dry (or the line is
//! blocked), so a latched low-reservoir indicator is raised.
//!
//! ## Lifecycle
//!
//! 1. Each iteration that ends with the valve `Open` and the reading above
//!    threshold adds one to the counter (the opening iteration included).
//! 2. When the counter exceeds `dry_reservoir_limit` the indicator latches.
//!    The counter saturates at `limit + 1`; it can never wrap.
//! 3. Only [`DryReservoirMonitor::refill`] clears the indicator.  Under
//!    [`ReservoirResetPolicy::CloseOrRefill`] an `Open -> Closed` transition
//!    also zeroes the counter (the indicator stays latched).

use log::{error, info};

use crate::config::{ReservoirResetPolicy, SystemConfig};
use crate::fsm::ValveState;

pub struct DryReservoirMonitor {
    limit: u32,
    policy: ReservoirResetPolicy,
    count: u32,
    low: bool,
}

impl DryReservoirMonitor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            limit: config.dry_reservoir_limit,
            policy: config.reservoir_reset_policy,
            count: 0,
            low: false,
        }
    }

    /// Account one finished iteration.  Returns `true` on the iteration that
    /// latches the low-reservoir indicator.
    pub fn record(&mut self, valve: ValveState, soil_dry: bool, just_closed: bool) -> bool {
        if valve == ValveState::Open && soil_dry {
            self.count = self.count.saturating_add(1).min(self.limit.saturating_add(1));
        } else if just_closed && self.policy == ReservoirResetPolicy::CloseOrRefill {
            self.count = 0;
        }

        if !self.low && self.count > self.limit {
            self.low = true;
            error!(
                "RESERVOIR: valve open and soil dry for {} iterations, reservoir low",
                self.count
            );
            return true;
        }
        false
    }

    /// Reservoir refilled: zero the counter and clear the indicator.
    /// Returns the count before the reset.
    pub fn refill(&mut self) -> u32 {
        let was = self.count;
        if self.low {
            info!("RESERVOIR: refilled, low indicator cleared");
        }
        self.count = 0;
        self.low = false;
        was
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Latched low-reservoir indicator.
    pub fn is_low(&self) -> bool {
        self.low
    }
}
