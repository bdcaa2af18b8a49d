//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the valve FSM, the dry-reservoir monitor and the
//! shared context.  All I/O flows through port traits injected at call
//! sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                 │        AppService          │
//! ActuatorPort ◀──│ FSM · calibration · refill │ ──▶ TelemetryPort
//!                 └────────────────────────────┘
//! ```
//!
//! ## Iteration order
//!
//! 1. Pending refill
//! 2. Fresh moisture sample (timeout ends the iteration here)
//! 3. Pending calibration, using that sample
//! 4. FSM decision
//! 5. Valve actuation, only when the decided state differs from the last
//!    state actually driven
//! 6. Dry-reservoir accounting.  Counts only while the valve is physically
//!    open, so a failed open never reads as a dry reservoir.
//! 7. Temperature (optional channel)
//! 8. Telemetry frame

use log::{debug, error, info, warn};

use crate::config::SystemConfig;
use crate::error::Error;
use crate::fsm::context::ControlContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, ValveState};
use crate::reservoir::DryReservoirMonitor;
use crate::sensors::MoistureReading;

use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, EventSink, FrameStatus, SensorPort, TelemetryPort};

/// Button requests waiting for the next iteration.
#[derive(Debug, Clone, Copy, Default)]
struct Pending {
    calibrate: bool,
    refill: bool,
}

pub struct AppService {
    fsm: Fsm,
    ctx: ControlContext,
    reservoir: DryReservoirMonitor,
    high_temperature_c: f32,
    /// Last valve position the servo was actually driven to.
    valve_applied: ValveState,
    pending: Pending,
    high_temperature: bool,
    last_temperature_c: Option<f32>,
    iteration_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), ValveState::Closed),
            ctx: ControlContext::new(MoistureReading::new(config.moisture_threshold)),
            reservoir: DryReservoirMonitor::new(config),
            high_temperature_c: config.high_temperature_c,
            valve_applied: ValveState::Closed,
            pending: Pending::default(),
            high_temperature: false,
            last_temperature_c: None,
            iteration_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in `Closed` and put both indicators in a known state.
    /// The valve itself must already be homed closed by the adapter.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        for result in [hw.set_low_reservoir_led(false), hw.set_high_temperature_led(false)] {
            if let Err(e) = result {
                sink.emit(&AppEvent::Fault(e.into()));
            }
        }
        sink.emit(&AppEvent::Started {
            state: self.fsm.current_state(),
            threshold: self.ctx.threshold,
        });
        info!(
            "AppService started in {:?}, threshold {}",
            self.fsm.current_state(),
            self.ctx.threshold
        );
    }

    // ── Command handling ──────────────────────────────────────

    /// Record a button request; it takes effect in the next iteration.
    pub fn handle_command(&mut self, cmd: AppCommand) {
        debug!("AppService: {cmd:?} queued for next iteration");
        match cmd {
            AppCommand::Calibrate => self.pending.calibrate = true,
            AppCommand::Refill => self.pending.refill = true,
        }
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// Run one full control iteration.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while keeping
    /// the port boundary explicit.
    pub fn run_iteration(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        telemetry: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        self.iteration_count += 1;

        // 1. Refill
        if core::mem::take(&mut self.pending.refill) {
            let count = self.reservoir.refill();
            sink.emit(&AppEvent::ReservoirRefilled { count });
        }

        // 2. Sample
        let reading = match hw.read_moisture() {
            Ok(r) => r,
            Err(e) => {
                warn!("AppService: iteration {} skipped: {e}", self.iteration_count);
                sink.emit(&AppEvent::Fault(e.into()));
                self.sync_low_reservoir_led(hw, sink);
                return;
            }
        };
        self.ctx.reading = reading;

        // 3. Calibrate
        if core::mem::take(&mut self.pending.calibrate) {
            let previous = self.ctx.threshold;
            self.ctx.threshold = reading;
            info!("CAL: threshold {previous} -> {reading}");
            sink.emit(&AppEvent::Calibrated {
                previous,
                threshold: reading,
            });
        }

        // 4. Decide
        self.fsm.tick(&mut self.ctx);

        // 5. Actuate
        let applied_before = self.valve_applied;
        self.apply_valve(hw, sink);

        // 6. Reservoir, against the valve as actually driven
        let just_closed =
            applied_before == ValveState::Open && self.valve_applied == ValveState::Closed;
        if self
            .reservoir
            .record(self.valve_applied, self.ctx.soil_dry(), just_closed)
        {
            sink.emit(&AppEvent::LowReservoir {
                count: self.reservoir.count(),
            });
        }
        self.sync_low_reservoir_led(hw, sink);

        // 7. Temperature
        self.update_temperature(hw, sink);

        // 8. Telemetry
        match telemetry.send_reading(reading) {
            Ok(FrameStatus::Sent) => {}
            Ok(FrameStatus::Truncated { written }) => {
                sink.emit(&AppEvent::TelemetryTruncated { written });
            }
            Err(e) => sink.emit(&AppEvent::Fault(e.into())),
        }
        sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            reading: self.ctx.reading,
            threshold: self.ctx.threshold,
            dry_count: self.reservoir.count(),
            low_reservoir: self.reservoir.is_low(),
            temperature_c: self.last_temperature_c,
        }
    }

    /// Valve state decided by the control loop.
    pub fn state(&self) -> ValveState {
        self.fsm.current_state()
    }

    /// Valve state the servo was last driven to.
    pub fn valve_applied(&self) -> ValveState {
        self.valve_applied
    }

    pub fn threshold(&self) -> MoistureReading {
        self.ctx.threshold
    }

    pub fn dry_count(&self) -> u32 {
        self.reservoir.count()
    }

    pub fn low_reservoir(&self) -> bool {
        self.reservoir.is_low()
    }

    pub fn high_temperature(&self) -> bool {
        self.high_temperature
    }

    pub fn calibration_pending(&self) -> bool {
        self.pending.calibrate
    }

    /// Iterations attempted since startup, including skipped ones.
    pub fn iteration_count(&self) -> u64 {
        self.iteration_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Drive the servo only when the decision differs from what was last
    /// applied.  A failed move leaves `valve_applied` unchanged so the next
    /// iteration retries.
    fn apply_valve(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let desired = if self.ctx.commands.valve_open {
            ValveState::Open
        } else {
            ValveState::Closed
        };
        if desired == self.valve_applied {
            return;
        }

        let result = match desired {
            ValveState::Open => hw.open_valve(),
            ValveState::Closed => hw.close_valve(),
        };
        match result {
            Ok(()) => {
                let from = self.valve_applied;
                self.valve_applied = desired;
                sink.emit(&AppEvent::ValveChanged {
                    from,
                    to: desired,
                    reading: self.ctx.reading,
                });
            }
            Err(e) => {
                error!("AppService: valve {desired:?} failed: {e}");
                sink.emit(&AppEvent::Fault(e.into()));
            }
        }
    }

    fn sync_low_reservoir_led(&self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if let Err(e) = hw.set_low_reservoir_led(self.reservoir.is_low()) {
            sink.emit(&AppEvent::Fault(e.into()));
        }
    }

    fn update_temperature(&mut self, hw: &mut (impl SensorPort + ActuatorPort), sink: &mut impl EventSink) {
        let reading = match hw.read_temperature() {
            None => return,
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                sink.emit(&AppEvent::Fault(Error::from(e)));
                return;
            }
        };
        self.last_temperature_c = Some(reading.celsius);

        let hot = reading.celsius > self.high_temperature_c;
        if let Err(e) = hw.set_high_temperature_led(hot) {
            sink.emit(&AppEvent::Fault(e.into()));
            return;
        }
        if hot != self.high_temperature {
            self.high_temperature = hot;
            sink.emit(&AppEvent::HighTemperature {
                celsius: reading.celsius,
                active: hot,
            });
        }
    }
}
