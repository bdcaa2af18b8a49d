//! Integration tests for the sample → decide → actuate → report pipeline.
//!
//! These run on the host (x86_64) and drive [`AppService`] through mock
//! adapters, checking the valve, indicator and telemetry side effects of
//! whole iteration sequences.

use plantwater::app::commands::AppCommand;
use plantwater::app::events::AppEvent;
use plantwater::app::service::AppService;
use plantwater::config::{ReservoirResetPolicy, SystemConfig};
use plantwater::error::Error;
use plantwater::fsm::ValveState;
use plantwater::telemetry::FrameEncoder;

use crate::mock_hw::{ActuatorCall, CaptureTelemetry, MockHardware, RecordingSink};

struct Rig {
    app: AppService,
    hw: MockHardware,
    telemetry: CaptureTelemetry,
    sink: RecordingSink,
}

impl Rig {
    fn new(config: &SystemConfig, readings: &[u16]) -> Self {
        let mut app = AppService::new(config);
        let mut hw = MockHardware::with_readings(readings);
        let mut sink = RecordingSink::new();
        app.start(&mut hw, &mut sink);
        Self {
            app,
            hw,
            telemetry: CaptureTelemetry::new(FrameEncoder::from_config(config)),
            sink,
        }
    }

    fn step(&mut self) {
        self.app
            .run_iteration(&mut self.hw, &mut self.telemetry, &mut self.sink);
    }

    fn steps(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }
}

// ── Hysteresis and actuation ─────────────────────────────────

#[test]
fn dry_then_wet_opens_once_and_closes_once() {
    let mut rig = Rig::new(&SystemConfig::default(), &[3000, 3000, 1000, 1000]);
    rig.steps(4);

    assert_eq!(
        rig.hw.valve_moves(),
        vec![ActuatorCall::OpenValve, ActuatorCall::CloseValve]
    );
    assert_eq!(rig.app.state(), ValveState::Closed);
    assert_eq!(rig.app.dry_count(), 2);
    assert_eq!(rig.telemetry.wire_str(), ";3000;3000;1000;1000");
}

#[test]
fn reading_equal_to_threshold_counts_as_wet() {
    let mut rig = Rig::new(&SystemConfig::default(), &[2000, 2001, 2000]);
    rig.step();
    assert_eq!(rig.app.state(), ValveState::Closed);
    rig.step();
    assert_eq!(rig.app.state(), ValveState::Open);
    rig.step();
    assert_eq!(rig.app.state(), ValveState::Closed);
}

#[test]
fn steady_state_never_reissues_valve_moves() {
    let mut rig = Rig::new(&SystemConfig::default(), &[3500; 10]);
    rig.steps(10);
    assert_eq!(rig.hw.valve_moves(), vec![ActuatorCall::OpenValve]);

    let changes = rig
        .sink
        .count(|e| matches!(e, AppEvent::ValveChanged { .. }));
    assert_eq!(changes, 1);
}

#[test]
fn telemetry_frame_per_iteration_in_configured_base() {
    let config = SystemConfig {
        telemetry_base: 16,
        telemetry_digits: 0,
        ..Default::default()
    };
    let mut rig = Rig::new(&config, &[4095, 16, 0]);
    rig.steps(3);
    assert_eq!(rig.telemetry.wire_str(), ";fff;10;0");
}

// ── Sensor timeout ───────────────────────────────────────────

#[test]
fn timeout_leaves_valve_and_wire_untouched() {
    let mut rig = Rig::new(&SystemConfig::default(), &[3000]);
    rig.step();
    rig.hw.script_timeout();
    let moves_before = rig.hw.valve_moves().len();
    let wire_before = rig.telemetry.wire.len();

    rig.step();

    assert_eq!(rig.hw.valve_moves().len(), moves_before);
    assert_eq!(rig.telemetry.wire.len(), wire_before);
    assert_eq!(rig.app.state(), ValveState::Open);
    assert!(
        rig.sink
            .events
            .iter()
            .any(|e| matches!(e, AppEvent::Fault(Error::Sensor(_))))
    );
    assert_eq!(rig.app.iteration_count(), 2);
}

// ── Calibration ──────────────────────────────────────────────

#[test]
fn calibrate_press_moves_threshold_to_current_reading() {
    let mut rig = Rig::new(&SystemConfig::default(), &[1200, 1300, 1250]);
    rig.step();

    rig.app.handle_command(AppCommand::Calibrate);
    rig.step();
    assert_eq!(rig.app.threshold().value(), 1300);
    assert!(!rig.app.calibration_pending());

    // 1250 is now below the threshold: wet.
    rig.step();
    assert_eq!(rig.app.state(), ValveState::Closed);
}

#[test]
fn repeated_calibrate_presses_collapse_into_one() {
    let mut rig = Rig::new(&SystemConfig::default(), &[1800]);
    rig.app.handle_command(AppCommand::Calibrate);
    rig.app.handle_command(AppCommand::Calibrate);
    rig.step();
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::Calibrated { .. })),
        1
    );
}

// ── Dry reservoir ────────────────────────────────────────────

#[test]
fn low_reservoir_led_lights_after_limit_exceeded() {
    let config = SystemConfig {
        dry_reservoir_limit: 4,
        ..Default::default()
    };
    let mut rig = Rig::new(&config, &[3000; 6]);
    rig.steps(4);
    assert!(!rig.app.low_reservoir());
    assert!(!rig.hw.low_reservoir_led());

    rig.step();
    assert!(rig.app.low_reservoir());
    assert!(rig.hw.low_reservoir_led());
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::LowReservoir { .. })),
        1
    );

    // Still latched, counter saturated.
    rig.step();
    assert_eq!(rig.app.dry_count(), 5);
    assert!(rig.hw.low_reservoir_led());
}

#[test]
fn low_reservoir_survives_soil_getting_wet() {
    let config = SystemConfig {
        dry_reservoir_limit: 1,
        reservoir_reset_policy: ReservoirResetPolicy::CloseOrRefill,
        ..Default::default()
    };
    let mut rig = Rig::new(&config, &[3000, 3000, 500]);
    rig.steps(3);
    assert_eq!(rig.app.state(), ValveState::Closed);
    assert_eq!(rig.app.dry_count(), 0);
    assert!(rig.app.low_reservoir());
    assert!(rig.hw.low_reservoir_led());
}

#[test]
fn refill_press_clears_indicator_on_next_iteration() {
    let config = SystemConfig {
        dry_reservoir_limit: 1,
        ..Default::default()
    };
    let mut rig = Rig::new(&config, &[3000, 3000, 500]);
    rig.steps(2);
    assert!(rig.hw.low_reservoir_led());

    rig.app.handle_command(AppCommand::Refill);
    rig.step();
    assert!(!rig.app.low_reservoir());
    assert!(!rig.hw.low_reservoir_led());
    assert_eq!(rig.app.dry_count(), 0);
    assert!(
        rig.sink
            .events
            .contains(&AppEvent::ReservoirRefilled { count: 2 })
    );
}

// ── Temperature ──────────────────────────────────────────────

#[test]
fn temperature_channel_absent_leaves_led_alone() {
    let mut rig = Rig::new(&SystemConfig::default(), &[1000]);
    rig.step();
    // Only the start-up reset touched the LED.
    assert_eq!(
        rig.hw
            .calls
            .iter()
            .filter(|c| matches!(c, ActuatorCall::HighTemperatureLed(_)))
            .count(),
        1
    );
    assert_eq!(rig.app.build_telemetry().temperature_c, None);
}

#[test]
fn high_temperature_led_follows_reading() {
    let mut rig = Rig::new(&SystemConfig::default(), &[1000]);
    rig.hw.temperature_c = Some(36.5);
    rig.step();
    assert!(rig.hw.high_temperature_led());
    assert!(rig.app.high_temperature());

    rig.hw.temperature_c = Some(35.0);
    rig.step();
    assert!(!rig.hw.high_temperature_led());
    assert!(!rig.app.high_temperature());
}

#[test]
fn startup_reports_initial_state() {
    let rig = Rig::new(&SystemConfig::default(), &[]);
    assert!(matches!(
        rig.sink.events.first(),
        Some(AppEvent::Started {
            state: ValveState::Closed,
            ..
        })
    ));
    assert!(!rig.hw.low_reservoir_led());
    assert!(rig.hw.valve_moves().is_empty());
}
