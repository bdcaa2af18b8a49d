//! End-to-end tests through the real adapters: sampler, servo, LEDs and
//! UART telemetry, with only the lowest-level peripherals faked.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};

use plantwater::adapters::config_source::EmbeddedConfig;
use plantwater::adapters::hardware::HardwareAdapter;
use plantwater::adapters::uart_telemetry::UartTelemetry;
use plantwater::app::commands::AppCommand;
use plantwater::app::ports::{ConfigError, ConfigPort};
use plantwater::app::service::AppService;
use plantwater::config::SystemConfig;
use plantwater::drivers::servo::{ServoDriver, pulse_to_duty};
use plantwater::drivers::status_led::StatusLeds;
use plantwater::drivers::uart::SerialTx;
use plantwater::fsm::ValveState;
use plantwater::sensors::{AdcDriver, AnalogInput, ConversionLatch, Sampler};

use crate::mock_hw::RecordingSink;

// ── Peripheral fakes ─────────────────────────────────────────

#[derive(Clone, Copy)]
struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Completes each conversion with the next scripted value.
struct ScriptedAdc {
    latch: &'static ConversionLatch,
    moisture: Rc<RefCell<Vec<u16>>>,
}

impl AdcDriver for ScriptedAdc {
    fn start_conversion(&mut self, input: AnalogInput) {
        assert_eq!(input, AnalogInput::Moisture);
        let mut script = self.moisture.borrow_mut();
        if !script.is_empty() {
            let raw = script.remove(0);
            self.latch.complete(raw);
        }
    }
}

/// 14-bit PWM that keeps every duty written.
struct TracePwm(Rc<RefCell<Vec<u16>>>);

impl PwmErrorType for TracePwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for TracePwm {
    fn max_duty_cycle(&self) -> u16 {
        16_383
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.0.borrow_mut().push(duty);
        Ok(())
    }
}

struct Led(Rc<Cell<bool>>);

impl PinErrorType for Led {
    type Error = core::convert::Infallible;
}

impl OutputPin for Led {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Wire(Rc<RefCell<Vec<u8>>>);

impl SerialTx for Wire {
    fn try_write(&mut self, byte: u8) -> bool {
        self.0.borrow_mut().push(byte);
        true
    }
}

struct Board {
    moisture: Rc<RefCell<Vec<u16>>>,
    duties: Rc<RefCell<Vec<u16>>>,
    low_led: Rc<Cell<bool>>,
    wire: Wire,
}

type Adapter = HardwareAdapter<ScriptedAdc, TracePwm, NoDelay, Led>;

fn board(config: &SystemConfig, latch: &'static ConversionLatch) -> (Board, Adapter) {
    let b = Board {
        moisture: Rc::default(),
        duties: Rc::default(),
        low_led: Rc::default(),
        wire: Wire::default(),
    };
    let sampler = Sampler::new(
        ScriptedAdc {
            latch,
            moisture: b.moisture.clone(),
        },
        NoDelay,
        latch,
        config.adc_timeout_us,
        None,
    );
    let servo = ServoDriver::new(TracePwm(b.duties.clone()), NoDelay, config.servo);
    let leds = StatusLeds::new(Led(b.low_led.clone()), Led(Rc::default()));
    (b, HardwareAdapter::new(sampler, servo, leds))
}

// ── Tests ────────────────────────────────────────────────────

#[test]
fn full_cycle_sweeps_servo_between_end_stops() {
    static LATCH: ConversionLatch = ConversionLatch::new();
    let config = SystemConfig::default();
    let (b, mut hw) = board(&config, &LATCH);
    hw.home().unwrap();
    assert_eq!(hw.servo_pulse_us(), config.servo.closed_pulse_us);

    let mut telemetry = UartTelemetry::new(b.wire.clone(), &config);
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut sink);

    b.moisture.borrow_mut().extend([3100, 900]);
    app.run_iteration(&mut hw, &mut telemetry, &mut sink);
    assert_eq!(app.valve_applied(), ValveState::Open);
    assert_eq!(hw.servo_pulse_us(), config.servo.open_pulse_us);

    app.run_iteration(&mut hw, &mut telemetry, &mut sink);
    assert_eq!(app.valve_applied(), ValveState::Closed);
    assert_eq!(hw.servo_pulse_us(), config.servo.closed_pulse_us);

    let max = 16_383;
    let duties = b.duties.borrow();
    assert_eq!(
        duties.last().copied(),
        Some(pulse_to_duty(config.servo.closed_pulse_us, config.servo.pwm_period_us, max))
    );
    assert!(duties.contains(&pulse_to_duty(
        config.servo.open_pulse_us,
        config.servo.pwm_period_us,
        max
    )));

    assert_eq!(b.wire.0.borrow().as_slice(), b";3100;0900");
}

#[test]
fn stalled_adc_skips_iteration_on_real_sampler() {
    static LATCH: ConversionLatch = ConversionLatch::new();
    let config = SystemConfig::default();
    let (b, mut hw) = board(&config, &LATCH);
    hw.home().unwrap();
    let mut telemetry = UartTelemetry::new(b.wire.clone(), &config);
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut sink);

    // Empty script: the conversion never completes.
    app.handle_command(AppCommand::Calibrate);
    app.run_iteration(&mut hw, &mut telemetry, &mut sink);
    assert!(b.wire.0.borrow().is_empty());
    assert!(app.calibration_pending());
    assert_eq!(b.duties.borrow().len(), 1, "only the homing write");
}

#[test]
fn low_reservoir_led_pin_follows_indicator() {
    static LATCH: ConversionLatch = ConversionLatch::new();
    let config = SystemConfig {
        dry_reservoir_limit: 1,
        ..Default::default()
    };
    let (b, mut hw) = board(&config, &LATCH);
    hw.home().unwrap();
    let mut telemetry = UartTelemetry::new(b.wire.clone(), &config);
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut sink);

    b.moisture.borrow_mut().extend([3000, 3000, 3000]);
    app.run_iteration(&mut hw, &mut telemetry, &mut sink);
    assert!(!b.low_led.get());
    app.run_iteration(&mut hw, &mut telemetry, &mut sink);
    assert!(b.low_led.get());

    app.handle_command(AppCommand::Refill);
    app.run_iteration(&mut hw, &mut telemetry, &mut sink);
    assert!(!b.low_led.get());
}

#[test]
fn config_override_changes_wire_format() {
    static LATCH: ConversionLatch = ConversionLatch::new();
    let config = EmbeddedConfig::from_json(r#"{"telemetry_base":2,"telemetry_digits":0,"telemetry_separator":44}"#)
        .load()
        .unwrap();
    let (b, mut hw) = board(&config, &LATCH);
    let mut telemetry = UartTelemetry::new(b.wire.clone(), &config);
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut sink);

    b.moisture.borrow_mut().push(5);
    app.run_iteration(&mut hw, &mut telemetry, &mut sink);
    assert_eq!(b.wire.0.borrow().as_slice(), b",101");
}

#[test]
fn invalid_override_is_rejected_not_clamped() {
    let err = EmbeddedConfig::from_json(r#"{"telemetry_base":40}"#)
        .load()
        .unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed(_)));

    let err = EmbeddedConfig::from_json("{not json").load().unwrap_err();
    assert_eq!(err, ConfigError::Corrupted);
}
