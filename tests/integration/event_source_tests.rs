//! Integration tests for the event source: ISR latches, debounce and the
//! queue feeding the main loop.

use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};

use embedded_hal::digital::{ErrorType, InputPin};

use plantwater::app::commands::AppCommand;
use plantwater::app::service::AppService;
use plantwater::config::SystemConfig;
use plantwater::drivers::button::{ButtonDriver, ButtonLatch};
use plantwater::events::{EVENT_QUEUE_CAP, Event, EventQueue};
use plantwater::telemetry::FrameEncoder;

use crate::mock_hw::{CaptureTelemetry, MockHardware, RecordingSink};

/// Active-low button whose level the test controls.
struct Contact<'a>(&'a Cell<bool>);

impl ErrorType for Contact<'_> {
    type Error = core::convert::Infallible;
}

impl InputPin for Contact<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.get())
    }
}

#[test]
fn chattering_press_yields_one_event() {
    static LATCH: ButtonLatch = ButtonLatch::new();
    let pressed = Cell::new(false);
    let mut button = ButtonDriver::new(Contact(&pressed), &LATCH, Event::RefillPressed, 50);

    // Contacts bounce for a few milliseconds after the first edge.
    pressed.set(true);
    for t in [100, 102, 105, 109] {
        LATCH.record(t);
        assert_eq!(button.tick(t), None);
    }
    assert_eq!(button.tick(149), None);
    assert_eq!(button.tick(150), Some(Event::RefillPressed));

    // More bounce while held, then release.
    LATCH.record(170);
    assert_eq!(button.tick(175), None);
    pressed.set(false);
    assert_eq!(button.tick(400), None);
    assert_eq!(button.tick(1_000), None);
}

#[test]
fn edge_without_sustained_press_is_ignored() {
    static LATCH: ButtonLatch = ButtonLatch::new();
    let pressed = Cell::new(false);
    let mut button = ButtonDriver::new(Contact(&pressed), &LATCH, Event::CalibratePressed, 50);

    LATCH.record(10);
    assert_eq!(button.tick(10), None);
    // Released before the hold time elapsed.
    assert_eq!(button.tick(80), None);
    assert_eq!(button.tick(200), None);
}

#[test]
fn second_press_after_release_is_reported() {
    static LATCH: ButtonLatch = ButtonLatch::new();
    let pressed = Cell::new(true);
    let mut button = ButtonDriver::new(Contact(&pressed), &LATCH, Event::CalibratePressed, 20);

    LATCH.record(0);
    button.tick(0);
    assert_eq!(button.tick(20), Some(Event::CalibratePressed));
    pressed.set(false);
    button.tick(40);

    pressed.set(true);
    LATCH.record(500);
    button.tick(500);
    assert_eq!(button.tick(520), Some(Event::CalibratePressed));
}

#[test]
fn debounce_survives_clock_wrap() {
    static LATCH: ButtonLatch = ButtonLatch::new();
    let pressed = Cell::new(true);
    let mut button = ButtonDriver::new(Contact(&pressed), &LATCH, Event::RefillPressed, 50);

    let edge = u32::MAX - 10;
    LATCH.record(edge);
    assert_eq!(button.tick(edge), None);
    assert_eq!(button.tick(edge.wrapping_add(49)), None);
    assert_eq!(button.tick(edge.wrapping_add(50)), Some(Event::RefillPressed));
}

#[test]
fn queue_preserves_order_and_reports_overflow() {
    let q = EventQueue::new();
    assert_eq!(q.pop(), None);

    for _ in 0..EVENT_QUEUE_CAP {
        assert!(q.push(Event::ControlTick));
    }
    assert!(!q.push(Event::RefillPressed));

    let mut seen = 0;
    q.drain(|e| {
        assert_eq!(e, Event::ControlTick);
        seen += 1;
    });
    assert_eq!(seen, EVENT_QUEUE_CAP);
    assert_eq!(q.pop(), None);
}

/// Timer task and main loop push concurrently; every accepted push must
/// come out exactly once.
#[test]
fn concurrent_producers_lose_no_accepted_event() {
    static QUEUE: EventQueue = EventQueue::new();
    const PER_PRODUCER: usize = 20_000;

    let accepted = AtomicUsize::new(0);
    let producers_done = AtomicUsize::new(0);
    let mut ticks = 0usize;
    let mut presses = 0usize;

    std::thread::scope(|scope| {
        for event in [Event::ControlTick, Event::CalibratePressed] {
            let accepted = &accepted;
            let producers_done = &producers_done;
            scope.spawn(move || {
                for _ in 0..PER_PRODUCER {
                    if QUEUE.push(event) {
                        accepted.fetch_add(1, Ordering::Relaxed);
                    } else {
                        std::thread::yield_now();
                    }
                }
                producers_done.fetch_add(1, Ordering::Release);
            });
        }

        loop {
            let finished = producers_done.load(Ordering::Acquire) == 2;
            QUEUE.drain(|e| match e {
                Event::ControlTick => ticks += 1,
                Event::CalibratePressed => presses += 1,
                Event::RefillPressed => panic!("never pushed"),
            });
            if finished {
                break;
            }
            std::thread::yield_now();
        }
    });

    assert_eq!(ticks + presses, accepted.load(Ordering::Relaxed));
    assert!(ticks <= PER_PRODUCER && presses <= PER_PRODUCER);
}

/// The main loop's dispatch: presses become pending commands, a tick runs
/// one iteration after the drain.
#[test]
fn press_drained_with_tick_applies_to_that_iteration() {
    let config = SystemConfig::default();
    let q = EventQueue::new();
    let mut app = AppService::new(&config);
    let mut hw = MockHardware::with_readings(&[2600]);
    let mut telemetry = CaptureTelemetry::new(FrameEncoder::from_config(&config));
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);

    assert!(q.push(Event::ControlTick));
    assert!(q.push(Event::CalibratePressed));

    let mut tick_due = false;
    q.drain(|event| match event {
        Event::ControlTick => tick_due = true,
        Event::CalibratePressed => app.handle_command(AppCommand::Calibrate),
        Event::RefillPressed => app.handle_command(AppCommand::Refill),
    });
    assert!(tick_due);
    app.run_iteration(&mut hw, &mut telemetry, &mut sink);

    assert_eq!(app.threshold().value(), 2600);
    assert!(hw.valve_moves().is_empty());
}
