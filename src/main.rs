//! PlantWater Firmware — Main Entry Point
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   UartTelemetry   LogEventSink  EmbeddedConfig│
//! │  (Sensor+Actuator) (Telemetry)     (EventSink)   (ConfigPort)  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Valve FSM · calibration · dry-reservoir monitor       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Timer cb ─▶ EventQueue ◀─ ButtonDriver ◀─ GPIO ISR latches    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use log::{info, warn};

use plantwater::adapters::config_source::EmbeddedConfig;
use plantwater::adapters::hardware::HardwareAdapter;
use plantwater::adapters::log_sink::LogEventSink;
use plantwater::adapters::time::Esp32TimeAdapter;
use plantwater::adapters::uart_telemetry::UartTelemetry;
use plantwater::app::commands::AppCommand;
use plantwater::app::ports::ConfigPort;
use plantwater::app::service::AppService;
use plantwater::config::{SystemConfig, WATCHDOG_TIMEOUT_MS};
use plantwater::drivers::button::{ButtonDriver, CALIBRATE_LATCH, REFILL_LATCH};
use plantwater::drivers::gpio::{GpioInput, GpioOutput};
use plantwater::drivers::servo::{LedcServoPwm, ServoDriver};
use plantwater::drivers::status_led::StatusLeds;
use plantwater::drivers::uart::EspUartTx;
use plantwater::drivers::watchdog::Watchdog;
use plantwater::drivers::{hw_init, hw_timer};
use plantwater::error::Error;
use plantwater::events::{EVENTS, Event, push_event};
use plantwater::pins;
use plantwater::sensors::{ADC_LATCH, OneshotAdc, Sampler};

/// Main-loop park between polls.  Bounds button latency and debounce
/// resolution; the control period itself comes from the hardware timer.
const IDLE_POLL_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PlantWater v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = match EmbeddedConfig::from_build_env().load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config override rejected ({e}), using defaults");
            SystemConfig::default()
        }
    };

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals(config.uart_baud, config.temperature.is_some()).map_err(Error::from)?;
    if let Err(e) = hw_init::init_isr_service() {
        warn!("ISR service init failed: {e} — buttons disabled");
    }
    let watchdog = Watchdog::new(WATCHDOG_TIMEOUT_MS);
    let clock = Esp32TimeAdapter::new();

    // ── 4. Adapters ───────────────────────────────────────────
    let sampler = Sampler::new(
        OneshotAdc::new(&ADC_LATCH),
        Ets,
        &ADC_LATCH,
        config.adc_timeout_us,
        config.temperature,
    );
    let servo = ServoDriver::new(LedcServoPwm::new(), Ets, config.servo);
    let leds = StatusLeds::new(
        GpioOutput(pins::LOW_RESERVOIR_LED_GPIO),
        GpioOutput(pins::HIGH_TEMPERATURE_LED_GPIO),
    );
    let mut hw = HardwareAdapter::new(sampler, servo, leds);
    hw.home().map_err(Error::from)?;

    let mut telemetry = UartTelemetry::new(EspUartTx, &config);
    let mut log_sink = LogEventSink::new();

    let mut calibrate_button = ButtonDriver::new(
        GpioInput(pins::CALIBRATE_BUTTON_GPIO),
        &CALIBRATE_LATCH,
        Event::CalibratePressed,
        config.debounce_ms,
    );
    let mut refill_button = ButtonDriver::new(
        GpioInput(pins::REFILL_BUTTON_GPIO),
        &REFILL_LATCH,
        Event::RefillPressed,
        config.debounce_ms,
    );

    // ── 5. App service ────────────────────────────────────────
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut log_sink);

    hw_timer::start_control_timer(config.control_loop_interval_ms);
    // First iteration right away rather than one full period after boot.
    push_event(Event::ControlTick);

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        for button in [&mut calibrate_button, &mut refill_button] {
            if let Some(event) = button.tick(now_ms) {
                push_event(event);
            }
        }

        // Button commands are recorded before the iteration runs so a press
        // drained alongside a tick applies to that same iteration.
        let mut tick_due = false;
        EVENTS.drain(|event| match event {
            Event::ControlTick => tick_due = true,
            Event::CalibratePressed => {
                info!("Button: calibrate");
                app.handle_command(AppCommand::Calibrate);
            }
            Event::RefillPressed => {
                info!("Button: refill");
                app.handle_command(AppCommand::Refill);
            }
        });

        if tick_due {
            app.run_iteration(&mut hw, &mut telemetry, &mut log_sink);
        }

        watchdog.feed();
        FreeRtos::delay_ms(IDLE_POLL_MS);
    }
}
