//! GPIO / peripheral pin assignments for the PlantWater controller board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Valve servo
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the valve servo signal line.
pub const SERVO_PWM_GPIO: i32 = 6;
/// LEDC base frequency for the servo (50 Hz hobby-servo frame).
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Frame period the LEDC actually produces at `SERVO_PWM_FREQ_HZ`.
pub const SERVO_PWM_PERIOD_US: u32 = 1_000_000 / SERVO_PWM_FREQ_HZ;
/// LEDC timer resolution for the servo channel (bits).
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

// Moisture probe on ADC1 channel 1 (GPIO 2 on ESP32-S3), optional
// temperature sensor on ADC1 channel 2 (GPIO 3).  Channels live in hw_init.

/// Moisture probe supply: driven HIGH for the life of the device.
pub const MOISTURE_SUPPLY_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// Push-buttons (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Recalibrate: threshold := current reading.
pub const CALIBRATE_BUTTON_GPIO: i32 = 4;
/// Reservoir refilled: clear the dry-reservoir counter and indicator.
pub const REFILL_BUTTON_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Status LEDs
// ---------------------------------------------------------------------------

pub const LOW_RESERVOIR_LED_GPIO: i32 = 11;
pub const HIGH_TEMPERATURE_LED_GPIO: i32 = 12;

// ---------------------------------------------------------------------------
// UART telemetry
// ---------------------------------------------------------------------------

pub const UART_PORT: i32 = 1;
pub const UART_TX_GPIO: i32 = 17;
pub const UART_RX_GPIO: i32 = 18;
