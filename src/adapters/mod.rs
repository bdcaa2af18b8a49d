//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter          | Implements     | Connects to                 |
//! |------------------|----------------|-----------------------------|
//! | `hardware`       | SensorPort     | ADC sampler                 |
//! |                  | ActuatorPort   | Valve servo, status LEDs    |
//! | `uart_telemetry` | TelemetryPort  | Telemetry UART              |
//! | `log_sink`       | EventSink      | Serial log output           |
//! | `config_source`  | ConfigPort     | Build-time JSON override    |
//! | `time`           | –              | ESP32 system timer          |

pub mod config_source;
pub mod hardware;
pub mod log_sink;
pub mod time;
pub mod uart_telemetry;
