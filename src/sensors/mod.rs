//! Analog sampling — the moisture probe and the optional temperature channel.
//!
//! ## Conversion handshake
//!
//! ```text
//!  Sampler ──start_conversion()──▶ ADC ──(ISR)──▶ ConversionLatch
//!     ▲                                              │
//!     └──────────── poll with bounded wait ──────────┘
//! ```
//!
//! Every read clears the latch, starts exactly one conversion, and waits
//! for the completion signal.  A stale result can never be returned: the
//! latch only carries the value published after the clear.  If the signal
//! never arrives within `adc_timeout_us` the read fails with
//! [`SensorError::Timeout`].

pub mod temperature;

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::error::SensorError;
use temperature::{TemperatureCalibration, TemperatureReading};

/// Full-scale value of the 12-bit converter.
pub const MOISTURE_ADC_MAX: u16 = 4095;

/// Granularity of the completion poll.
pub const ADC_POLL_STEP_US: u32 = 10;

/// The analog inputs the sampler knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogInput {
    Moisture,
    Temperature,
}

impl fmt::Display for AnalogInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Moisture => write!(f, "moisture"),
            Self::Temperature => write!(f, "temperature"),
        }
    }
}

// ---------------------------------------------------------------------------
// Moisture reading
// ---------------------------------------------------------------------------

/// One raw soil-moisture sample.  Higher is drier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoistureReading(u16);

impl MoistureReading {
    /// Wrap a raw converter value, saturating at full scale.
    pub const fn new(raw: u16) -> Self {
        if raw > MOISTURE_ADC_MAX {
            Self(MOISTURE_ADC_MAX)
        } else {
            Self(raw)
        }
    }

    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for MoistureReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Conversion-complete latch (ISR → sampler)
// ---------------------------------------------------------------------------

/// Single-slot mailbox written by the ADC completion interrupt.
///
/// Lock-free: the ISR stores the value then raises the flag with `Release`;
/// the sampler observes the flag with `Acquire` before reading the value.
pub struct ConversionLatch {
    ready: AtomicBool,
    value: AtomicU16,
}

impl ConversionLatch {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            value: AtomicU16::new(0),
        }
    }

    /// Publish a finished conversion.  Safe to call from interrupt context.
    pub fn complete(&self, raw: u16) {
        self.value.store(raw, Ordering::Relaxed);
        self.ready.store(true, Ordering::Release);
    }

    /// Discard any unconsumed result.
    pub fn clear(&self) {
        self.ready.store(false, Ordering::Release);
    }

    /// Take the result if one has been published since the last clear.
    pub fn take(&self) -> Option<u16> {
        if self.ready.swap(false, Ordering::Acquire) {
            Some(self.value.load(Ordering::Relaxed))
        } else {
            None
        }
    }
}

impl Default for ConversionLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// The latch the ESP-IDF ADC path completes.
pub static ADC_LATCH: ConversionLatch = ConversionLatch::new();

// ---------------------------------------------------------------------------
// ADC driver seam
// ---------------------------------------------------------------------------

/// Starts a conversion; completion is reported through the sampler's latch.
pub trait AdcDriver {
    fn start_conversion(&mut self, input: AnalogInput);
}

// ---------------------------------------------------------------------------
// Sampler
// ---------------------------------------------------------------------------

/// Fresh-sample reader for the moisture and temperature channels.
pub struct Sampler<A, D> {
    adc: A,
    delay: D,
    latch: &'static ConversionLatch,
    timeout_us: u32,
    temperature: Option<TemperatureCalibration>,
}

impl<A: AdcDriver, D: DelayNs> Sampler<A, D> {
    pub fn new(
        adc: A,
        delay: D,
        latch: &'static ConversionLatch,
        timeout_us: u32,
        temperature: Option<TemperatureCalibration>,
    ) -> Self {
        Self {
            adc,
            delay,
            latch,
            timeout_us,
            temperature,
        }
    }

    /// Trigger one moisture conversion and wait for it.
    pub fn read_moisture(&mut self) -> Result<MoistureReading, SensorError> {
        self.convert(AnalogInput::Moisture).map(MoistureReading::new)
    }

    /// Trigger one temperature conversion; `None` if the channel isn't fitted.
    pub fn read_temperature(&mut self) -> Option<Result<TemperatureReading, SensorError>> {
        let cal = self.temperature?;
        Some(
            self.convert(AnalogInput::Temperature)
                .map(|raw| TemperatureReading::from_raw(raw, &cal)),
        )
    }

    pub fn has_temperature_channel(&self) -> bool {
        self.temperature.is_some()
    }

    fn convert(&mut self, input: AnalogInput) -> Result<u16, SensorError> {
        self.latch.clear();
        self.adc.start_conversion(input);

        let mut waited_us = 0;
        loop {
            if let Some(raw) = self.latch.take() {
                return Ok(raw);
            }
            if waited_us >= self.timeout_us {
                warn!("sampler: {input} conversion did not complete within {}us", self.timeout_us);
                return Err(SensorError::Timeout(input));
            }
            self.delay.delay_us(ADC_POLL_STEP_US);
            waited_us = waited_us.saturating_add(ADC_POLL_STEP_US);
        }
    }
}

// ---------------------------------------------------------------------------
// ESP-IDF ADC (oneshot — completes the latch synchronously)
// ---------------------------------------------------------------------------

/// ADC1 oneshot driver.  The oneshot API blocks until the result is ready,
/// so the completion is published before `start_conversion` returns.
pub struct OneshotAdc {
    latch: &'static ConversionLatch,
}

impl OneshotAdc {
    pub fn new(latch: &'static ConversionLatch) -> Self {
        Self { latch }
    }
}

impl AdcDriver for OneshotAdc {
    #[cfg(target_os = "espidf")]
    fn start_conversion(&mut self, input: AnalogInput) {
        use crate::drivers::hw_init;

        let channel = match input {
            AnalogInput::Moisture => hw_init::ADC1_CH_MOISTURE,
            AnalogInput::Temperature => hw_init::ADC1_CH_TEMPERATURE,
        };
        // A failed oneshot read leaves the latch untouched; the sampler
        // reports it as a timeout.
        if let Some(raw) = hw_init::adc1_read(channel) {
            self.latch.complete(raw);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn start_conversion(&mut self, input: AnalogInput) {
        let raw = match input {
            AnalogInput::Moisture => SIM_MOISTURE_ADC.load(Ordering::Relaxed),
            AnalogInput::Temperature => SIM_TEMPERATURE_ADC.load(Ordering::Relaxed),
        };
        self.latch.complete(raw);
    }
}

#[cfg(not(target_os = "espidf"))]
static SIM_MOISTURE_ADC: AtomicU16 = AtomicU16::new(1500);
#[cfg(not(target_os = "espidf"))]
static SIM_TEMPERATURE_ADC: AtomicU16 = AtomicU16::new(1950);

/// Inject the value the simulated moisture channel converts to.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_moisture_adc(raw: u16) {
    SIM_MOISTURE_ADC.store(raw, Ordering::Relaxed);
}

/// Inject the value the simulated temperature channel converts to.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temperature_adc(raw: u16) {
    SIM_TEMPERATURE_ADC.store(raw, Ordering::Relaxed);
}
