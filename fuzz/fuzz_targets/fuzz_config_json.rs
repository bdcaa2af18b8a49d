//! Fuzz target: build-time config override parsing
//!
//! Whatever JSON ends up in the image, loading it must either yield a
//! configuration that passes validation or a `ConfigError`, never a panic.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use plantwater::config::SystemConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = serde_json::from_str::<SystemConfig>(text) {
        let _ = config.validate();
    }
});
