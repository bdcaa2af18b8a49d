//! Build-time configuration source.
//!
//! The device has no persistent storage.  A JSON override can be baked
//! into the image by setting `PLANTWATER_CONFIG_JSON` when building;
//! fields it omits keep their defaults.  Without it the defaults apply.
//!
//! ```text
//! PLANTWATER_CONFIG_JSON='{"moisture_threshold":1800,"telemetry_base":16}'
//! ```

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

pub struct EmbeddedConfig {
    json: Option<&'static str>,
}

impl EmbeddedConfig {
    /// The override captured from the build environment, if any.
    pub fn from_build_env() -> Self {
        Self {
            json: option_env!("PLANTWATER_CONFIG_JSON"),
        }
    }

    pub fn from_json(json: &'static str) -> Self {
        Self { json: Some(json) }
    }
}

impl ConfigPort for EmbeddedConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let config = match self.json {
            None => {
                info!("config: using built-in defaults");
                SystemConfig::default()
            }
            Some(json) => {
                let config: SystemConfig = serde_json::from_str(json).map_err(|e| {
                    warn!("config: build-time override unparsable: {e}");
                    ConfigError::Corrupted
                })?;
                info!("config: build-time override applied");
                config
            }
        };
        config.validate()?;
        Ok(config)
    }
}
