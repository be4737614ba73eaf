//! Embedded configuration loader
//!
//! Falls back to defaults if the embedded bytes cannot be used.

use defmt::*;

use vportal_core::config::{ConfigError, PortalConfig};

/// Configuration written by build.rs from portal.toml
static EMBEDDED_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/portal.bin"));

/// Configuration loading errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Deserialization failed
    Deserialize,
    /// Decoded values out of range
    Invalid(ConfigError),
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

/// Decode and validate a serialized configuration
fn decode(bytes: &[u8]) -> Result<PortalConfig, LoadError> {
    let config: PortalConfig = postcard::from_bytes(bytes).map_err(|_| LoadError::Deserialize)?;
    config.validate()?;
    Ok(config)
}

/// Load the embedded configuration
pub fn load_config() -> PortalConfig {
    match decode(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Loaded configuration: fade tick {}ms, status interval {}ms",
                config.fade_tick_ms, config.status_interval_ms
            );
            config
        }
        Err(e) => {
            error!("Embedded configuration unusable: {:?}", e);
            warn!("Using default configuration");
            PortalConfig::default()
        }
    }
}
