//! Configuration type definitions
//!
//! The firmware carries a `portal.toml` that is validated at build time and
//! embedded as postcard-serialized binary data.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Longest accepted fade tick interval
pub const MAX_FADE_TICK_MS: u16 = 100;

/// Longest accepted unsolicited status interval
pub const MAX_STATUS_INTERVAL_MS: u16 = 1000;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Stored layout does not match [`CONFIG_VERSION`]
    VersionMismatch { found: u8 },
    /// Fade tick interval outside `1..=MAX_FADE_TICK_MS`
    InvalidFadeTick(u16),
    /// Status interval outside `1..=MAX_STATUS_INTERVAL_MS`
    InvalidStatusInterval(u16),
}

/// Portal configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PortalConfig {
    /// Layout version
    pub version: u8,
    /// Interval between fade engine updates while a fade is running (ms)
    pub fade_tick_ms: u16,
    /// Interval between unsolicited status reports while active (ms)
    pub status_interval_ms: u16,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            fade_tick_ms: 1,
            status_interval_ms: 10,
        }
    }
}

impl PortalConfig {
    /// Check every field is within range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch {
                found: self.version,
            });
        }
        if !(1..=MAX_FADE_TICK_MS).contains(&self.fade_tick_ms) {
            return Err(ConfigError::InvalidFadeTick(self.fade_tick_ms));
        }
        if !(1..=MAX_STATUS_INTERVAL_MS).contains(&self.status_interval_ms) {
            return Err(ConfigError::InvalidStatusInterval(self.status_interval_ms));
        }
        Ok(())
    }
}
