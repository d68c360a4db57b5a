//! toy-watch specific configuration

use std::path::PathBuf;
use std::time::Duration;
use toy_common::config::{PlayerConfig, SessionConfig, TomlConfig};

/// Watch service configuration after CLI/env/TOML resolution
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub catalog_path: Option<PathBuf>,
    pub app_store_url: String,
    pub public_url: String,
    pub player: PlayerSettings,
    pub sessions: SessionLimits,
}

impl From<TomlConfig> for Config {
    fn from(toml: TomlConfig) -> Self {
        Self {
            port: toml.port,
            catalog_path: toml.catalog_path,
            app_store_url: toml.app_store_url,
            public_url: toml.public_url,
            player: PlayerSettings::from(&toml.player),
            sessions: SessionLimits::from(&toml.sessions),
        }
    }
}

/// Per-session player behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSettings {
    /// Bounded wait for slot readiness before proceeding anyway
    pub loading_timeout: Duration,
    /// Start automatically once loading settles
    pub autoplay: bool,
    /// Mount slots muted
    pub start_muted: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self::from(&PlayerConfig::default())
    }
}

impl From<&PlayerConfig> for PlayerSettings {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            loading_timeout: config.loading_timeout(),
            autoplay: config.autoplay,
            start_muted: config.start_muted,
        }
    }
}

/// Idle-session expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// A session with no request for this long is unmounted
    pub idle_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for SessionLimits {
    fn from(config: &SessionConfig) -> Self {
        Self {
            idle_timeout: config.idle_timeout(),
            sweep_interval: config.sweep_interval(),
        }
    }
}
