//! Bootstrap configuration loading
//!
//! Settings come from, in priority order:
//! 1. Command-line arguments (handled by the binary)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! A missing or unreadable config file is not fatal: a warning is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TOY_CONFIG";

/// Default HTTP port for the watch service
pub const DEFAULT_PORT: u16 = 5780;

/// Default bounded wait for slot readiness
pub const DEFAULT_LOADING_TIMEOUT_MS: u64 = 3000;

/// Public site origin that share links point at
pub const DEFAULT_PUBLIC_URL: &str = "https://sendtoycard.com";

/// Sessions untouched this long are unmounted and dropped
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// How often the idle-session sweep runs
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

/// Default app listing used by the card opener redirects
pub const DEFAULT_APP_STORE_URL: &str =
    "https://apps.apple.com/us/app/toy-group-video-cards/id6758913044";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// HTTP server port
    pub port: u16,

    /// Card catalog consumed by the media resolver
    pub catalog_path: Option<PathBuf>,

    /// App listing the card opener redirects to
    pub app_store_url: String,

    /// Public origin used to build watch page share links
    pub public_url: String,

    pub logging: LoggingConfig,

    pub player: PlayerConfig,

    pub sessions: SessionConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            catalog_path: None,
            app_store_url: DEFAULT_APP_STORE_URL.to_string(),
            public_url: DEFAULT_PUBLIC_URL.to_string(),
            logging: LoggingConfig::default(),
            player: PlayerConfig::default(),
            sessions: SessionConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Player behaviour knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Bounded wait before loading is treated as settled without readiness
    pub loading_timeout_ms: u64,

    /// Start playback automatically once loading settles
    pub autoplay: bool,

    /// Mount slots muted (required for autoplay on most mobile browsers)
    pub start_muted: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            loading_timeout_ms: DEFAULT_LOADING_TIMEOUT_MS,
            autoplay: true,
            start_muted: true,
        }
    }
}

impl PlayerConfig {
    pub fn loading_timeout(&self) -> Duration {
        Duration::from_millis(self.loading_timeout_ms)
    }
}

/// Watch session lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Idle time after which a session is unmounted (viewer left the page)
    pub idle_timeout_secs: u64,

    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: DEFAULT_SESSION_IDLE_TIMEOUT_SECS,
            sweep_interval_secs: DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl TomlConfig {
    /// Parse and validate config text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the resolved config file, falling back to defaults on any failure
    pub fn load_or_default(cli_path: Option<&Path>) -> Self {
        let Some(path) = resolve_config_path(cli_path, CONFIG_ENV_VAR) else {
            info!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load(&path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Failed to load config {}: {} (using defaults)", path.display(), e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.player.loading_timeout_ms == 0 {
            return Err(Error::Config(
                "player.loading_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.sessions.idle_timeout_secs == 0 || self.sessions.sweep_interval_secs == 0 {
            return Err(Error::Config(
                "sessions.idle_timeout_secs and sessions.sweep_interval_secs must be greater than zero"
                    .to_string(),
            ));
        }
        if self.app_store_url.trim().is_empty() {
            return Err(Error::Config("app_store_url must not be empty".to_string()));
        }
        if self.public_url.trim().is_empty() {
            return Err(Error::Config("public_url must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Config file resolution:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. Platform config directory (`<config_dir>/toy/config.toml`), if it exists
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|path| path.exists())
}

/// Platform default config file location
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("toy").join("config.toml"))
}
