//! # SDK Configuration
//!
//! Configuration for a [`Subkit`](crate::Subkit) instance.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SUBKIT_API_KEY=public_live_abc                                     │
//! │     SUBKIT_LOG_LEVEL=verbose                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/subkit/subkit.toml (Linux)                               │
//! │     ~/Library/Application Support/com.subkit.sdk/subkit.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # subkit.toml
//! [sdk]
//! api_key = "public_live_abc"
//! base_url = "https://api.subkit.io/api/v1"
//! log_level = "info"        # none | error | warn | info | verbose
//!
//! [queue]
//! command_timeout_secs = 0  # 0 disables the stalled-command watchdog
//!
//! [storage]
//! database_path = "/var/lib/app/subkit.db"  # omit for in-memory storage
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use subkit_core::validation::validate_api_key;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SdkError, SdkResult};
use crate::logging::LogLevel;

// =============================================================================
// Sections
// =============================================================================

/// `[sdk]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkSettings {
    /// Public SDK key. May instead be passed to `activate`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for SdkSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            log_level: LogLevel::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.subkit.io/api/v1".to_string()
}

/// `[queue]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Watchdog limit per queued command in seconds. 0 disables it.
    #[serde(default)]
    pub command_timeout_secs: u64,
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database file. `None` keeps state in memory only.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

// =============================================================================
// SDK Config
// =============================================================================

/// Complete SDK configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SdkConfig {
    #[serde(default)]
    pub sdk: SdkSettings,

    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl SdkConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Overlay TOML file (if exists)
    /// 3. Overlay environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> SdkResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading SDK config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load SDK config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SdkResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SdkError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "SDK config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SdkResult<()> {
        if let Some(ref key) = self.sdk.api_key {
            validate_api_key(key)?;
        }

        let url = Url::parse(&self.sdk.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SdkError::Config(format!(
                "Base URL must use http or https, got: {}",
                self.sdk.base_url
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var("SUBKIT_API_KEY") {
            debug!("Overriding API key from environment");
            self.sdk.api_key = Some(key);
        }

        if let Some(url) = var("SUBKIT_BASE_URL") {
            debug!(base_url = %url, "Overriding base URL from environment");
            self.sdk.base_url = url;
        }

        if let Some(level) = var("SUBKIT_LOG_LEVEL") {
            match level.parse() {
                Ok(parsed) => self.sdk.log_level = parsed,
                Err(e) => warn!("Ignoring SUBKIT_LOG_LEVEL: {}", e),
            }
        }

        if let Some(secs) = var("SUBKIT_COMMAND_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                self.queue.command_timeout_secs = s;
            }
        }

        if let Some(path) = var("SUBKIT_DB_PATH") {
            self.storage.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "subkit", "sdk")
            .map(|dirs| dirs.config_dir().join("subkit.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Watchdog limit for queued commands, if enabled.
    pub fn command_timeout(&self) -> Option<Duration> {
        match self.queue.command_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.sdk.api_key.as_deref()
    }

    pub fn log_level(&self) -> LogLevel {
        self.sdk.log_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = SdkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.command_timeout(), None);
        assert_eq!(config.log_level(), LogLevel::Error);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let config: SdkConfig = toml::from_str(
            r#"
            [sdk]
            api_key = "public_live_abc"
            log_level = "verbose"

            [queue]
            command_timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key(), Some("public_live_abc"));
        assert_eq!(config.log_level(), LogLevel::Verbose);
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.sdk.base_url, default_base_url());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SUBKIT_API_KEY", "public_env_key"),
            ("SUBKIT_LOG_LEVEL", "info"),
            ("SUBKIT_COMMAND_TIMEOUT_SECS", "5"),
            ("SUBKIT_DB_PATH", "/tmp/subkit.db"),
        ]
        .into_iter()
        .collect();

        let mut config = SdkConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_key(), Some("public_env_key"));
        assert_eq!(config.log_level(), LogLevel::Info);
        assert_eq!(config.queue.command_timeout_secs, 5);
        assert_eq!(
            config.storage.database_path,
            Some(PathBuf::from("/tmp/subkit.db"))
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = SdkConfig::default();
        config.sdk.api_key = Some("   ".into());
        assert!(matches!(config.validate(), Err(SdkError::Validation(_))));

        let mut config = SdkConfig::default();
        config.sdk.base_url = "ftp://example.com".into();
        assert!(matches!(config.validate(), Err(SdkError::Config(_))));

        config.sdk.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(SdkError::Config(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("subkit-config-{}", std::process::id()));
        let path = dir.join("subkit.toml");

        let mut config = SdkConfig::default();
        config.sdk.api_key = Some("public_live_abc".into());
        config.queue.command_timeout_secs = 10;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: SdkConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(dir);
    }
}
