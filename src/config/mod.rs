//! Configuration loading and validation.
//!
//! Transport settings come from an optional TOML file; the bot token is a
//! secret and only ever read from the environment. A missing token is fatal
//! at startup, before any network activity.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the Telegram bot token.
pub const TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("{TOKEN_ENV} must be set")]
    MissingToken,

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root URL of the Bot API. Overridable for tests against a stub.
    #[serde(default = "default_api_root")]
    pub api_root: String,

    /// Long-poll timeout for getUpdates, in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_root() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_root: default_api_root(),
            poll_timeout_seconds: default_poll_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file if it exists, otherwise fall back to defaults.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_root.is_empty() {
            return Err(ConfigError::ValidationError(
                "api_root must not be empty".to_string(),
            ));
        }

        if self.poll_timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "poll_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Read the bot token from the environment. Absence or an empty value is a
/// fatal configuration error.
pub fn bot_token_from_env() -> Result<String, ConfigError> {
    std::env::var(TOKEN_ENV)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::MissingToken)
}
