use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::types::RuntimeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl RuntimeConfig {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/portal/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("portal").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `RuntimeConfig::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(RuntimeConfig::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: RuntimeConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The log level is a filter `EnvFilter` accepts, such as `info` or
    ///   `portal=debug,info`, where every directive ends in a known level
    /// - The slow transition threshold is positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_log_filter(&self.logging.level)?;

        if self.time_logger.slow_transition_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "time_logger.slow_transition_ms must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Bare target directives (`portal`) are refused so a misspelled level is
/// not silently read as a target name.
fn validate_log_filter(filter: &str) -> Result<(), ConfigError> {
    for directive in filter.split(',').map(str::trim) {
        let level = directive.rsplit('=').next().unwrap_or(directive);
        if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Unknown log level '{}', expected one of: {}",
                    level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
    }

    EnvFilter::try_new(filter).map_err(|e| ConfigError::ValidationError {
        message: format!("Invalid log filter '{}': {}", filter, e),
    })?;
    Ok(())
}
