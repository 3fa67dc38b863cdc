use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub time_logger: TimeLoggerConfig,
    #[serde(default)]
    pub runtime: LoopConfig,
}

/// Tracing output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when neither `PORTAL_LOG` nor `RUST_LOG`
    /// is set (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also write logs to this file. A timestamp and the pid are appended
    /// to the name.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Settings of the transition timing middleware.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeLoggerConfig {
    /// Log dispatch times (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Warn when one transition takes longer than this (default: 16).
    #[serde(default = "default_slow_transition_ms")]
    pub slow_transition_ms: u64,
}

/// Settings of the message loop itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Render after every processed message, including ones that left the
    /// state unchanged (default: true). When false, a `None` transition
    /// skips the render cycle.
    #[serde(default = "default_true")]
    pub render_unchanged: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_slow_transition_ms() -> u64 {
    16
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for TimeLoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slow_transition_ms: default_slow_transition_ms(),
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            render_unchanged: true,
        }
    }
}
