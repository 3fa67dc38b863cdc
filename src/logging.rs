//! Tracing setup for binaries embedding the runtime.

use std::path::{Path, PathBuf};

use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Env var overriding the filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "PORTAL_LOG";

/// Initialize tracing: stderr output plus an optional log file.
///
/// The filter comes from `PORTAL_LOG`, then `RUST_LOG`, then the configured
/// level. Log files get unique names so that several instances never write
/// to the same file: `{path}.{timestamp}.{pid}`.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339());

    let file_layer = config.file.as_deref().and_then(|base| {
        let path = unique_log_path(base);
        match std::fs::File::create(&path) {
            Ok(file) => Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_level(true)
                    .with_timer(UtcTime::rfc_3339()),
            ),
            Err(e) => {
                eprintln!("Warning: Failed to create log file {}: {}", path.display(), e);
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}

fn unique_log_path(base: &Path) -> PathBuf {
    let pid = std::process::id();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(format!("{}.{}.{}", base.display(), timestamp, pid))
}
