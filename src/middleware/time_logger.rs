//! Per-transition timing middleware.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::pipeline::{Middleware, Next};
use crate::app::{Application, Transition};
use crate::config::TimeLoggerConfig;

/// Receives formatted timing lines.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Measures how long the rest of the pipeline takes for each message.
///
/// Purely observational: the result of `next` is returned untouched whether
/// logging is enabled or not.
pub struct TimeLogger {
    enabled: Arc<AtomicBool>,
    log: LogSink,
    slow_threshold: Option<Duration>,
}

impl TimeLogger {
    /// Logger writing to `tracing` at debug level.
    pub fn new() -> Self {
        Self::with_sink(|line| tracing::debug!(target: "portal::timing", "{}", line))
    }

    /// Logger writing to a custom sink.
    pub fn with_sink<F>(log: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            log: Arc::new(log),
            slow_threshold: None,
        }
    }

    pub fn from_config(config: &TimeLoggerConfig) -> Self {
        let logger = Self::new().with_slow_threshold(Duration::from_millis(config.slow_transition_ms));
        logger.set_enabled(config.enabled);
        logger
    }

    /// Warn when a transition takes longer than `threshold`.
    pub fn with_slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Handle toggling this logger after it was moved into a pipeline.
    pub fn switch(&self) -> LoggerSwitch {
        LoggerSwitch {
            enabled: Arc::clone(&self.enabled),
        }
    }
}

impl Default for TimeLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimeLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeLogger")
            .field("enabled", &self.is_enabled())
            .field("slow_threshold", &self.slow_threshold)
            .finish()
    }
}

/// Shared on/off switch of a [`TimeLogger`].
#[derive(Debug, Clone)]
pub struct LoggerSwitch {
    enabled: Arc<AtomicBool>,
}

impl LoggerSwitch {
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Milliseconds rounded to two decimals.
fn dispatch_millis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100_000.0).round() / 100.0
}

impl<A: Application> Middleware<A> for TimeLogger {
    fn call(
        &self,
        state: &A::State,
        message: A::Message,
        command: Option<A::Command>,
        next: Next<'_, A>,
    ) -> Transition<A::State, A::Command> {
        let started = Instant::now();
        let result = next.run(state, message, command);
        let elapsed = started.elapsed();

        if self.is_enabled() {
            (self.log)(&format!("Dispatch time {}ms", dispatch_millis(elapsed)));
            if let Some(threshold) = self.slow_threshold {
                if elapsed > threshold {
                    tracing::warn!(
                        elapsed_ms = dispatch_millis(elapsed),
                        threshold_ms = threshold.as_millis() as u64,
                        "Slow transition"
                    );
                }
            }
        }

        result
    }
}
