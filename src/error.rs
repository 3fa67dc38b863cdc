//! Runtime error channel.
//!
//! Effect failures never reach the transition function. They are reported
//! to an [`ErrorSink`] on the side and the loop keeps processing messages.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Failures surfaced by collaborators of the runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A command executor returned an error.
    #[error("Command {command} failed: {source}")]
    Command {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    /// A command task panicked.
    #[error("Command {command} panicked: {reason}")]
    CommandPanicked { command: String, reason: String },

    /// A command was issued outside of a tokio runtime.
    #[error("Command {command} could not be spawned: no tokio runtime")]
    CommandSpawn { command: String },

    /// A subscription manager failed to start a feed.
    #[error("Failed to add subscription {subscription}: {source}")]
    SubscriptionAdd {
        subscription: String,
        #[source]
        source: anyhow::Error,
    },

    /// A subscription manager failed to stop a feed.
    #[error("Failed to remove subscription {subscription}: {source}")]
    SubscriptionRemove {
        subscription: String,
        #[source]
        source: anyhow::Error,
    },

    /// The render target rejected a change set.
    #[error("Render target failed to apply change set: {source}")]
    Render {
        #[source]
        source: anyhow::Error,
    },
}

impl RuntimeError {
    /// Short category name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RuntimeError::Command { .. } => "command",
            RuntimeError::CommandPanicked { .. } => "command_panicked",
            RuntimeError::CommandSpawn { .. } => "command_spawn",
            RuntimeError::SubscriptionAdd { .. } => "subscription_add",
            RuntimeError::SubscriptionRemove { .. } => "subscription_remove",
            RuntimeError::Render { .. } => "render",
        }
    }
}

type ReportFn = dyn Fn(&RuntimeError) + Send + Sync;

/// Side channel receiving every [`RuntimeError`].
#[derive(Clone)]
pub struct ErrorSink {
    report: Arc<ReportFn>,
}

impl ErrorSink {
    pub fn new<F>(report: F) -> Self
    where
        F: Fn(&RuntimeError) + Send + Sync + 'static,
    {
        Self {
            report: Arc::new(report),
        }
    }

    /// Sink logging each error through `tracing`.
    pub fn tracing() -> Self {
        Self::new(|err| {
            tracing::warn!(kind = err.kind(), error = %err, "Effect failure");
        })
    }

    pub fn report(&self, err: &RuntimeError) {
        (self.report)(err);
    }
}

impl Default for ErrorSink {
    fn default() -> Self {
        Self::tracing()
    }
}

impl fmt::Debug for ErrorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorSink").finish_non_exhaustive()
    }
}
