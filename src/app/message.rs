//! Base trait for messages fed into the transition function.

use std::fmt;

/// Marker trait for message objects.
///
/// Messages represent:
/// - User actions routed through a mailbox
/// - Command results
/// - Subscription feed items
///
/// Each message is consumed exactly once by the transition function.
pub trait Message: fmt::Debug + Send + 'static {}
