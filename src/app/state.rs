//! Base trait for application state.

/// Marker trait for application state.
///
/// States should be:
/// - Immutable (a transition returns a new state, it never edits the old one)
/// - Self-contained (all data needed to render the view)
///
/// `Clone` is required because a transition that only forwards a command
/// keeps the current state.
pub trait AppState: Clone + Send + 'static {}
