//! Application runtime.
//!
//! [`Runtime`] owns the state, runs every message through the middleware
//! pipeline, hands commands and subscriptions to their collaborators and
//! renders each new view through the change-set engine into a
//! [`RenderTarget`].

mod event_loop;
mod render;

pub use event_loop::{Phase, Runtime, RuntimeBuilder, RuntimeStats};
pub use render::{from_fn, FnTarget, Mirror, NullTarget, RenderTarget};
