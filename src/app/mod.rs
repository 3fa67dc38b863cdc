//! Application contract for unidirectional data flow.
//!
//! ```text
//! Message ──→ update ──→ State ──→ view
//!    ↑                             │
//!    └─────────────────────────────┘
//! ```
//!
//! - **State**: Immutable snapshot owned by the runtime
//! - **Message**: Something that happened (user action, effect result)
//! - **update**: Pure function from (state, message) to the next transition

mod application;
mod message;
mod state;

pub use application::{Application, Transition};
pub use message::Message;
pub use state::AppState;
