//! Mailbox / event router.
//!
//! Decouples native interaction sources from typed message consumers:
//!
//! ```text
//! raw event ──→ BindingTable::route ──→ translate ──→ Dispatcher ──→ runtime queue
//! ```
//!
//! - `dispatcher.rs` - Cloneable, thread-safe message target
//! - `binding.rs` - Per-view slot bindings, at most one per slot
//! - `translate.rs` - Translations for common controls

mod binding;
mod dispatcher;
pub mod translate;

pub use binding::{BindingHandle, BindingId, BindingTable, RouteOutcome, Translate};
pub use dispatcher::{DispatchGuard, Dispatcher};
