//! Unidirectional-data-flow application runtime with a declarative
//! change-set engine.
//!
//! # Architecture
//!
//! ```text
//! raw event ──→ Mailbox ──→ Message ──→ Runtime ──→ Middleware ──→ update
//!                                          │                         │
//!                                          │        (State, Command) ┘
//!                                          ├──→ CommandExecutor ──→ Message
//!                                          ├──→ SubscriptionManager ──→ Message
//!                                          └──→ view ──→ diff ──→ RenderTarget
//! ```
//!
//! - [`app`]: the application contract (state, messages, pure transitions)
//! - [`mailbox`]: per-view event bindings translating raw events into messages
//! - [`changeset`]: schema-scoped property sets and their minimal deltas
//! - [`effects`]: command and subscription boundary
//! - [`middleware`]: ordered interceptors around the transition function
//! - [`runtime`]: the single-owner processing loop
//! - [`config`], [`logging`], [`shutdown`]: settings, tracing setup and graceful stop

pub mod app;
pub mod changeset;
pub mod config;
pub mod effects;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod middleware;
pub mod runtime;
pub mod shutdown;

mod macros;

pub use app::{AppState, Application, Message, Transition};
pub use changeset::{Change, ChangeSet, Delta, Diff, Node, Patch, PropertySet, Tree};
pub use config::RuntimeConfig;
pub use effects::{CommandExecutor, SubscriptionManager};
pub use error::{ErrorSink, RuntimeError};
pub use mailbox::{BindingTable, Dispatcher};
pub use middleware::{Middleware, Next, TimeLogger};
pub use runtime::{Mirror, RenderTarget, Runtime};
pub use shutdown::{ShutdownCoordinator, ShutdownHandle};
