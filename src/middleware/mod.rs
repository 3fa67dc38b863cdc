//! Middleware pipeline around the transition function.
//!
//! Middlewares form an explicit ordered list, frozen when the runtime is
//! built. The first registered wraps outermost:
//!
//! ```text
//! M1 ──→ M2 ──→ … ──→ Application::update
//!  ↑      ↑                   │
//!  └──────┴──── result ───────┘
//! ```
//!
//! Each middleware receives a [`Next`] cursor over the rest of the chain and
//! may call it once, post-process its result, or skip it entirely.

mod pipeline;
mod time_logger;

pub use pipeline::{from_fn, FnMiddleware, Middleware, Next, Pipeline};
pub use time_logger::{LogSink, LoggerSwitch, TimeLogger};
