//! Command and subscription boundary.
//!
//! Commands are one-shot asynchronous requests, subscriptions are long-lived
//! feeds. Both only ever hold a [`Dispatcher`](crate::mailbox::Dispatcher)
//! and post their results back into the runtime as messages.

mod command;
pub mod feed;
mod subscription;

pub use command::{CommandExecutor, NoCommands};
pub use feed::FeedManager;
pub(crate) use subscription::ActiveSubscriptions;
pub use subscription::{diff_subscriptions, NoSubscriptions, SubscriptionDiff, SubscriptionManager};
