//! Stream-backed subscription manager.
//!
//! Maps each subscription to an async stream of messages and runs one task
//! per active subscription. Removing a subscription aborts its task.

use std::collections::HashMap;
use std::fmt;
use std::future::poll_fn;
use std::hash::Hash;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures_core::Stream;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use super::subscription::SubscriptionManager;
use crate::mailbox::Dispatcher;

/// A boxed message stream.
pub type Feed<M> = Pin<Box<dyn Stream<Item = M> + Send + 'static>>;

type FeedFactory<S, M> = Box<dyn Fn(&S) -> Feed<M> + Send>;

/// [`SubscriptionManager`] running one stream per subscription.
pub struct FeedManager<S, M> {
    factory: FeedFactory<S, M>,
    tasks: HashMap<S, JoinHandle<()>>,
}

impl<S, M> fmt::Debug for FeedManager<S, M>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedManager")
            .field("active", &self.tasks.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<S, M> FeedManager<S, M>
where
    S: Clone + Eq + Hash + fmt::Debug + Send + 'static,
    M: Send + 'static,
{
    /// Build a manager from a function mapping a subscription to its feed.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&S) -> Feed<M> + Send + 'static,
    {
        Self {
            factory: Box::new(factory),
            tasks: HashMap::new(),
        }
    }

    /// Number of running feeds.
    pub fn active(&self) -> usize {
        self.tasks.len()
    }
}

impl<S, M> SubscriptionManager<S, M> for FeedManager<S, M>
where
    S: Clone + Eq + Hash + fmt::Debug + Send + 'static,
    M: Send + 'static,
{
    fn add(&mut self, subscription: S, dispatcher: Dispatcher<M>) -> anyhow::Result<()> {
        if self.tasks.contains_key(&subscription) {
            return Ok(());
        }

        let handle = Handle::try_current()
            .map_err(|err| anyhow::anyhow!("cannot start feed {:?}: {}", subscription, err))?;

        let mut feed = (self.factory)(&subscription);
        let label = format!("{:?}", subscription);
        let task = handle.spawn(async move {
            while let Some(message) = poll_fn(|cx| feed.as_mut().poll_next(cx)).await {
                if !dispatcher.dispatch(message) {
                    break;
                }
            }
            tracing::debug!(subscription = %label, "Feed finished");
        });

        self.tasks.insert(subscription, task);
        Ok(())
    }

    fn remove(&mut self, subscription: &S) -> anyhow::Result<()> {
        if let Some(task) = self.tasks.remove(subscription) {
            task.abort();
        }
        Ok(())
    }
}

impl<S, M> Drop for FeedManager<S, M> {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Feed producing `message()` every `period`, first tick after one period.
pub fn every<M, F>(period: Duration, message: F) -> Feed<M>
where
    M: Send + 'static,
    F: Fn() -> M + Send + Unpin + 'static,
{
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Box::pin(Ticks { interval, message })
}

struct Ticks<F> {
    interval: Interval,
    message: F,
}

impl<M, F> Stream for Ticks<F>
where
    F: Fn() -> M + Unpin,
{
    type Item = M;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<M>> {
        match self.interval.poll_tick(cx) {
            Poll::Ready(_) => Poll::Ready(Some((self.message)())),
            Poll::Pending => Poll::Pending,
        }
    }
}
