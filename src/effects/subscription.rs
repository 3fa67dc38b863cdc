//! Subscription management contract and set diffing.

use std::collections::HashSet;
use std::hash::Hash;

use crate::mailbox::{DispatchGuard, Dispatcher};

/// Owns the long-lived feeds behind subscriptions.
///
/// The runtime never calls `add` twice for a subscription that stayed
/// active, and always calls `remove` before forgetting one.
pub trait SubscriptionManager<S, M>: Send + 'static {
    /// Start the feed for `subscription`, posting into `dispatcher`.
    fn add(&mut self, subscription: S, dispatcher: Dispatcher<M>) -> anyhow::Result<()>;

    /// Stop the feed for `subscription`.
    fn remove(&mut self, subscription: &S) -> anyhow::Result<()>;
}

/// Manager for applications without subscriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSubscriptions;

impl<S, M> SubscriptionManager<S, M> for NoSubscriptions
where
    S: Send + 'static,
    M: Send + 'static,
{
    fn add(&mut self, _subscription: S, _dispatcher: Dispatcher<M>) -> anyhow::Result<()> {
        Ok(())
    }

    fn remove(&mut self, _subscription: &S) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Subscriptions to stop and to start between two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionDiff<S> {
    /// Present before, absent now. In previous order.
    pub removed: Vec<S>,
    /// Absent before, present now. In next order, without duplicates.
    pub added: Vec<S>,
}

impl<S> SubscriptionDiff<S> {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Symmetric difference between two subscription lists.
pub fn diff_subscriptions<S>(previous: &[S], next: &[S]) -> SubscriptionDiff<S>
where
    S: Clone + Eq + Hash,
{
    let before: HashSet<&S> = previous.iter().collect();
    let after: HashSet<&S> = next.iter().collect();

    let removed = previous
        .iter()
        .filter(|subscription| !after.contains(subscription))
        .cloned()
        .collect();

    let mut seen = HashSet::new();
    let added = next
        .iter()
        .filter(|subscription| !before.contains(subscription) && seen.insert(*subscription))
        .cloned()
        .collect();

    SubscriptionDiff { removed, added }
}

/// Runtime-side bookkeeping of active subscriptions and their guards.
pub(crate) struct ActiveSubscriptions<S> {
    entries: Vec<(S, DispatchGuard)>,
}

impl<S> ActiveSubscriptions<S>
where
    S: Clone + Eq + Hash,
{
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn current(&self) -> Vec<S> {
        self.entries
            .iter()
            .map(|(subscription, _)| subscription.clone())
            .collect()
    }

    pub(crate) fn insert(&mut self, subscription: S, guard: DispatchGuard) {
        self.entries.push((subscription, guard));
    }

    /// Forget `subscription` and revoke its guard. Returns whether it was active.
    pub(crate) fn revoke(&mut self, subscription: &S) -> bool {
        let Some(position) = self
            .entries
            .iter()
            .position(|(active, _)| active == subscription)
        else {
            return false;
        };
        let (_, guard) = self.entries.remove(position);
        guard.revoke();
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
