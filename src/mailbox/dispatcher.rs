//! Cloneable handle for posting messages into the runtime queue.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc::UnboundedSender;

type SendFn<M> = dyn Fn(M) -> bool + Send + Sync;

/// Fire-and-forget message target.
///
/// Safe to clone and use from any thread. Messages sent through the same
/// handle from one thread arrive in the order they were sent. Effects and
/// mailboxes only ever hold a `Dispatcher`, never the state itself.
pub struct Dispatcher<M> {
    send: Arc<SendFn<M>>,
}

impl<M> Clone for Dispatcher<M> {
    fn clone(&self) -> Self {
        Self {
            send: Arc::clone(&self.send),
        }
    }
}

impl<M> fmt::Debug for Dispatcher<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl<M: Send + 'static> Dispatcher<M> {
    /// Dispatcher posting into a runtime queue.
    pub fn from_sender(sender: UnboundedSender<M>) -> Self {
        Self::from_fn(move |message| sender.send(message).is_ok())
    }

    /// Dispatcher backed by a function. The function reports whether the
    /// message was accepted.
    pub fn from_fn<F>(send: F) -> Self
    where
        F: Fn(M) -> bool + Send + Sync + 'static,
    {
        Self {
            send: Arc::new(send),
        }
    }

    /// Post a message. Returns `false` when the message was dropped
    /// (runtime gone or dispatcher revoked); never blocks on processing.
    pub fn dispatch(&self, message: M) -> bool {
        let accepted = (self.send)(message);
        if !accepted {
            tracing::trace!("Dispatch dropped: target closed or revoked");
        }
        accepted
    }

    /// Dispatcher for a child message type, forwarding through `map`.
    pub fn map<N, F>(&self, map: F) -> Dispatcher<N>
    where
        N: Send + 'static,
        F: Fn(N) -> M + Send + Sync + 'static,
    {
        let parent = self.clone();
        Dispatcher::from_fn(move |message| parent.dispatch(map(message)))
    }

    /// Dispatcher that stops delivering once `guard` is revoked.
    pub fn guarded(&self, guard: &DispatchGuard) -> Dispatcher<M> {
        let parent = self.clone();
        let open = Arc::clone(&guard.open);
        Dispatcher::from_fn(move |message| {
            // Hold the read lock across the send so revoke() waits for
            // in-progress deliveries.
            let is_open = open.read();
            *is_open && parent.dispatch(message)
        })
    }
}

/// Revocable permission to deliver messages.
///
/// Once [`DispatchGuard::revoke`] returns, no message sent through a guarded
/// dispatcher is delivered.
#[derive(Debug, Clone)]
pub struct DispatchGuard {
    open: Arc<RwLock<bool>>,
}

impl DispatchGuard {
    pub fn new() -> Self {
        Self {
            open: Arc::new(RwLock::new(true)),
        }
    }

    pub fn revoke(&self) {
        *self.open.write() = false;
    }

    pub fn is_open(&self) -> bool {
        *self.open.read()
    }
}

impl Default for DispatchGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn dispatch_preserves_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::from_sender(tx);
        for value in 0..5 {
            assert!(dispatcher.dispatch(value));
        }
        let received: Vec<i32> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(received, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn dispatch_after_receiver_dropped_reports_false() {
        let (tx, rx) = mpsc::unbounded_channel::<u8>();
        drop(rx);
        assert!(!Dispatcher::from_sender(tx).dispatch(1));
    }

    #[test]
    fn map_forwards_to_parent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let parent = Dispatcher::from_sender(tx);
        let child = parent.map(|index: usize| format!("row {index}"));
        child.dispatch(3);
        assert_eq!(rx.try_recv().ok(), Some("row 3".to_string()));
    }

    #[test]
    fn revoked_guard_drops_messages() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let guard = DispatchGuard::new();
        let guarded = Dispatcher::from_sender(tx).guarded(&guard);

        assert!(guarded.dispatch(1));
        guard.revoke();
        assert!(!guard.is_open());
        assert!(!guarded.dispatch(2));

        assert_eq!(rx.try_recv().ok(), Some(1));
        assert!(rx.try_recv().is_err());
    }
}
