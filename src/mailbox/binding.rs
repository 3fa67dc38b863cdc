//! Per-view event bindings.
//!
//! A view adapter owns one [`BindingTable`] per view instance. The table maps
//! each event slot to a translation from the raw native event to an optional
//! typed message, and forwards produced messages to the table's dispatcher.
//! There is no process-wide registry: dropping the table releases every
//! binding of the view.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, Weak};

use super::dispatcher::Dispatcher;

/// Translation from a raw native event to an optional message.
pub type Translate<E, M> = Box<dyn Fn(&E) -> Option<M> + Send + Sync>;

/// Identifier of one installed binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

/// Handle returned by [`BindingTable::bind`].
///
/// Reports whether its binding is still installed and can unbind it without
/// touching a newer binding on the same slot.
#[derive(Debug, Clone)]
pub struct BindingHandle<K> {
    slot: K,
    id: BindingId,
    alive: Weak<()>,
}

impl<K> BindingHandle<K> {
    pub fn slot(&self) -> &K {
        &self.slot
    }

    pub fn id(&self) -> BindingId {
        self.id
    }

    /// `false` once the binding was replaced, unbound or its table dropped.
    pub fn is_active(&self) -> bool {
        self.alive.strong_count() > 0
    }
}

/// Result of routing one raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A message was produced and handed to the dispatcher.
    Delivered,
    /// The translation produced no message; the event was absorbed.
    Absorbed,
    /// No binding on the slot; the event was dropped.
    Unbound,
}

struct Binding<E, M> {
    id: BindingId,
    translate: Translate<E, M>,
    // Handles observe liveness through a Weak to this.
    _alive: Arc<()>,
}

/// Event bindings of one view instance.
pub struct BindingTable<K, E, M> {
    dispatcher: Dispatcher<M>,
    bindings: HashMap<K, Binding<E, M>>,
    next_id: u64,
}

impl<K, E, M> fmt::Debug for BindingTable<K, E, M>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingTable")
            .field("slots", &self.bindings.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K, E, M> BindingTable<K, E, M>
where
    K: Clone + Eq + Hash + fmt::Debug,
    E: 'static,
    M: Send + 'static,
{
    pub fn new(dispatcher: Dispatcher<M>) -> Self {
        Self {
            dispatcher,
            bindings: HashMap::new(),
            next_id: 0,
        }
    }

    /// Install a translation for `slot`, replacing any existing binding.
    ///
    /// The previous binding is released before the new one is installed, so
    /// an event is never delivered through both.
    pub fn bind<F>(&mut self, slot: K, translate: F) -> BindingHandle<K>
    where
        F: Fn(&E) -> Option<M> + Send + Sync + 'static,
    {
        if self.bindings.remove(&slot).is_some() {
            tracing::trace!(slot = ?slot, "Released previous binding");
        }

        let id = BindingId(self.next_id);
        self.next_id += 1;
        let alive = Arc::new(());
        let handle = BindingHandle {
            slot: slot.clone(),
            id,
            alive: Arc::downgrade(&alive),
        };

        self.bindings.insert(
            slot,
            Binding {
                id,
                translate: Box::new(translate),
                _alive: alive,
            },
        );
        handle
    }

    /// Bind `slot` to always produce `message`.
    pub fn bind_message(&mut self, slot: K, message: M) -> BindingHandle<K>
    where
        M: Clone + Sync,
    {
        self.bind(slot, move |_| Some(message.clone()))
    }

    /// Remove the binding on `slot`. Returns whether one was installed.
    pub fn unbind(&mut self, slot: &K) -> bool {
        let released = self.bindings.remove(slot).is_some();
        if released {
            tracing::trace!(slot = ?slot, "Unbound");
        }
        released
    }

    /// Remove the binding behind `handle`, unless it was already replaced.
    pub fn unbind_handle(&mut self, handle: &BindingHandle<K>) -> bool {
        match self.bindings.get(&handle.slot) {
            Some(binding) if binding.id == handle.id => self.unbind(&handle.slot),
            _ => false,
        }
    }

    /// Bind every slot with a message and unbind every slot without one.
    pub fn sync<I>(&mut self, slots: I)
    where
        I: IntoIterator<Item = (K, Option<M>)>,
        M: Clone + Sync,
    {
        for (slot, message) in slots {
            match message {
                Some(message) => {
                    self.bind_message(slot, message);
                }
                None => {
                    self.unbind(&slot);
                }
            }
        }
    }

    /// Route a raw event arriving on `slot`.
    ///
    /// Unbound slots and translations producing nothing are not errors.
    pub fn route(&self, event: &E, slot: &K) -> RouteOutcome {
        let Some(binding) = self.bindings.get(slot) else {
            tracing::trace!(slot = ?slot, "Event on unbound slot dropped");
            return RouteOutcome::Unbound;
        };

        match (binding.translate)(event) {
            Some(message) => {
                self.dispatcher.dispatch(message);
                RouteOutcome::Delivered
            }
            None => {
                tracing::trace!(slot = ?slot, "Event absorbed by translation");
                RouteOutcome::Absorbed
            }
        }
    }

    pub fn is_bound(&self, slot: &K) -> bool {
        self.bindings.contains_key(slot)
    }

    /// Number of active bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Release every binding of this view.
    pub fn release_all(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Slot {
        Tap,
        Changed,
    }

    fn table() -> (
        BindingTable<Slot, String, String>,
        mpsc::UnboundedReceiver<String>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (BindingTable::new(Dispatcher::from_sender(tx)), rx)
    }

    #[test]
    fn rebinding_replaces_and_releases() {
        let (mut table, mut rx) = table();
        let first = table.bind(Slot::Tap, |raw: &String| Some(format!("first:{raw}")));
        let second = table.bind(Slot::Tap, |raw: &String| Some(format!("second:{raw}")));

        assert!(!first.is_active());
        assert!(second.is_active());
        assert_eq!(table.len(), 1);

        assert_eq!(table.route(&"x".to_string(), &Slot::Tap), RouteOutcome::Delivered);
        assert_eq!(rx.try_recv().ok(), Some("second:x".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn stale_handle_does_not_unbind_newer_binding() {
        let (mut table, _rx) = table();
        let stale = table.bind_message(Slot::Tap, "a".to_string());
        table.bind_message(Slot::Tap, "b".to_string());
        assert!(!table.unbind_handle(&stale));
        assert!(table.is_bound(&Slot::Tap));
    }

    #[test]
    fn unbound_slot_drops_events() {
        let (mut table, mut rx) = table();
        let handle = table.bind_message(Slot::Changed, "changed".to_string());
        assert!(table.unbind(&Slot::Changed));
        assert!(!handle.is_active());
        assert_eq!(table.route(&String::new(), &Slot::Changed), RouteOutcome::Unbound);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sync_binds_and_unbinds() {
        let (mut table, _rx) = table();
        table.bind_message(Slot::Changed, "old".to_string());
        table.sync([(Slot::Tap, Some("tap".to_string())), (Slot::Changed, None)]);
        assert!(table.is_bound(&Slot::Tap));
        assert!(!table.is_bound(&Slot::Changed));
    }

    #[test]
    fn dropping_table_deactivates_handles() {
        let (mut table, _rx) = table();
        let handle = table.bind_message(Slot::Tap, "tap".to_string());
        drop(table);
        assert!(!handle.is_active());
    }
}
