mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use common::*;
use portal::mailbox::translate::{constant, select_index};
use portal::mailbox::{BindingTable, RouteOutcome};
use portal::{Dispatcher, Runtime};

/// Raw events a native control can emit.
#[derive(Debug, Clone, PartialEq)]
enum Raw {
    Tap,
    Selected(usize),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Primary,
    Selection,
    Editing,
}

#[test]
fn routed_events_drive_the_runtime() {
    let mut runtime = Runtime::<CounterApp>::builder(CounterFlags::default()).build();
    let mut view: BindingTable<Slot, Raw, Msg> = BindingTable::new(runtime.dispatcher());

    view.bind(Slot::Primary, constant(Msg::Increment));
    view.bind(Slot::Editing, |raw: &Raw| match raw {
        Raw::Text(text) if !text.is_empty() => Some(Msg::Rename(Some(text.clone()))),
        _ => None,
    });

    assert_eq!(view.route(&Raw::Tap, &Slot::Primary), RouteOutcome::Delivered);
    assert_eq!(view.route(&Raw::Tap, &Slot::Primary), RouteOutcome::Delivered);
    assert_eq!(
        view.route(&Raw::Text(String::new()), &Slot::Editing),
        RouteOutcome::Absorbed
    );
    assert_eq!(
        view.route(&Raw::Text("Taps".into()), &Slot::Editing),
        RouteOutcome::Delivered
    );
    assert_eq!(view.route(&Raw::Tap, &Slot::Selection), RouteOutcome::Unbound);

    assert_eq!(runtime.drain(), 3);
    assert_eq!(runtime.state().count, 2);
    assert_eq!(runtime.state().title.as_deref(), Some("Taps"));
}

#[test]
fn selection_index_maps_to_segment_messages() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut view: BindingTable<Slot, usize, Msg> = BindingTable::new(Dispatcher::from_sender(tx));
    view.bind(
        Slot::Selection,
        select_index(vec![Some(Msg::Increment), None, Some(Msg::Decrement)]),
    );

    assert_eq!(view.route(&0, &Slot::Selection), RouteOutcome::Delivered);
    assert_eq!(view.route(&1, &Slot::Selection), RouteOutcome::Absorbed);
    assert_eq!(view.route(&2, &Slot::Selection), RouteOutcome::Delivered);
    assert_eq!(view.route(&9, &Slot::Selection), RouteOutcome::Absorbed);

    let received: Vec<Msg> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert_eq!(received, vec![Msg::Increment, Msg::Decrement]);
}

#[test]
fn rebinding_keeps_a_single_binding_per_slot() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut view: BindingTable<Slot, Raw, Msg> = BindingTable::new(Dispatcher::from_sender(tx));

    let first = view.bind_message(Slot::Primary, Msg::Increment);
    let second = view.bind_message(Slot::Primary, Msg::Decrement);

    assert_eq!(view.len(), 1);
    assert!(!first.is_active());
    assert!(!view.unbind_handle(&first));
    assert!(view.is_bound(&Slot::Primary));

    view.route(&Raw::Tap, &Slot::Primary);
    assert_eq!(rx.try_recv().ok(), Some(Msg::Decrement));
    assert!(rx.try_recv().is_err());

    assert!(view.unbind_handle(&second));
    assert!(view.is_empty());
}

#[test]
fn replaced_translation_is_dropped_immediately() {
    let (tx, _rx) = mpsc::unbounded_channel::<Msg>();
    let mut view: BindingTable<Slot, Raw, Msg> = BindingTable::new(Dispatcher::from_sender(tx));

    let captured = Arc::new(Mutex::new(0u32));
    {
        let captured = Arc::clone(&captured);
        view.bind(Slot::Primary, move |_: &Raw| {
            *captured.lock() += 1;
            None
        });
    }
    assert_eq!(Arc::strong_count(&captured), 2);

    view.bind_message(Slot::Primary, Msg::Noop);
    assert_eq!(Arc::strong_count(&captured), 1);
}

#[test]
fn sync_applies_optional_messages_per_slot() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut view: BindingTable<Slot, Raw, Msg> = BindingTable::new(Dispatcher::from_sender(tx));

    view.sync([
        (Slot::Primary, Some(Msg::Increment)),
        (Slot::Editing, Some(Msg::Noop)),
    ]);
    assert_eq!(view.len(), 2);

    // The control loses its action: its slot is unbound and events drop.
    view.sync([(Slot::Editing, None)]);
    assert_eq!(view.route(&Raw::Tap, &Slot::Editing), RouteOutcome::Unbound);
    assert_eq!(view.route(&Raw::Selected(0), &Slot::Primary), RouteOutcome::Delivered);
    assert_eq!(rx.try_recv().ok(), Some(Msg::Increment));
}

#[test]
fn child_component_posts_through_mapped_dispatcher() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let parent = Dispatcher::from_sender(tx);
    let child = parent.map(|delta: i64| Msg::Loaded(delta * 10));

    let mut view: BindingTable<Slot, Raw, i64> = BindingTable::new(child);
    view.bind_message(Slot::Primary, 4);
    view.route(&Raw::Tap, &Slot::Primary);

    assert_eq!(rx.try_recv().ok(), Some(Msg::Loaded(40)));
}

#[test]
fn releasing_the_view_drops_later_events() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut view: BindingTable<Slot, Raw, Msg> = BindingTable::new(Dispatcher::from_sender(tx));
    let handle = view.bind_message(Slot::Primary, Msg::Increment);

    view.release_all();

    assert!(!handle.is_active());
    assert_eq!(view.route(&Raw::Tap, &Slot::Primary), RouteOutcome::Unbound);
    assert!(rx.try_recv().is_err());
}
