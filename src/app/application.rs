//! The application trait tying state, messages, effects and view together.

use std::fmt;
use std::hash::Hash;

use super::message::Message;
use super::state::AppState;
use crate::changeset::Diff;

/// Outcome of one transition.
///
/// `None` means "no state change, no command". It is a valid outcome and is
/// distinct from `Some((state, None))` with a state equal to the old one.
pub type Transition<S, C> = Option<(S, Option<C>)>;

/// An application driven by the runtime.
///
/// Every function here is pure: no side effects and no captured mutable
/// state. Effects are requested through `Command` values and long-lived
/// feeds through `Subscription` values; the runtime hands both to external
/// collaborators.
pub trait Application: Send + 'static {
    /// Immutable state owned by the runtime.
    type State: AppState;

    /// Closed set of things that can happen.
    type Message: Message;

    /// Closed set of one-shot effect requests.
    type Command: fmt::Debug + Send + 'static;

    /// Closed set of long-lived feeds, compared by value between transitions.
    type Subscription: Clone + Eq + Hash + fmt::Debug + Send + 'static;

    /// Declarative view description produced by [`Application::view`].
    type View: Diff;

    /// Data needed to build the initial state.
    type Flags: Send;

    /// Build the initial state and an optional startup command.
    fn init(flags: Self::Flags) -> (Self::State, Option<Self::Command>);

    /// Process a message against the current state.
    fn update(state: &Self::State, message: Self::Message) -> Transition<Self::State, Self::Command>;

    /// Describe the view for a state.
    fn view(state: &Self::State) -> Self::View;

    /// Subscriptions implied by a state.
    ///
    /// Default: none.
    fn subscriptions(_state: &Self::State) -> Vec<Self::Subscription> {
        Vec::new()
    }
}
