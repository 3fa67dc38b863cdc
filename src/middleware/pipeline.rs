//! Middleware trait, continuation cursor and frozen pipeline.

use std::fmt;
use std::marker::PhantomData;

use crate::app::{Application, Transition};

/// Interceptor wrapping the transition function.
///
/// A middleware may:
/// - call `next` and return its result unchanged
/// - call `next` and rewrite the result
/// - skip `next`, short-circuiting the inner middlewares and the
///   application's `update`
///
/// Returning `None` means "no state change, no command".
pub trait Middleware<A: Application>: Send + 'static {
    fn call(
        &self,
        state: &A::State,
        message: A::Message,
        command: Option<A::Command>,
        next: Next<'_, A>,
    ) -> Transition<A::State, A::Command>;
}

/// The rest of the pipeline, ending in the application's `update`.
///
/// Consumed by [`Next::run`], so the continuation runs at most once.
pub struct Next<'a, A: Application> {
    rest: &'a [Box<dyn Middleware<A>>],
}

impl<'a, A: Application> Next<'a, A> {
    pub fn run(
        self,
        state: &A::State,
        message: A::Message,
        command: Option<A::Command>,
    ) -> Transition<A::State, A::Command> {
        match self.rest.split_first() {
            Some((middleware, rest)) => middleware.call(state, message, command, Next { rest }),
            None => core_transition::<A>(state, message, command),
        }
    }

    /// Middlewares left before the application's `update`.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }
}

/// The innermost step: the application's own transition.
///
/// A command handed down the chain is kept unless `update` issues its own.
/// When `update` returns `None` but a command was handed down, the state is
/// kept and the command still goes out.
fn core_transition<A: Application>(
    state: &A::State,
    message: A::Message,
    command: Option<A::Command>,
) -> Transition<A::State, A::Command> {
    match A::update(state, message) {
        Some((next_state, own)) => Some((next_state, own.or(command))),
        None => command.map(|command| (state.clone(), Some(command))),
    }
}

/// Ordered middlewares, fixed at construction.
pub struct Pipeline<A: Application> {
    middlewares: Vec<Box<dyn Middleware<A>>>,
}

impl<A: Application> Pipeline<A> {
    pub fn new(middlewares: Vec<Box<dyn Middleware<A>>>) -> Self {
        Self { middlewares }
    }

    /// Run one message through the chain.
    pub fn run(&self, state: &A::State, message: A::Message) -> Transition<A::State, A::Command> {
        Next {
            rest: &self.middlewares,
        }
        .run(state, message, None)
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<A: Application> Default for Pipeline<A> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<A: Application> fmt::Debug for Pipeline<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("middlewares", &self.middlewares.len())
            .finish()
    }
}

/// Middleware backed by a closure. Build with [`from_fn`].
pub struct FnMiddleware<A, F> {
    call: F,
    _app: PhantomData<fn() -> A>,
}

/// Adapt a closure into a [`Middleware`].
pub fn from_fn<A, F>(call: F) -> FnMiddleware<A, F>
where
    A: Application,
    F: Fn(
            &A::State,
            A::Message,
            Option<A::Command>,
            Next<'_, A>,
        ) -> Transition<A::State, A::Command>
        + Send
        + 'static,
{
    FnMiddleware {
        call,
        _app: PhantomData,
    }
}

impl<A, F> Middleware<A> for FnMiddleware<A, F>
where
    A: Application,
    F: Fn(
            &A::State,
            A::Message,
            Option<A::Command>,
            Next<'_, A>,
        ) -> Transition<A::State, A::Command>
        + Send
        + 'static,
{
    fn call(
        &self,
        state: &A::State,
        message: A::Message,
        command: Option<A::Command>,
        next: Next<'_, A>,
    ) -> Transition<A::State, A::Command> {
        (self.call)(state, message, command, next)
    }
}
