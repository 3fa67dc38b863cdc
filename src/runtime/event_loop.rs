//! The message loop.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::render::{NullTarget, RenderTarget, Renderer};
use crate::app::Application;
use crate::config::LoopConfig;
use crate::effects::{
    diff_subscriptions, ActiveSubscriptions, CommandExecutor, NoCommands, NoSubscriptions,
    SubscriptionManager,
};
use crate::error::{ErrorSink, RuntimeError};
use crate::mailbox::{DispatchGuard, Dispatcher};
use crate::middleware::{Middleware, Pipeline};
use crate::shutdown::{ShutdownHandle, ShutdownPhase};

/// Whether the runtime is inside a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Transitioning,
}

/// Counters kept by the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Messages taken off the queue.
    pub processed: u64,
    /// Messages whose pipeline returned a new state.
    pub transitions: u64,
    /// Messages whose pipeline returned `None`.
    pub unchanged: u64,
    /// Render cycles, the initial one included.
    pub renders: u64,
}

type Executor<A> =
    Arc<dyn CommandExecutor<<A as Application>::Command, <A as Application>::Message>>;
type Manager<A> =
    Box<dyn SubscriptionManager<<A as Application>::Subscription, <A as Application>::Message>>;

/// Configures a [`Runtime`]. Created by [`Runtime::builder`].
pub struct RuntimeBuilder<A: Application> {
    flags: A::Flags,
    middlewares: Vec<Box<dyn Middleware<A>>>,
    executor: Executor<A>,
    subscriptions: Manager<A>,
    target: Box<dyn RenderTarget<A::View>>,
    errors: ErrorSink,
    config: LoopConfig,
}

impl<A: Application> RuntimeBuilder<A> {
    /// Append a middleware. The first one added wraps outermost.
    pub fn middleware<M: Middleware<A>>(mut self, middleware: M) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    pub fn executor<E>(mut self, executor: E) -> Self
    where
        E: CommandExecutor<A::Command, A::Message>,
    {
        self.executor = Arc::new(executor);
        self
    }

    pub fn subscriptions<S>(mut self, manager: S) -> Self
    where
        S: SubscriptionManager<A::Subscription, A::Message>,
    {
        self.subscriptions = Box::new(manager);
        self
    }

    pub fn render_target<T: RenderTarget<A::View>>(mut self, target: T) -> Self {
        self.target = Box::new(target);
        self
    }

    pub fn on_error(mut self, errors: ErrorSink) -> Self {
        self.errors = errors;
        self
    }

    pub fn loop_config(mut self, config: LoopConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the initial state and freeze the pipeline.
    ///
    /// Nothing is rendered, started or spawned yet: that happens on the
    /// first call to [`Runtime::run`], [`Runtime::step`] or [`Runtime::drain`].
    pub fn build(self) -> Runtime<A> {
        let (state, init_command) = A::init(self.flags);
        let (sender, receiver) = mpsc::unbounded_channel();

        tracing::debug!(
            middlewares = self.middlewares.len(),
            render_unchanged = self.config.render_unchanged,
            "Runtime built"
        );

        Runtime {
            state,
            pipeline: Pipeline::new(self.middlewares),
            executor: self.executor,
            subscriptions: self.subscriptions,
            active: ActiveSubscriptions::new(),
            renderer: Renderer::new(self.target),
            errors: self.errors,
            config: self.config,
            dispatcher: Dispatcher::from_sender(sender),
            receiver,
            phase: Phase::Idle,
            stats: RuntimeStats::default(),
            startup: Some(init_command),
        }
    }
}

/// Owns the application state and processes messages one at a time.
///
/// Per message: pipeline, state replacement, command spawn, subscription
/// sync, render. Messages posted while a transition runs (from effects,
/// other threads or a middleware) are queued and processed afterwards in
/// arrival order.
pub struct Runtime<A: Application> {
    state: A::State,
    pipeline: Pipeline<A>,
    executor: Executor<A>,
    subscriptions: Manager<A>,
    active: ActiveSubscriptions<A::Subscription>,
    renderer: Renderer<A::View>,
    errors: ErrorSink,
    config: LoopConfig,
    dispatcher: Dispatcher<A::Message>,
    receiver: UnboundedReceiver<A::Message>,
    phase: Phase,
    stats: RuntimeStats,
    // `Some` until the startup cycle ran; holds the init command.
    startup: Option<Option<A::Command>>,
}

impl<A: Application> fmt::Debug for Runtime<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("phase", &self.phase)
            .field("stats", &self.stats)
            .field("pipeline", &self.pipeline)
            .field("active_subscriptions", &self.active.len())
            .finish_non_exhaustive()
    }
}

impl<A: Application> Runtime<A> {
    pub fn builder(flags: A::Flags) -> RuntimeBuilder<A> {
        RuntimeBuilder {
            flags,
            middlewares: Vec::new(),
            executor: Arc::new(NoCommands),
            subscriptions: Box::new(NoSubscriptions),
            target: Box::new(NullTarget),
            errors: ErrorSink::default(),
            config: LoopConfig::default(),
        }
    }

    /// Handle for posting messages. Never blocks, usable from any thread.
    pub fn dispatcher(&self) -> Dispatcher<A::Message> {
        self.dispatcher.clone()
    }

    pub fn state(&self) -> &A::State {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> RuntimeStats {
        self.stats
    }

    /// Number of subscriptions currently held by the manager.
    pub fn active_subscriptions(&self) -> usize {
        self.active.len()
    }

    /// Wait for the next message and process it.
    pub async fn step(&mut self) {
        self.ensure_started();
        if let Some(message) = self.receiver.recv().await {
            self.process(message);
        }
    }

    /// Process every message already queued, including ones queued while
    /// draining. Returns how many were processed.
    pub fn drain(&mut self) -> usize {
        self.ensure_started();
        let mut count = 0;
        while let Ok(message) = self.receiver.try_recv() {
            self.process(message);
            count += 1;
        }
        count
    }

    /// Process messages until `shutdown` is signaled, then release every
    /// subscription and return the final state.
    ///
    /// A transition in progress when the signal arrives runs to completion.
    /// Queued messages left behind are dropped.
    pub async fn run(mut self, shutdown: ShutdownHandle) -> A::State {
        self.ensure_started();
        tracing::info!("Runtime started");

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.wait() => None,
                message = self.receiver.recv() => message,
            };
            match next {
                Some(message) => self.process(message),
                None => break,
            }
        }

        shutdown.advance(ShutdownPhase::StoppingLoop);
        let dropped = self.drop_queued();
        shutdown.advance(ShutdownPhase::ReleasingEffects);
        self.release_subscriptions();

        tracing::info!(
            processed = self.stats.processed,
            dropped,
            "Runtime stopped"
        );
        self.state
    }

    fn ensure_started(&mut self) {
        let Some(init_command) = self.startup.take() else {
            return;
        };
        if let Some(command) = init_command {
            self.spawn_command(command);
        }
        self.sync_subscriptions();
        self.render();
    }

    fn process(&mut self, message: A::Message) {
        self.phase = Phase::Transitioning;
        tracing::trace!(?message, "Processing message");

        let outcome = self.pipeline.run(&self.state, message);
        self.stats.processed += 1;

        let changed = match outcome {
            Some((state, command)) => {
                self.state = state;
                self.stats.transitions += 1;
                if let Some(command) = command {
                    self.spawn_command(command);
                }
                self.sync_subscriptions();
                true
            }
            None => {
                self.stats.unchanged += 1;
                false
            }
        };

        if changed || self.config.render_unchanged {
            self.render();
        }
        self.phase = Phase::Idle;
    }

    fn spawn_command(&self, command: A::Command) {
        let label = format!("{:?}", command);
        let Ok(handle) = Handle::try_current() else {
            self.errors
                .report(&RuntimeError::CommandSpawn { command: label });
            return;
        };

        tracing::debug!(command = %label, "Spawning command");
        let executor = Arc::clone(&self.executor);
        let dispatcher = self.dispatcher.clone();
        let errors = self.errors.clone();

        handle.spawn(async move {
            // Run on a nested task so a panic surfaces as a JoinError.
            let task = tokio::spawn(async move { executor.execute(command, dispatcher).await });
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(source)) => errors.report(&RuntimeError::Command {
                    command: label,
                    source,
                }),
                Err(err) if err.is_panic() => errors.report(&RuntimeError::CommandPanicked {
                    command: label,
                    reason: panic_reason(err.into_panic()),
                }),
                Err(_) => tracing::debug!(command = %label, "Command cancelled"),
            }
        });
    }

    /// Removes first, then adds. Each added subscription gets a guarded
    /// dispatcher that is revoked before the manager's `remove` runs.
    fn sync_subscriptions(&mut self) {
        let next = A::subscriptions(&self.state);
        let diff = diff_subscriptions(&self.active.current(), &next);
        if diff.is_empty() {
            return;
        }

        for subscription in diff.removed {
            self.active.revoke(&subscription);
            tracing::debug!(?subscription, "Removing subscription");
            if let Err(source) = self.subscriptions.remove(&subscription) {
                self.errors.report(&RuntimeError::SubscriptionRemove {
                    subscription: format!("{:?}", subscription),
                    source,
                });
            }
        }

        for subscription in diff.added {
            let guard = DispatchGuard::new();
            let dispatcher = self.dispatcher.guarded(&guard);
            tracing::debug!(?subscription, "Adding subscription");
            if let Err(source) = self.subscriptions.add(subscription.clone(), dispatcher) {
                self.errors.report(&RuntimeError::SubscriptionAdd {
                    subscription: format!("{:?}", subscription),
                    source,
                });
            }
            // Tracked even on failure: it is not retried while the state
            // keeps asking for it.
            self.active.insert(subscription, guard);
        }
    }

    fn release_subscriptions(&mut self) {
        for subscription in self.active.current() {
            self.active.revoke(&subscription);
            if let Err(source) = self.subscriptions.remove(&subscription) {
                self.errors.report(&RuntimeError::SubscriptionRemove {
                    subscription: format!("{:?}", subscription),
                    source,
                });
            }
        }
    }

    fn drop_queued(&mut self) -> usize {
        self.receiver.close();
        let mut dropped = 0;
        while self.receiver.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    fn render(&mut self) {
        let view = A::view(&self.state);
        self.stats.renders += 1;
        match self.renderer.render(view) {
            Ok(applied) => tracing::trace!(applied, "Render cycle"),
            Err(err) => self.errors.report(&err),
        }
    }
}

fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    if let Some(reason) = payload.downcast_ref::<&str>() {
        reason.to_string()
    } else if let Some(reason) = payload.downcast_ref::<String>() {
        reason.clone()
    } else {
        "unknown panic".to_string()
    }
}
