//! Shared test fixtures: a counter application and recording collaborators.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use portal::changeset::ChangeSet;
use portal::{
    AppState, Application, CommandExecutor, Dispatcher, ErrorSink, Message, RenderTarget,
    SubscriptionManager, Transition,
};

portal::property_set! {
    /// Content of the counter label.
    pub struct CounterView / CounterTag / CounterProperty {
        count: i64 => Count,
        title: String => Title,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub count: i64,
    pub ticking: bool,
    pub title: Option<String>,
}

impl AppState for Counter {}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Increment,
    Decrement,
    Noop,
    Rename(Option<String>),
    StartTicking,
    StopTicking,
    Load,
    Loaded(i64),
    FailCommand,
    PanicCommand,
    Tick,
}

impl Message for Msg {}

#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    Load,
    Fail,
    Panic,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sub {
    Tick,
}

/// Initial count and whether the tick subscription starts active.
#[derive(Debug, Clone, Default)]
pub struct CounterFlags {
    pub count: i64,
    pub ticking: bool,
    pub startup: Option<Cmd>,
}

pub struct CounterApp;

fn edit(state: &Counter, change: impl FnOnce(&mut Counter)) -> Counter {
    let mut next = state.clone();
    change(&mut next);
    next
}

impl Application for CounterApp {
    type State = Counter;
    type Message = Msg;
    type Command = Cmd;
    type Subscription = Sub;
    type View = CounterView;
    type Flags = CounterFlags;

    fn init(flags: CounterFlags) -> (Counter, Option<Cmd>) {
        let state = Counter {
            count: flags.count,
            ticking: flags.ticking,
            title: None,
        };
        (state, flags.startup)
    }

    fn update(state: &Counter, message: Msg) -> Transition<Counter, Cmd> {
        match message {
            Msg::Increment | Msg::Tick => Some((edit(state, |s| s.count += 1), None)),
            Msg::Decrement => Some((edit(state, |s| s.count -= 1), None)),
            Msg::Noop => None,
            Msg::Rename(title) => Some((edit(state, |s| s.title = title), None)),
            Msg::StartTicking => Some((edit(state, |s| s.ticking = true), None)),
            Msg::StopTicking => Some((edit(state, |s| s.ticking = false), None)),
            Msg::Load => Some((state.clone(), Some(Cmd::Load))),
            Msg::Loaded(count) => Some((edit(state, |s| s.count = count), None)),
            Msg::FailCommand => Some((state.clone(), Some(Cmd::Fail))),
            Msg::PanicCommand => Some((state.clone(), Some(Cmd::Panic))),
        }
    }

    fn view(state: &Counter) -> CounterView {
        CounterView {
            count: Some(state.count),
            title: state.title.clone(),
        }
    }

    fn subscriptions(state: &Counter) -> Vec<Sub> {
        if state.ticking {
            vec![Sub::Tick]
        } else {
            Vec::new()
        }
    }
}

/// Executor answering `Load` with `Loaded(42)`, failing `Fail` and
/// panicking on `Panic`. Records every command it receives.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    pub executed: Arc<Mutex<Vec<Cmd>>>,
}

#[async_trait]
impl CommandExecutor<Cmd, Msg> for RecordingExecutor {
    async fn execute(&self, command: Cmd, dispatcher: Dispatcher<Msg>) -> anyhow::Result<()> {
        self.executed.lock().push(command.clone());
        match command {
            Cmd::Load => {
                tokio::task::yield_now().await;
                dispatcher.dispatch(Msg::Loaded(42));
                Ok(())
            }
            Cmd::Fail => anyhow::bail!("backend unavailable"),
            Cmd::Panic => panic!("executor exploded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubEvent {
    Added(Sub),
    Removed(Sub),
}

/// Manager recording add/remove calls and keeping the dispatchers it was
/// given, so tests can post through them after removal.
#[derive(Clone, Default)]
pub struct RecordingManager {
    pub events: Arc<Mutex<Vec<SubEvent>>>,
    pub dispatchers: Arc<Mutex<Vec<(Sub, Dispatcher<Msg>)>>>,
    pub fail_add: bool,
    pub fail_remove: bool,
}

impl RecordingManager {
    pub fn failing_add() -> Self {
        Self {
            fail_add: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<SubEvent> {
        self.events.lock().clone()
    }

    pub fn dispatcher_for(&self, subscription: &Sub) -> Option<Dispatcher<Msg>> {
        self.dispatchers
            .lock()
            .iter()
            .rev()
            .find(|(sub, _)| sub == subscription)
            .map(|(_, dispatcher)| dispatcher.clone())
    }
}

impl SubscriptionManager<Sub, Msg> for RecordingManager {
    fn add(&mut self, subscription: Sub, dispatcher: Dispatcher<Msg>) -> anyhow::Result<()> {
        self.events.lock().push(SubEvent::Added(subscription.clone()));
        if self.fail_add {
            anyhow::bail!("no timer available");
        }
        self.dispatchers.lock().push((subscription, dispatcher));
        Ok(())
    }

    fn remove(&mut self, subscription: &Sub) -> anyhow::Result<()> {
        self.events
            .lock()
            .push(SubEvent::Removed(subscription.clone()));
        if self.fail_remove {
            anyhow::bail!("timer already gone");
        }
        Ok(())
    }
}

/// Render target recording every change set it receives.
#[derive(Clone, Default)]
pub struct RecordingTarget {
    pub applied: Arc<Mutex<Vec<ChangeSet<CounterView>>>>,
    pub fail: Arc<Mutex<bool>>,
}

impl RecordingTarget {
    pub fn applied(&self) -> Vec<ChangeSet<CounterView>> {
        self.applied.lock().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

impl RenderTarget<CounterView> for RecordingTarget {
    fn apply(&mut self, changes: &ChangeSet<CounterView>) -> anyhow::Result<()> {
        if *self.fail.lock() {
            anyhow::bail!("view detached");
        }
        self.applied.lock().push(changes.clone());
        Ok(())
    }
}

/// Error sink collecting the kind of every reported error.
pub fn error_log() -> (ErrorSink, Arc<Mutex<Vec<&'static str>>>) {
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let kinds = Arc::clone(&kinds);
        ErrorSink::new(move |err| kinds.lock().push(err.kind()))
    };
    (sink, kinds)
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
