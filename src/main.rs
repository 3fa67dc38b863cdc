use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use tokio::signal;

use portal::changeset::{Change, ChangeSet};
use portal::effects::feed::every;
use portal::effects::FeedManager;
use portal::logging::init_tracing;
use portal::runtime;
use portal::shutdown::ShutdownPhase;
use portal::{
    AppState, Application, CommandExecutor, Dispatcher, Message, Runtime, RuntimeConfig,
    ShutdownCoordinator, ShutdownHandle, TimeLogger, Transition,
};

/// portal-counter - counts subscription ticks through the portal runtime
#[derive(Parser, Debug)]
#[command(name = "portal-counter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file (default: platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks before the counter stops
    #[arg(long, default_value_t = 5)]
    ticks: u32,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 200)]
    interval_ms: u64,

    /// Disable dispatch time logging
    #[arg(long)]
    quiet: bool,
}

portal::property_set! {
    /// Content of the counter label.
    struct CounterView / CounterTag / CounterProperty {
        count: u32 => Count,
        done: bool => Done,
    }
}

#[derive(Debug, Clone)]
struct Counter {
    count: u32,
    remaining: u32,
    interval_ms: u64,
    finished: bool,
}

impl AppState for Counter {}

#[derive(Debug)]
enum Msg {
    Tick,
    Done,
}

impl Message for Msg {}

#[derive(Debug)]
enum Cmd {
    Announce(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Sub {
    Tick { interval_ms: u64 },
}

struct Flags {
    ticks: u32,
    interval_ms: u64,
}

struct CounterApp;

impl Application for CounterApp {
    type State = Counter;
    type Message = Msg;
    type Command = Cmd;
    type Subscription = Sub;
    type View = CounterView;
    type Flags = Flags;

    fn init(flags: Flags) -> (Counter, Option<Cmd>) {
        let state = Counter {
            count: 0,
            remaining: flags.ticks,
            interval_ms: flags.interval_ms,
            finished: false,
        };
        let command = (flags.ticks == 0).then_some(Cmd::Announce(0));
        (state, command)
    }

    fn update(state: &Counter, message: Msg) -> Transition<Counter, Cmd> {
        match message {
            Msg::Tick if state.remaining == 0 => None,
            Msg::Tick => {
                let next = Counter {
                    count: state.count + 1,
                    remaining: state.remaining - 1,
                    ..state.clone()
                };
                let command = (next.remaining == 0).then_some(Cmd::Announce(next.count));
                Some((next, command))
            }
            Msg::Done => Some((
                Counter {
                    finished: true,
                    ..state.clone()
                },
                None,
            )),
        }
    }

    fn view(state: &Counter) -> CounterView {
        CounterView {
            count: Some(state.count),
            done: state.finished.then_some(true),
        }
    }

    fn subscriptions(state: &Counter) -> Vec<Sub> {
        if state.remaining > 0 {
            vec![Sub::Tick {
                interval_ms: state.interval_ms,
            }]
        } else {
            Vec::new()
        }
    }
}

struct Announcer;

#[async_trait]
impl CommandExecutor<Cmd, Msg> for Announcer {
    async fn execute(&self, command: Cmd, dispatcher: Dispatcher<Msg>) -> anyhow::Result<()> {
        match command {
            Cmd::Announce(count) => {
                tracing::info!(count, "Counter finished");
                dispatcher.dispatch(Msg::Done);
            }
        }
        Ok(())
    }
}

async fn forward_signals(shutdown: ShutdownHandle) -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
            _ = shutdown.wait() => return Ok(()),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = shutdown.wait() => return Ok(()),
        }
    }

    shutdown.signal();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RuntimeConfig::load_from(path)?,
        None => RuntimeConfig::load()?,
    };
    init_tracing(&config.logging);

    let logger = TimeLogger::from_config(&config.time_logger);
    if args.quiet {
        logger.set_enabled(false);
    }

    let coordinator = ShutdownCoordinator::new();
    let on_done = coordinator.handle();

    let counter = Runtime::<CounterApp>::builder(Flags {
        ticks: args.ticks,
        interval_ms: args.interval_ms,
    })
    .middleware(logger)
    .executor(Announcer)
    .subscriptions(FeedManager::new(|subscription: &Sub| match subscription {
        Sub::Tick { interval_ms } => every(Duration::from_millis(*interval_ms), || Msg::Tick),
    }))
    .render_target(runtime::from_fn::<CounterView, _>(
        move |changes: &ChangeSet<CounterView>| {
            for change in changes {
                tracing::info!(?change, "Render");
            }
            if let Some(Change::Set(CounterProperty::Done(true))) = changes.get(CounterTag::Done)
            {
                on_done.signal();
            }
            Ok(())
        },
    ))
    .loop_config(config.runtime.clone())
    .build();

    let signals = tokio::spawn(forward_signals(coordinator.handle()));

    let last = counter.run(coordinator.handle()).await;
    coordinator.advance(ShutdownPhase::Complete);
    signals.abort();

    println!("Final count: {}", last.count);
    Ok(())
}
