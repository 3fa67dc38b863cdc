mod common;

use std::sync::Arc;

use parking_lot::Mutex;

use common::*;
use portal::middleware::{from_fn, Middleware, Pipeline, TimeLogger};

type Log = Arc<Mutex<Vec<String>>>;

fn counter(count: i64) -> Counter {
    Counter {
        count,
        ticking: false,
        title: None,
    }
}

fn tracer(name: &'static str, log: &Log) -> Box<dyn Middleware<CounterApp>> {
    let log = Arc::clone(log);
    Box::new(from_fn::<CounterApp, _>(move |state, message, command, next| {
        log.lock().push(format!("{name} before ({} left)", next.remaining()));
        let result = next.run(state, message, command);
        log.lock().push(format!("{name} after"));
        result
    }))
}

#[test]
fn first_registered_wraps_outermost() {
    let log: Log = Arc::default();
    let pipeline = Pipeline::new(vec![tracer("outer", &log), tracer("inner", &log)]);

    let result = pipeline.run(&counter(0), Msg::Increment);

    assert_eq!(result, Some((counter(1), None)));
    assert_eq!(
        *log.lock(),
        vec![
            "outer before (1 left)",
            "inner before (0 left)",
            "inner after",
            "outer after",
        ]
    );
}

#[test]
fn empty_pipeline_is_the_bare_transition() {
    let pipeline = Pipeline::<CounterApp>::default();
    assert!(pipeline.is_empty());
    assert_eq!(pipeline.run(&counter(4), Msg::Decrement), Some((counter(3), None)));
    assert_eq!(pipeline.run(&counter(4), Msg::Noop), None);
}

#[test]
fn short_circuit_skips_update_and_inner_middlewares() {
    let log: Log = Arc::default();
    let gate: Box<dyn Middleware<CounterApp>> =
        Box::new(from_fn::<CounterApp, _>(|state, message, command, next| {
            if message == Msg::Increment && state.count >= 10 {
                return None;
            }
            next.run(state, message, command)
        }));
    let pipeline = Pipeline::new(vec![gate, tracer("inner", &log)]);

    assert_eq!(pipeline.run(&counter(10), Msg::Increment), None);
    assert!(log.lock().is_empty());

    assert_eq!(pipeline.run(&counter(3), Msg::Increment), Some((counter(4), None)));
    assert_eq!(log.lock().len(), 2);
}

#[test]
fn post_processing_rewrites_result() {
    let clamp: Box<dyn Middleware<CounterApp>> =
        Box::new(from_fn::<CounterApp, _>(|state, message, command, next| {
            next.run(state, message, command).map(|(mut next_state, command)| {
                next_state.count = next_state.count.max(0);
                (next_state, command)
            })
        }));
    let pipeline = Pipeline::new(vec![clamp]);

    assert_eq!(pipeline.run(&counter(0), Msg::Decrement), Some((counter(0), None)));
    assert_eq!(pipeline.len(), 1);
}

#[test]
fn command_handed_to_next_reaches_the_result() {
    let inject = || {
        Box::new(from_fn::<CounterApp, _>(|state, message, _command, next| {
            next.run(state, message, Some(Cmd::Load))
        })) as Box<dyn Middleware<CounterApp>>
    };
    let pipeline = Pipeline::new(vec![inject()]);

    // Update changes the state and issues nothing: the injected command stays.
    assert_eq!(
        pipeline.run(&counter(0), Msg::Increment),
        Some((counter(1), Some(Cmd::Load)))
    );
    // Update returns nothing: the state is kept and the command still goes out.
    assert_eq!(
        pipeline.run(&counter(5), Msg::Noop),
        Some((counter(5), Some(Cmd::Load)))
    );
    // Update issues its own command: it wins.
    assert_eq!(
        pipeline.run(&counter(5), Msg::FailCommand),
        Some((counter(5), Some(Cmd::Fail)))
    );
}

#[test]
fn disabled_time_logger_changes_nothing() {
    let lines: Log = Arc::default();
    let logger = {
        let lines = Arc::clone(&lines);
        TimeLogger::with_sink(move |line| lines.lock().push(line.to_string()))
    };
    logger.set_enabled(false);

    let logged = Pipeline::new(vec![Box::new(logger) as Box<dyn Middleware<CounterApp>>]);
    let bare = Pipeline::<CounterApp>::default();

    for message in [Msg::Increment, Msg::Noop, Msg::Load, Msg::Decrement] {
        assert_eq!(
            logged.run(&counter(2), message.clone()),
            bare.run(&counter(2), message)
        );
    }
    assert!(lines.lock().is_empty());
}

#[test]
fn enabled_time_logger_reports_each_dispatch() {
    let lines: Log = Arc::default();
    let logger = {
        let lines = Arc::clone(&lines);
        TimeLogger::with_sink(move |line| lines.lock().push(line.to_string()))
    };
    let switch = logger.switch();
    let pipeline = Pipeline::new(vec![Box::new(logger) as Box<dyn Middleware<CounterApp>>]);

    assert_eq!(pipeline.run(&counter(0), Msg::Increment), Some((counter(1), None)));
    assert_eq!(pipeline.run(&counter(0), Msg::Noop), None);

    switch.set_enabled(false);
    pipeline.run(&counter(0), Msg::Increment);

    let lines = lines.lock();
    assert_eq!(lines.len(), 2);
    for line in lines.iter() {
        assert!(line.starts_with("Dispatch time "), "unexpected line: {line}");
        assert!(line.ends_with("ms"));
    }
}
