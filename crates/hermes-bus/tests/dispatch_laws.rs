//! Dispatch law integration tests.
//!
//! Each test pins down one observable rule of the dispatcher:
//!
//! - behavior ordering (first registered is outermost)
//! - zero behaviors
//! - absent requests fail before any registry lookup
//! - static and dynamic dispatch are equivalent
//! - ambiguous registrations fail every dispatch
//! - short-circuiting behaviors
//! - error propagation and re-runnable continuations
//! - binding mismatches on the dynamic path

use hermes_bus::Dispatcher;
use hermes_core::fixtures::{
    CountingPingHandler, Echo, EchoHandler, EventLog, FlakyPingHandler, Ping, PingHandler,
    RetryBehavior, ShortCircuitBehavior, SpyBehavior,
};
use hermes_core::{
    BehaviorBinding, CancellationToken, Container, DispatchKey, DynRequest, HandlerBinding,
    HermesError, HermesResult, Registry,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Registry wrapper counting every lookup.
struct CountingRegistry {
    inner: Container,
    lookups: Arc<AtomicUsize>,
}

impl Registry for CountingRegistry {
    fn resolve_handler(&self, key: &DispatchKey) -> HermesResult<HandlerBinding> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_handler(key)
    }

    fn resolve_behaviors(&self, key: &DispatchKey) -> HermesResult<Vec<BehaviorBinding>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve_behaviors(key)
    }
}

/// Registry answering every key with bindings created for `Echo`.
struct MisbindingRegistry {
    log: EventLog,
}

impl Registry for MisbindingRegistry {
    fn resolve_handler(&self, _key: &DispatchKey) -> HermesResult<HandlerBinding> {
        Ok(HandlerBinding::new::<Echo, _>(EchoHandler))
    }

    fn resolve_behaviors(&self, _key: &DispatchKey) -> HermesResult<Vec<BehaviorBinding>> {
        Ok(vec![BehaviorBinding::new::<Echo, _>(SpyBehavior::new(
            "A",
            self.log.clone(),
        ))])
    }
}

fn ping_container(log: &EventLog, behaviors: &[&'static str]) -> Container {
    let mut container = Container::new();
    container.register_handler::<Ping, _>(PingHandler);
    for &name in behaviors {
        container.register_behavior::<Ping, _>(SpyBehavior::new(name, log.clone()));
    }
    container
}

fn dyn_ping(message: &str) -> Box<dyn DynRequest<String>> {
    Box::new(Ping::new(message))
}

#[tokio::test]
async fn test_ordering_law() {
    let log = EventLog::new();
    let dispatcher = Dispatcher::new(ping_container(&log, &["A", "B"]));

    let result = dispatcher
        .execute(Ping::new("order"), &CancellationToken::new())
        .await;

    assert_eq!(result.unwrap(), "pong:order");
    assert_eq!(log.events(), vec!["A:before", "B:before", "B:after", "A:after"]);
}

#[tokio::test]
async fn test_zero_behaviors() {
    let log = EventLog::new();
    let dispatcher = Dispatcher::new(ping_container(&log, &[]));
    let cancel = CancellationToken::new();

    assert_eq!(dispatcher.execute(Ping::new("hi"), &cancel).await.unwrap(), "pong:hi");
    assert_eq!(dispatcher.execute_dyn(dyn_ping("hi"), &cancel).await.unwrap(), "pong:hi");
    assert!(log.events().is_empty());
}

#[tokio::test]
async fn test_null_request_fails_before_lookup() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let dispatcher = Dispatcher::new(CountingRegistry {
        inner: ping_container(&EventLog::new(), &["A"]),
        lookups: Arc::clone(&lookups),
    });
    let cancel = CancellationToken::new();

    let err = dispatcher
        .execute_optional::<Ping>(None, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, HermesError::NullRequest { .. }));

    let err = dispatcher
        .execute_dyn_optional::<String>(None, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, HermesError::NullRequest { .. }));
    assert_eq!(lookups.load(Ordering::SeqCst), 0);

    dispatcher.execute(Ping::new("x"), &cancel).await.unwrap();
    assert_eq!(lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_static_and_dynamic_dispatch_are_equivalent() {
    let log = EventLog::new();
    let dispatcher = Dispatcher::new(ping_container(&log, &["A", "B", "C"]));
    let cancel = CancellationToken::new();

    let static_result = dispatcher.execute(Ping::new("same"), &cancel).await.unwrap();
    let static_events = log.events();
    log.clear();

    let dynamic_result = dispatcher.execute_dyn(dyn_ping("same"), &cancel).await.unwrap();
    let dynamic_events = log.events();

    assert_eq!(static_result, dynamic_result);
    assert_eq!(static_events, dynamic_events);
    assert_eq!(
        dynamic_events,
        vec!["A:before", "B:before", "C:before", "C:after", "B:after", "A:after"]
    );
}

#[tokio::test]
async fn test_dynamic_dispatch_uses_runtime_type() {
    let mut container = Container::new();
    container
        .register_handler::<Ping, _>(PingHandler)
        .register_handler::<Echo, _>(EchoHandler);
    let dispatcher = Dispatcher::new(container);
    let cancel = CancellationToken::new();

    let requests: Vec<Box<dyn DynRequest<u64>>> = vec![Box::new(Echo(1)), Box::new(Echo(2))];
    let mut results = Vec::new();
    for request in requests {
        results.push(dispatcher.execute_dyn(request, &cancel).await.unwrap());
    }
    assert_eq!(results, vec![1, 2]);
}

#[tokio::test]
async fn test_ambiguous_handlers_fail_every_dispatch() {
    let mut container = Container::new();
    container
        .register_handler::<Ping, _>(PingHandler)
        .register_handler::<Ping, _>(CountingPingHandler::new());
    let dispatcher = Dispatcher::new(container);
    let cancel = CancellationToken::new();

    for _ in 0..2 {
        let err = dispatcher.execute(Ping::new("x"), &cancel).await.unwrap_err();
        assert!(matches!(err, HermesError::AmbiguousHandler { count: 2, .. }));

        let err = dispatcher.execute_dyn(dyn_ping("x"), &cancel).await.unwrap_err();
        assert!(matches!(err, HermesError::AmbiguousHandler { count: 2, .. }));
    }
}

#[tokio::test]
async fn test_short_circuit_stops_inner_layers() {
    let log = EventLog::new();
    let handler = CountingPingHandler::new();
    let mut container = Container::new();
    container
        .register_handler::<Ping, _>(handler.clone())
        .register_behavior::<Ping, _>(SpyBehavior::new("A", log.clone()))
        .register_behavior::<Ping, _>(ShortCircuitBehavior::new(
            "S",
            "from-cache".to_string(),
            log.clone(),
        ))
        .register_behavior::<Ping, _>(SpyBehavior::new("B", log.clone()));
    let dispatcher = Dispatcher::new(container);
    let cancel = CancellationToken::new();

    let result = dispatcher.execute(Ping::new("x"), &cancel).await.unwrap();
    assert_eq!(result, "from-cache");
    assert_eq!(log.events(), vec!["A:before", "S:short-circuit", "A:after"]);

    log.clear();
    let result = dispatcher.execute_dyn(dyn_ping("x"), &cancel).await.unwrap();
    assert_eq!(result, "from-cache");
    assert_eq!(log.events(), vec!["A:before", "S:short-circuit", "A:after"]);

    assert_eq!(handler.calls(), 0);
}

#[tokio::test]
async fn test_handler_errors_propagate_unchanged() {
    let log = EventLog::new();
    let mut container = Container::new();
    container
        .register_handler::<Ping, _>(FlakyPingHandler::always())
        .register_behavior::<Ping, _>(SpyBehavior::new("A", log.clone()));
    let dispatcher = Dispatcher::new(container);
    let cancel = CancellationToken::new();

    let err = dispatcher.execute(Ping::new("x"), &cancel).await.unwrap_err();
    assert!(matches!(err, HermesError::Handler { ref message, .. } if message == "boom #1"));

    let err = dispatcher.execute_dyn(dyn_ping("x"), &cancel).await.unwrap_err();
    assert!(matches!(err, HermesError::Handler { ref message, .. } if message == "boom #2"));

    assert_eq!(log.events(), vec!["A:before", "A:after", "A:before", "A:after"]);
}

#[tokio::test]
async fn test_retry_behavior_reruns_continuation() {
    let handler = FlakyPingHandler::new(2);
    let mut container = Container::new();
    container
        .register_handler::<Ping, _>(handler.clone())
        .register_behavior::<Ping, _>(RetryBehavior::new(3));
    let dispatcher = Dispatcher::new(container);

    let result = dispatcher
        .execute_dyn(dyn_ping("again"), &CancellationToken::new())
        .await;

    assert_eq!(result.unwrap(), "pong:again");
    assert_eq!(handler.calls(), 3);
}

#[tokio::test]
async fn test_misbound_registry_is_binding_mismatch() {
    let log = EventLog::new();
    let dispatcher = Dispatcher::new(MisbindingRegistry { log: log.clone() });
    let cancel = CancellationToken::new();

    let err = dispatcher.execute_dyn(dyn_ping("x"), &cancel).await.unwrap_err();
    assert!(matches!(err, HermesError::BindingMismatch { .. }));

    let err = dispatcher.execute(Ping::new("x"), &cancel).await.unwrap_err();
    assert!(matches!(err, HermesError::BindingMismatch { .. }));

    assert!(log.events().is_empty());
}

#[tokio::test]
async fn test_scoped_registry_dispatch() {
    let mut container = Container::new();
    container.register_handler_factory::<Ping, _, _>(
        hermes_core::Lifetime::Scoped,
        CountingPingHandler::new,
    );
    let container = Arc::new(container);

    let dispatcher = Dispatcher::new(container.create_scope());
    let cancel = CancellationToken::new();
    assert_eq!(dispatcher.execute(Ping::new("s"), &cancel).await.unwrap(), "pong:s");
    assert_eq!(dispatcher.execute_dyn(dyn_ping("s"), &cancel).await.unwrap(), "pong:s");
}

fn names(count: usize) -> Vec<&'static str> {
    const NAMES: [&str; 8] = ["A", "B", "C", "D", "E", "F", "G", "H"];
    NAMES[..count].to_vec()
}

proptest! {
    #[test]
    fn test_ordering_law_for_any_behavior_count(count in 0usize..=8, dynamic in any::<bool>()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let log = EventLog::new();
        let behaviors = names(count);
        let dispatcher = Dispatcher::new(ping_container(&log, &behaviors));
        let cancel = CancellationToken::new();

        let result = runtime.block_on(async {
            if dynamic {
                dispatcher.execute_dyn(dyn_ping("p"), &cancel).await
            } else {
                dispatcher.execute(Ping::new("p"), &cancel).await
            }
        });

        let mut expected: Vec<String> = behaviors.iter().map(|n| format!("{n}:before")).collect();
        expected.extend(behaviors.iter().rev().map(|n| format!("{n}:after")));

        prop_assert_eq!(result.unwrap(), "pong:p");
        prop_assert_eq!(log.events(), expected);
    }
}
