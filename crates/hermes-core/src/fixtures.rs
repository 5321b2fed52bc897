//! Test fixtures for Hermes development and testing.
//!
//! This module provides small requests, handlers, and behaviors that tests
//! across the Hermes crates share.
//!
//! # Example
//!
//! ```
//! use hermes_core::fixtures::{EventLog, Ping, PingHandler, SpyBehavior};
//! use hermes_core::Container;
//!
//! let log = EventLog::new();
//! let mut container = Container::new();
//! container
//!     .register_handler::<Ping, _>(PingHandler)
//!     .register_behavior::<Ping, _>(SpyBehavior::new("A", log.clone()));
//!
//! assert!(log.events().is_empty());
//! ```

use crate::contract::{Behavior, BoxFuture, Handler, Request};
use crate::error::{HermesError, HermesResult};
use crate::next::Next;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Request answered with `"pong:<message>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ping(pub String);

impl Ping {
    /// Creates a ping carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl Request for Ping {
    type Output = String;
}

/// Handles [`Ping`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PingHandler;

impl Handler<Ping> for PingHandler {
    fn handle<'a>(
        &'a self,
        request: &'a Ping,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<String>> {
        Box::pin(async move { Ok(format!("pong:{}", request.0)) })
    }
}

/// Request answered with its own value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Echo(pub u64);

impl Request for Echo {
    type Output = u64;
}

/// Handles [`Echo`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoHandler;

impl Handler<Echo> for EchoHandler {
    fn handle<'a>(
        &'a self,
        request: &'a Echo,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<u64>> {
        Box::pin(async move { Ok(request.0) })
    }
}

/// Handles [`Ping`] and counts its invocations.
#[derive(Debug, Clone, Default)]
pub struct CountingPingHandler {
    calls: Arc<AtomicUsize>,
}

impl CountingPingHandler {
    /// Creates a handler with a zeroed counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many times the handler ran, across all clones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler<Ping> for CountingPingHandler {
    fn handle<'a>(
        &'a self,
        request: &'a Ping,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<String>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("pong:{}", request.0))
        })
    }
}

/// Handles [`Ping`] by failing with a handler error.
///
/// Fails the first `failures` calls and succeeds afterwards.
#[derive(Debug, Clone)]
pub struct FlakyPingHandler {
    failures: usize,
    calls: Arc<AtomicUsize>,
}

impl FlakyPingHandler {
    /// Creates a handler that fails `failures` times before succeeding.
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a handler that never succeeds.
    #[must_use]
    pub fn always() -> Self {
        Self::new(usize::MAX)
    }

    /// Returns how many times the handler ran, across all clones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler<Ping> for FlakyPingHandler {
    fn handle<'a>(
        &'a self,
        request: &'a Ping,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<String>> {
        Box::pin(async move {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(HermesError::handler(format!("boom #{}", call + 1)));
            }
            Ok(format!("pong:{}", request.0))
        })
    }
}

/// Shared, ordered record of pipeline events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn push(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Removes all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// Behavior recording `"<name>:before"` and `"<name>:after"` around `next`.
///
/// Works for every request type.
#[derive(Debug, Clone)]
pub struct SpyBehavior {
    name: &'static str,
    log: EventLog,
}

impl SpyBehavior {
    /// Creates a spy writing to `log`.
    #[must_use]
    pub const fn new(name: &'static str, log: EventLog) -> Self {
        Self { name, log }
    }
}

impl<Req: Request> Behavior<Req> for SpyBehavior {
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        _request: &'a Req,
        next: Next<Req::Output>,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>> {
        Box::pin(async move {
            self.log.push(format!("{}:before", self.name));
            let result = next.run().await;
            self.log.push(format!("{}:after", self.name));
            result
        })
    }
}

/// Behavior that never calls `next` and returns a fixed value.
///
/// Records `"<name>:short-circuit"` when it runs.
#[derive(Debug, Clone)]
pub struct ShortCircuitBehavior<T> {
    name: &'static str,
    value: T,
    log: EventLog,
}

impl<T> ShortCircuitBehavior<T> {
    /// Creates a behavior answering `value`.
    #[must_use]
    pub const fn new(name: &'static str, value: T, log: EventLog) -> Self {
        Self { name, value, log }
    }
}

impl<Req, T> Behavior<Req> for ShortCircuitBehavior<T>
where
    Req: Request<Output = T>,
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        _request: &'a Req,
        _next: Next<T>,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<T>> {
        Box::pin(async move {
            self.log.push(format!("{}:short-circuit", self.name));
            Ok(self.value.clone())
        })
    }
}

/// Behavior that retries `next` until it succeeds or `attempts` runs are used.
#[derive(Debug, Clone, Copy)]
pub struct RetryBehavior {
    attempts: usize,
}

impl RetryBehavior {
    /// Creates a behavior running `next` at most `attempts` times.
    #[must_use]
    pub const fn new(attempts: usize) -> Self {
        Self { attempts }
    }
}

impl<Req: Request> Behavior<Req> for RetryBehavior {
    fn name(&self) -> &'static str {
        "retry"
    }

    fn handle<'a>(
        &'a self,
        _request: &'a Req,
        next: Next<Req::Output>,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>> {
        Box::pin(async move {
            let mut attempt = 1;
            loop {
                match next.run().await {
                    Err(err) if attempt < self.attempts => {
                        tracing::debug!(attempt, error = %err, "retrying");
                        attempt += 1;
                    }
                    result => return result,
                }
            }
        })
    }
}
