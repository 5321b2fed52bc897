//! Tracing behavior.
//!
//! Opens a span per dispatch and logs its outcome. The span carries the
//! concrete request type and its result type:
//!
//! - `request` - request type name
//! - `result` - result type name
//!
//! Completion is logged at `debug`, failures and slow dispatches at `warn`.

use hermes_core::{Behavior, BoxFuture, CancellationToken, HermesResult, Next, Request};
use std::any::type_name;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Behavior that wraps each dispatch in a `tracing` span.
///
/// # Example
///
/// ```
/// use hermes_core::fixtures::{Ping, PingHandler};
/// use hermes_core::Container;
/// use hermes_pipeline::stages::TracingBehavior;
/// use std::time::Duration;
///
/// let tracing = TracingBehavior::new().slow_threshold(Duration::from_millis(250));
///
/// let mut container = Container::new();
/// container
///     .register_handler::<Ping, _>(PingHandler)
///     .register_behavior::<Ping, _>(tracing);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingBehavior {
    slow_threshold: Option<Duration>,
}

impl TracingBehavior {
    /// Creates a tracing behavior without a slow threshold.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slow_threshold: None,
        }
    }

    /// Warns when a dispatch takes longer than `threshold`.
    #[must_use]
    pub fn slow_threshold(mut self, threshold: Duration) -> Self {
        self.slow_threshold = Some(threshold);
        self
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow_threshold.is_some_and(|threshold| elapsed > threshold)
    }
}

impl<Req: Request> Behavior<Req> for TracingBehavior {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn handle<'a>(
        &'a self,
        _request: &'a Req,
        next: Next<Req::Output>,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>> {
        let span = tracing::info_span!(
            "dispatch",
            request = type_name::<Req>(),
            result = type_name::<Req::Output>(),
        );

        Box::pin(
            async move {
                tracing::debug!("dispatch started");
                let start = Instant::now();
                let result = next.run().await;
                let elapsed = start.elapsed();
                let duration_ms = elapsed.as_secs_f64() * 1000.0;

                match &result {
                    Ok(_) => tracing::debug!(duration_ms, "dispatch completed"),
                    Err(err) => tracing::warn!(
                        duration_ms,
                        category = err.category().as_str(),
                        error = %err,
                        "dispatch failed"
                    ),
                }

                if self.is_slow(elapsed) {
                    tracing::warn!(duration_ms, threshold = ?self.slow_threshold, "slow dispatch");
                }

                result
            }
            .instrument(span),
        )
    }
}
