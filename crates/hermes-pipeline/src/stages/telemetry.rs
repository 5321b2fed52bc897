//! Dispatch metrics behavior.
//!
//! Records one observation per dispatch through `hermes-telemetry`:
//!
//! - `hermes_dispatch_total{request, outcome}`
//! - `hermes_dispatch_duration_seconds{request}`
//! - `hermes_dispatch_in_flight`
//!
//! The `outcome` label is `success` or the error category.

use hermes_core::{Behavior, BoxFuture, CancellationToken, HermesResult, Next, Request};
use hermes_telemetry::{record_dispatch, DispatchOutcome, InFlightGuard};
use std::time::Instant;

/// Behavior that records dispatch metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryBehavior;

impl TelemetryBehavior {
    /// Creates a telemetry behavior.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Maps a dispatch result onto its metric outcome.
pub fn outcome_of<T>(result: &HermesResult<T>) -> DispatchOutcome {
    match result {
        Ok(_) => DispatchOutcome::Success,
        Err(err) => DispatchOutcome::Failure(err.category().as_str()),
    }
}

impl<Req: Request> Behavior<Req> for TelemetryBehavior {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    fn handle<'a>(
        &'a self,
        _request: &'a Req,
        next: Next<Req::Output>,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>> {
        Box::pin(async move {
            let _in_flight = InFlightGuard::new();
            let start = Instant::now();
            let result = next.run().await;
            record_dispatch(std::any::type_name::<Req>(), outcome_of(&result), start.elapsed());
            result
        })
    }
}
