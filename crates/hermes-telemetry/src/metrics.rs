//! Dispatch metrics.
//!
//! Metrics are recorded through the `metrics` facade. Hermes installs no
//! recorder or exporter of its own; without a recorder every call is a no-op.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `hermes_dispatch_total` | Counter | `request`, `outcome` | Completed dispatches |
//! | `hermes_dispatch_duration_seconds` | Histogram | `request` | Dispatch latency |
//! | `hermes_dispatch_in_flight` | Gauge | - | Dispatches currently running |

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::fmt;
use std::time::Duration;

/// Counter of completed dispatches.
pub const DISPATCH_TOTAL: &str = "hermes_dispatch_total";

/// Histogram of dispatch latency in seconds.
pub const DISPATCH_DURATION_SECONDS: &str = "hermes_dispatch_duration_seconds";

/// Gauge of dispatches currently running.
pub const DISPATCH_IN_FLIGHT: &str = "hermes_dispatch_in_flight";

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchOutcome {
    /// The pipeline produced a value.
    Success,
    /// The pipeline failed; carries the error category label.
    Failure(&'static str),
}

impl DispatchOutcome {
    /// Returns the `outcome` label value.
    #[must_use]
    pub const fn as_label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure(category) => category,
        }
    }

    /// Returns `true` for [`DispatchOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Registers descriptions for the standard metrics.
///
/// Call once after installing a recorder.
pub fn describe_metrics() {
    describe_counter!(DISPATCH_TOTAL, "Total number of completed dispatches");
    describe_histogram!(
        DISPATCH_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Dispatch duration in seconds"
    );
    describe_gauge!(DISPATCH_IN_FLIGHT, "Number of dispatches currently running");
}

/// Records a completed dispatch.
///
/// Updates:
/// - `hermes_dispatch_total` (incremented)
/// - `hermes_dispatch_duration_seconds` (histogram observation)
pub fn record_dispatch(request: &str, outcome: DispatchOutcome, duration: Duration) {
    counter!(
        DISPATCH_TOTAL,
        "request" => request.to_string(),
        "outcome" => outcome.as_label()
    )
    .increment(1);

    histogram!(DISPATCH_DURATION_SECONDS, "request" => request.to_string())
        .record(duration.as_secs_f64());
}

/// Guard that decrements the in-flight gauge on drop.
///
/// The gauge is decremented even if the guarded future is dropped early.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Creates a new guard and increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(DISPATCH_IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(DISPATCH_IN_FLIGHT).decrement(1.0);
    }
}
