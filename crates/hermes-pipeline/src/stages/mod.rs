//! Stock behaviors.
//!
//! Generic behaviors that applications register per request type like any
//! other behavior. None of them is installed implicitly.
//!
//! | Behavior | Name | Purpose |
//! |----------|------|---------|
//! | [`TracingBehavior`] | `tracing` | Span per dispatch, outcome and slow-dispatch logs |
//! | [`TelemetryBehavior`] | `telemetry` | Dispatch counters and latency histogram |
//! | [`CancellationBehavior`] | `cancellation` | Turns a cancelled token into an error |
//! | [`ValidationBehavior`] | `validation` | Rejects requests failing [`Validate`] |
//!
//! [`register_standard`] installs the first three in the order above, which
//! makes tracing the outermost layer.

pub mod cancellation;
pub mod telemetry;
pub mod tracing;
pub mod validation;

pub use cancellation::CancellationBehavior;
pub use telemetry::TelemetryBehavior;
pub use tracing::TracingBehavior;
pub use validation::{Validate, ValidationBehavior};

use hermes_core::{Container, Request};
use std::time::Duration;

/// Selects which stock behaviors [`register_standard`] installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageOptions {
    /// Install [`TracingBehavior`].
    pub tracing: bool,
    /// Slow-dispatch threshold for [`TracingBehavior`].
    pub slow_threshold: Option<Duration>,
    /// Install [`TelemetryBehavior`].
    pub metrics: bool,
    /// Install [`CancellationBehavior`].
    pub cancellation_guard: bool,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            tracing: true,
            slow_threshold: None,
            metrics: false,
            cancellation_guard: true,
        }
    }
}

impl StageOptions {
    /// Options installing nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            tracing: false,
            slow_threshold: None,
            metrics: false,
            cancellation_guard: false,
        }
    }

    /// Returns the names of the behaviors these options install, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.tracing {
            names.push("tracing");
        }
        if self.metrics {
            names.push("telemetry");
        }
        if self.cancellation_guard {
            names.push("cancellation");
        }
        names
    }
}

/// Registers the stock behaviors selected by `options` for `Req`.
///
/// Behaviors registered earlier stay outside these; behaviors registered
/// later run inside them.
///
/// # Example
///
/// ```
/// use hermes_core::fixtures::{Ping, PingHandler};
/// use hermes_core::{Container, DispatchKey};
/// use hermes_pipeline::stages::{register_standard, StageOptions};
///
/// let mut container = Container::new();
/// container.register_handler::<Ping, _>(PingHandler);
/// register_standard::<Ping>(&mut container, &StageOptions::default());
///
/// assert_eq!(container.behavior_count(&DispatchKey::of::<Ping>()), 2);
/// ```
pub fn register_standard<Req: Request>(container: &mut Container, options: &StageOptions) {
    if options.tracing {
        let mut tracing = TracingBehavior::new();
        if let Some(threshold) = options.slow_threshold {
            tracing = tracing.slow_threshold(threshold);
        }
        container.register_behavior::<Req, _>(tracing);
    }
    if options.metrics {
        container.register_behavior::<Req, _>(TelemetryBehavior::new());
    }
    if options.cancellation_guard {
        container.register_behavior::<Req, _>(CancellationBehavior::new());
    }
}

/// Registers [`ValidationBehavior`] for `Req`.
pub fn register_validation<Req: Request + Validate>(container: &mut Container) {
    container.register_behavior::<Req, _>(ValidationBehavior::new());
}
