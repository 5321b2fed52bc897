//! Configuration-driven setup.

use hermes_config::{DispatchConfig, HermesConfig};
use hermes_core::{Container, Request};
use hermes_pipeline::stages::register_standard;
use hermes_telemetry::{describe_metrics, init_logging, TelemetryError};

/// Registers the stock behaviors selected by `config` for `Req`.
///
/// Call this before registering the request's own behaviors so that the
/// stock ones stay outermost.
///
/// # Example
///
/// ```
/// use hermes::config::DispatchConfig;
/// use hermes::core::fixtures::{Ping, PingHandler};
/// use hermes::core::{Container, DispatchKey};
///
/// let mut container = Container::new();
/// container.register_handler::<Ping, _>(PingHandler);
/// hermes::register_standard_behaviors::<Ping>(&mut container, &DispatchConfig::default());
///
/// assert_eq!(container.behavior_count(&DispatchKey::of::<Ping>()), 2);
/// ```
pub fn register_standard_behaviors<Req: Request>(container: &mut Container, config: &DispatchConfig) {
    register_standard::<Req>(container, &config.stage_options());
}

/// Installs the global log subscriber and registers metric descriptions.
///
/// Metrics are only described when `config.dispatch.metrics_enabled` is set.
///
/// # Errors
///
/// Returns [`TelemetryError`] if the log filter is invalid or a global
/// subscriber is already installed.
pub fn init_telemetry(config: &HermesConfig) -> Result<(), TelemetryError> {
    init_logging(&config.log_config())?;
    if config.dispatch.metrics_enabled {
        describe_metrics();
    }
    Ok(())
}
