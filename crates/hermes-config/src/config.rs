//! Main configuration type.
//!
//! This module provides the top-level [`HermesConfig`] struct.

use hermes_telemetry::logging::create_env_filter;
use hermes_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, DispatchConfig, LogFormat, LoggingConfig};

/// Complete Hermes configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use hermes_config::HermesConfig;
///
/// let config = HermesConfig::default();
/// assert!(config.dispatch.tracing_enabled);
/// assert_eq!(config.logging.level, "info");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HermesConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dispatch pipeline configuration.
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl HermesConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - the log level is not a valid filter directive
    /// - the slow-dispatch threshold is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        if self.dispatch.slow_threshold_ms == Some(0) {
            return Err(ConfigError::invalid_value(
                "dispatch.slow_threshold_ms",
                "must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logs with span events, and a 250ms slow-dispatch warning.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::{HermesConfig, LogFormat};
    ///
    /// let config = HermesConfig::development();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.span_events = true;

        config.dispatch.slow_threshold_ms = Some(250);

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON info logs, dispatch metrics on, and a one second slow-dispatch
    /// warning.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;

        config.dispatch.metrics_enabled = true;
        config.dispatch.slow_threshold_ms = Some(1000);

        config
    }

    /// Converts the logging section into a telemetry [`LogConfig`].
    ///
    /// Settings not exposed in the file come from the matching
    /// [`LogConfig`] preset for the chosen format.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::HermesConfig;
    ///
    /// let log = HermesConfig::development().log_config();
    /// assert!(!log.json_format);
    /// assert_eq!(log.level, "debug");
    /// ```
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let base = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };

        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            json_format: self.logging.format == LogFormat::Json,
            span_events: self.logging.span_events,
            ..base
        }
    }
}
