//! Configuration schema types.
//!
//! This module defines the structure of the configuration sections.

use hermes_pipeline::StageOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration section.
///
/// # Example
///
/// ```
/// use hermes_config::{LogFormat, LoggingConfig};
///
/// let config = LoggingConfig::default();
/// assert_eq!(config.level, "info");
/// assert_eq!(config.format, LogFormat::Json);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info" or "hermes_pipeline=debug,warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Log span open and close events.
    #[serde(default)]
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            span_events: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Dispatch configuration section.
///
/// Selects the stock behaviors installed in front of user behaviors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DispatchConfig {
    /// Install the tracing behavior (one span per dispatch).
    #[serde(default = "default_true")]
    pub tracing_enabled: bool,

    /// Warn about dispatches slower than this many milliseconds.
    #[serde(default)]
    pub slow_threshold_ms: Option<u64>,

    /// Install the telemetry behavior (dispatch counters and histograms).
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Install the cancellation behavior.
    #[serde(default = "default_true")]
    pub cancellation_guard: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tracing_enabled: true,
            slow_threshold_ms: None,
            metrics_enabled: false,
            cancellation_guard: true,
        }
    }
}

impl DispatchConfig {
    /// Converts this section into pipeline [`StageOptions`].
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_config::DispatchConfig;
    /// use std::time::Duration;
    ///
    /// let config = DispatchConfig {
    ///     slow_threshold_ms: Some(250),
    ///     ..Default::default()
    /// };
    /// let options = config.stage_options();
    /// assert_eq!(options.slow_threshold, Some(Duration::from_millis(250)));
    /// ```
    #[must_use]
    pub fn stage_options(&self) -> StageOptions {
        StageOptions {
            tracing: self.tracing_enabled,
            slow_threshold: self.slow_threshold_ms.map(Duration::from_millis),
            metrics: self.metrics_enabled,
            cancellation_guard: self.cancellation_guard,
        }
    }
}

fn default_true() -> bool {
    true
}
