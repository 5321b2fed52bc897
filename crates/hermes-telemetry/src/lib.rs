//! Observability for Hermes.
//!
//! This crate provides the logging and metrics plumbing shared by the Hermes
//! crates:
//!
//! - **Logging**: `tracing-subscriber` setup with JSON or pretty output
//! - **Metrics**: dispatch counters and latency histograms via the `metrics` crate
//!
//! The dispatcher core emits nothing itself. Logs come from registration and
//! from the stock behaviors in `hermes-pipeline`; metrics come from its
//! telemetry behavior.
//!
//! # Example
//!
//! ```rust,ignore
//! use hermes_telemetry::{init_logging, metrics, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! metrics::describe_metrics();
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{fields, init_logging, LogConfig};
pub use metrics::{describe_metrics, record_dispatch, DispatchOutcome, InFlightGuard};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
