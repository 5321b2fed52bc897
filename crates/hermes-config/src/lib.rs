//! Typed configuration for Hermes.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! [`HermesConfig`] has two sections:
//!
//! - [`LoggingConfig`] - subscriber settings, converted with
//!   [`HermesConfig::log_config`]
//! - [`DispatchConfig`] - which stock behaviors wrap every pipeline, converted
//!   with [`DispatchConfig::stage_options`]
//!
//! # Example
//!
//! ```no_run
//! use hermes_config::ConfigLoader;
//!
//! # fn main() -> Result<(), hermes_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("hermes.toml")?
//!     .with_dotenv()?
//!     .with_env_prefix("HERMES")
//!     .load()?;
//!
//! println!("log level: {}", config.logging.level);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! span_events = false
//!
//! [dispatch]
//! tracing_enabled = true
//! slow_threshold_ms = 1000
//! metrics_enabled = true
//! cancellation_guard = true
//! ```
//!
//! # Environment Variables
//!
//! With prefix `HERMES`, every key above can be overridden as
//! `HERMES__SECTION__KEY`, e.g. `HERMES__LOGGING__LEVEL=debug`.

#![doc(html_root_url = "https://docs.rs/hermes-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::HermesConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{DispatchConfig, LogFormat, LoggingConfig};
