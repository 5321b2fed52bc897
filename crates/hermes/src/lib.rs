//! # Hermes
//!
//! **In-process request dispatcher with behavior pipelines**
//!
//! Hermes routes a request value to the single handler registered for its
//! type, running it inside an ordered chain of behaviors:
//!
//! - **One handler per request type** - a missing or duplicate handler is an error
//! - **Ordered behaviors** - the first registered behavior is the outermost layer
//! - **Static and dynamic dispatch** - by concrete type, or by result type alone
//! - **Stock behaviors** - tracing, metrics, cancellation and validation
//!
//! ## Quick Start
//!
//! ```
//! use hermes::prelude::*;
//! use hermes::core::fixtures::{Ping, PingHandler};
//!
//! # tokio_test::block_on(async {
//! let config = ConfigLoader::new().with_development().load().unwrap();
//!
//! let mut container = Container::new();
//! container.register_handler::<Ping, _>(PingHandler);
//! hermes::register_standard_behaviors::<Ping>(&mut container, &config.dispatch);
//!
//! let dispatcher = Dispatcher::new(container);
//! let pong = dispatcher
//!     .execute(Ping::new("hi"), &CancellationToken::new())
//!     .await
//!     .unwrap();
//! assert_eq!(pong, "pong:hi");
//! # });
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → Tracing → Telemetry → Cancellation → user behaviors → Handler
//!                                                                    ↓
//! Result  ← Tracing ← Telemetry ← Cancellation ← user behaviors ←───┘
//! ```

#![doc(html_root_url = "https://docs.rs/hermes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod setup;

// Re-export core types
pub use hermes_core as core;

// Re-export pipeline composition and stock behaviors
pub use hermes_pipeline as pipeline;

// Re-export dispatchers
pub use hermes_bus as bus;

// Re-export logging and metrics
pub use hermes_telemetry as telemetry;

// Re-export configuration
pub use hermes_config as config;

pub use setup::{init_telemetry, register_standard_behaviors};

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```
/// use hermes::prelude::*;
/// ```
pub mod prelude {
    pub use hermes_core::{
        Behavior, BoxFuture, CancellationToken, Container, DispatchKey, DynRequest, FnBehavior,
        FnHandler, Handler, HermesError, HermesResult, Lifetime, Next, Registry, Request, Scope,
    };

    // Re-export dispatcher
    pub use hermes_bus::Dispatcher;

    // Re-export stock behaviors
    pub use hermes_pipeline::{
        CancellationBehavior, Pipeline, TelemetryBehavior, TracingBehavior, Validate,
        ValidationBehavior,
    };

    // Re-export configuration
    pub use hermes_config::{ConfigLoader, DispatchConfig, HermesConfig};
}
