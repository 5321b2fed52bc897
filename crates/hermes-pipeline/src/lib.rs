//! # Hermes Pipeline
//!
//! Behavior pipeline composition for the Hermes request dispatcher.
//!
//! Every dispatch runs its handler inside the behaviors registered for the
//! request type. The first registered behavior is the outermost layer:
//!
//! ```text
//! Request → B[0] → B[1] → ... → Handler
//!                                  ↓
//! Result  ← B[0] ← B[1] ← ... ←───┘
//! ```
//!
//! A behavior may call its continuation zero times (short-circuit), once, or
//! several times (retry). Errors raised by any layer travel outwards
//! unchanged.
//!
//! ## Example
//!
//! ```
//! use hermes_core::fixtures::{EventLog, Ping, PingHandler, SpyBehavior};
//! use hermes_core::CancellationToken;
//! use hermes_pipeline::Pipeline;
//!
//! # tokio_test::block_on(async {
//! let log = EventLog::new();
//! let pipeline = Pipeline::builder(PingHandler)
//!     .behavior(SpyBehavior::new("A", log.clone()))
//!     .behavior(SpyBehavior::new("B", log.clone()))
//!     .build();
//!
//! let pong = pipeline.run(Ping::new("order"), &CancellationToken::new()).await.unwrap();
//! assert_eq!(pong, "pong:order");
//! assert_eq!(log.events(), vec!["A:before", "B:before", "B:after", "A:after"]);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod pipeline;
pub mod stages;

pub use pipeline::{compose, BoxedBehavior, BoxedHandler, Pipeline, PipelineBuilder};
pub use stages::{
    register_standard, register_validation, CancellationBehavior, StageOptions,
    TelemetryBehavior, TracingBehavior, Validate, ValidationBehavior,
};
