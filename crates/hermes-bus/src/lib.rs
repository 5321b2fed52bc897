//! # Hermes Bus
//!
//! Request dispatchers for Hermes.
//!
//! [`Dispatcher`] resolves exactly one handler per request type from a
//! [`Registry`](hermes_core::Registry), wraps it in the behaviors registered
//! for the same type, and runs the resulting pipeline.
//!
//! Two calling conventions are offered:
//!
//! - **Static**: [`Dispatcher::execute`] takes the concrete request type.
//! - **Dynamic**: [`Dispatcher::execute_dyn`] takes a
//!   `Box<dyn DynRequest<R>>` and discovers the concrete type at runtime.
//!
//! ## Example
//!
//! ```
//! use hermes_bus::Dispatcher;
//! use hermes_core::fixtures::{EventLog, Ping, PingHandler, SpyBehavior};
//! use hermes_core::{CancellationToken, Container};
//!
//! # tokio_test::block_on(async {
//! let log = EventLog::new();
//! let mut container = Container::new();
//! container
//!     .register_handler::<Ping, _>(PingHandler)
//!     .register_behavior::<Ping, _>(SpyBehavior::new("A", log.clone()))
//!     .register_behavior::<Ping, _>(SpyBehavior::new("B", log.clone()));
//!
//! let dispatcher = Dispatcher::new(container);
//! let pong = dispatcher
//!     .execute(Ping::new("order"), &CancellationToken::new())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(pong, "pong:order");
//! assert_eq!(log.events(), vec!["A:before", "B:before", "B:after", "A:after"]);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hermes-bus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod dispatcher;

pub use dispatcher::Dispatcher;
