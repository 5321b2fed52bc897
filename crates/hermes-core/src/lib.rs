//! # Hermes Core
//!
//! Core types and traits for the Hermes request dispatcher.
//!
//! This crate provides the vocabulary every other Hermes crate speaks:
//!
//! - [`Request`] - A value whose type fixes the type of its result
//! - [`Handler`] - The single producer of a request's result
//! - [`Behavior`] - A wrapper executed around a handler (logging, validation, ...)
//! - [`Next`] - The continuation a behavior uses to run the rest of the pipeline
//! - [`DispatchKey`] - The (request type, result type) identity used for resolution
//! - [`Registry`] - The lookup interface the dispatcher consumes
//! - [`Container`] - An in-memory registry with singleton/scoped/transient lifetimes
//! - [`HermesError`] - Standard error type
//!
//! ## Type-erased invocation
//!
//! Callers that only hold a `Box<dyn DynRequest<R>>` cannot name the concrete
//! request type. Every [`HandlerBinding`] and [`BehaviorBinding`] therefore
//! carries two views of the same instance: the typed one used by static
//! dispatch, and an erased thunk over [`ErasedRequest`] created together with
//! the binding. Both views are resolved through the same [`DispatchKey`].

#![doc(html_root_url = "https://docs.rs/hermes-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binding;
pub mod container;
mod contract;
pub mod erased;
mod error;
pub mod fixtures;
mod key;
mod next;
mod registry;

pub use binding::{BehaviorBinding, HandlerBinding};
pub use container::{Container, Lifetime, Scope};
pub use contract::{Behavior, BoxFuture, FnBehavior, FnHandler, Handler, Request};
pub use erased::{DynRequest, ErasedOutput, ErasedRequest};
pub use error::{ErrorCategory, HermesError, HermesResult};
pub use key::{DispatchKey, TypeToken};
pub use next::Next;
pub use registry::{select_single, Registry};

/// Cancellation signal threaded through every pipeline layer.
pub use tokio_util::sync::CancellationToken;
