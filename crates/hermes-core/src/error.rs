//! Error types for Hermes.
//!
//! This module provides the [`HermesError`] type, the single error type that
//! flows through dispatchers, pipelines, handlers, and behaviors.
//!
//! Resolution errors ([`HermesError::NullRequest`], [`HermesError::HandlerNotFound`],
//! [`HermesError::AmbiguousHandler`], [`HermesError::BindingMismatch`]) are raised
//! by the dispatcher itself. Every other variant is raised by a handler or a
//! behavior and travels back to the caller untouched.

use crate::key::DispatchKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`HermesError`].
pub type HermesResult<T> = Result<T, HermesError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The request argument was absent.
    Request,
    /// No handler, or more than one handler, is bound for the request.
    Resolution,
    /// A registry binding does not match the types it is invoked with.
    Binding,
    /// A layer observed the cancellation signal and aborted.
    Cancelled,
    /// Request validation failed.
    Validation,
    /// Failure raised by handler or behavior code.
    Handler,
}

impl ErrorCategory {
    /// Returns the label used for this category in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Resolution => "resolution",
            Self::Binding => "binding",
            Self::Cancelled => "cancelled",
            Self::Validation => "validation",
            Self::Handler => "handler",
        }
    }
}

/// Standard error type for Hermes.
///
/// # Example
///
/// ```
/// use hermes_core::{ErrorCategory, HermesError};
///
/// fn check(amount: i64) -> Result<(), HermesError> {
///     if amount < 0 {
///         return Err(HermesError::validation("amount must not be negative"));
///     }
///     Ok(())
/// }
///
/// let err = check(-1).unwrap_err();
/// assert_eq!(err.category(), ErrorCategory::Validation);
/// ```
#[derive(Error, Debug)]
pub enum HermesError {
    /// The request argument was absent.
    #[error("Null request: no {request_type} value was supplied")]
    NullRequest {
        /// Name of the request type the caller dispatched.
        request_type: &'static str,
    },

    /// No handler is bound for the key.
    #[error("Handler not found for {key}")]
    HandlerNotFound {
        /// The key that was resolved.
        key: DispatchKey,
    },

    /// More than one handler is bound for the key.
    #[error("Ambiguous handler for {key}: {count} handlers bound, expected exactly one")]
    AmbiguousHandler {
        /// The key that was resolved.
        key: DispatchKey,
        /// How many handlers are bound.
        count: usize,
    },

    /// A binding was invoked with a value of the wrong type.
    #[error("Binding mismatch for {key}: expected {expected} as {context}")]
    BindingMismatch {
        /// The key of the offending binding.
        key: DispatchKey,
        /// Name of the type the binding expected.
        expected: &'static str,
        /// What was being converted ("request", "result", "handler", "behavior").
        context: &'static str,
    },

    /// A layer observed the cancellation signal.
    #[error("Dispatch cancelled")]
    Cancelled,

    /// Request validation failed.
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// Failure raised by handler or behavior code.
    #[error("Handler error: {message}")]
    Handler {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl HermesError {
    /// Creates a null request error for the given request type.
    #[must_use]
    pub fn null_request<T: ?Sized>() -> Self {
        Self::NullRequest {
            request_type: std::any::type_name::<T>(),
        }
    }

    /// Creates a handler-not-found error.
    #[must_use]
    pub const fn handler_not_found(key: DispatchKey) -> Self {
        Self::HandlerNotFound { key }
    }

    /// Creates an ambiguous handler error.
    #[must_use]
    pub const fn ambiguous_handler(key: DispatchKey, count: usize) -> Self {
        Self::AmbiguousHandler { key, count }
    }

    /// Creates a binding mismatch error.
    #[must_use]
    pub const fn binding_mismatch(
        key: DispatchKey,
        expected: &'static str,
        context: &'static str,
    ) -> Self {
        Self::BindingMismatch {
            key,
            expected,
            context,
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a handler error.
    #[must_use]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error with a source error.
    pub fn handler_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Handler {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NullRequest { .. } => ErrorCategory::Request,
            Self::HandlerNotFound { .. } | Self::AmbiguousHandler { .. } => {
                ErrorCategory::Resolution
            }
            Self::BindingMismatch { .. } => ErrorCategory::Binding,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Handler { .. } => ErrorCategory::Handler,
        }
    }

    /// Returns `true` if the dispatcher raised this error before running
    /// any handler or behavior code.
    #[must_use]
    pub const fn is_resolution_error(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Request | ErrorCategory::Resolution | ErrorCategory::Binding
        )
    }

    /// Returns the human-readable message without the category prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message } | Self::Handler { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
