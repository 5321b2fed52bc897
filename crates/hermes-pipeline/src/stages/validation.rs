//! Request validation behavior.
//!
//! Requests opt in by implementing [`Validate`]. An invalid request never
//! reaches inner behaviors or the handler.

use hermes_core::{Behavior, BoxFuture, CancellationToken, HermesError, HermesResult, Next, Request};

/// A request that can check its own invariants.
///
/// # Example
///
/// ```
/// use hermes_core::{HermesError, Request};
/// use hermes_pipeline::stages::Validate;
///
/// struct Transfer {
///     amount: i64,
/// }
///
/// impl Request for Transfer {
///     type Output = ();
/// }
///
/// impl Validate for Transfer {
///     fn validate(&self) -> Result<(), HermesError> {
///         if self.amount <= 0 {
///             return Err(HermesError::validation("amount must be positive"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    /// Checks the request.
    ///
    /// # Errors
    ///
    /// Returns the error to hand back to the caller, usually
    /// [`HermesError::Validation`].
    fn validate(&self) -> Result<(), HermesError>;
}

/// Behavior that rejects invalid requests before running `next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationBehavior;

impl ValidationBehavior {
    /// Creates a validation behavior.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<Req: Request + Validate> Behavior<Req> for ValidationBehavior {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn handle<'a>(
        &'a self,
        request: &'a Req,
        next: Next<Req::Output>,
        _cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>> {
        Box::pin(async move {
            if let Err(err) = request.validate() {
                tracing::debug!(
                    request = std::any::type_name::<Req>(),
                    error = %err,
                    "request rejected"
                );
                return Err(err);
            }
            next.run().await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pipeline;
    use hermes_core::FnHandler;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Transfer {
        amount: i64,
    }

    impl Request for Transfer {
        type Output = i64;
    }

    impl Validate for Transfer {
        fn validate(&self) -> Result<(), HermesError> {
            if self.amount <= 0 {
                return Err(HermesError::validation("amount must be positive"));
            }
            Ok(())
        }
    }

    fn pipeline(calls: &Arc<AtomicUsize>) -> Pipeline<Transfer> {
        let calls = Arc::clone(calls);
        Pipeline::builder(FnHandler::new(
            move |request: &Transfer, _cancel: &CancellationToken| {
                calls.fetch_add(1, Ordering::SeqCst);
                let amount = request.amount;
                async move { Ok(amount) }
            },
        ))
        .behavior(ValidationBehavior::new())
        .build()
    }

    #[tokio::test]
    async fn test_valid_request_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let result = pipeline(&calls)
            .run(Transfer { amount: 5 }, &CancellationToken::new())
            .await;

        assert_eq!(result.unwrap(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_request_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let err = pipeline(&calls)
            .run(Transfer { amount: -1 }, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, HermesError::Validation { .. }));
        assert_eq!(err.message(), "amount must be positive");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
