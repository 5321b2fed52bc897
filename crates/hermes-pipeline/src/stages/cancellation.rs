//! Cancellation guard behavior.
//!
//! The pipeline threads the cancellation token through every layer but never
//! acts on it. This behavior does: it refuses to start a dispatch whose token
//! is already cancelled, and abandons the inner layers as soon as the token
//! fires.

use hermes_core::{Behavior, BoxFuture, CancellationToken, HermesError, HermesResult, Next, Request};

/// Behavior that turns a cancelled token into [`HermesError::Cancelled`].
///
/// Only layers inside it are stopped. [`register_standard`](super::register_standard)
/// installs it as the innermost stock behavior, so tracing and telemetry still
/// observe a cancelled dispatch while user behaviors registered afterwards do not run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CancellationBehavior;

impl CancellationBehavior {
    /// Creates a cancellation guard.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<Req: Request> Behavior<Req> for CancellationBehavior {
    fn name(&self) -> &'static str {
        "cancellation"
    }

    fn handle<'a>(
        &'a self,
        _request: &'a Req,
        next: Next<Req::Output>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(HermesError::Cancelled);
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    tracing::debug!(request = std::any::type_name::<Req>(), "dispatch cancelled");
                    Err(HermesError::Cancelled)
                }
                result = next.run() => result,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pipeline;
    use hermes_core::fixtures::{CountingPingHandler, EventLog, Ping, SpyBehavior};
    use hermes_core::FnHandler;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let handler = CountingPingHandler::new();
        let pipeline = Pipeline::builder(handler.clone())
            .behavior(CancellationBehavior::new())
            .build();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pipeline.run(Ping::new("x"), &cancel).await;
        assert!(matches!(result, Err(HermesError::Cancelled)));
        assert_eq!(handler.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_stops_only_inner_layers() {
        let log = EventLog::new();
        let handler = CountingPingHandler::new();
        let pipeline = Pipeline::builder(handler.clone())
            .behavior(SpyBehavior::new("outer", log.clone()))
            .behavior(CancellationBehavior::new())
            .behavior(SpyBehavior::new("inner", log.clone()))
            .build();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pipeline.run(Ping::new("x"), &cancel).await;
        assert!(matches!(result, Err(HermesError::Cancelled)));
        assert_eq!(log.events(), vec!["outer:before", "outer:after"]);
        assert_eq!(handler.calls(), 0);
    }

    #[tokio::test]
    async fn test_not_cancelled_passes_through() {
        let pipeline = Pipeline::builder(CountingPingHandler::new())
            .behavior(CancellationBehavior::new())
            .build();

        let result = pipeline.run(Ping::new("x"), &CancellationToken::new()).await;
        assert_eq!(result.unwrap(), "pong:x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_while_running() {
        let pipeline = Pipeline::builder(FnHandler::new(
            |_request: &Ping, _cancel: &CancellationToken| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok("late".to_string())
            },
        ))
        .behavior(CancellationBehavior::new())
        .build();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = pipeline.run(Ping::new("x"), &cancel).await;
        assert!(matches!(result, Err(HermesError::Cancelled)));
    }
}
