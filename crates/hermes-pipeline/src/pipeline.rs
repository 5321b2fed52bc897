//! Pipeline composition.
//!
//! A pipeline is built fresh for every dispatch from one handler and an
//! ordered list of behaviors. Behaviors are folded from last to first around
//! the handler, so the first behavior in the list becomes the outermost layer:
//!
//! ```text
//! caller → B[0] → B[1] → ... → B[n-1] → handler
//!                                          ↓
//! caller ← B[0] ← B[1] ← ... ← B[n-1] ←───┘
//! ```
//!
//! Composition holds no shared mutable state and never touches the errors
//! flowing through it.

use hermes_core::{
    Behavior, BehaviorBinding, CancellationToken, ErasedRequest, Handler, HandlerBinding,
    HermesResult, Next, Request,
};
use std::fmt;
use std::sync::Arc;

/// A shared behavior.
pub type BoxedBehavior<Req> = Arc<dyn Behavior<Req>>;

/// A shared handler.
pub type BoxedHandler<Req> = Arc<dyn Handler<Req>>;

/// Builds the continuation chain for one dispatch.
///
/// Runs the returned [`Next`] to execute the pipeline. Nothing executes until
/// then.
///
/// # Example
///
/// ```
/// use hermes_core::fixtures::{EventLog, Ping, PingHandler, SpyBehavior};
/// use hermes_core::{Behavior, CancellationToken, Handler};
/// use hermes_pipeline::compose;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let log = EventLog::new();
/// let behaviors: Vec<Arc<dyn Behavior<Ping>>> = vec![
///     Arc::new(SpyBehavior::new("A", log.clone())),
///     Arc::new(SpyBehavior::new("B", log.clone())),
/// ];
/// let handler: Arc<dyn Handler<Ping>> = Arc::new(PingHandler);
///
/// let next = compose(handler, &behaviors, Arc::new(Ping::new("order")), CancellationToken::new());
/// assert_eq!(next.run().await.unwrap(), "pong:order");
/// assert_eq!(log.events(), vec!["A:before", "B:before", "B:after", "A:after"]);
/// # });
/// ```
pub fn compose<Req: Request>(
    handler: BoxedHandler<Req>,
    behaviors: &[BoxedBehavior<Req>],
    request: Arc<Req>,
    cancel: CancellationToken,
) -> Next<Req::Output> {
    let terminal = {
        let request = Arc::clone(&request);
        let cancel = cancel.clone();
        Next::new(move || {
            let handler = Arc::clone(&handler);
            let request = Arc::clone(&request);
            let cancel = cancel.clone();
            Box::pin(async move { handler.handle(&request, &cancel).await })
        })
    };

    behaviors.iter().rev().fold(terminal, |next, behavior| {
        let behavior = Arc::clone(behavior);
        let request = Arc::clone(&request);
        let cancel = cancel.clone();
        Next::new(move || {
            let behavior = Arc::clone(&behavior);
            let request = Arc::clone(&request);
            let cancel = cancel.clone();
            let next = next.clone();
            Box::pin(async move { behavior.handle(&request, next, &cancel).await })
        })
    })
}

/// One handler with its ordered behaviors.
///
/// # Example
///
/// ```
/// use hermes_core::fixtures::{EventLog, Ping, PingHandler, SpyBehavior};
/// use hermes_core::CancellationToken;
/// use hermes_pipeline::Pipeline;
///
/// # tokio_test::block_on(async {
/// let log = EventLog::new();
/// let pipeline = Pipeline::builder(PingHandler)
///     .behavior(SpyBehavior::new("audit", log.clone()))
///     .build();
///
/// assert_eq!(pipeline.stage_names(), vec!["audit"]);
/// let pong = pipeline.run(Ping::new("hi"), &CancellationToken::new()).await.unwrap();
/// assert_eq!(pong, "pong:hi");
/// # });
/// ```
pub struct Pipeline<Req: Request> {
    handler: BoxedHandler<Req>,
    behaviors: Vec<BoxedBehavior<Req>>,
}

impl<Req: Request> Pipeline<Req> {
    /// Creates a pipeline from shared instances.
    #[must_use]
    pub fn new(handler: BoxedHandler<Req>, behaviors: Vec<BoxedBehavior<Req>>) -> Self {
        Self { handler, behaviors }
    }

    /// Creates a new pipeline builder around `handler`.
    pub fn builder<H: Handler<Req>>(handler: H) -> PipelineBuilder<Req> {
        PipelineBuilder {
            handler: Arc::new(handler),
            behaviors: Vec::new(),
        }
    }

    /// Creates a pipeline from the typed views of resolved bindings.
    ///
    /// # Errors
    ///
    /// Returns [`HermesError::BindingMismatch`](hermes_core::HermesError::BindingMismatch)
    /// if any binding was created for a request type other than `Req`.
    pub fn from_bindings(
        handler: &HandlerBinding,
        behaviors: &[BehaviorBinding],
    ) -> HermesResult<Self> {
        let handler = handler.typed::<Req>()?;
        let behaviors = behaviors
            .iter()
            .map(BehaviorBinding::typed::<Req>)
            .collect::<HermesResult<Vec<_>>>()?;
        Ok(Self::new(handler, behaviors))
    }

    /// Returns the behavior names, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.behaviors.iter().map(|b| b.name()).collect()
    }

    /// Returns the number of behaviors.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Builds the continuation chain for `request` without running it.
    pub fn chain(&self, request: Arc<Req>, cancel: CancellationToken) -> Next<Req::Output> {
        compose(Arc::clone(&self.handler), &self.behaviors, request, cancel)
    }

    /// Runs `request` through the pipeline.
    pub async fn run(&self, request: Req, cancel: &CancellationToken) -> HermesResult<Req::Output> {
        self.chain(Arc::new(request), cancel.clone()).run().await
    }
}

impl Pipeline<ErasedRequest> {
    /// Creates a pipeline from the erased thunks of resolved bindings.
    #[must_use]
    pub fn erased(handler: &HandlerBinding, behaviors: &[BehaviorBinding]) -> Self {
        Self::new(
            handler.erased(),
            behaviors.iter().map(BehaviorBinding::erased).collect(),
        )
    }
}

impl<Req: Request> fmt::Debug for Pipeline<Req> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("request", &std::any::type_name::<Req>())
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder<Req: Request> {
    handler: BoxedHandler<Req>,
    behaviors: Vec<BoxedBehavior<Req>>,
}

impl<Req: Request> PipelineBuilder<Req> {
    /// Appends a behavior. Behaviors added first run outermost.
    #[must_use]
    pub fn behavior<B: Behavior<Req>>(mut self, behavior: B) -> Self {
        self.behaviors.push(Arc::new(behavior));
        self
    }

    /// Appends a shared behavior.
    #[must_use]
    pub fn shared_behavior(mut self, behavior: BoxedBehavior<Req>) -> Self {
        self.behaviors.push(behavior);
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline<Req> {
        Pipeline::new(self.handler, self.behaviors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::erased::downcast_output;
    use hermes_core::fixtures::{
        CountingPingHandler, EventLog, FlakyPingHandler, Ping, PingHandler, RetryBehavior,
        ShortCircuitBehavior, SpyBehavior,
    };
    use hermes_core::{DispatchKey, FnBehavior, HermesError};

    fn spies(log: &EventLog, names: &[&'static str]) -> Vec<BoxedBehavior<Ping>> {
        names
            .iter()
            .map(|&name| Arc::new(SpyBehavior::new(name, log.clone())) as BoxedBehavior<Ping>)
            .collect()
    }

    #[tokio::test]
    async fn test_first_behavior_is_outermost() {
        let log = EventLog::new();
        let pipeline =
            Pipeline::<Ping>::new(Arc::new(PingHandler), spies(&log, &["A", "B", "C"]));

        let result = pipeline
            .run(Ping::new("order"), &CancellationToken::new())
            .await;

        assert_eq!(result.unwrap(), "pong:order");
        assert_eq!(
            log.events(),
            vec!["A:before", "B:before", "C:before", "C:after", "B:after", "A:after"]
        );
    }

    #[tokio::test]
    async fn test_no_behaviors_runs_handler() {
        let pipeline = Pipeline::builder(PingHandler).build();
        assert_eq!(pipeline.stage_count(), 0);

        let result = pipeline.run(Ping::new("hi"), &CancellationToken::new()).await;
        assert_eq!(result.unwrap(), "pong:hi");
    }

    #[tokio::test]
    async fn test_chain_is_lazy() {
        let handler = CountingPingHandler::new();
        let pipeline = Pipeline::builder(handler.clone()).build();

        let next = pipeline.chain(Arc::new(Ping::new("x")), CancellationToken::new());
        assert_eq!(handler.calls(), 0);

        next.run().await.unwrap();
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn test_short_circuit_skips_inner_layers() {
        let log = EventLog::new();
        let handler = CountingPingHandler::new();
        let pipeline = Pipeline::builder(handler.clone())
            .behavior(SpyBehavior::new("A", log.clone()))
            .behavior(ShortCircuitBehavior::new("S", "cached".to_string(), log.clone()))
            .behavior(SpyBehavior::new("B", log.clone()))
            .build();

        let result = pipeline.run(Ping::new("x"), &CancellationToken::new()).await;

        assert_eq!(result.unwrap(), "cached");
        assert_eq!(log.events(), vec!["A:before", "S:short-circuit", "A:after"]);
        assert_eq!(handler.calls(), 0);
    }

    #[tokio::test]
    async fn test_handler_error_propagates_unchanged() {
        let log = EventLog::new();
        let pipeline = Pipeline::<Ping>::new(
            Arc::new(FlakyPingHandler::always()),
            spies(&log, &["A", "B"]),
        );

        let err = pipeline
            .run(Ping::new("x"), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, HermesError::Handler { ref message, .. } if message == "boom #1"));
        assert_eq!(log.events(), vec!["A:before", "B:before", "B:after", "A:after"]);
    }

    #[tokio::test]
    async fn test_retry_reruns_inner_layers() {
        let log = EventLog::new();
        let handler = FlakyPingHandler::new(2);
        let pipeline = Pipeline::builder(handler.clone())
            .behavior(RetryBehavior::new(3))
            .behavior(SpyBehavior::new("inner", log.clone()))
            .build();

        let result = pipeline.run(Ping::new("x"), &CancellationToken::new()).await;

        assert_eq!(result.unwrap(), "pong:x");
        assert_eq!(handler.calls(), 3);
        assert_eq!(log.events().len(), 6);
    }

    #[tokio::test]
    async fn test_behavior_can_transform_result() {
        let pipeline = Pipeline::builder(PingHandler)
            .behavior(FnBehavior::new(
                "upper",
                |_request: &Ping, next: Next<String>, _cancel: &CancellationToken| async move {
                    next.run().await.map(|s| s.to_uppercase())
                },
            ))
            .build();

        let result = pipeline.run(Ping::new("x"), &CancellationToken::new()).await;
        assert_eq!(result.unwrap(), "PONG:X");
    }

    #[tokio::test]
    async fn test_from_bindings_and_erased_agree() {
        let log = EventLog::new();
        let handler = HandlerBinding::new::<Ping, _>(PingHandler);
        let behaviors = vec![
            BehaviorBinding::new::<Ping, _>(SpyBehavior::new("A", log.clone())),
            BehaviorBinding::new::<Ping, _>(SpyBehavior::new("B", log.clone())),
        ];
        let cancel = CancellationToken::new();

        let typed = Pipeline::<Ping>::from_bindings(&handler, &behaviors).unwrap();
        let typed_result = typed.run(Ping::new("eq"), &cancel).await.unwrap();
        let typed_events = log.events();
        log.clear();

        let erased = Pipeline::erased(&handler, &behaviors);
        assert_eq!(erased.stage_names(), typed.stage_names());
        let output = erased
            .run(ErasedRequest::from_typed(Ping::new("eq")), &cancel)
            .await
            .unwrap();
        let erased_result = downcast_output::<String>(DispatchKey::of::<Ping>(), output).unwrap();

        assert_eq!(typed_result, erased_result);
        assert_eq!(typed_events, log.events());
    }

    #[test]
    fn test_pipeline_debug() {
        let pipeline = Pipeline::builder(PingHandler)
            .behavior(SpyBehavior::new("audit", EventLog::new()))
            .build();

        let debug = format!("{pipeline:?}");
        assert!(debug.contains("Pipeline"));
        assert!(debug.contains("audit"));
    }
}
