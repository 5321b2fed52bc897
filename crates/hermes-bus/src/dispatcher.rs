//! The dispatcher.
//!
//! [`Dispatcher`] turns a request into a result in three steps:
//!
//! 1. Reject an absent request with [`HermesError::NullRequest`], before
//!    touching the registry.
//! 2. Resolve the single handler and the ordered behaviors for the request's
//!    [`DispatchKey`].
//! 3. Compose the pipeline and run it, returning its result unchanged.
//!
//! The static entry points know the concrete request type at compile time.
//! The dynamic ones only know the result type and read the concrete type
//! from the value at runtime; they run the erased thunks stored in each
//! binding. For the same request value both produce the same result and the
//! same behavior side effects.
//!
//! The dispatcher holds no state besides the registry, caches nothing, and
//! emits no logs.

use hermes_core::erased::downcast_output;
use hermes_core::{
    CancellationToken, DispatchKey, DynRequest, ErasedRequest, HermesError, HermesResult,
    Registry, Request, TypeToken,
};
use hermes_pipeline::Pipeline;
use std::fmt;
use std::sync::Arc;

/// Dispatches requests to their handlers through the registered behaviors.
///
/// Cheap to clone; clones share the registry.
///
/// # Example
///
/// ```
/// use hermes_bus::Dispatcher;
/// use hermes_core::fixtures::{Ping, PingHandler};
/// use hermes_core::{CancellationToken, Container, DynRequest};
///
/// # tokio_test::block_on(async {
/// let mut container = Container::new();
/// container.register_handler::<Ping, _>(PingHandler);
/// let dispatcher = Dispatcher::new(container);
/// let cancel = CancellationToken::new();
///
/// let pong = dispatcher.execute(Ping::new("hi"), &cancel).await.unwrap();
/// assert_eq!(pong, "pong:hi");
///
/// let request: Box<dyn DynRequest<String>> = Box::new(Ping::new("hi"));
/// let pong = dispatcher.execute_dyn(request, &cancel).await.unwrap();
/// assert_eq!(pong, "pong:hi");
/// # });
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<dyn Registry>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    pub fn new<R: Registry + 'static>(registry: R) -> Self {
        Self::from_registry(Arc::new(registry))
    }

    /// Creates a dispatcher over a shared registry.
    #[must_use]
    pub fn from_registry(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    /// Returns the registry this dispatcher resolves from.
    #[must_use]
    pub fn registry(&self) -> &Arc<dyn Registry> {
        &self.registry
    }

    /// Dispatches a request whose concrete type is known.
    ///
    /// # Errors
    ///
    /// - [`HermesError::HandlerNotFound`] / [`HermesError::AmbiguousHandler`]
    ///   if the registry does not bind exactly one handler
    /// - [`HermesError::BindingMismatch`] if the registry returned a binding
    ///   created for another request type
    /// - any error raised by the handler or a behavior, unchanged
    pub async fn execute<Req: Request>(
        &self,
        request: Req,
        cancel: &CancellationToken,
    ) -> HermesResult<Req::Output> {
        self.execute_optional(Some(request), cancel).await
    }

    /// Dispatches a request that may be absent.
    ///
    /// # Errors
    ///
    /// Returns [`HermesError::NullRequest`] for `None` without consulting the
    /// registry; otherwise as [`Dispatcher::execute`].
    pub async fn execute_optional<Req: Request>(
        &self,
        request: Option<Req>,
        cancel: &CancellationToken,
    ) -> HermesResult<Req::Output> {
        let request = request.ok_or_else(HermesError::null_request::<Req>)?;
        let key = DispatchKey::of::<Req>();

        let handler = self.registry.resolve_handler(&key)?;
        let behaviors = self.registry.resolve_behaviors(&key)?;
        let pipeline = Pipeline::<Req>::from_bindings(&handler, &behaviors)?;

        pipeline.run(request, cancel).await
    }

    /// Dispatches a request known only through its result type.
    ///
    /// The registry is consulted with the request's runtime type, never with
    /// `dyn DynRequest<R>`.
    ///
    /// # Errors
    ///
    /// As [`Dispatcher::execute`]. A binding whose erased thunk does not
    /// match the request or result type surfaces as
    /// [`HermesError::BindingMismatch`].
    pub async fn execute_dyn<R: Send + 'static>(
        &self,
        request: Box<dyn DynRequest<R>>,
        cancel: &CancellationToken,
    ) -> HermesResult<R> {
        self.execute_dyn_optional(Some(request), cancel).await
    }

    /// Dispatches a possibly absent request known only through its result type.
    ///
    /// # Errors
    ///
    /// Returns [`HermesError::NullRequest`] for `None` without consulting the
    /// registry; otherwise as [`Dispatcher::execute_dyn`].
    pub async fn execute_dyn_optional<R: Send + 'static>(
        &self,
        request: Option<Box<dyn DynRequest<R>>>,
        cancel: &CancellationToken,
    ) -> HermesResult<R> {
        let request = request.ok_or_else(HermesError::null_request::<dyn DynRequest<R>>)?;
        let key = DispatchKey::new(request.request_type(), TypeToken::of::<R>());

        let handler = self.registry.resolve_handler(&key)?;
        let behaviors = self.registry.resolve_behaviors(&key)?;
        let pipeline = Pipeline::erased(&handler, &behaviors);

        let request = ErasedRequest::new(key, request.into_erased());
        let output = pipeline.run(request, cancel).await?;
        downcast_output::<R>(key, output)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
