//! Type-erased invocation for dynamic dispatch.
//!
//! A caller holding only `Box<dyn DynRequest<R>>` knows the result type but
//! not the concrete request type. The dynamic dispatcher turns that value into
//! an [`ErasedRequest`] and runs the pipeline over the erased thunks stored in
//! each binding. Each thunk was created for exactly one concrete
//! (request, result) pair and downcasts back to it on entry; a value of any
//! other type surfaces as [`HermesError::BindingMismatch`].

use crate::contract::{Behavior, BoxFuture, Handler, Request};
use crate::error::{HermesError, HermesResult};
use crate::key::{DispatchKey, TypeToken};
use crate::next::Next;
use std::any::{type_name, Any};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A result value whose concrete type has been erased.
pub type ErasedOutput = Box<dyn Any + Send>;

/// The common supertype of every request producing `R`.
///
/// Implemented for all [`Request`] types, so any request can be boxed as
/// `Box<dyn DynRequest<R>>` and dispatched without naming its concrete type.
///
/// # Example
///
/// ```
/// use hermes_core::{DynRequest, Request, TypeToken};
///
/// struct Ping;
///
/// impl Request for Ping {
///     type Output = String;
/// }
///
/// let request: Box<dyn DynRequest<String>> = Box::new(Ping);
/// assert_eq!(request.request_type(), TypeToken::of::<Ping>());
/// ```
pub trait DynRequest<R>: Send + Sync + 'static {
    /// Returns the identity of the concrete request type.
    fn request_type(&self) -> TypeToken;

    /// Converts the request into a shared, opaque value.
    fn into_erased(self: Box<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Request> DynRequest<T::Output> for T {
    fn request_type(&self) -> TypeToken {
        TypeToken::of::<T>()
    }

    fn into_erased(self: Box<Self>) -> Arc<dyn Any + Send + Sync> {
        let erased: Box<dyn Any + Send + Sync> = self;
        Arc::from(erased)
    }
}

/// A request whose concrete type has been erased.
///
/// `ErasedRequest` is itself a [`Request`], so the ordinary composer builds
/// pipelines over it unchanged.
pub struct ErasedRequest {
    key: DispatchKey,
    value: Arc<dyn Any + Send + Sync>,
}

impl Request for ErasedRequest {
    type Output = ErasedOutput;
}

impl ErasedRequest {
    /// Wraps an opaque request value resolved under `key`.
    #[must_use]
    pub fn new(key: DispatchKey, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self { key, value }
    }

    /// Erases a typed request.
    #[must_use]
    pub fn from_typed<Req: Request>(request: Req) -> Self {
        Self::new(DispatchKey::of::<Req>(), Arc::new(request))
    }

    /// Returns the key the request was resolved under.
    #[must_use]
    pub const fn key(&self) -> DispatchKey {
        self.key
    }

    /// Borrows the request as `Req`.
    pub fn downcast_ref<Req: Request>(&self) -> HermesResult<&Req> {
        self.value
            .downcast_ref::<Req>()
            .ok_or_else(|| HermesError::binding_mismatch(self.key, type_name::<Req>(), "request"))
    }
}

impl std::fmt::Debug for ErasedRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErasedRequest")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Recovers a typed result from an erased one.
pub fn downcast_output<T: 'static>(key: DispatchKey, output: ErasedOutput) -> HermesResult<T> {
    output
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| HermesError::binding_mismatch(key, type_name::<T>(), "result"))
}

fn erase_output<T: Send + 'static>(output: T) -> ErasedOutput {
    Box::new(output)
}

/// Converts an erased continuation into a typed one.
fn typed_next<T: Send + 'static>(key: DispatchKey, next: Next<ErasedOutput>) -> Next<T> {
    Next::new(move || {
        let inner = next.run();
        Box::pin(async move { downcast_output::<T>(key, inner.await?) })
    })
}

/// Erased thunk over a typed handler.
pub(crate) struct ErasedHandler<Req: Request> {
    key: DispatchKey,
    inner: Arc<dyn Handler<Req>>,
}

impl<Req: Request> ErasedHandler<Req> {
    pub(crate) fn new(key: DispatchKey, inner: Arc<dyn Handler<Req>>) -> Self {
        Self { key, inner }
    }
}

impl<Req: Request> Handler<ErasedRequest> for ErasedHandler<Req> {
    fn handle<'a>(
        &'a self,
        request: &'a ErasedRequest,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<ErasedOutput>> {
        Box::pin(async move {
            let typed = request.value.downcast_ref::<Req>().ok_or_else(|| {
                HermesError::binding_mismatch(self.key, type_name::<Req>(), "request")
            })?;
            self.inner.handle(typed, cancel).await.map(erase_output)
        })
    }
}

/// Erased thunk over a typed behavior.
pub(crate) struct ErasedBehavior<Req: Request> {
    key: DispatchKey,
    inner: Arc<dyn Behavior<Req>>,
}

impl<Req: Request> ErasedBehavior<Req> {
    pub(crate) fn new(key: DispatchKey, inner: Arc<dyn Behavior<Req>>) -> Self {
        Self { key, inner }
    }
}

impl<Req: Request> Behavior<ErasedRequest> for ErasedBehavior<Req> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn handle<'a>(
        &'a self,
        request: &'a ErasedRequest,
        next: Next<ErasedOutput>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<ErasedOutput>> {
        Box::pin(async move {
            let typed = request.value.downcast_ref::<Req>().ok_or_else(|| {
                HermesError::binding_mismatch(self.key, type_name::<Req>(), "request")
            })?;
            let next = typed_next::<Req::Output>(self.key, next);
            self.inner.handle(typed, next, cancel).await.map(erase_output)
        })
    }
}
