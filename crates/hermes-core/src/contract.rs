//! Request, handler, and behavior contracts.
//!
//! These traits are the typed vocabulary the composer and the dispatchers
//! operate over. They carry no dispatch logic of their own.

use crate::error::HermesResult;
use crate::next::Next;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A value representing an intent to compute an [`Output`](Request::Output).
///
/// The concrete request type is its identity: exactly one result type is
/// associated with it, known at compile time and recoverable at runtime.
///
/// # Example
///
/// ```
/// use hermes_core::Request;
///
/// struct CreateInvoice {
///     customer_id: u64,
/// }
///
/// impl Request for CreateInvoice {
///     type Output = u64;
/// }
/// ```
pub trait Request: Send + Sync + 'static {
    /// The type of the value a handler produces for this request.
    type Output: Send + 'static;
}

/// The single unit that produces a request's result.
///
/// At most one handler may be bound per (request type, result type) pair.
///
/// # Example
///
/// ```
/// use hermes_core::{BoxFuture, CancellationToken, Handler, HermesResult, Request};
///
/// struct Double(u32);
///
/// impl Request for Double {
///     type Output = u32;
/// }
///
/// struct DoubleHandler;
///
/// impl Handler<Double> for DoubleHandler {
///     fn handle<'a>(
///         &'a self,
///         request: &'a Double,
///         _cancel: &'a CancellationToken,
///     ) -> BoxFuture<'a, HermesResult<u32>> {
///         Box::pin(async move { Ok(request.0 * 2) })
///     }
/// }
/// ```
pub trait Handler<Req: Request>: Send + Sync + 'static {
    /// Produces the result for `request`.
    ///
    /// The handler may observe `cancel` and abort early; nothing else
    /// enforces it.
    fn handle<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>>;
}

/// A cross-cutting wrapper executed around a handler.
///
/// A behavior receives the request, a [`Next`] continuation that runs the
/// rest of the pipeline, and the cancellation signal. It may call `next`
/// zero times (short-circuit), once, or several times (retry).
///
/// # Example
///
/// ```
/// use hermes_core::{Behavior, BoxFuture, CancellationToken, HermesResult, Next, Request};
///
/// struct Audit;
///
/// impl<Req: Request> Behavior<Req> for Audit {
///     fn handle<'a>(
///         &'a self,
///         _request: &'a Req,
///         next: Next<Req::Output>,
///         _cancel: &'a CancellationToken,
///     ) -> BoxFuture<'a, HermesResult<Req::Output>> {
///         Box::pin(async move {
///             // Pre-processing
///             let result = next.run().await;
///             // Post-processing
///             result
///         })
///     }
/// }
/// ```
pub trait Behavior<Req: Request>: Send + Sync + 'static {
    /// Returns the name of this behavior, used in logs and diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Runs this layer of the pipeline.
    fn handle<'a>(
        &'a self,
        request: &'a Req,
        next: Next<Req::Output>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>>;
}

/// A handler created from a closure.
///
/// The closure receives borrowed arguments and returns an owned future, so it
/// must copy out whatever it needs from the request before going async.
///
/// # Example
///
/// ```
/// use hermes_core::{FnHandler, Request};
///
/// struct Greet(String);
///
/// impl Request for Greet {
///     type Output = String;
/// }
///
/// let handler = FnHandler::new(|request: &Greet, _cancel| {
///     let name = request.0.clone();
///     async move { Ok(format!("hello, {name}")) }
/// });
/// # let _ = handler;
/// ```
pub struct FnHandler<F, Req> {
    func: F,
    _phantom: PhantomData<fn(&Req)>,
}

impl<F, Req> FnHandler<F, Req>
where
    Req: Request,
{
    /// Creates a new closure-based handler.
    pub fn new<Fut>(func: F) -> Self
    where
        F: Fn(&Req, &CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<Req::Output>> + Send + 'static,
    {
        Self {
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Req, Fut> Handler<Req> for FnHandler<F, Req>
where
    Req: Request,
    F: Fn(&Req, &CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<Req::Output>> + Send + 'static,
{
    fn handle<'a>(
        &'a self,
        request: &'a Req,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>> {
        Box::pin((self.func)(request, cancel))
    }
}

/// A behavior created from a closure.
///
/// # Example
///
/// ```
/// use hermes_core::{FnBehavior, Request};
///
/// struct Greet(String);
///
/// impl Request for Greet {
///     type Output = String;
/// }
///
/// let shout = FnBehavior::new("shout", |_request: &Greet, next, _cancel| async move {
///     next.run().await.map(|greeting| greeting.to_uppercase())
/// });
/// # let _ = shout;
/// ```
pub struct FnBehavior<F, Req> {
    name: &'static str,
    func: F,
    _phantom: PhantomData<fn(&Req)>,
}

impl<F, Req> FnBehavior<F, Req>
where
    Req: Request,
{
    /// Creates a new closure-based behavior.
    pub fn new<Fut>(name: &'static str, func: F) -> Self
    where
        F: Fn(&Req, Next<Req::Output>, &CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HermesResult<Req::Output>> + Send + 'static,
    {
        Self {
            name,
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Req, Fut> Behavior<Req> for FnBehavior<F, Req>
where
    Req: Request,
    F: Fn(&Req, Next<Req::Output>, &CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HermesResult<Req::Output>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(
        &'a self,
        request: &'a Req,
        next: Next<Req::Output>,
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, HermesResult<Req::Output>> {
        Box::pin((self.func)(request, next, cancel))
    }
}
