//! Registry bindings.
//!
//! A binding holds one handler or behavior instance for one
//! (request type, result type) pair, in two views:
//!
//! - the typed view (`Arc<dyn Handler<Req>>`) used by static dispatch;
//! - the erased view (`Arc<dyn Handler<ErasedRequest>>`) used by dynamic dispatch.
//!
//! Both views share the same instance and are created together, once.

use crate::contract::{Behavior, Handler, Request};
use crate::erased::{ErasedBehavior, ErasedHandler, ErasedRequest};
use crate::error::{HermesError, HermesResult};
use crate::key::DispatchKey;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// A resolved handler instance.
#[derive(Clone)]
pub struct HandlerBinding {
    key: DispatchKey,
    typed: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn Handler<ErasedRequest>>,
}

impl HandlerBinding {
    /// Binds a handler to `DispatchKey::of::<Req>()`.
    pub fn new<Req, H>(handler: H) -> Self
    where
        Req: Request,
        H: Handler<Req>,
    {
        Self::from_arc::<Req>(Arc::new(handler))
    }

    /// Binds a shared handler instance.
    pub fn from_arc<Req: Request>(handler: Arc<dyn Handler<Req>>) -> Self {
        let key = DispatchKey::of::<Req>();
        let typed: Arc<dyn Any + Send + Sync> = Arc::new(Arc::clone(&handler));
        Self {
            key,
            typed,
            erased: Arc::new(ErasedHandler::new(key, handler)),
        }
    }

    /// Returns the key this binding was created for.
    #[must_use]
    pub const fn key(&self) -> DispatchKey {
        self.key
    }

    /// Returns the typed handler.
    ///
    /// # Errors
    ///
    /// Returns [`HermesError::BindingMismatch`] if the binding was created for
    /// a different request type.
    pub fn typed<Req: Request>(&self) -> HermesResult<Arc<dyn Handler<Req>>> {
        self.typed
            .downcast_ref::<Arc<dyn Handler<Req>>>()
            .cloned()
            .ok_or_else(|| HermesError::binding_mismatch(self.key, type_name::<Req>(), "handler"))
    }

    /// Returns the erased invocation thunk.
    #[must_use]
    pub fn erased(&self) -> Arc<dyn Handler<ErasedRequest>> {
        Arc::clone(&self.erased)
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A resolved behavior instance.
#[derive(Clone)]
pub struct BehaviorBinding {
    key: DispatchKey,
    name: &'static str,
    typed: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn Behavior<ErasedRequest>>,
}

impl BehaviorBinding {
    /// Binds a behavior to `DispatchKey::of::<Req>()`.
    pub fn new<Req, B>(behavior: B) -> Self
    where
        Req: Request,
        B: Behavior<Req>,
    {
        Self::from_arc::<Req>(Arc::new(behavior))
    }

    /// Binds a shared behavior instance.
    pub fn from_arc<Req: Request>(behavior: Arc<dyn Behavior<Req>>) -> Self {
        let key = DispatchKey::of::<Req>();
        let name = behavior.name();
        let typed: Arc<dyn Any + Send + Sync> = Arc::new(Arc::clone(&behavior));
        Self {
            key,
            name,
            typed,
            erased: Arc::new(ErasedBehavior::new(key, behavior)),
        }
    }

    /// Returns the key this binding was created for.
    #[must_use]
    pub const fn key(&self) -> DispatchKey {
        self.key
    }

    /// Returns the behavior's name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the typed behavior.
    ///
    /// # Errors
    ///
    /// Returns [`HermesError::BindingMismatch`] if the binding was created for
    /// a different request type.
    pub fn typed<Req: Request>(&self) -> HermesResult<Arc<dyn Behavior<Req>>> {
        self.typed
            .downcast_ref::<Arc<dyn Behavior<Req>>>()
            .cloned()
            .ok_or_else(|| HermesError::binding_mismatch(self.key, type_name::<Req>(), "behavior"))
    }

    /// Returns the erased invocation thunk.
    #[must_use]
    pub fn erased(&self) -> Arc<dyn Behavior<ErasedRequest>> {
        Arc::clone(&self.erased)
    }
}

impl fmt::Debug for BehaviorBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorBinding")
            .field("key", &self.key)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
