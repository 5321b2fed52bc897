//! The registry interface consumed by the dispatcher.
//!
//! How handlers are discovered, stored, and scoped is the registry's concern.
//! The dispatcher only asks two questions per dispatch, both keyed by
//! [`DispatchKey`], and never mutates the registry.

use crate::binding::{BehaviorBinding, HandlerBinding};
use crate::error::{HermesError, HermesResult};
use crate::key::DispatchKey;
use std::sync::Arc;

/// Resolves handlers and behaviors for a dispatch key.
pub trait Registry: Send + Sync {
    /// Resolves the single handler bound to `key`.
    ///
    /// # Errors
    ///
    /// - [`HermesError::HandlerNotFound`] if no handler is bound
    /// - [`HermesError::AmbiguousHandler`] if more than one handler is bound
    fn resolve_handler(&self, key: &DispatchKey) -> HermesResult<HandlerBinding>;

    /// Resolves the behaviors bound to `key`, in registration order.
    ///
    /// The first element becomes the outermost layer of the pipeline. The
    /// order must be stable across calls within the same scope.
    fn resolve_behaviors(&self, key: &DispatchKey) -> HermesResult<Vec<BehaviorBinding>>;
}

impl<R: Registry + ?Sized> Registry for Arc<R> {
    fn resolve_handler(&self, key: &DispatchKey) -> HermesResult<HandlerBinding> {
        (**self).resolve_handler(key)
    }

    fn resolve_behaviors(&self, key: &DispatchKey) -> HermesResult<Vec<BehaviorBinding>> {
        (**self).resolve_behaviors(key)
    }
}

impl<R: Registry + ?Sized> Registry for &R {
    fn resolve_handler(&self, key: &DispatchKey) -> HermesResult<HandlerBinding> {
        (**self).resolve_handler(key)
    }

    fn resolve_behaviors(&self, key: &DispatchKey) -> HermesResult<Vec<BehaviorBinding>> {
        (**self).resolve_behaviors(key)
    }
}

/// Applies the one-handler-per-key rule to a set of candidates.
///
/// Registries that collect candidates themselves use this so every registry
/// reports missing and ambiguous handlers the same way.
///
/// # Errors
///
/// Returns [`HermesError::HandlerNotFound`] for an empty slice and
/// [`HermesError::AmbiguousHandler`] for more than one candidate.
///
/// # Example
///
/// ```
/// use hermes_core::{select_single, DispatchKey, HermesError, Request};
///
/// struct Ping;
///
/// impl Request for Ping {
///     type Output = ();
/// }
///
/// let key = DispatchKey::of::<Ping>();
/// assert_eq!(select_single(&key, &[7]).unwrap(), &7);
/// assert!(matches!(
///     select_single::<i32>(&key, &[]),
///     Err(HermesError::HandlerNotFound { .. })
/// ));
/// ```
pub fn select_single<'a, T>(key: &DispatchKey, candidates: &'a [T]) -> HermesResult<&'a T> {
    match candidates {
        [] => Err(HermesError::handler_not_found(*key)),
        [only] => Ok(only),
        many => Err(HermesError::ambiguous_handler(*key, many.len())),
    }
}
