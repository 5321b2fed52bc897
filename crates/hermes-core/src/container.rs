//! In-memory registry with service lifetimes.
//!
//! [`Container`] stores handler and behavior registrations keyed by
//! [`DispatchKey`]. Registrations are made at application startup; the
//! container is then shared (usually behind an `Arc`) and resolved from by
//! the dispatcher, either directly (the root scope) or through a [`Scope`].
//!
//! # Example
//!
//! ```rust
//! use hermes_core::fixtures::{Ping, PingHandler};
//! use hermes_core::{Container, DispatchKey, Lifetime, Registry};
//! use std::sync::Arc;
//!
//! let mut container = Container::new();
//! container.register_handler::<Ping, _>(PingHandler);
//!
//! let container = Arc::new(container);
//! let scope = container.create_scope();
//!
//! assert!(scope.resolve_handler(&DispatchKey::of::<Ping>()).is_ok());
//! ```

use crate::binding::{BehaviorBinding, HandlerBinding};
use crate::contract::{Behavior, Handler, Request};
use crate::error::HermesResult;
use crate::key::DispatchKey;
use crate::registry::{select_single, Registry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How long a factory-produced instance lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// One instance for the whole container.
    #[default]
    Singleton,
    /// One instance per [`Scope`]; the container itself is the root scope.
    Scoped,
    /// A new instance on every resolution.
    Transient,
}

type Factory<B> = Arc<dyn Fn() -> B + Send + Sync>;

enum Provider<B> {
    Instance(B),
    Factory { lifetime: Lifetime, factory: Factory<B> },
}

struct Registration<B> {
    id: usize,
    provider: Provider<B>,
}

impl<B> Registration<B> {
    fn lifetime(&self) -> Lifetime {
        match &self.provider {
            Provider::Instance(_) => Lifetime::Singleton,
            Provider::Factory { lifetime, .. } => *lifetime,
        }
    }
}

/// Per-scope instance cache, keyed by registration id.
#[derive(Default)]
struct ScopeCache {
    handlers: Mutex<HashMap<usize, HandlerBinding>>,
    behaviors: Mutex<HashMap<usize, BehaviorBinding>>,
}

/// Produces the instance for a registration, honouring its lifetime.
fn provide<B: Clone>(
    registration: &Registration<B>,
    singletons: &Mutex<HashMap<usize, B>>,
    scoped: &Mutex<HashMap<usize, B>>,
) -> B {
    match &registration.provider {
        Provider::Instance(binding) => binding.clone(),
        Provider::Factory { lifetime, factory } => {
            let cache = match lifetime {
                Lifetime::Transient => return factory(),
                Lifetime::Singleton => singletons,
                Lifetime::Scoped => scoped,
            };
            cache
                .lock()
                .entry(registration.id)
                .or_insert_with(|| factory())
                .clone()
        }
    }
}

/// An in-memory [`Registry`].
///
/// Handlers and behaviors are registered per request type. Behaviors keep
/// their registration order; the first one registered is the outermost layer.
/// Registering a second handler for the same request type is accepted, and
/// makes every dispatch of that type fail with
/// [`HermesError::AmbiguousHandler`](crate::HermesError::AmbiguousHandler).
///
/// # Thread Safety
///
/// The container is `Send + Sync`. Resolution takes `&self`; instance caches
/// for singleton and scoped factories are guarded by mutexes.
#[derive(Default)]
pub struct Container {
    handlers: HashMap<DispatchKey, Vec<Registration<HandlerBinding>>>,
    behaviors: HashMap<DispatchKey, Vec<Registration<BehaviorBinding>>>,
    next_id: usize,
    root: ScopeCache,
}

impl Container {
    /// Creates a new empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn push_handler(&mut self, key: DispatchKey, provider: Provider<HandlerBinding>) {
        let id = self.next_id();
        let registration = Registration { id, provider };
        tracing::debug!(
            request = key.request().name(),
            result = key.result().name(),
            lifetime = ?registration.lifetime(),
            "registered handler"
        );
        self.handlers.entry(key).or_default().push(registration);
    }

    fn push_behavior(&mut self, key: DispatchKey, provider: Provider<BehaviorBinding>) {
        let id = self.next_id();
        let registration = Registration { id, provider };
        let entries = self.behaviors.entry(key).or_default();
        tracing::debug!(
            request = key.request().name(),
            result = key.result().name(),
            lifetime = ?registration.lifetime(),
            position = entries.len(),
            "registered behavior"
        );
        entries.push(registration);
    }

    /// Registers a handler instance shared by every dispatch.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hermes_core::fixtures::{Ping, PingHandler};
    /// use hermes_core::Container;
    ///
    /// let mut container = Container::new();
    /// container.register_handler::<Ping, _>(PingHandler);
    /// assert!(container.contains_handler::<Ping>());
    /// ```
    pub fn register_handler<Req, H>(&mut self, handler: H) -> &mut Self
    where
        Req: Request,
        H: Handler<Req>,
    {
        let key = DispatchKey::of::<Req>();
        self.push_handler(key, Provider::Instance(HandlerBinding::new::<Req, H>(handler)));
        self
    }

    /// Registers a handler produced by `factory` with the given lifetime.
    pub fn register_handler_factory<Req, H, F>(&mut self, lifetime: Lifetime, factory: F) -> &mut Self
    where
        Req: Request,
        H: Handler<Req>,
        F: Fn() -> H + Send + Sync + 'static,
    {
        let key = DispatchKey::of::<Req>();
        let factory: Factory<HandlerBinding> =
            Arc::new(move || HandlerBinding::new::<Req, H>(factory()));
        self.push_handler(key, Provider::Factory { lifetime, factory });
        self
    }

    /// Registers a behavior instance shared by every dispatch.
    ///
    /// Behaviors for the same request type run in registration order,
    /// first registered outermost.
    pub fn register_behavior<Req, B>(&mut self, behavior: B) -> &mut Self
    where
        Req: Request,
        B: Behavior<Req>,
    {
        let key = DispatchKey::of::<Req>();
        self.push_behavior(key, Provider::Instance(BehaviorBinding::new::<Req, B>(behavior)));
        self
    }

    /// Registers a behavior produced by `factory` with the given lifetime.
    pub fn register_behavior_factory<Req, B, F>(
        &mut self,
        lifetime: Lifetime,
        factory: F,
    ) -> &mut Self
    where
        Req: Request,
        B: Behavior<Req>,
        F: Fn() -> B + Send + Sync + 'static,
    {
        let key = DispatchKey::of::<Req>();
        let factory: Factory<BehaviorBinding> =
            Arc::new(move || BehaviorBinding::new::<Req, B>(factory()));
        self.push_behavior(key, Provider::Factory { lifetime, factory });
        self
    }

    /// Checks if at least one handler is registered for `Req`.
    #[must_use]
    pub fn contains_handler<Req: Request>(&self) -> bool {
        self.handler_count(&DispatchKey::of::<Req>()) > 0
    }

    /// Returns how many handlers are registered for `key`.
    #[must_use]
    pub fn handler_count(&self, key: &DispatchKey) -> usize {
        self.handlers.get(key).map_or(0, Vec::len)
    }

    /// Returns how many behaviors are registered for `key`.
    #[must_use]
    pub fn behavior_count(&self, key: &DispatchKey) -> usize {
        self.behaviors.get(key).map_or(0, Vec::len)
    }

    /// Returns the total number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum::<usize>()
            + self.behaviors.values().map(Vec::len).sum::<usize>()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a new scope.
    ///
    /// Scoped factories produce one instance per scope; singleton and
    /// transient registrations behave as they do on the container.
    #[must_use]
    pub fn create_scope(self: &Arc<Self>) -> Scope {
        Scope {
            container: Arc::clone(self),
            cache: ScopeCache::default(),
        }
    }

    fn resolve_handler_in(
        &self,
        key: &DispatchKey,
        scope: &ScopeCache,
    ) -> HermesResult<HandlerBinding> {
        let registrations = self.handlers.get(key).map_or(&[][..], Vec::as_slice);
        let registration = select_single(key, registrations)?;
        Ok(provide(registration, &self.root.handlers, &scope.handlers))
    }

    fn resolve_behaviors_in(&self, key: &DispatchKey, scope: &ScopeCache) -> Vec<BehaviorBinding> {
        self.behaviors
            .get(key)
            .map(|registrations| {
                registrations
                    .iter()
                    .map(|registration| {
                        provide(registration, &self.root.behaviors, &scope.behaviors)
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Registry for Container {
    fn resolve_handler(&self, key: &DispatchKey) -> HermesResult<HandlerBinding> {
        self.resolve_handler_in(key, &self.root)
    }

    fn resolve_behaviors(&self, key: &DispatchKey) -> HermesResult<Vec<BehaviorBinding>> {
        Ok(self.resolve_behaviors_in(key, &self.root))
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("handler_keys", &self.handlers.len())
            .field("behavior_keys", &self.behaviors.len())
            .field("registration_count", &self.len())
            .finish()
    }
}

/// A resolution scope over a shared [`Container`].
///
/// Each scope caches its own [`Lifetime::Scoped`] instances. Drop the scope
/// to release them.
pub struct Scope {
    container: Arc<Container>,
    cache: ScopeCache,
}

impl Scope {
    /// Returns the container this scope resolves from.
    #[must_use]
    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }
}

impl Registry for Scope {
    fn resolve_handler(&self, key: &DispatchKey) -> HermesResult<HandlerBinding> {
        self.container.resolve_handler_in(key, &self.cache)
    }

    fn resolve_behaviors(&self, key: &DispatchKey) -> HermesResult<Vec<BehaviorBinding>> {
        Ok(self.container.resolve_behaviors_in(key, &self.cache))
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("container", &self.container)
            .field("scoped_handlers", &self.cache.handlers.lock().len())
            .field("scoped_behaviors", &self.cache.behaviors.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HermesError;
    use crate::fixtures::{Echo, EchoHandler, EventLog, Ping, PingHandler, SpyBehavior};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_factory(
        counter: &Arc<AtomicUsize>,
    ) -> impl Fn() -> PingHandler + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            PingHandler
        }
    }

    #[test]
    fn test_container_new() {
        let container = Container::new();
        assert!(container.is_empty());
        assert_eq!(container.len(), 0);
    }

    #[test]
    fn test_register_and_resolve_handler() {
        let mut container = Container::new();
        container.register_handler::<Ping, _>(PingHandler);

        let binding = container.resolve_handler(&DispatchKey::of::<Ping>()).unwrap();
        assert_eq!(binding.key(), DispatchKey::of::<Ping>());
        assert!(binding.typed::<Ping>().is_ok());
    }

    #[test]
    fn test_resolve_missing_handler() {
        let container = Container::new();
        let err = container
            .resolve_handler(&DispatchKey::of::<Ping>())
            .unwrap_err();
        assert!(matches!(err, HermesError::HandlerNotFound { .. }));
    }

    #[test]
    fn test_second_handler_makes_resolution_ambiguous() {
        let mut container = Container::new();
        container
            .register_handler::<Ping, _>(PingHandler)
            .register_handler::<Ping, _>(PingHandler);

        assert_eq!(container.handler_count(&DispatchKey::of::<Ping>()), 2);
        let err = container
            .resolve_handler(&DispatchKey::of::<Ping>())
            .unwrap_err();
        assert!(matches!(err, HermesError::AmbiguousHandler { count: 2, .. }));
    }

    #[test]
    fn test_ambiguity_is_checked_before_factories_run() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut container = Container::new();
        container
            .register_handler_factory::<Ping, _, _>(Lifetime::Transient, counting_factory(&created))
            .register_handler_factory::<Ping, _, _>(Lifetime::Transient, counting_factory(&created));

        assert!(container.resolve_handler(&DispatchKey::of::<Ping>()).is_err());
        assert_eq!(created.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_behaviors_keep_registration_order() {
        let log = EventLog::new();
        let mut container = Container::new();
        container
            .register_behavior::<Ping, _>(SpyBehavior::new("A", log.clone()))
            .register_behavior::<Ping, _>(SpyBehavior::new("B", log.clone()))
            .register_behavior::<Echo, _>(SpyBehavior::new("C", log));

        let names: Vec<_> = container
            .resolve_behaviors(&DispatchKey::of::<Ping>())
            .unwrap()
            .iter()
            .map(BehaviorBinding::name)
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(container.behavior_count(&DispatchKey::of::<Echo>()), 1);
    }

    #[test]
    fn test_no_behaviors_is_empty_not_error() {
        let container = Container::new();
        let behaviors = container
            .resolve_behaviors(&DispatchKey::of::<Ping>())
            .unwrap();
        assert!(behaviors.is_empty());
    }

    #[test]
    fn test_transient_factory_runs_every_resolution() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut container = Container::new();
        container.register_handler_factory::<Ping, _, _>(Lifetime::Transient, counting_factory(&created));

        let key = DispatchKey::of::<Ping>();
        container.resolve_handler(&key).unwrap();
        container.resolve_handler(&key).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_singleton_factory_shared_across_scopes() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut container = Container::new();
        container.register_handler_factory::<Ping, _, _>(Lifetime::Singleton, counting_factory(&created));
        let container = Arc::new(container);

        let key = DispatchKey::of::<Ping>();
        container.create_scope().resolve_handler(&key).unwrap();
        container.create_scope().resolve_handler(&key).unwrap();
        container.resolve_handler(&key).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_scoped_factory_once_per_scope() {
        let created = Arc::new(AtomicUsize::new(0));
        let mut container = Container::new();
        container.register_handler_factory::<Ping, _, _>(Lifetime::Scoped, counting_factory(&created));
        let container = Arc::new(container);

        let key = DispatchKey::of::<Ping>();
        let first = container.create_scope();
        first.resolve_handler(&key).unwrap();
        first.resolve_handler(&key).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 1);

        let second = container.create_scope();
        second.resolve_handler(&key).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_scoped_behavior_factory() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&created);
        let log = EventLog::new();
        let mut container = Container::new();
        container.register_behavior_factory::<Ping, _, _>(Lifetime::Scoped, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            SpyBehavior::new("scoped", log.clone())
        });
        let container = Arc::new(container);

        let scope = container.create_scope();
        let key = DispatchKey::of::<Ping>();
        assert_eq!(scope.resolve_behaviors(&key).unwrap().len(), 1);
        assert_eq!(scope.resolve_behaviors(&key).unwrap().len(), 1);
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_container_multiple_request_types() {
        let mut container = Container::new();
        container
            .register_handler::<Ping, _>(PingHandler)
            .register_handler::<Echo, _>(EchoHandler);

        assert_eq!(container.len(), 2);
        assert!(container.contains_handler::<Ping>());
        assert!(container.contains_handler::<Echo>());
    }

    #[test]
    fn test_container_debug() {
        let mut container = Container::new();
        container.register_handler::<Ping, _>(PingHandler);

        let debug = format!("{:?}", container);
        assert!(debug.contains("Container"));
        assert!(debug.contains("registration_count"));

        let scope = Arc::new(container).create_scope();
        assert!(format!("{scope:?}").contains("Scope"));
    }
}
