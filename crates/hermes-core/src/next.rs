//! The continuation handed to each behavior.

use crate::contract::BoxFuture;
use crate::error::HermesResult;
use std::fmt;
use std::sync::Arc;

/// Callback that runs the rest of the pipeline.
///
/// `Next` is cheap to clone and may be run any number of times: zero
/// (the behavior short-circuits), once, or repeatedly (the behavior retries).
/// Each run executes every inner layer and the handler again.
pub struct Next<T: Send + 'static> {
    inner: Arc<dyn Fn() -> BoxFuture<'static, HermesResult<T>> + Send + Sync>,
}

impl<T: Send + 'static> Next<T> {
    /// Creates a continuation from a closure producing the inner future.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, HermesResult<T>> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Runs the next layer (or the handler, at the end of the chain).
    pub fn run(&self) -> BoxFuture<'static, HermesResult<T>> {
        (self.inner)()
    }
}

impl<T: Send + 'static> Clone for Next<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + 'static> fmt::Debug for Next<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("output", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}
