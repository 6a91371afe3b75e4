//! Query interface used by initialization drivers.

use std::sync::Arc;

use parking_lot::Mutex;

use super::OrderCache;
use crate::diagnostics::{AllInitializable, CapabilityPolicy, DiagnosticSink, TracingSink};
use crate::graph::{ExecutionOrder, GraphBuilder};
use crate::source::{DeclarationSource, TypeKey};

/// Answers "in which order must `root` and its dependencies be initialized?"
pub trait DependencyManager<T> {
    fn execution_order(&mut self, root: &T) -> ExecutionOrder<T>;
}

/// A [`GraphBuilder`] paired with an [`OrderCache`] for one session.
#[derive(Debug)]
pub struct CachingDependencyManager<T: TypeKey, S, P = AllInitializable, D = TracingSink> {
    builder: GraphBuilder<S, P, D>,
    cache: OrderCache<T>,
}

impl<T: TypeKey, S> CachingDependencyManager<T, S> {
    /// Start a session over `source` with the default policy and sink.
    pub fn new(source: S) -> Self {
        Self::from_builder(GraphBuilder::new(source))
    }
}

impl<T: TypeKey, S, P, D> CachingDependencyManager<T, S, P, D> {
    /// Start a session with a fully configured builder.
    pub fn from_builder(builder: GraphBuilder<S, P, D>) -> Self {
        Self {
            builder,
            cache: OrderCache::new(),
        }
    }

    pub fn builder(&self) -> &GraphBuilder<S, P, D> {
        &self.builder
    }

    pub fn cache(&self) -> &OrderCache<T> {
        &self.cache
    }

    /// Number of types with a cached order.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// End the current session's cache and start over.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Move this manager behind a lock so it can be shared across threads.
    pub fn into_shared(self) -> SharedDependencyManager<T, S, P, D> {
        SharedDependencyManager {
            inner: Arc::new(Mutex::new(self)),
        }
    }
}

impl<T, S, P, D> DependencyManager<T> for CachingDependencyManager<T, S, P, D>
where
    T: TypeKey,
    S: DeclarationSource<T>,
    P: CapabilityPolicy<T>,
    D: DiagnosticSink<T>,
{
    fn execution_order(&mut self, root: &T) -> ExecutionOrder<T> {
        self.cache.query(root, &self.builder)
    }
}

/// Cloneable, thread-safe handle to a [`CachingDependencyManager`].
///
/// A query holds the lock from the cache lookup until the new entries are
/// stored, so concurrent queries for overlapping roots never interleave
/// their writes.
pub struct SharedDependencyManager<T: TypeKey, S, P = AllInitializable, D = TracingSink> {
    inner: Arc<Mutex<CachingDependencyManager<T, S, P, D>>>,
}

impl<T: TypeKey, S> SharedDependencyManager<T, S> {
    pub fn new(source: S) -> Self {
        CachingDependencyManager::new(source).into_shared()
    }
}

impl<T, S, P, D> SharedDependencyManager<T, S, P, D>
where
    T: TypeKey,
    S: DeclarationSource<T>,
    P: CapabilityPolicy<T>,
    D: DiagnosticSink<T>,
{
    /// Shared-reference variant of [`DependencyManager::execution_order`].
    pub fn execution_order(&self, root: &T) -> ExecutionOrder<T> {
        self.inner.lock().execution_order(root)
    }
}

impl<T: TypeKey, S, P, D> SharedDependencyManager<T, S, P, D> {
    pub fn cached_len(&self) -> usize {
        self.inner.lock().cached_len()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl<T: TypeKey, S, P, D> Clone for SharedDependencyManager<T, S, P, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, S, P, D> DependencyManager<T> for SharedDependencyManager<T, S, P, D>
where
    T: TypeKey,
    S: DeclarationSource<T>,
    P: CapabilityPolicy<T>,
    D: DiagnosticSink<T>,
{
    fn execution_order(&mut self, root: &T) -> ExecutionOrder<T> {
        SharedDependencyManager::execution_order(self, root)
    }
}
