//! Result Cache
//!
//! Memoizes execution orders per type.
//!
//! # How the Cache Works
//!
//! 1. A query for a cached type returns the stored order immediately.
//!
//! 2. On a miss, the root is expanded into a dependency tree and
//!    linearized.
//!
//! 3. Every node of that tree that is not cached yet is linearized *as its
//!    own root* and stored. Orders are never sliced out of a bigger order,
//!    so a type's cached order is what a direct query would have produced.
//!    A node [truncated](Node::is_truncated) by a cycle through an outer
//!    ancestor is rebuilt from its own type first, so members of a cycle
//!    get the same order whichever root reached them.
//!
//! 4. Entries are never evicted. The cache lives as long as its owner's
//!    session and is dropped (or [`cleared`](OrderCache::clear)) with it.
//!
//! After a query for `T`, every type reachable from `T` is cached, and no
//! later query for any of them consults the declaration source again.
//!
//! # Thread Safety
//!
//! `OrderCache` is a plain single-owner value. Hosts that query from
//! several threads use [`SharedDependencyManager`], which runs the whole
//! miss-build-populate sequence under one lock.

mod manager;

pub use manager::{CachingDependencyManager, DependencyManager, SharedDependencyManager};

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::diagnostics::{CapabilityPolicy, DiagnosticSink};
use crate::graph::{linearize, ExecutionOrder, GraphBuilder, Node};
use crate::source::{DeclarationSource, TypeKey};

/// Execution orders keyed by type.
#[derive(Debug, Clone)]
pub struct OrderCache<T: TypeKey> {
    orders: HashMap<T, ExecutionOrder<T>>,
}

impl<T: TypeKey> OrderCache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
        }
    }

    /// The cached order for `ty`, if any.
    pub fn get(&self, ty: &T) -> Option<ExecutionOrder<T>> {
        self.orders.get(ty).cloned()
    }

    pub fn contains(&self, ty: &T) -> bool {
        self.orders.contains_key(ty)
    }

    /// Cache the order of every node in `root` that is not cached yet.
    ///
    /// Each node is linearized as its own root; truncated nodes are rebuilt
    /// with `builder` before that. Returns the number of new entries.
    pub fn populate<S, P, D>(&mut self, root: &Node<T>, builder: &GraphBuilder<S, P, D>) -> usize
    where
        S: DeclarationSource<T>,
        P: CapabilityPolicy<T>,
        D: DiagnosticSink<T>,
    {
        let mut added = 0;
        for node in root.descendants() {
            if self.orders.contains_key(node.value()) {
                continue;
            }
            let order = if node.is_truncated() {
                trace!(ty = ?node.value(), "rebuilding node cut by an outer cycle");
                linearize(&builder.build(node.value()))
            } else {
                linearize(node)
            };
            self.orders.insert(node.value().clone(), order);
            added += 1;
        }
        added
    }

    /// The execution order for `ty`, building and caching it on a miss.
    pub fn query<S, P, D>(
        &mut self,
        ty: &T,
        builder: &GraphBuilder<S, P, D>,
    ) -> ExecutionOrder<T>
    where
        S: DeclarationSource<T>,
        P: CapabilityPolicy<T>,
        D: DiagnosticSink<T>,
    {
        if let Some(order) = self.get(ty) {
            debug!(?ty, "execution order cache hit");
            return order;
        }

        let root = builder.build(ty);
        let order = linearize(&root);
        self.orders.insert(ty.clone(), order.clone());
        let added = self.populate(&root, builder);
        debug!(?ty, cached = added + 1, "execution order cache miss");

        order
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Drop every cached order.
    pub fn clear(&mut self) {
        self.orders.clear();
    }
}

impl<T: TypeKey> Default for OrderCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::source::DeclarationTable;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_source(
        table: DeclarationTable<&'static str>,
    ) -> (impl Fn(&&'static str) -> Vec<&'static str>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let source = move |ty: &&'static str| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            table.dependencies(ty).into_vec()
        };
        (source, calls)
    }

    #[test]
    fn populate_caches_every_node_as_its_own_root() {
        let root = Node::new(
            "A",
            vec![
                Node::new("B", vec![Node::leaf("D")]),
                Node::new("C", vec![Node::leaf("D")]),
            ],
        );
        let builder = GraphBuilder::new(DeclarationTable::<&str>::new());
        let mut cache = OrderCache::new();

        assert_eq!(cache.populate(&root, &builder), 4);
        assert_eq!(cache.get(&"A").unwrap(), ["D", "B", "C", "A"]);
        assert_eq!(cache.get(&"C").unwrap(), ["D", "C"]);
        assert_eq!(cache.get(&"D").unwrap(), ["D"]);

        // Already cached nodes are left alone.
        assert_eq!(cache.populate(&root, &builder), 0);
    }

    #[test]
    fn query_hits_do_not_consult_the_source() {
        let (source, calls) = counting_source(
            DeclarationTable::new()
                .with("GameState", ["Network", "Logger"])
                .with("Network", ["Logger"]),
        );
        let builder = GraphBuilder::new(source);
        let mut cache = OrderCache::new();

        let first = cache.query(&"GameState", &builder);
        let after_first = calls.load(Ordering::SeqCst);
        let second = cache.query(&"GameState", &builder);

        assert_eq!(first, ["Logger", "Network", "GameState"]);
        assert!(first.ptr_eq(&second));
        assert_eq!(calls.load(Ordering::SeqCst), after_first);
    }

    #[test]
    fn query_caches_reachable_types() {
        let (source, calls) = counting_source(
            DeclarationTable::new().with("A", ["B"]).with("B", ["C"]),
        );
        let builder = GraphBuilder::new(source);
        let mut cache = OrderCache::new();

        cache.query(&"A", &builder);
        let after_first = calls.load(Ordering::SeqCst);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.query(&"B", &builder), ["C", "B"]);
        assert_eq!(calls.load(Ordering::SeqCst), after_first);
    }

    #[test]
    fn cycle_member_order_does_not_depend_on_query_order() {
        let declarations = || DeclarationTable::new().with("A", ["B"]).with("B", ["A"]);
        let (source, calls) = counting_source(declarations());
        let builder = GraphBuilder::new(source).with_sink(CollectingSink::new());
        let mut cache = OrderCache::new();

        assert_eq!(cache.query(&"A", &builder), ["B", "A"]);
        let after_first = calls.load(Ordering::SeqCst);
        assert_eq!(cache.query(&"B", &builder), ["A", "B"]);
        assert_eq!(calls.load(Ordering::SeqCst), after_first);

        let direct = GraphBuilder::new(declarations()).with_sink(CollectingSink::new());
        let mut fresh = OrderCache::new();
        assert_eq!(fresh.query(&"B", &direct), cache.get(&"B").unwrap());
    }

    #[test]
    fn clear_forgets_everything() {
        let builder = GraphBuilder::new(DeclarationTable::new().with(1, [2]));
        let mut cache = OrderCache::new();
        cache.query(&1, &builder);
        assert!(cache.contains(&2));

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&1).is_none());
    }
}
