//! Graph Builder
//!
//! Expands a root type into its dependency tree.
//!
//! # Algorithm
//!
//! Recursive expansion carrying the *path*: the chain of types currently
//! being expanded from the root down to the current node.
//!
//! 1. Push the current type onto the path
//! 2. For each declared dependency, in declaration order:
//!    - if it fails the capability policy, report it (it is still expanded)
//!    - if it is already on the path, the edge closes a cycle: report it and
//!      drop that edge only
//!    - otherwise expand it recursively
//! 3. Pop the current type and return its node
//!
//! A node whose subtree lost an edge to one of *its* ancestors is marked
//! [`truncated`](Node::is_truncated): its expansion here depends on where
//! the walk started. A self edge stays inside the subtree and does not mark.
//!
//! The path is not a global visited set. A dependency shared by two
//! branches (a diamond) is expanded once per branch; only a repeat within
//! the current ancestor chain is a cycle. Termination follows because the
//! path can never hold a type twice and the set of types is finite.

use indexmap::IndexSet;
use tracing::{debug, trace};

use super::node::Node;
use crate::diagnostics::{
    AllInitializable, CapabilityPolicy, Diagnostic, DiagnosticSink, TracingSink,
};
use crate::source::{DeclarationSource, TypeKey};

/// Builds dependency trees from a declaration source.
#[derive(Debug, Clone)]
pub struct GraphBuilder<S, P = AllInitializable, D = TracingSink> {
    source: S,
    policy: P,
    sink: D,
}

impl<S> GraphBuilder<S> {
    /// Create a builder that accepts every type and logs diagnostics.
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: AllInitializable,
            sink: TracingSink,
        }
    }
}

impl<S, P, D> GraphBuilder<S, P, D> {
    /// Replace the capability policy.
    pub fn with_policy<Q>(self, policy: Q) -> GraphBuilder<S, Q, D> {
        GraphBuilder {
            source: self.source,
            policy,
            sink: self.sink,
        }
    }

    /// Replace the diagnostics sink.
    pub fn with_sink<E>(self, sink: E) -> GraphBuilder<S, P, E> {
        GraphBuilder {
            source: self.source,
            policy: self.policy,
            sink,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Expand `root` into its dependency tree.
    pub fn build<T>(&self, root: &T) -> Node<T>
    where
        T: TypeKey,
        S: DeclarationSource<T>,
        P: CapabilityPolicy<T>,
        D: DiagnosticSink<T>,
    {
        let mut path = IndexSet::new();
        let (node, _) = self.expand(root.clone(), &mut path);
        debug!(
            ?root,
            nodes = node.size(),
            depth = node.depth(),
            "built dependency graph"
        );
        node
    }

    /// Returns the node and the lowest path index any dropped edge in its
    /// subtree pointed at.
    fn expand<T>(&self, ty: T, path: &mut IndexSet<T>) -> (Node<T>, usize)
    where
        T: TypeKey,
        S: DeclarationSource<T>,
        P: CapabilityPolicy<T>,
        D: DiagnosticSink<T>,
    {
        let dependencies = self.source.dependencies(&ty);
        trace!(?ty, count = dependencies.len(), "expanding");

        let (index, _) = path.insert_full(ty.clone());
        let mut reach = index;
        let mut children = Vec::with_capacity(dependencies.len());

        for dependency in dependencies {
            if !self.policy.is_initializable(&dependency) {
                self.sink.report(Diagnostic::MissingCapability {
                    ty: dependency.clone(),
                });
            }

            if let Some(ancestor) = path.get_index_of(&dependency) {
                debug!(chain = ?path, ?dependency, "cycle closed");
                reach = reach.min(ancestor);
                self.sink.report(Diagnostic::CycleDetected {
                    participant: ty.clone(),
                    dependency,
                });
                continue;
            }

            let (child, child_reach) = self.expand(dependency, path);
            reach = reach.min(child_reach);
            children.push(child);
        }

        path.pop();
        let node = Node::new(ty, children).with_truncated(reach < index);
        (node, reach)
    }
}
