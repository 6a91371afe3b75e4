//! Order Linearizer
//!
//! Flattens a dependency tree into an [`ExecutionOrder`].
//!
//! # Algorithm
//!
//! 1. Post-order depth-first traversal: emit every child (left to right,
//!    i.e. in declaration order) before the node itself
//! 2. Deduplicate left to right, keeping the *first* occurrence of each type
//!
//! Every emission of a type happens after the emissions of its own
//! dependencies, so keeping the first one preserves "dependencies first".
//! Unrelated types are ordered by declaration order, scanned depth first,
//! which makes the result a pure function of the tree.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexSet;
use serde::{Serialize, Serializer};

use super::node::Node;
use crate::source::TypeKey;

/// A deduplicated sequence of types in which every type appears after all
/// of its transitive dependencies.
///
/// Cloning is cheap and clones share storage, so a cached order handed out
/// twice is the same sequence ([`ptr_eq`](Self::ptr_eq)).
pub struct ExecutionOrder<T> {
    types: Arc<[T]>,
}

impl<T> ExecutionOrder<T> {
    /// Whether two orders share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.types, &other.types)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.types
    }

    /// The type initialized last: the root the order was computed for.
    pub fn root(&self) -> Option<&T> {
        self.types.last()
    }
}

impl<T: PartialEq> ExecutionOrder<T> {
    /// Index of `ty` in the order.
    pub fn position(&self, ty: &T) -> Option<usize> {
        self.types.iter().position(|t| t == ty)
    }
}

impl<T: Clone> ExecutionOrder<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.types.to_vec()
    }
}

impl<T> Clone for ExecutionOrder<T> {
    fn clone(&self) -> Self {
        Self {
            types: Arc::clone(&self.types),
        }
    }
}

impl<T> Deref for ExecutionOrder<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.types
    }
}

impl<T> From<Vec<T>> for ExecutionOrder<T> {
    fn from(types: Vec<T>) -> Self {
        Self {
            types: types.into(),
        }
    }
}

impl<T: PartialEq> PartialEq for ExecutionOrder<T> {
    fn eq(&self, other: &Self) -> bool {
        self.types == other.types
    }
}

impl<T: Eq> Eq for ExecutionOrder<T> {}

impl<T: PartialEq> PartialEq<[T]> for ExecutionOrder<T> {
    fn eq(&self, other: &[T]) -> bool {
        *self.types == *other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for ExecutionOrder<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        *self.types == other[..]
    }
}

impl<T: fmt::Debug> fmt::Debug for ExecutionOrder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.types.iter()).finish()
    }
}

impl<T: Serialize> Serialize for ExecutionOrder<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.types.iter())
    }
}

impl<'a, T> IntoIterator for &'a ExecutionOrder<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}

/// Compute the execution order of a dependency tree.
pub fn linearize<T: TypeKey>(root: &Node<T>) -> ExecutionOrder<T> {
    let mut emitted = Vec::with_capacity(root.size());
    post_order(root, &mut emitted);

    // IndexSet keeps the position of the first insertion.
    let unique: IndexSet<T> = emitted.into_iter().collect();
    ExecutionOrder::from(unique.into_iter().collect::<Vec<_>>())
}

fn post_order<T: Clone>(node: &Node<T>, out: &mut Vec<T>) {
    for child in node.children() {
        post_order(child, out);
    }
    out.push(node.value().clone());
}
