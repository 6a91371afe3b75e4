//! Graph Nodes
//!
//! This module defines the node type that makes up an expanded dependency
//! tree.

use std::hash::{Hash, Hasher};

use crate::source::TypeKey;

/// One type's expansion in a dependency tree.
///
/// A node's identity is its type: equality and hashing look at `value`
/// only, so two expansions of the same type are interchangeable no matter
/// where in a tree they were found.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The type this node stands for.
    value: T,

    /// Direct dependencies of `value`, in declaration order.
    /// Edges that would close a cycle are absent.
    children: Vec<Node<T>>,

    /// An edge below this node was dropped against one of its ancestors,
    /// so this subtree is not what expanding `value` on its own produces.
    truncated: bool,
}

impl<T> Node<T> {
    /// Create a node with the given dependencies.
    pub fn new(value: T, children: Vec<Node<T>>) -> Self {
        Self {
            value,
            children,
            truncated: false,
        }
    }

    pub(crate) fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Create a node with no dependencies.
    pub fn leaf(value: T) -> Self {
        Self::new(value, Vec::new())
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether a cycle edge was cut against a type outside this subtree.
    ///
    /// Linearizing a truncated node misses dependencies that a build rooted
    /// at its own type would keep.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Number of nodes in the tree, counting repeated subtrees each time
    /// they appear.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }

    /// Length of the longest dependency chain below and including this node.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Every node in the tree, parents before children, left to right.
    pub fn descendants(&self) -> Descendants<'_, T> {
        Descendants { stack: vec![self] }
    }

    /// Values of every node in the tree, parents before children.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.descendants().map(Node::value)
    }
}

impl<T: TypeKey> PartialEq for Node<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: TypeKey> Eq for Node<T> {}

impl<T: TypeKey> Hash for Node<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

/// Pre-order iterator over a node and everything below it.
pub struct Descendants<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iterator for Descendants<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
