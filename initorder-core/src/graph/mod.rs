//! Dependency Graph
//!
//! This module turns dependency declarations into execution orders.
//!
//! # Overview
//!
//! - [`GraphBuilder`] expands a root type into a tree of [`Node`]s, one per
//!   declared dependency, dropping only the edges that would close a cycle
//! - [`linearize`] flattens such a tree into an [`ExecutionOrder`]: every
//!   type appears once, after all of its transitive dependencies
//!
//! # Design Decisions
//!
//! 1. The tree is unrolled, not merged. A dependency shared by several
//!    branches appears under each of them, so any node can be linearized
//!    on its own as a root (the cache relies on this).
//!
//! 2. Cycle detection is path-local. Only a repeat in the current ancestor
//!    chain is a cycle; diamonds are ordinary.
//!
//! 3. Orders are fully deterministic: ties between unrelated types are
//!    broken by declaration order.

mod builder;
mod node;
mod order;

pub use builder::GraphBuilder;
pub use node::{Descendants, Node};
pub use order::{linearize, ExecutionOrder};
