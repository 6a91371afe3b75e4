//! Initorder Core
//!
//! This crate computes deterministic, dependency-respecting initialization
//! orders for components that declare which other component types they
//! depend on. It implements:
//!
//! - Dependency graph construction with path-local cycle detection
//! - Linearization into a deduplicated, dependencies-first order
//! - A per-session cache that memoizes the order of every type it has seen
//! - A whole-program variant driven by run-before/run-after declarations
//! - A thin driver that initializes live components in the computed order
//!
//! Declarations are attached to component *types*, never to instances, and
//! are supplied by the host through a [`DeclarationSource`].
//!
//! # Architecture
//!
//! - `source`: declaration sources (closures, tables, Rust types)
//! - `graph`: graph builder, nodes and the order linearizer
//! - `cache`: the result cache and the query interface
//! - `diagnostics`: cycle and capability reporting
//! - `global`: whole-program ordering from run-before/run-after declarations
//! - `driver`: component initialization in dependency order
//!
//! # Example
//!
//! ```rust
//! use initorder_core::{CachingDependencyManager, DeclarationTable, DependencyManager};
//!
//! let table = DeclarationTable::new()
//!     .with("GameState", ["Network", "Logger"])
//!     .with("Network", ["Logger"]);
//!
//! let mut manager = CachingDependencyManager::new(table);
//! let order = manager.execution_order(&"GameState");
//!
//! assert_eq!(order, ["Logger", "Network", "GameState"]);
//! ```

pub mod cache;
pub mod diagnostics;
pub mod driver;
pub mod error;
pub mod global;
pub mod graph;
pub mod source;

pub use cache::{CachingDependencyManager, DependencyManager, OrderCache, SharedDependencyManager};
pub use diagnostics::{
    AllInitializable, CapabilityPolicy, CollectingSink, Diagnostic, DiagnosticSink, TracingSink,
};
pub use driver::{Component, ComponentSet, InitReport, Initialize};
pub use error::{CycleError, Error, Result};
pub use global::{dependency_list, global_order, GlobalOrder, Run, RunBeforeList, RunManifest};
pub use graph::{linearize, Descendants, ExecutionOrder, GraphBuilder, Node};
pub use source::{
    ComponentType, DeclarationSource, DeclarationTable, Dependencies, DependsOn, TypeKey,
    TypeRegistry,
};
