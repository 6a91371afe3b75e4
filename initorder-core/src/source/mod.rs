//! Declaration Sources
//!
//! A declaration source answers one question: which types does a type
//! directly depend on? The engine treats it as a pure function and never
//! inspects how the answer was produced.
//!
//! # Contract
//!
//! - Deterministic and side-effect free for the lifetime of a cache.
//! - Declaration order is preserved; it is the tie-break for unrelated
//!   dependencies in every execution order.
//! - A type the source knows nothing about has no dependencies. "Unknown"
//!   and "declares nothing" are the same answer.
//!
//! Three sources ship with the crate:
//!
//! - any closure `Fn(&T) -> impl IntoIterator<Item = T>`
//! - [`DeclarationTable`], an explicit table (optionally loaded from JSON)
//! - [`TypeRegistry`], keyed by Rust types implementing [`DependsOn`]

mod typed;

pub use typed::{ComponentType, DependsOn, TypeRegistry};

use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::Result;

/// Identifier for a component kind.
///
/// Blanket-implemented for every cloneable, hashable, debuggable value.
pub trait TypeKey: Clone + Eq + Hash + Debug {}

impl<T> TypeKey for T where T: Clone + Eq + Hash + Debug {}

/// The direct dependencies of one type, in declaration order.
pub type Dependencies<T> = SmallVec<[T; 4]>;

/// Supplies the direct dependencies of a type.
pub trait DeclarationSource<T> {
    /// The types `ty` depends on, in declaration order.
    fn dependencies(&self, ty: &T) -> Dependencies<T>;
}

impl<T, F, I> DeclarationSource<T> for F
where
    F: Fn(&T) -> I,
    I: IntoIterator<Item = T>,
{
    fn dependencies(&self, ty: &T) -> Dependencies<T> {
        self(ty).into_iter().collect()
    }
}

/// An explicit declaration table.
///
/// Types are kept in insertion order so that iterating the table (for
/// example to pick roots) is as deterministic as querying it.
#[derive(Debug, Clone)]
pub struct DeclarationTable<T: TypeKey> {
    entries: IndexMap<T, Dependencies<T>>,
}

impl<T: TypeKey> DeclarationTable<T> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Declare that `ty` depends on each of `dependencies`.
    ///
    /// Repeated declarations for the same type append, skipping duplicates.
    pub fn declare<I>(&mut self, ty: T, dependencies: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
    {
        let entry = self.entries.entry(ty).or_default();
        for dependency in dependencies {
            if !entry.contains(&dependency) {
                entry.push(dependency);
            }
        }
        self
    }

    /// Builder-style [`declare`](Self::declare).
    pub fn with<I>(mut self, ty: T, dependencies: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.declare(ty, dependencies);
        self
    }

    /// Types that carry at least one declaration entry, in insertion order.
    pub fn types(&self) -> impl Iterator<Item = &T> {
        self.entries.keys()
    }

    /// Number of declared types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DeclarationTable<String> {
    /// Load a table from a JSON manifest.
    ///
    /// ```json
    /// { "GameState": ["Network", "Logger"], "Network": ["Logger"] }
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: IndexMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for (ty, dependencies) in raw {
            table.declare(ty, dependencies);
        }
        Ok(table)
    }
}

impl<T: TypeKey> Default for DeclarationTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TypeKey> DeclarationSource<T> for DeclarationTable<T> {
    fn dependencies(&self, ty: &T) -> Dependencies<T> {
        self.entries.get(ty).cloned().unwrap_or_default()
    }
}

impl<T: TypeKey> FromIterator<(T, Vec<T>)> for DeclarationTable<T> {
    fn from_iter<I: IntoIterator<Item = (T, Vec<T>)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (ty, dependencies) in iter {
            table.declare(ty, dependencies);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_source_preserves_order() {
        let source = |ty: &&str| match *ty {
            "GameState" => vec!["Network", "Logger"],
            _ => vec![],
        };

        let deps = source.dependencies(&"GameState");
        assert_eq!(deps.as_slice(), &["Network", "Logger"]);
        assert!(source.dependencies(&"Logger").is_empty());
    }

    #[test]
    fn table_unknown_type_has_no_dependencies() {
        let table = DeclarationTable::new().with("A", ["B"]);
        assert!(table.dependencies(&"Z").is_empty());
        assert_eq!(table.dependencies(&"A").as_slice(), &["B"]);
    }

    #[test]
    fn table_declare_appends_without_duplicates() {
        let mut table = DeclarationTable::new();
        table.declare("A", ["B", "C"]);
        table.declare("A", ["C", "D"]);

        assert_eq!(table.dependencies(&"A").as_slice(), &["B", "C", "D"]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_loads_from_json_manifest() {
        let table = DeclarationTable::from_json(
            r#"{ "GameState": ["Network", "Logger"], "Network": ["Logger"] }"#,
        )
        .unwrap();

        let types: Vec<_> = table.types().cloned().collect();
        assert_eq!(types, vec!["GameState", "Network"]);
        assert_eq!(
            table.dependencies(&"GameState".to_string()).as_slice(),
            &["Network".to_string(), "Logger".to_string()]
        );
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let err = DeclarationTable::from_json(r#"{ "A": "B" }"#).unwrap_err();
        assert!(matches!(err, crate::Error::Manifest(_)));
    }
}
