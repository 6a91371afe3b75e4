//! Global Execution Order
//!
//! Orders *every* declared type at once from bidirectional declarations,
//! instead of lazily per root.
//!
//! # Declarations
//!
//! A type may declare [`Run::Before`] another type or [`Run::After`] it.
//! `After(Y)` on `X` is folded into `Before(X)` on `Y`, so the ordering
//! below only deals with one relation: "runs before".
//!
//! # Algorithm
//!
//! Types are placed one at a time, in declaration order:
//!
//! 1. A type with no run-before targets is appended
//! 2. Otherwise its targets are placed first (recursively), then the type
//!    is inserted immediately before the earliest of them
//!
//! The chain of types whose placement is in progress is tracked; reaching a
//! type already on that chain is a cycle. Unlike the per-root engine, a
//! cycle fails the whole computation, since the result is a single
//! one-shot ordering of the program where a partial order is unsafe.

mod manifest;

pub use manifest::{RunDeclarations, RunManifest};

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::CycleError;
use crate::source::TypeKey;

/// Priority assigned to the first type of a global order.
pub const DEFAULT_PRIORITY_BASE: i32 = 100;

/// A run-before or run-after declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Run<T> {
    /// The declaring type runs before this one.
    Before(T),
    /// The declaring type runs after this one.
    After(T),
}

impl<T> Run<T> {
    /// The type the declaration refers to.
    pub fn target(&self) -> &T {
        match self {
            Run::Before(ty) | Run::After(ty) => ty,
        }
    }
}

/// For each type, the types it must run before.
pub type RunBeforeList<T> = IndexMap<T, IndexSet<T>>;

/// Normalize declarations into a [`RunBeforeList`].
///
/// Only types with at least one declaration, and the targets of folded
/// `After` declarations, appear as keys. Duplicate edges collapse.
pub fn dependency_list<T, I, R>(declarations: I) -> RunBeforeList<T>
where
    T: TypeKey,
    I: IntoIterator<Item = (T, R)>,
    R: IntoIterator<Item = Run<T>>,
{
    let mut list: RunBeforeList<T> = IndexMap::new();
    let mut folded = Vec::new();

    for (ty, runs) in declarations {
        let mut runs = runs.into_iter().peekable();
        if runs.peek().is_none() {
            continue;
        }

        let before = list.entry(ty.clone()).or_default();
        for run in runs {
            match run {
                Run::Before(target) => {
                    before.insert(target);
                }
                Run::After(target) => folded.push((target, ty.clone())),
            }
        }
    }

    for (target, ty) in folded {
        list.entry(target).or_default().insert(ty);
    }

    list
}

/// Compute one order for every type in `list`.
pub fn global_order<T: TypeKey>(
    list: &RunBeforeList<T>,
) -> Result<GlobalOrder<T>, CycleError<T>> {
    let mut placer = Placer {
        list,
        visited: HashSet::new(),
        chain: Vec::new(),
        order: Vec::new(),
    };

    for ty in list.keys() {
        placer.place(ty)?;
    }

    info!(types = placer.order.len(), "computed global execution order");
    Ok(GlobalOrder {
        types: placer.order,
    })
}

struct Placer<'a, T: TypeKey> {
    list: &'a RunBeforeList<T>,
    visited: HashSet<T>,
    chain: Vec<T>,
    order: Vec<T>,
}

impl<T: TypeKey> Placer<'_, T> {
    fn place(&mut self, ty: &T) -> Result<(), CycleError<T>> {
        if self.chain.contains(ty) {
            let mut chain = self.chain.clone();
            chain.push(ty.clone());
            return Err(CycleError { chain });
        }

        if !self.visited.insert(ty.clone()) {
            return Ok(());
        }

        let list = self.list;
        match list.get(ty).filter(|targets| !targets.is_empty()) {
            Some(targets) => {
                self.chain.push(ty.clone());
                for target in targets {
                    self.place(target)?;
                }
                self.chain.pop();

                let index = targets
                    .iter()
                    .filter_map(|target| self.order.iter().position(|t| t == target))
                    .min()
                    .unwrap_or(self.order.len());
                debug!(?ty, index, "inserting before earliest target");
                self.order.insert(index, ty.clone());
            }
            None => self.order.push(ty.clone()),
        }

        Ok(())
    }
}

/// A whole-program execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GlobalOrder<T> {
    types: Vec<T>,
}

impl<T: TypeKey> GlobalOrder<T> {
    pub fn as_slice(&self) -> &[T] {
        &self.types
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn position(&self, ty: &T) -> Option<usize> {
        self.types.iter().position(|t| t == ty)
    }

    /// Execution priority per type: `base` for the first, counting up.
    pub fn priorities(&self, base: i32) -> IndexMap<T, i32> {
        self.types
            .iter()
            .zip(base..)
            .map(|(ty, priority)| (ty.clone(), priority))
            .collect()
    }

    /// Whether this order differs from a previously applied one.
    pub fn differs_from(&self, previous: &[T]) -> bool {
        self.types.as_slice() != previous
    }

    pub fn into_vec(self) -> Vec<T> {
        self.types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_before<'a>(order: &GlobalOrder<&'a str>, first: &'a str, then: &'a str) -> bool {
        order.position(&first).unwrap() < order.position(&then).unwrap()
    }

    #[test]
    fn run_after_folds_into_run_before() {
        let list = dependency_list([
            ("Network", vec![Run::After("Logger")]),
            ("Logger", vec![Run::Before("Audio")]),
            ("Plain", vec![]),
        ]);

        let before: Vec<_> = list["Logger"].iter().copied().collect();
        assert_eq!(before, vec!["Audio", "Network"]);
        assert!(list["Network"].is_empty());
        assert!(!list.contains_key("Plain"));
    }

    #[test]
    fn duplicate_declarations_collapse() {
        let list = dependency_list([
            ("A", vec![Run::Before("B"), Run::Before("B")]),
            ("B", vec![Run::After("A")]),
        ]);
        assert_eq!(list["A"].len(), 1);
    }

    #[test]
    fn every_run_before_edge_is_respected() {
        let list = dependency_list([
            ("GameState", vec![Run::After("Network"), Run::After("Logger")]),
            ("Network", vec![Run::After("Logger")]),
            ("Ui", vec![Run::After("GameState")]),
        ]);
        let order = global_order(&list).unwrap();

        assert_eq!(order.as_slice(), &["Logger", "Network", "GameState", "Ui"]);
        assert!(is_before(&order, "Logger", "GameState"));
    }

    #[test]
    fn types_are_inserted_before_their_earliest_target() {
        let list = dependency_list([
            ("A", vec![]),
            ("C", vec![Run::Before("D")]),
            ("B", vec![Run::Before("D"), Run::Before("E")]),
            ("E", vec![Run::Before("D")]),
        ]);
        let order = global_order(&list).unwrap();

        for (first, then) in [("C", "D"), ("B", "D"), ("B", "E"), ("E", "D")] {
            assert!(is_before(&order, first, then), "{first} before {then}");
        }
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn cycle_fails_with_full_chain() {
        let list = dependency_list([
            ("A", vec![Run::Before("B")]),
            ("B", vec![Run::Before("C")]),
            ("C", vec![Run::Before("A")]),
        ]);
        let err = global_order(&list).unwrap_err();

        assert_eq!(err.chain, vec!["A", "B", "C", "A"]);
        assert_eq!(err.repeated(), Some(&"A"));
    }

    #[test]
    fn priorities_count_up_from_base() {
        let list = dependency_list([("A", vec![Run::Before("B")])]);
        let order = global_order(&list).unwrap();
        let priorities = order.priorities(DEFAULT_PRIORITY_BASE);

        assert_eq!(priorities["A"], 100);
        assert_eq!(priorities["B"], 101);
        assert!(!order.differs_from(&["A", "B"]));
        assert!(order.differs_from(&["B", "A"]));
    }
}
