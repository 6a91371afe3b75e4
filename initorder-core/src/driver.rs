//! Initialization Driver
//!
//! Runs component initialization in dependency order. The driver only
//! walks execution orders handed out by a [`DependencyManager`]; finding
//! and creating components stays with the host.
//!
//! For every initializable component (in insertion order) the driver
//! fetches the execution order of its type and visits each type in it
//! once:
//!
//! - present and initializable: initialized
//! - present but not initializable: skipped with a warning
//! - absent: skipped with an error log, recorded as missing
//!
//! Nothing here aborts. The outcome is returned as an [`InitReport`].

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, error, warn};

use crate::cache::DependencyManager;
use crate::source::{ComponentType, TypeKey};

/// The initialization capability.
pub trait Initialize {
    fn initialize(&mut self);
}

/// A live component instance.
pub trait Component {
    /// The initialization hook of this component, if it has one.
    fn as_initializable(&mut self) -> Option<&mut dyn Initialize> {
        None
    }
}

/// What happened during one initialization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport<T> {
    /// Types initialized, in the order it happened.
    pub initialized: Vec<T>,
    /// Types present in an order but lacking the initialization capability.
    pub not_initializable: Vec<T>,
    /// Types depended upon but with no component present.
    pub missing: Vec<T>,
}

impl<T> InitReport<T> {
    /// Whether every visited type was initialized.
    pub fn is_complete(&self) -> bool {
        self.not_initializable.is_empty() && self.missing.is_empty()
    }
}

impl<T> Default for InitReport<T> {
    fn default() -> Self {
        Self {
            initialized: Vec::new(),
            not_initializable: Vec::new(),
            missing: Vec::new(),
        }
    }
}

/// Components of one host object, keyed by type.
pub struct ComponentSet<T: TypeKey> {
    components: IndexMap<T, Box<dyn Component>>,
}

impl<T: TypeKey> ComponentSet<T> {
    pub fn new() -> Self {
        Self {
            components: IndexMap::new(),
        }
    }

    /// Add a component under `ty`, replacing any previous one.
    pub fn insert<C: Component + 'static>(&mut self, ty: T, component: C) -> &mut Self {
        self.components.insert(ty, Box::new(component));
        self
    }

    pub fn get_mut(&mut self, ty: &T) -> Option<&mut (dyn Component + 'static)> {
        self.components.get_mut(ty).map(|c| c.as_mut())
    }

    pub fn contains(&self, ty: &T) -> bool {
        self.components.contains_key(ty)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Initialize every component in dependency order.
    pub fn initialize<M>(&mut self, manager: &mut M) -> InitReport<T>
    where
        M: DependencyManager<T> + ?Sized,
    {
        let roots: Vec<T> = self
            .components
            .iter_mut()
            .filter_map(|(ty, component)| component.as_initializable().map(|_| ty.clone()))
            .collect();

        let mut visited = HashSet::new();
        let mut report = InitReport::default();

        for root in roots {
            let order = manager.execution_order(&root);
            debug!(?root, ?order, "initializing in dependency order");

            for ty in &order {
                if !visited.insert(ty.clone()) {
                    continue;
                }

                let Some(component) = self.components.get_mut(ty) else {
                    error!(
                        ?ty,
                        ?root,
                        "type was depended upon but no component is present"
                    );
                    report.missing.push(ty.clone());
                    continue;
                };

                match component.as_initializable() {
                    Some(initializable) => {
                        initializable.initialize();
                        report.initialized.push(ty.clone());
                    }
                    None => {
                        warn!(
                            ?ty,
                            "component is part of a dependency graph but is not initializable"
                        );
                        report.not_initializable.push(ty.clone());
                    }
                }
            }
        }

        report
    }
}

impl ComponentSet<ComponentType> {
    /// Add a component keyed by its own Rust type.
    pub fn add<C: Component + 'static>(&mut self, component: C) -> &mut Self {
        self.insert(ComponentType::of::<C>(), component)
    }
}

impl<T: TypeKey> Default for ComponentSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
