//! Rust-typed declarations.
//!
//! Components declare their prerequisites by implementing [`DependsOn`];
//! a [`TypeRegistry`] collects those declarations keyed by
//! [`ComponentType`]. The registry doubles as a [`CapabilityPolicy`]:
//! a type is initializable when it was registered with
//! [`DependsOn::INITIALIZABLE`] set.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexSet;

use super::{DeclarationSource, DeclarationTable, Dependencies};
use crate::diagnostics::CapabilityPolicy;

/// Identity of a Rust component type.
///
/// Equality and hashing use the [`TypeId`] only; the name is kept for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// The component type of `C`.
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Declares the components a type must be initialized after.
///
/// # Example
///
/// ```rust,ignore
/// struct Logger;
/// struct Network;
///
/// impl DependsOn for Logger {}
///
/// impl DependsOn for Network {
///     fn depends_on() -> Vec<ComponentType> {
///         vec![ComponentType::of::<Logger>()]
///     }
/// }
/// ```
pub trait DependsOn: 'static {
    /// Whether the type can be initialized. Pure data dependencies set this
    /// to `false`.
    const INITIALIZABLE: bool = true;

    fn depends_on() -> Vec<ComponentType> {
        Vec::new()
    }
}

/// Declaration source built from [`DependsOn`] implementations.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    table: DeclarationTable<ComponentType>,
    initializable: IndexSet<ComponentType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the declarations of `C`.
    pub fn register<C: DependsOn>(&mut self) -> &mut Self {
        let ty = ComponentType::of::<C>();
        self.table.declare(ty, C::depends_on());
        if C::INITIALIZABLE {
            self.initializable.insert(ty);
        }
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<C: DependsOn>(mut self) -> Self {
        self.register::<C>();
        self
    }

    /// Registered component types, in registration order.
    pub fn types(&self) -> impl Iterator<Item = &ComponentType> {
        self.table.types()
    }
}

impl DeclarationSource<ComponentType> for TypeRegistry {
    fn dependencies(&self, ty: &ComponentType) -> Dependencies<ComponentType> {
        self.table.dependencies(ty)
    }
}

/// Unregistered types are not initializable.
impl CapabilityPolicy<ComponentType> for TypeRegistry {
    fn is_initializable(&self, ty: &ComponentType) -> bool {
        self.initializable.contains(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Diagnostic};
    use crate::graph::GraphBuilder;

    struct Logger;
    struct Network;
    struct GameState;
    struct Transform;
    struct Player;

    impl DependsOn for Logger {}

    impl DependsOn for Transform {
        const INITIALIZABLE: bool = false;
    }

    impl DependsOn for Player {
        fn depends_on() -> Vec<ComponentType> {
            vec![
                ComponentType::of::<Transform>(),
                ComponentType::of::<Logger>(),
                ComponentType::of::<Network>(),
            ]
        }
    }

    impl DependsOn for Network {
        fn depends_on() -> Vec<ComponentType> {
            vec![ComponentType::of::<Logger>()]
        }
    }

    impl DependsOn for GameState {
        fn depends_on() -> Vec<ComponentType> {
            vec![ComponentType::of::<Network>(), ComponentType::of::<Logger>()]
        }
    }

    #[test]
    fn component_type_identity_is_type_id() {
        assert_eq!(ComponentType::of::<Logger>(), ComponentType::of::<Logger>());
        assert_ne!(ComponentType::of::<Logger>(), ComponentType::of::<Network>());
        assert_eq!(ComponentType::of::<Logger>().short_name(), "Logger");
    }

    #[test]
    fn registry_reports_declared_dependencies() {
        let registry = TypeRegistry::new()
            .with::<Logger>()
            .with::<Network>()
            .with::<GameState>();

        let deps = registry.dependencies(&ComponentType::of::<GameState>());
        assert_eq!(
            deps.as_slice(),
            &[ComponentType::of::<Network>(), ComponentType::of::<Logger>()]
        );
        assert!(registry
            .dependencies(&ComponentType::of::<Logger>())
            .is_empty());
        assert_eq!(registry.types().count(), 3);
    }

    #[test]
    fn unregistered_type_has_no_dependencies() {
        let registry = TypeRegistry::new().with::<Network>();
        assert!(registry
            .dependencies(&ComponentType::of::<GameState>())
            .is_empty());
    }

    #[test]
    fn registry_is_a_capability_policy() {
        let registry = TypeRegistry::new()
            .with::<Logger>()
            .with::<Transform>()
            .with::<Player>();

        assert!(registry.is_initializable(&ComponentType::of::<Logger>()));
        assert!(!registry.is_initializable(&ComponentType::of::<Transform>()));
        assert!(!registry.is_initializable(&ComponentType::of::<Network>()));
    }

    #[test]
    fn registry_policy_reports_missing_capability() {
        let registry = TypeRegistry::new()
            .with::<Logger>()
            .with::<Transform>()
            .with::<Player>();
        let sink = CollectingSink::new();
        let builder = GraphBuilder::new(registry.clone())
            .with_policy(registry)
            .with_sink(sink);

        builder.build(&ComponentType::of::<Player>());

        assert_eq!(
            builder.sink().diagnostics(),
            vec![
                Diagnostic::MissingCapability {
                    ty: ComponentType::of::<Transform>(),
                },
                Diagnostic::MissingCapability {
                    ty: ComponentType::of::<Network>(),
                },
            ]
        );
    }
}
