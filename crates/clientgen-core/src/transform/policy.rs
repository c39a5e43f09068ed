use crate::model::{ResolvedType, TypeKind, TypeRegistry, TypeStyle};

/// Decides whether decoded values of a type are instantiated through a
/// generated class or used as plain data.
#[derive(Debug, Clone, Copy)]
pub struct MaterializationPolicy<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> MaterializationPolicy<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Named types materialize when their style is `Class` and a generator is
    /// registered for them. Arrays and maps follow their element type.
    pub fn should_materialize(&self, ty: &ResolvedType) -> bool {
        match &ty.kind {
            TypeKind::Named(named) => {
                named.style == TypeStyle::Class && self.registry.has_generator(&named.name)
            }
            TypeKind::Array { item: inner } | TypeKind::Map { value: inner } => {
                self.should_materialize(inner)
            }
            _ => false,
        }
    }
}
