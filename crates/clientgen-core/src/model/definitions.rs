use indexmap::IndexMap;
use serde::Serialize;

use super::types::{NamedType, NormalizedName, ResolvedType, TypeStyle};

/// A generated type definition, as registered by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub style: TypeStyle,
    pub kind: DefinitionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefinitionKind {
    Object(ObjectDefinition),
    Enum(EnumDefinition),
}

/// An object definition with an optional base type (from `allOf`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectDefinition {
    pub base: Option<NamedType>,
    pub fields: Vec<FieldDefinition>,
    /// Value type of the index signature, when extra properties are allowed.
    pub additional_properties: Option<ResolvedType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    pub name: NormalizedName,
    pub original_name: String,
    pub field_type: ResolvedType,
    pub required: bool,
    pub read_only: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnumDefinition {
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: EnumValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EnumValue {
    String(String),
    Integer(i64),
}

impl EnumDefinition {
    pub fn is_integer(&self) -> bool {
        self.members
            .iter()
            .all(|m| matches!(m.value, EnumValue::Integer(_)))
            && !self.members.is_empty()
    }
}

/// Every type definition registered during a run, in registration order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    definitions: IndexMap<String, TypeDefinition>,
}

impl TypeRegistry {
    /// Whether a class/enum generator exists for the given type name.
    pub fn has_generator(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.definitions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Claim the slot for `definition.name` before its members are resolved,
    /// so registration order follows first visitation.
    pub(crate) fn reserve(&mut self, definition: TypeDefinition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    pub(crate) fn complete(&mut self, name: &str, kind: DefinitionKind) {
        if let Some(definition) = self.definitions.get_mut(name) {
            definition.kind = kind;
        }
    }
}
