use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::config::TypeSettings;
use crate::error::{GenerateError, ResolveError};
use crate::model::{
    DefinitionKind, EnumDefinition, EnumMember, EnumValue, FieldDefinition, NamedKind, NamedType,
    ObjectDefinition, ResolvedType, TypeDefinition, TypeKind, TypeRegistry,
};
use crate::parse::ref_resolve::{RefResolver, SchemaTarget};
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, TypeSet};

use super::name_normalizer::{normalize_name, type_name, unique_name};

/// A schema node compared by identity rather than by value.
///
/// Two structurally equal inline shapes at different places in the document
/// stay distinct.
#[derive(Debug, Clone, Copy)]
struct SchemaNode<'a>(&'a Schema);

impl PartialEq for SchemaNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0)
    }
}

impl Eq for SchemaNode<'_> {}

impl Hash for SchemaNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.0, state);
    }
}

/// Identity of a shape for memoization.
///
/// Component definitions are keyed by their name; anonymous inline shapes by
/// their node in the borrowed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ShapeKey<'a> {
    Named(&'a str),
    Inline(SchemaNode<'a>),
}

/// What a dereferenced shape turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeClass {
    Primitive(SchemaType),
    File,
    Array,
    Dictionary,
    Object,
    Enum,
    Any,
}

/// Run-scoped resolver from description shapes to [`ResolvedType`]s.
///
/// Every named definition it reaches is registered exactly once in its
/// [`TypeRegistry`], in first-visitation order.
#[derive(Debug)]
pub struct TypeResolver<'a> {
    refs: RefResolver<'a>,
    settings: TypeSettings,
    cache: HashMap<ShapeKey<'a>, NamedType>,
    registry: TypeRegistry,
    used_names: HashSet<String>,
    component_names: HashMap<&'a str, String>,
    component_bodies: HashMap<SchemaNode<'a>, &'a str>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(refs: RefResolver<'a>, settings: TypeSettings) -> Self {
        let mut used_names = HashSet::new();
        let mut component_names = HashMap::new();
        let mut component_bodies = HashMap::new();

        if let Some(components) = refs.spec().components.as_ref() {
            for (name, schema) in &components.schemas {
                let generated = unique_name(&type_name(name), &mut used_names);
                component_names.insert(name.as_str(), generated);
                if let SchemaOrRef::Schema(body) = schema {
                    component_bodies.insert(SchemaNode(&**body), name.as_str());
                }
            }
        }

        Self {
            refs,
            settings,
            cache: HashMap::new(),
            registry: TypeRegistry::default(),
            used_names,
            component_names,
            component_bodies,
        }
    }

    pub fn refs(&self) -> RefResolver<'a> {
        self.refs
    }

    pub fn settings(&self) -> &TypeSettings {
        &self.settings
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> TypeRegistry {
        self.registry
    }

    /// Resolve every component schema, in declaration order.
    pub fn resolve_definitions(&mut self) -> Result<(), GenerateError> {
        let Some(components) = self.refs.spec().components.as_ref() else {
            return Ok(());
        };
        for (name, schema) in &components.schemas {
            self.resolve(schema, false, name)
                .map_err(|source| GenerateError::Definition {
                    name: name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Resolve a shape to its canonical type.
    ///
    /// `nullable` adds to whatever nullability the shape declares itself.
    /// `name_hint` names anonymous object and enum shapes.
    pub fn resolve(
        &mut self,
        shape: &'a SchemaOrRef,
        nullable: bool,
        name_hint: &str,
    ) -> Result<ResolvedType, ResolveError> {
        let target = self.refs.schema(shape)?;
        let (target, wrapped_nullable) = self.unwrap_single_all_of(target)?;
        let target = self.with_component_name(target);
        let nullable = nullable || wrapped_nullable || target.schema.is_nullable();
        let null = if nullable {
            self.settings.null_handling.marker()
        } else {
            None
        };

        let resolved = match classify(target) {
            ShapeClass::File => return Ok(ResolvedType::file()),
            ShapeClass::Any => return Ok(ResolvedType::any()),
            ShapeClass::Primitive(SchemaType::String) => ResolvedType::new(TypeKind::String),
            ShapeClass::Primitive(SchemaType::Number) => ResolvedType::new(TypeKind::Number),
            ShapeClass::Primitive(SchemaType::Integer) => ResolvedType::new(TypeKind::Integer),
            ShapeClass::Primitive(SchemaType::Boolean) => ResolvedType::new(TypeKind::Boolean),
            ShapeClass::Primitive(_) => return Ok(ResolvedType::any()),
            ShapeClass::Array => {
                let hint = collection_hint(target, name_hint, "Item");
                let item = match &target.schema.items {
                    Some(items) => self.resolve(items, false, &hint)?,
                    None => ResolvedType::any(),
                };
                ResolvedType::array(item)
            }
            ShapeClass::Dictionary => {
                let hint = collection_hint(target, name_hint, "Value");
                let value = match &target.schema.additional_properties {
                    Some(AdditionalProperties::Schema(value)) => {
                        self.resolve(value, false, &hint)?
                    }
                    _ => ResolvedType::any(),
                };
                ResolvedType::map(value)
            }
            ShapeClass::Object => {
                let named = self.resolve_named(target, NamedKind::Object, name_hint)?;
                ResolvedType::new(TypeKind::Named(named))
            }
            ShapeClass::Enum => {
                let named = self.resolve_named(target, NamedKind::Enum, name_hint)?;
                ResolvedType::new(TypeKind::Named(named))
            }
        };

        Ok(resolved.with_null(null))
    }

    /// Whether the shape, or the item shape of an array, is a file.
    pub fn is_file_shape(&self, shape: &'a SchemaOrRef) -> Result<bool, ResolveError> {
        let target = self.refs.schema(shape)?;
        if is_file_schema(target.schema) {
            return Ok(true);
        }
        match &target.schema.items {
            Some(items) => Ok(is_file_schema(self.refs.schema(items)?.schema)),
            None => Ok(false),
        }
    }

    /// Peel `allOf: [X]` wrappers that add nothing of their own.
    fn unwrap_single_all_of(
        &self,
        mut target: SchemaTarget<'a>,
    ) -> Result<(SchemaTarget<'a>, bool), ResolveError> {
        let mut nullable = false;
        let mut seen: HashSet<SchemaNode<'a>> = HashSet::new();
        while is_transparent_wrapper(target.schema) {
            if !seen.insert(SchemaNode(target.schema)) {
                return Err(ResolveError::CircularRef(
                    target.name.unwrap_or("allOf").to_string(),
                ));
            }
            nullable |= target.schema.is_nullable();
            let inner = self.refs.schema(&target.schema.all_of[0])?;
            target = SchemaTarget {
                name: inner.name.or(target.name),
                schema: inner.schema,
            };
        }
        Ok((target, nullable))
    }

    /// Component bodies reached directly (not through `$ref`) keep their component name.
    fn with_component_name(&self, target: SchemaTarget<'a>) -> SchemaTarget<'a> {
        if target.name.is_some() {
            return target;
        }
        SchemaTarget {
            name: self
                .component_bodies
                .get(&SchemaNode(target.schema))
                .copied(),
            schema: target.schema,
        }
    }

    fn resolve_named(
        &mut self,
        target: SchemaTarget<'a>,
        kind: NamedKind,
        name_hint: &str,
    ) -> Result<NamedType, ResolveError> {
        let key = match target.name {
            Some(name) => ShapeKey::Named(name),
            None => ShapeKey::Inline(SchemaNode(target.schema)),
        };
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let name = match target.name.and_then(|n| self.component_names.get(n)) {
            Some(component) => component.clone(),
            None => {
                let base = target.schema.title.as_deref().unwrap_or(name_hint);
                unique_name(&type_name(base), &mut self.used_names)
            }
        };
        let style = self.settings.style_for(&name);
        let named = NamedType {
            name: name.clone(),
            kind,
            style,
        };

        // Register before recursing so self-references hit the cache.
        self.cache.insert(key, named.clone());
        let placeholder = match kind {
            NamedKind::Object => DefinitionKind::Object(ObjectDefinition::default()),
            NamedKind::Enum => DefinitionKind::Enum(EnumDefinition::default()),
        };
        self.registry.reserve(TypeDefinition {
            name: name.clone(),
            description: target.schema.description.clone(),
            style,
            kind: placeholder,
        });
        log::debug!("registered {:?} type '{}' ({:?})", kind, name, style);

        let definition = match kind {
            NamedKind::Object => DefinitionKind::Object(self.build_object(&name, target.schema)?),
            NamedKind::Enum => DefinitionKind::Enum(build_enum(&name, target.schema)),
        };
        self.registry.complete(&name, definition);
        Ok(named)
    }

    fn build_object(
        &mut self,
        owner: &str,
        schema: &'a Schema,
    ) -> Result<ObjectDefinition, ResolveError> {
        let mut object = ObjectDefinition::default();
        let mut merged: HashSet<SchemaNode<'a>> = HashSet::new();
        merged.insert(SchemaNode(schema));

        for part in &schema.all_of {
            let part_target = self.refs.schema(part)?;
            if object.base.is_none() && object.fields.is_empty() && part_target.name.is_some() {
                let resolved = self.resolve(part, false, owner)?;
                if let Some(named) = resolved.named().filter(|n| n.kind == NamedKind::Object) {
                    object.base = Some(named.clone());
                    continue;
                }
            }
            self.merge_part(owner, part_target.schema, &schema.required, &mut object, &mut merged)?;
        }

        self.merge_fields(owner, schema, &schema.required, &mut object)?;

        object.additional_properties = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => {
                Some(self.resolve(value, false, &format!("{owner}Value"))?)
            }
            Some(AdditionalProperties::Bool(true)) => Some(ResolvedType::any()),
            _ => None,
        };
        Ok(object)
    }

    /// Flatten an `allOf` part (and its own parts) into the owner's fields.
    fn merge_part(
        &mut self,
        owner: &str,
        part: &'a Schema,
        owner_required: &[String],
        object: &mut ObjectDefinition,
        merged: &mut HashSet<SchemaNode<'a>>,
    ) -> Result<(), ResolveError> {
        if !merged.insert(SchemaNode(part)) {
            return Ok(());
        }
        for nested in &part.all_of {
            let nested = self.refs.schema(nested)?;
            self.merge_part(owner, nested.schema, owner_required, object, merged)?;
        }
        let mut required = part.required.clone();
        required.extend(owner_required.iter().cloned());
        self.merge_fields(owner, part, &required, object)
    }

    fn merge_fields(
        &mut self,
        owner: &str,
        schema: &'a Schema,
        required: &[String],
        object: &mut ObjectDefinition,
    ) -> Result<(), ResolveError> {
        for (prop_name, prop) in &schema.properties {
            let hint = format!("{owner}{}", type_name(prop_name));
            let field_type = self.resolve(prop, false, &hint)?;
            let (read_only, description) = match prop {
                SchemaOrRef::Schema(inline) => {
                    (inline.read_only.unwrap_or(false), inline.description.clone())
                }
                SchemaOrRef::Ref { .. } => (false, None),
            };
            let field = FieldDefinition {
                name: normalize_name(prop_name),
                original_name: prop_name.clone(),
                field_type,
                required: required.contains(prop_name),
                read_only,
                description,
            };
            match object
                .fields
                .iter_mut()
                .find(|f| f.original_name == field.original_name)
            {
                Some(existing) => *existing = field,
                None => object.fields.push(field),
            }
        }
        Ok(())
    }
}

fn classify(target: SchemaTarget<'_>) -> ShapeClass {
    let schema = target.schema;
    if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        log::warn!(
            "'{}' uses oneOf/anyOf; falling back to an untyped value",
            target.name.unwrap_or("inline schema")
        );
        return ShapeClass::Any;
    }
    if is_file_schema(schema) {
        return ShapeClass::File;
    }
    if !schema.enum_values.is_empty() {
        return ShapeClass::Enum;
    }
    if !schema.all_of.is_empty() {
        return ShapeClass::Object;
    }

    match schema.schema_type.as_ref().map(TypeSet::primary) {
        Some(Some(SchemaType::Array)) => ShapeClass::Array,
        Some(Some(SchemaType::Object)) | None => {
            if !schema.properties.is_empty() {
                ShapeClass::Object
            } else if matches!(
                schema.additional_properties,
                Some(AdditionalProperties::Schema(_)) | Some(AdditionalProperties::Bool(true))
            ) {
                ShapeClass::Dictionary
            } else if schema.schema_type.is_none() && schema.items.is_some() {
                ShapeClass::Array
            } else if target.name.is_some() && schema.schema_type.is_some() {
                ShapeClass::Object
            } else {
                ShapeClass::Any
            }
        }
        Some(Some(primitive)) => ShapeClass::Primitive(primitive),
        Some(None) => ShapeClass::Any,
    }
}

fn is_file_schema(schema: &Schema) -> bool {
    match schema.schema_type.as_ref().and_then(TypeSet::primary) {
        Some(SchemaType::File) => true,
        Some(SchemaType::String) => schema.format.as_deref() == Some("binary"),
        _ => false,
    }
}

fn is_transparent_wrapper(schema: &Schema) -> bool {
    schema.all_of.len() == 1
        && schema.properties.is_empty()
        && schema.enum_values.is_empty()
        && schema.additional_properties.is_none()
        && schema.one_of.is_empty()
        && schema.any_of.is_empty()
}

/// Hint for the item/value shape of a collection; named collections lend their own name.
fn collection_hint(target: SchemaTarget<'_>, name_hint: &str, suffix: &str) -> String {
    let base = target.name.map(type_name).unwrap_or_else(|| name_hint.to_string());
    format!("{base}{suffix}")
}

fn build_enum(owner: &str, schema: &Schema) -> EnumDefinition {
    let mut taken = HashSet::new();
    let mut members = Vec::new();

    for (i, raw) in schema.enum_values.iter().enumerate() {
        let value = match raw {
            Value::String(s) => EnumValue::String(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(v) => EnumValue::Integer(v),
                None => {
                    log::warn!("enum '{}' skips non-integer value {}", owner, n);
                    continue;
                }
            },
            other => {
                log::warn!("enum '{}' skips unsupported value {}", owner, other);
                continue;
            }
        };
        let base = match (schema.enum_names.get(i), &value) {
            (Some(declared), _) => type_name(declared),
            (None, EnumValue::String(s)) => type_name(s),
            (None, EnumValue::Integer(v)) => format!("_{v}").replace('-', "minus"),
        };
        members.push(EnumMember {
            name: unique_name(&base, &mut taken),
            value,
        });
    }

    EnumDefinition { members }
}
