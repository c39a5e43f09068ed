use clientgen_core::model::{
    DefinitionKind, EnumDefinition, EnumValue, FieldDefinition, ObjectDefinition, PreparedType,
    TypeStyle,
};
use minijinja::{Value, context};

use super::js_string;
use crate::type_mapper::{TypePosition, ts_type};

/// Which template renders a type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTemplate {
    Class,
    Interface,
    Enum,
}

pub struct TypeContext {
    pub template: TypeTemplate,
    pub value: Value,
}

/// Template context for one registered type.
pub fn type_context(ty: &PreparedType<'_>) -> TypeContext {
    let definition = ty.definition;
    let docs: Vec<&str> = definition
        .description
        .as_deref()
        .map(|d| d.lines().collect())
        .unwrap_or_default();

    match &definition.kind {
        DefinitionKind::Enum(e) => TypeContext {
            template: TypeTemplate::Enum,
            value: context! {
                name => ty.class_name.clone(),
                docs => docs,
                members => enum_members(e),
            },
        },
        DefinitionKind::Object(object) if definition.style == TypeStyle::Interface => TypeContext {
            template: TypeTemplate::Interface,
            value: context! {
                name => ty.class_name.clone(),
                docs => docs,
                base_interface => object.base.as_ref().map(|b| b.name.clone()),
                fields => fields(object, &ty.field_conversions),
                index_signature => index_signature(object),
            },
        },
        DefinitionKind::Object(object) => {
            let class_base = object
                .base
                .as_ref()
                .filter(|b| b.style == TypeStyle::Class)
                .map(|b| b.name.clone());
            let base_interface = object.base.as_ref().map(|b| match b.style {
                TypeStyle::Class => interface_name(&b.name),
                TypeStyle::Interface => b.name.clone(),
            });
            TypeContext {
                template: TypeTemplate::Class,
                value: context! {
                    name => ty.class_name.clone(),
                    public_name => definition.name.clone(),
                    interface_name => interface_name(&definition.name),
                    docs => docs,
                    base => class_base,
                    base_interface => base_interface,
                    fields => fields(object, &ty.field_conversions),
                    index_signature => index_signature(object),
                },
            }
        }
    }
}

/// Constructor-data interface companion of a generated class.
fn interface_name(class: &str) -> String {
    format!("I{class}")
}

fn fields(object: &ObjectDefinition, conversions: &[Option<String>]) -> Vec<Value> {
    object
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let source = format!("_data[{}]", js_string(&field.original_name));
            let init = conversions
                .get(i)
                .cloned()
                .flatten()
                .unwrap_or_else(|| format!("this.{} = {source};", field.name.camel_case));
            context! {
                name => field.name.camel_case.clone(),
                wire_name => property_key(&field.original_name),
                original_name => js_string(&field.original_name),
                type => ts_type(&field.field_type, TypePosition::Field),
                optional => !field.required,
                docs => field_docs(field),
                init => init,
            }
        })
        .collect()
}

fn field_docs(field: &FieldDefinition) -> Vec<String> {
    field
        .description
        .as_deref()
        .map(|d| d.lines().map(String::from).collect())
        .unwrap_or_default()
}

/// Value type of the index signature. Declared fields must be assignable
/// to it, so anything but a field-less map widens to `any`.
fn index_signature(object: &ObjectDefinition) -> Option<String> {
    object.additional_properties.as_ref().map(|value| {
        if object.fields.is_empty() {
            ts_type(value, TypePosition::Field)
        } else {
            "any".to_string()
        }
    })
}

/// Property key as written in a structural type: bare when it is a valid
/// identifier, quoted otherwise.
fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        name.to_string()
    } else {
        js_string(name)
    }
}

fn enum_members(e: &EnumDefinition) -> Vec<Value> {
    e.members
        .iter()
        .map(|m| {
            let value = match &m.value {
                EnumValue::String(s) => js_string(s),
                EnumValue::Integer(n) => n.to_string(),
            };
            context! { name => m.name.clone(), value => value }
        })
        .collect()
}
