use std::fmt;

use serde::{Deserialize, Serialize};

/// How values of a named type are materialized in generated code.
///
/// `Class` is the nominal style: decoded values are instantiated through the
/// generated class. `Interface` is the structural style: decoded values are
/// used as plain data and only typed through an interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeStyle {
    #[default]
    Class,
    Interface,
}

/// The null literal folded into a type's external representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NullValue {
    Null,
    Undefined,
}

impl NullValue {
    pub fn literal(&self) -> &'static str {
        match self {
            NullValue::Null => "null",
            NullValue::Undefined => "undefined",
        }
    }
}

/// What sort of definition a named type was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedKind {
    Object,
    Enum,
}

/// A type that owns a generated definition. Two named types are the same
/// generated type exactly when their names are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NamedType {
    pub name: String,
    #[serde(rename = "definition")]
    pub kind: NamedKind,
    pub style: TypeStyle,
}

/// Shape of a resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    String,
    Number,
    Integer,
    Boolean,
    Named(NamedType),
    Array { item: Box<ResolvedType> },
    Map { value: Box<ResolvedType> },
    /// Built-in upload/binary representation.
    File,
    /// Universal untyped representation.
    Any,
}

/// The canonical output-side type assigned to a shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedType {
    #[serde(flatten)]
    pub kind: TypeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null: Option<NullValue>,
}

impl ResolvedType {
    pub fn new(kind: TypeKind) -> Self {
        Self { kind, null: None }
    }

    pub fn any() -> Self {
        Self::new(TypeKind::Any)
    }

    pub fn file() -> Self {
        Self::new(TypeKind::File)
    }

    /// `multiple` selects the collection-of-file representation.
    pub fn file_upload(multiple: bool) -> Self {
        if multiple {
            Self::array(Self::file())
        } else {
            Self::file()
        }
    }

    pub fn array(item: ResolvedType) -> Self {
        Self::new(TypeKind::Array {
            item: Box::new(item),
        })
    }

    pub fn map(value: ResolvedType) -> Self {
        Self::new(TypeKind::Map {
            value: Box::new(value),
        })
    }

    pub fn with_null(mut self, null: Option<NullValue>) -> Self {
        self.null = null;
        self
    }

    pub fn named(&self) -> Option<&NamedType> {
        match &self.kind {
            TypeKind::Named(named) => Some(named),
            _ => None,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, TypeKind::Any)
    }

    /// File, or a collection of files.
    pub fn is_file(&self) -> bool {
        match &self.kind {
            TypeKind::File => true,
            TypeKind::Array { item } => matches!(item.kind, TypeKind::File),
            _ => false,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, TypeKind::Array { .. } | TypeKind::Map { .. })
    }

    /// The named type at the bottom of any array/map nesting.
    pub fn innermost_named(&self) -> Option<&NamedType> {
        match &self.kind {
            TypeKind::Named(named) => Some(named),
            TypeKind::Array { item: inner } | TypeKind::Map { value: inner } => {
                inner.innermost_named()
            }
            _ => None,
        }
    }
}

/// A name with the casing variants generated code needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedName {
    pub original: String,
    pub pascal_case: String,
    pub camel_case: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}
