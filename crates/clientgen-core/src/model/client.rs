use serde::Serialize;

use super::definitions::{TypeDefinition, TypeRegistry};
use super::operations::PreparedOperation;

/// One generated client class and its operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientModel {
    /// Public name of the client, before extension renaming.
    pub name: String,
    /// Name the generated class is emitted under.
    pub class_name: String,
    pub base_class: Option<String>,
    pub base_url: String,
    pub operations: Vec<PreparedOperation>,
}

/// A registered type ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedType<'d> {
    pub definition: &'d TypeDefinition,
    /// Name the generated class is emitted under.
    pub class_name: String,
    /// Per-field conversion code for class initializers, aligned with the
    /// object's fields. `None` means the raw value is assigned as-is.
    pub field_conversions: Vec<Option<String>>,
}

/// Everything one run produced before rendering.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationModel {
    pub clients: Vec<ClientModel>,
    pub types: TypeRegistry,
}

/// A rendered class with extension code merged in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedUnit {
    pub name: String,
    pub code: String,
}

/// Rendered text for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    /// Extension code that lives outside any class (imports, helpers).
    pub preamble: Option<String>,
    pub types: Vec<RenderedUnit>,
    pub clients: Vec<RenderedUnit>,
}
