use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

/// A media type object inside a request body or response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
}

/// Content types whose bodies are sent as individual form fields.
pub const FORM_CONTENT_TYPES: [&str; 2] = ["multipart/form-data", "application/x-www-form-urlencoded"];

/// Whether a content type is JSON or a `+json` suffix type.
pub fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or("").trim();
    essence == "application/json" || essence.ends_with("+json") || essence == "text/json"
}
