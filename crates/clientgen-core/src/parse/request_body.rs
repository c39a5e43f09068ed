use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::{FORM_CONTENT_TYPES, MediaType, is_json};

/// A request body definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,

    #[serde(rename = "x-name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RequestBody {
    /// The JSON media type, falling back to the first non-form media type.
    pub fn json_content(&self) -> Option<(&str, &MediaType)> {
        self.content
            .iter()
            .find(|(ct, _)| is_json(ct))
            .or_else(|| {
                self.content
                    .iter()
                    .find(|(ct, _)| !FORM_CONTENT_TYPES.contains(&ct.as_str()))
            })
            .map(|(ct, mt)| (ct.as_str(), mt))
    }

    /// The form media type, if the body is sent as form fields.
    pub fn form_content(&self) -> Option<(&str, &MediaType)> {
        FORM_CONTENT_TYPES.iter().find_map(|ct| {
            self.content
                .get_key_value(*ct)
                .map(|(ct, mt)| (ct.as_str(), mt))
        })
    }
}

/// A reference or inline request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBodyOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    RequestBody(RequestBody),
}
