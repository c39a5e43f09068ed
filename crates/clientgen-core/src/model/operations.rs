use std::fmt;

use serde::{Serialize, Serializer};

use super::types::{NormalizedName, ResolvedType};
use crate::parse::operation::HttpMethod;

/// Where a parameter travels in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Path,
    Query,
    Header,
    Cookie,
    Body,
    Form,
    File,
}

/// Serialization of array-valued parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionFormat {
    /// Comma separated values.
    Csv,
    /// Space separated values.
    Ssv,
    /// Tab separated values.
    Tsv,
    /// Pipe separated values.
    Pipes,
    /// One field per value.
    Multi,
}

impl CollectionFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "csv" => Some(CollectionFormat::Csv),
            "ssv" => Some(CollectionFormat::Ssv),
            "tsv" => Some(CollectionFormat::Tsv),
            "pipes" => Some(CollectionFormat::Pipes),
            "multi" => Some(CollectionFormat::Multi),
            _ => None,
        }
    }

    /// Separator used to join values into one field.
    pub fn separator(&self) -> Option<&'static str> {
        match self {
            CollectionFormat::Csv => Some(","),
            CollectionFormat::Ssv => Some(" "),
            CollectionFormat::Tsv => Some("\t"),
            CollectionFormat::Pipes => Some("|"),
            CollectionFormat::Multi => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterModel {
    pub name: NormalizedName,
    pub original_name: String,
    pub kind: ParameterKind,
    pub param_type: ResolvedType,
    pub required: bool,
    pub nullable: bool,
    pub collection_format: Option<CollectionFormat>,
    pub description: Option<String>,
}

/// Response status key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Exact(u16),
    /// `1XX`..`5XX`; holds the leading digit.
    Range(u8),
    Default,
}

impl StatusCode {
    pub fn parse(key: &str) -> Option<Self> {
        if key == "default" {
            return Some(StatusCode::Default);
        }
        let bytes = key.as_bytes();
        if bytes.len() == 3 && key.is_ascii() && key[1..].eq_ignore_ascii_case("xx") {
            return match bytes[0] {
                b @ b'1'..=b'5' => Some(StatusCode::Range(b - b'0')),
                _ => None,
            };
        }
        key.parse::<u16>()
            .ok()
            .filter(|code| (100..600).contains(code))
            .map(StatusCode::Exact)
    }

    pub fn is_success(&self) -> bool {
        match self {
            StatusCode::Exact(code) => (200..300).contains(code),
            StatusCode::Range(class) => *class == 2,
            StatusCode::Default => false,
        }
    }

    /// Suffix qualifying per-response bindings in generated code.
    pub fn binding_suffix(&self) -> String {
        match self {
            StatusCode::Exact(code) => code.to_string(),
            StatusCode::Range(class) => format!("{class}XX"),
            StatusCode::Default => "Default".to_string(),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Exact(code) => write!(f, "{code}"),
            StatusCode::Range(class) => write!(f, "{class}XX"),
            StatusCode::Default => write!(f, "default"),
        }
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseModel {
    pub status: StatusCode,
    /// `None` when the response has no body.
    pub response_type: Option<ResolvedType>,
    pub nullable: bool,
    pub description: Option<String>,
}

impl ResponseModel {
    pub fn has_typed_body(&self) -> bool {
        self.response_type.as_ref().is_some_and(|t| !t.is_any())
    }
}

/// Union of the error payloads an operation can reject with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptionType {
    pub alternatives: Vec<ResolvedType>,
    /// Trailing untyped-payload alternative. Always set by the builder.
    pub generic_fallback: bool,
}

impl ExceptionType {
    pub fn is_generic_only(&self) -> bool {
        self.alternatives.is_empty()
    }
}

/// One API operation, as built from the description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationModel {
    pub name: NormalizedName,
    pub method: HttpMethod,
    pub path: String,
    pub group: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub parameters: Vec<ParameterModel>,
    pub responses: Vec<ResponseModel>,
    pub default_response: Option<ResponseModel>,
    /// `None` means the operation resolves with no value.
    pub result_type: Option<ResolvedType>,
    pub exception_type: ExceptionType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedParameter {
    #[serde(flatten)]
    pub parameter: ParameterModel,
    pub materialize: bool,
}

/// Names of the generated bindings a response body flows through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseBindings {
    /// Raw decoded value.
    pub source: String,
    /// Materialized value.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedResponse {
    #[serde(flatten)]
    pub response: ResponseModel,
    pub is_success: bool,
    pub materialize: bool,
    pub bindings: ResponseBindings,
    pub conversion: Option<String>,
}

/// An operation with materialization decisions and conversion code filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedOperation {
    pub name: NormalizedName,
    pub method: HttpMethod,
    pub path: String,
    pub group: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub deprecated: bool,
    pub parameters: Vec<PreparedParameter>,
    pub responses: Vec<PreparedResponse>,
    pub default_response: Option<PreparedResponse>,
    pub result_type: Option<ResolvedType>,
    pub exception_type: ExceptionType,
}
