use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{NullValue, TypeStyle};

/// Top-level project configuration loaded from `.clientgen.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientgenConfig {
    pub input: String,
    pub output: String,
    pub client: ClientConfig,
    pub naming: NamingConfig,
    pub types: TypeSettings,
    pub extensions: ExtensionConfig,
}

impl Default for ClientgenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            output: "src/api/client.ts".to_string(),
            client: ClientConfig::default(),
            naming: NamingConfig::default(),
            types: TypeSettings::default(),
            extensions: ExtensionConfig::default(),
        }
    }
}

impl ClientgenConfig {
    /// The part of the configuration the generation core reads.
    pub fn settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            client: self.client.clone(),
            naming: self.naming.clone(),
            types: self.types.clone(),
        }
    }
}

/// Settings consumed by a generation run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorSettings {
    pub client: ClientConfig,
    pub naming: NamingConfig,
    pub types: TypeSettings,
}

/// How operations are split into client classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientGrouping {
    /// Every operation in one client.
    SingleClient,
    /// One client per operation's first tag.
    #[default]
    FirstTag,
    /// One client per first path segment.
    PathSegment,
}

/// Client class options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub grouping: ClientGrouping,
    /// Class name template; `{controller}` is replaced with the group name.
    pub class_name: String,
    /// Class every generated client extends.
    pub base_class: Option<String>,
    /// Overrides the first server URL of the description.
    pub base_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            grouping: ClientGrouping::default(),
            class_name: "{controller}Client".to_string(),
            base_class: None,
            base_url: None,
        }
    }
}

impl ClientConfig {
    pub fn class_name_for(&self, controller: &str) -> String {
        self.class_name.replace("{controller}", controller)
    }
}

/// Naming strategy and aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub strategy: NamingStrategy,
    /// Map from resolved operation name (operationId or route-derived) to custom alias.
    pub aliases: IndexMap<String, String>,
}

/// How operation names are derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    #[default]
    UseOperationId,
    UseRouteBased,
}

/// How declared nullability shows up in generated types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    /// `T | null`
    #[default]
    Null,
    /// `T | undefined`
    Undefined,
    /// Nullability is dropped.
    Ignore,
}

impl NullHandling {
    pub fn marker(&self) -> Option<NullValue> {
        match self {
            NullHandling::Null => Some(NullValue::Null),
            NullHandling::Undefined => Some(NullValue::Undefined),
            NullHandling::Ignore => None,
        }
    }

    /// Literal written when a value is absent in conversion code.
    pub fn literal(&self) -> &'static str {
        match self {
            NullHandling::Undefined => "undefined",
            NullHandling::Null | NullHandling::Ignore => "null",
        }
    }
}

/// Type generation options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TypeSettings {
    pub default_style: TypeStyle,
    /// Per-type overrides keyed by generated type name.
    pub styles: IndexMap<String, TypeStyle>,
    pub null_handling: NullHandling,
}

impl TypeSettings {
    pub fn style_for(&self, type_name: &str) -> TypeStyle {
        self.styles
            .get(type_name)
            .copied()
            .unwrap_or(self.default_style)
    }
}

/// Hand-written code merged into generated classes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// TypeScript file whose classes are appended to generated classes of the same name.
    pub code_file: Option<String>,
    /// Inline code blocks keyed by class name.
    pub classes: IndexMap<String, String>,
    /// Classes with a hand-written subclass; generated as `<Name>Base`.
    pub extended: Vec<String>,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".clientgen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ClientgenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: ClientgenConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# clientgen configuration
input: openapi.yaml
output: src/api/client.ts

client:
  grouping: first_tag           # single_client | first_tag | path_segment
  class_name: "{controller}Client"
  # base_class: ClientBase      # class every generated client extends
  # base_url: https://api.example.com

naming:
  strategy: use_operation_id    # use_operation_id | use_route_based
  aliases: {}
    # listPets: all

types:
  default_style: class          # class | interface
  styles: {}
    # Pet: interface
  null_handling: "null"         # "null" | undefined | ignore

extensions:
  # code_file: src/api/client.extensions.ts
  classes: {}
  extended: []
"#
}
