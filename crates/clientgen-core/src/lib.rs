pub mod config;
pub mod error;
pub mod model;
pub mod parse;
pub mod transform;

use config::GeneratorSettings;
use parse::spec::OpenApiSpec;
use transform::ExtensionBundle;

/// A generated file with path and content.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Trait for code generators that produce files from a parsed description.
pub trait CodeGenerator {
    type Error: std::error::Error;
    fn generate(
        &self,
        spec: &OpenApiSpec,
        settings: &GeneratorSettings,
        extensions: &ExtensionBundle,
    ) -> Result<Vec<GeneratedFile>, Self::Error>;
}
