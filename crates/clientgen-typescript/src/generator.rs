use clientgen_core::config::GeneratorSettings;
use clientgen_core::parse::spec::OpenApiSpec;
use clientgen_core::transform::{ClientEmitter, ExtensionBundle};
use clientgen_core::{CodeGenerator, GeneratedFile};

use crate::emitters::TypeScriptRenderer;
use crate::error::TypeScriptError;

/// Generates a single TypeScript module holding every client, type and
/// helper.
pub struct TypeScriptGenerator {
    file_name: String,
}

impl TypeScriptGenerator {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Default for TypeScriptGenerator {
    fn default() -> Self {
        Self::new("client.ts")
    }
}

impl CodeGenerator for TypeScriptGenerator {
    type Error = TypeScriptError;

    fn generate(
        &self,
        spec: &OpenApiSpec,
        settings: &GeneratorSettings,
        extensions: &ExtensionBundle,
    ) -> Result<Vec<GeneratedFile>, TypeScriptError> {
        let renderer = TypeScriptRenderer::new()?;
        let output = ClientEmitter::new(spec, settings, extensions).generate(&renderer)?;
        log::info!(
            "rendered {} client(s) and {} type(s)",
            output.clients.len(),
            output.types.len()
        );
        let content = renderer.render_file(&output, &spec.info)?;
        Ok(vec![GeneratedFile {
            path: self.file_name.clone(),
            content,
        }])
    }
}
