use std::collections::HashSet;

use crate::config::GeneratorSettings;
use crate::error::GenerateError;
use crate::model::{
    ClientModel, DefinitionKind, GenerationModel, GenerationOutput, NormalizedName,
    OperationModel, PreparedType, RenderedUnit,
};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::spec::OpenApiSpec;

use super::conversion::ConversionEmitter;
use super::extension::ExtensionBundle;
use super::grouping::{OperationRef, group_operations};
use super::name_normalizer::{normalize_name, type_name, unique_name};
use super::operation_builder::{OperationBuilder, operation_name, prepare};
use super::policy::MaterializationPolicy;
use super::type_resolver::TypeResolver;

/// Turns prepared models into target-language text.
pub trait ClientRenderer {
    type Error: std::error::Error + Send + Sync + 'static;

    fn render_client(&self, client: &ClientModel) -> Result<String, Self::Error>;

    fn render_type(&self, ty: &PreparedType<'_>) -> Result<String, Self::Error>;
}

/// Orchestrates one generation run over a description.
pub struct ClientEmitter<'a> {
    spec: &'a OpenApiSpec,
    settings: &'a GeneratorSettings,
    extensions: &'a ExtensionBundle,
}

impl<'a> ClientEmitter<'a> {
    pub fn new(
        spec: &'a OpenApiSpec,
        settings: &'a GeneratorSettings,
        extensions: &'a ExtensionBundle,
    ) -> Self {
        Self {
            spec,
            settings,
            extensions,
        }
    }

    /// Resolve every definition and operation, then prepare them for rendering.
    pub fn build_models(&self) -> Result<GenerationModel, GenerateError> {
        let refs = RefResolver::new(self.spec);
        let mut resolver = TypeResolver::new(refs, self.settings.types.clone());
        resolver.resolve_definitions()?;

        let operations = OperationRef::collect(self.spec);
        let groups = group_operations(operations, self.settings.client.grouping);
        let mut built: Vec<(String, Vec<OperationModel>)> = Vec::with_capacity(groups.len());
        for (key, operations) in &groups {
            let mut builder = OperationBuilder::new(&mut resolver);
            let mut taken = HashSet::new();
            let mut models = Vec::with_capacity(operations.len());
            for op in operations {
                let raw = operation_name(op, &self.settings.naming);
                let name = unique_operation_name(&raw, &mut taken);
                models.push(builder.build(op, name, key)?);
            }
            built.push((key.clone(), models));
        }

        let types = resolver.into_registry();
        log::debug!("{} type definition(s) registered", types.len());

        let clients = {
            let policy = MaterializationPolicy::new(&types);
            let null_literal = self.settings.types.null_handling.literal();
            let emitter = ConversionEmitter::new(policy, null_literal);
            let base_url = self
                .settings
                .client
                .base_url
                .clone()
                .unwrap_or_else(|| self.spec.default_base_url().to_string());

            // Client classes share the module namespace with the registered types.
            let mut taken: HashSet<String> = types.iter().map(|t| t.name.clone()).collect();
            built
                .into_iter()
                .map(|(key, models)| {
                    let controller = if key.is_empty() {
                        String::new()
                    } else {
                        type_name(&key)
                    };
                    let requested = self.settings.client.class_name_for(&controller);
                    let name = unique_name(&requested, &mut taken);
                    if name != requested {
                        log::warn!("client '{}' for group '{}' renamed to '{}'", requested, key, name);
                    }
                    ClientModel {
                        class_name: self.extensions.class_name_for(&name),
                        name,
                        base_class: self.settings.client.base_class.clone(),
                        base_url: base_url.clone(),
                        operations: models.into_iter().map(|m| prepare(m, &emitter)).collect(),
                    }
                })
                .collect()
        };

        Ok(GenerationModel { clients, types })
    }

    /// Render every type and client, merging extension code after each.
    pub fn emit<R: ClientRenderer>(
        &self,
        model: &GenerationModel,
        renderer: &R,
    ) -> Result<GenerationOutput, GenerateError> {
        let policy = MaterializationPolicy::new(&model.types);
        let emitter = ConversionEmitter::new(policy, self.settings.types.null_handling.literal());

        let mut types = Vec::with_capacity(model.types.len());
        for definition in model.types.iter() {
            let field_conversions = match &definition.kind {
                DefinitionKind::Object(object) => {
                    object.fields.iter().map(|f| emitter.emit_field(f)).collect()
                }
                DefinitionKind::Enum(_) => Vec::new(),
            };
            let prepared = PreparedType {
                definition,
                class_name: self.extensions.class_name_for(&definition.name),
                field_conversions,
            };
            let code = renderer
                .render_type(&prepared)
                .map_err(|source| render_error(&definition.name, source))?;
            types.push(RenderedUnit {
                name: definition.name.clone(),
                code: self.extensions.append(&definition.name, code),
            });
        }

        let mut clients = Vec::with_capacity(model.clients.len());
        for client in &model.clients {
            let code = renderer
                .render_client(client)
                .map_err(|source| render_error(&client.name, source))?;
            clients.push(RenderedUnit {
                name: client.name.clone(),
                code: self.extensions.append(&client.name, code),
            });
        }

        Ok(GenerationOutput {
            preamble: self.extensions.preamble().map(str::to_string),
            types,
            clients,
        })
    }

    /// Build and render in one go.
    pub fn generate<R: ClientRenderer>(
        &self,
        renderer: &R,
    ) -> Result<GenerationOutput, GenerateError> {
        let model = self.build_models()?;
        self.emit(&model, renderer)
    }
}

/// Operation names are unique within one client class.
fn unique_operation_name(raw: &str, taken: &mut HashSet<String>) -> NormalizedName {
    let mut name = normalize_name(raw);
    let unique = unique_name(&name.camel_case, taken);
    if unique != name.camel_case {
        let suffix = &unique[name.camel_case.len()..];
        name.pascal_case = format!("{}{suffix}", name.pascal_case);
        name.camel_case = unique;
    }
    name
}

fn render_error<E>(name: &str, source: E) -> GenerateError
where
    E: std::error::Error + Send + Sync + 'static,
{
    GenerateError::Render {
        name: name.to_string(),
        source: Box::new(source),
    }
}
