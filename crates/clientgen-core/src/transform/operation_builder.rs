use std::collections::HashSet;

use crate::config::{NamingConfig, NamingStrategy};
use crate::error::{GenerateError, ResolveError};
use crate::model::{
    CollectionFormat, ExceptionType, NormalizedName, OperationModel, ParameterKind,
    ParameterModel, PreparedOperation, PreparedParameter, PreparedResponse, ResolvedType,
    ResponseModel, StatusCode, TypeKind,
};
use crate::parse::media_type::is_json;
use crate::parse::parameter::{Parameter, ParameterLocation, ParameterOrRef};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{SchemaOrRef, SchemaType, TypeSet};

use super::conversion::{ConversionEmitter, response_bindings};
use super::grouping::OperationRef;
use super::name_normalizer::{normalize_name, route_to_name, type_name, unique_name};
use super::type_resolver::TypeResolver;

/// Name an operation per the naming strategy, then apply any alias.
pub fn operation_name(op: &OperationRef<'_>, naming: &NamingConfig) -> String {
    let resolved = match (naming.strategy, &op.operation.operation_id) {
        (NamingStrategy::UseOperationId, Some(id)) => id.clone(),
        _ => route_to_name(op.method.as_str(), op.path),
    };
    match naming.aliases.get(&resolved) {
        Some(alias) => alias.clone(),
        None => resolved,
    }
}

/// Builds [`OperationModel`]s, registering every type they reach.
pub struct OperationBuilder<'r, 'a> {
    resolver: &'r mut TypeResolver<'a>,
}

impl<'r, 'a> OperationBuilder<'r, 'a> {
    pub fn new(resolver: &'r mut TypeResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn build(
        &mut self,
        op: &OperationRef<'a>,
        name: NormalizedName,
        group: &str,
    ) -> Result<OperationModel, GenerateError> {
        self.build_inner(op, name, group)
            .map_err(|source| GenerateError::Operation {
                method: op.method.as_str(),
                path: op.path.to_string(),
                source,
            })
    }

    fn build_inner(
        &mut self,
        op: &OperationRef<'a>,
        name: NormalizedName,
        group: &str,
    ) -> Result<OperationModel, ResolveError> {
        let owner = name.pascal_case.clone();
        let parameters = self.build_parameters(op, &owner)?;
        let (responses, default_response) = self.build_responses(op, &owner)?;

        // The first success response decides, even when it has no body.
        let result_type = responses
            .iter()
            .find(|r| r.status.is_success())
            .and_then(|r| r.response_type.clone());
        let exception_type = exception_type(&responses, default_response.as_ref());

        Ok(OperationModel {
            name,
            method: op.method,
            path: op.path.to_string(),
            group: group.to_string(),
            summary: op.operation.summary.clone(),
            description: op.operation.description.clone(),
            deprecated: op.operation.deprecated.unwrap_or(false),
            parameters,
            responses,
            default_response,
            result_type,
            exception_type,
        })
    }

    fn build_parameters(
        &mut self,
        op: &OperationRef<'a>,
        owner: &str,
    ) -> Result<Vec<ParameterModel>, ResolveError> {
        let refs = self.resolver.refs();
        let declared = merge_parameters(refs, op.path_parameters, &op.operation.parameters)?;
        let mut parameters = Vec::with_capacity(declared.len());
        for param in declared {
            parameters.push(self.build_parameter(param, owner)?);
        }

        if let Some(body) = &op.operation.request_body {
            let body = self.resolver.refs().request_body(body)?;
            if let Some((_, media)) = body.json_content() {
                let original = body.name.clone().unwrap_or_else(|| "body".to_string());
                let hint = format!("{owner}Body");
                let param_type = match &media.schema {
                    Some(schema) => self.resolver.resolve(schema, false, &hint)?,
                    None => ResolvedType::any(),
                };
                parameters.push(ParameterModel {
                    name: normalize_name(&original),
                    original_name: original,
                    kind: ParameterKind::Body,
                    nullable: param_type.null.is_some(),
                    param_type,
                    required: body.required,
                    collection_format: None,
                    description: body.description.clone(),
                });
            } else if let Some((_, media)) = body.form_content() {
                if let Some(schema) = &media.schema {
                    parameters.extend(self.build_form_fields(schema, owner)?);
                }
            }
        }

        dedupe_parameter_names(&mut parameters);
        Ok(parameters)
    }

    fn build_parameter(
        &mut self,
        param: &'a Parameter,
        owner: &str,
    ) -> Result<ParameterModel, ResolveError> {
        let is_file = match &param.schema {
            Some(schema) => self.resolver.is_file_shape(schema)?,
            None => false,
        };
        let collection_format = self.collection_format(param)?;
        let declared_multi = param
            .collection_format
            .as_deref()
            .and_then(CollectionFormat::parse)
            == Some(CollectionFormat::Multi);
        let kind = match param.location {
            ParameterLocation::Path => ParameterKind::Path,
            ParameterLocation::Query => ParameterKind::Query,
            ParameterLocation::Header => ParameterKind::Header,
            ParameterLocation::Cookie => ParameterKind::Cookie,
            ParameterLocation::Body => ParameterKind::Body,
            ParameterLocation::FormData if is_file => ParameterKind::File,
            ParameterLocation::FormData => ParameterKind::Form,
        };

        let declared_nullable = param.nullable.unwrap_or(false);
        let param_type = match (&param.schema, kind) {
            (_, ParameterKind::File) => ResolvedType::file_upload(declared_multi),
            (Some(schema), _) => {
                let hint = format!("{owner}{}", type_name(&param.name));
                self.resolver.resolve(schema, declared_nullable, &hint)?
            }
            (None, _) => ResolvedType::any(),
        };

        Ok(ParameterModel {
            name: normalize_name(&param.name),
            original_name: param.name.clone(),
            kind,
            nullable: declared_nullable || param_type.null.is_some(),
            param_type,
            required: param.required || kind == ParameterKind::Path,
            collection_format,
            description: param.description.clone(),
        })
    }

    /// One parameter per property of a form body.
    fn build_form_fields(
        &mut self,
        schema: &'a SchemaOrRef,
        owner: &str,
    ) -> Result<Vec<ParameterModel>, ResolveError> {
        let target = self.resolver.refs().schema(schema)?;
        let mut fields = Vec::new();
        for (prop_name, prop) in &target.schema.properties {
            let is_array = self.is_array(prop)?;
            let collection_format = is_array.then_some(CollectionFormat::Multi);
            let (kind, param_type) = if self.resolver.is_file_shape(prop)? {
                (ParameterKind::File, ResolvedType::file_upload(is_array))
            } else {
                let hint = format!("{owner}{}", type_name(prop_name));
                (ParameterKind::Form, self.resolver.resolve(prop, false, &hint)?)
            };
            fields.push(ParameterModel {
                name: normalize_name(prop_name),
                original_name: prop_name.clone(),
                kind,
                nullable: param_type.null.is_some(),
                param_type,
                required: target.schema.required.contains(prop_name),
                collection_format,
                description: None,
            });
        }
        Ok(fields)
    }

    fn build_responses(
        &mut self,
        op: &OperationRef<'a>,
        owner: &str,
    ) -> Result<(Vec<ResponseModel>, Option<ResponseModel>), ResolveError> {
        let mut responses = Vec::new();
        let mut default_response = None;

        for (key, response) in &op.operation.responses {
            let Some(status) = StatusCode::parse(key) else {
                log::warn!(
                    "{} {}: skipping response with unknown status '{}'",
                    op.method.as_str(),
                    op.path,
                    key
                );
                continue;
            };
            let response = self.resolver.refs().response(response)?;
            let nullable = response.nullable.unwrap_or(false);
            let hint = if status.is_success() {
                format!("{owner}Response")
            } else {
                format!("{owner}{}Response", status.binding_suffix())
            };

            let response_type = match response.body() {
                None => None,
                Some((content_type, media)) => match &media.schema {
                    Some(schema) => Some(self.resolver.resolve(schema, nullable, &hint)?),
                    None if is_json(content_type) => Some(ResolvedType::any()),
                    None => Some(ResolvedType::file()),
                },
            };

            let model = ResponseModel {
                status,
                nullable: nullable || response_type.as_ref().is_some_and(|t| t.null.is_some()),
                response_type,
                description: Some(response.description.clone()).filter(|d| !d.is_empty()),
            };
            if status == StatusCode::Default {
                default_response = Some(model);
            } else {
                responses.push(model);
            }
        }

        Ok((responses, default_response))
    }

    /// Explicit `collectionFormat` wins; otherwise derived from `style`/`explode`.
    /// A `formData` parameter without either keeps the `csv` default.
    fn collection_format(
        &self,
        param: &'a Parameter,
    ) -> Result<Option<CollectionFormat>, ResolveError> {
        if let Some(declared) = &param.collection_format {
            let parsed = CollectionFormat::parse(declared);
            if parsed.is_none() {
                log::warn!(
                    "parameter '{}' has unknown collectionFormat '{}'",
                    param.name,
                    declared
                );
            }
            return Ok(parsed);
        }

        let is_array = match &param.schema {
            Some(schema) => self.is_array(schema)?,
            None => false,
        };
        if !is_array {
            return Ok(None);
        }

        let format = match param.location {
            ParameterLocation::FormData if param.style.is_none() => Some(CollectionFormat::Csv),
            ParameterLocation::Query | ParameterLocation::FormData => {
                match param.style.as_deref().unwrap_or("form") {
                    "form" if param.explode.unwrap_or(true) => Some(CollectionFormat::Multi),
                    "form" => Some(CollectionFormat::Csv),
                    "spaceDelimited" => Some(CollectionFormat::Ssv),
                    "pipeDelimited" => Some(CollectionFormat::Pipes),
                    _ => None,
                }
            }
            ParameterLocation::Path | ParameterLocation::Header => Some(CollectionFormat::Csv),
            ParameterLocation::Cookie | ParameterLocation::Body => None,
        };
        Ok(format)
    }

    fn is_array(&self, schema: &'a SchemaOrRef) -> Result<bool, ResolveError> {
        let target = self.resolver.refs().schema(schema)?;
        Ok(target
            .schema
            .schema_type
            .as_ref()
            .and_then(TypeSet::primary)
            == Some(SchemaType::Array))
    }
}

/// Path-item parameters first; an operation parameter with the same
/// `(name, in)` replaces the path-item one in place.
fn merge_parameters<'a>(
    refs: RefResolver<'a>,
    path_parameters: &'a [ParameterOrRef],
    operation_parameters: &'a [ParameterOrRef],
) -> Result<Vec<&'a Parameter>, ResolveError> {
    let mut merged: Vec<&'a Parameter> = Vec::new();
    for param in path_parameters {
        merged.push(refs.parameter(param)?);
    }
    for param in operation_parameters {
        let param = refs.parameter(param)?;
        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(existing) => *existing = param,
            None => merged.push(param),
        }
    }
    Ok(merged)
}

/// Generated bindings must be distinct even when a path and query
/// parameter share a name.
fn dedupe_parameter_names(parameters: &mut [ParameterModel]) {
    let mut taken = HashSet::new();
    for param in parameters.iter_mut() {
        let unique = unique_name(&param.name.camel_case, &mut taken);
        param.name.camel_case = unique;
    }
}

/// One alternative per non-success response with a body, in declaration
/// order, the default response last, with the generic fallback always present.
fn exception_type(responses: &[ResponseModel], default: Option<&ResponseModel>) -> ExceptionType {
    let alternatives = responses
        .iter()
        .filter(|r| !r.status.is_success())
        .chain(default)
        .filter_map(|r| r.response_type.clone())
        .collect();
    ExceptionType {
        alternatives,
        generic_fallback: true,
    }
}

/// Attach materialization decisions and conversion code to a built model.
pub fn prepare(model: OperationModel, emitter: &ConversionEmitter<'_>) -> PreparedOperation {
    let policy = emitter.policy();
    let parameters = model
        .parameters
        .into_iter()
        .map(|parameter| PreparedParameter {
            materialize: parameter.kind != ParameterKind::File
                && !matches!(parameter.param_type.kind, TypeKind::File)
                && policy.should_materialize(&parameter.param_type),
            parameter,
        })
        .collect();

    let prepare_response = |response: ResponseModel| {
        let bindings = response_bindings(&response.status);
        let (materialize, conversion) = match &response.response_type {
            Some(ty) => (
                policy.should_materialize(ty),
                emitter.emit(ty, &bindings.source, &bindings.target),
            ),
            None => (false, None),
        };
        PreparedResponse {
            is_success: response.status.is_success(),
            materialize,
            bindings,
            conversion,
            response,
        }
    };

    PreparedOperation {
        name: model.name,
        method: model.method,
        path: model.path,
        group: model.group,
        summary: model.summary,
        description: model.description,
        deprecated: model.deprecated,
        parameters,
        responses: model.responses.into_iter().map(&prepare_response).collect(),
        default_response: model.default_response.map(&prepare_response),
        result_type: model.result_type,
        exception_type: model.exception_type,
    }
}
