use std::collections::HashSet;

use super::parameter::{Parameter, ParameterOrRef};
use super::request_body::{RequestBody, RequestBodyOrRef};
use super::response::{Response, ResponseOrRef};
use super::schema::{Schema, SchemaOrRef};
use super::spec::OpenApiSpec;
use crate::error::ResolveError;

/// A schema reached through zero or more `$ref` hops.
#[derive(Debug, Clone, Copy)]
pub struct SchemaTarget<'a> {
    /// Component name of the definition that holds the schema, if it was reached by reference.
    pub name: Option<&'a str>,
    pub schema: &'a Schema,
}

/// Borrowing `$ref` lookups against a document's `components`.
///
/// Nothing is cloned: every returned reference points into the document, so
/// callers can use addresses as identities for the lifetime of the borrow.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    spec: &'a OpenApiSpec,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &'a OpenApiSpec {
        self.spec
    }

    /// Follow `$ref` hops until a concrete schema is reached.
    pub fn schema(&self, schema_or_ref: &'a SchemaOrRef) -> Result<SchemaTarget<'a>, ResolveError> {
        let mut current = schema_or_ref;
        let mut name = None;
        let mut visited: HashSet<&str> = HashSet::new();

        loop {
            match current {
                SchemaOrRef::Schema(schema) => {
                    return Ok(SchemaTarget { name, schema });
                }
                SchemaOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let (key, target) = self
                        .spec
                        .components
                        .as_ref()
                        .and_then(|c| {
                            let target_name = parse_ref_name(ref_path, "schemas").ok()?;
                            c.schemas.get_key_value(target_name)
                        })
                        .ok_or_else(|| self.missing(ref_path, "schemas"))?;
                    name = Some(key.as_str());
                    current = target;
                }
            }
        }
    }

    pub fn parameter(&self, param: &'a ParameterOrRef) -> Result<&'a Parameter, ResolveError> {
        let mut current = param;
        let mut visited: HashSet<&str> = HashSet::new();
        loop {
            match current {
                ParameterOrRef::Parameter(p) => return Ok(p),
                ParameterOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "parameters")?;
                    current = self
                        .spec
                        .components
                        .as_ref()
                        .and_then(|c| c.parameters.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    pub fn request_body(&self, body: &'a RequestBodyOrRef) -> Result<&'a RequestBody, ResolveError> {
        let mut current = body;
        let mut visited: HashSet<&str> = HashSet::new();
        loop {
            match current {
                RequestBodyOrRef::RequestBody(rb) => return Ok(rb),
                RequestBodyOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "requestBodies")?;
                    current = self
                        .spec
                        .components
                        .as_ref()
                        .and_then(|c| c.request_bodies.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    pub fn response(&self, resp: &'a ResponseOrRef) -> Result<&'a Response, ResolveError> {
        let mut current = resp;
        let mut visited: HashSet<&str> = HashSet::new();
        loop {
            match current {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "responses")?;
                    current = self
                        .spec
                        .components
                        .as_ref()
                        .and_then(|c| c.responses.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    fn missing(&self, ref_path: &str, section: &str) -> ResolveError {
        match parse_ref_name(ref_path, section) {
            Ok(_) => ResolveError::RefTargetNotFound(ref_path.to_string()),
            Err(e) => e,
        }
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
pub fn parse_ref_name<'r>(ref_path: &'r str, expected_section: &str) -> Result<&'r str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const DOC: &str = r##"
openapi: "3.0.3"
info: { title: Refs, version: "1" }
paths: {}
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
    Animal:
      $ref: "#/components/schemas/Pet"
    Loop1:
      $ref: "#/components/schemas/Loop2"
    Loop2:
      $ref: "#/components/schemas/Loop1"
  parameters:
    Limit:
      $ref: "#/components/parameters/PageSize"
    PageSize:
      $ref: "#/components/parameters/Limit"
  requestBodies:
    Upload:
      $ref: "#/components/requestBodies/Import"
    Import:
      $ref: "#/components/requestBodies/Upload"
  responses:
    Gone:
      $ref: "#/components/responses/Gone"
    Moved:
      $ref: "#/components/responses/Relocated"
    Relocated:
      description: Relocated.
"##;

    #[test]
    fn test_parse_ref_name() {
        assert_eq!(
            parse_ref_name("#/components/schemas/Pet", "schemas").unwrap(),
            "Pet"
        );
        assert!(matches!(
            parse_ref_name("#/definitions/Pet", "schemas"),
            Err(ResolveError::InvalidRefFormat(_))
        ));
        assert!(matches!(
            parse_ref_name("#/components/responses/Pet", "schemas"),
            Err(ResolveError::InvalidRefFormat(_))
        ));
    }

    #[test]
    fn test_alias_chain_lands_on_concrete_definition() {
        let spec = parse::from_yaml(DOC).unwrap();
        let refs = RefResolver::new(&spec);
        let alias = SchemaOrRef::Ref {
            ref_path: "#/components/schemas/Animal".to_string(),
        };
        let target = refs.schema(&alias).unwrap();
        assert_eq!(target.name, Some("Pet"));
        assert!(target.schema.properties.contains_key("name"));
    }

    #[test]
    fn test_alias_cycle_is_an_error() {
        let spec = parse::from_yaml(DOC).unwrap();
        let refs = RefResolver::new(&spec);
        let looped = SchemaOrRef::Ref {
            ref_path: "#/components/schemas/Loop1".to_string(),
        };
        assert!(matches!(refs.schema(&looped), Err(ResolveError::CircularRef(_))));
    }

    #[test]
    fn test_component_ref_cycles_are_errors() {
        let spec = parse::from_yaml(DOC).unwrap();
        let refs = RefResolver::new(&spec);

        let param = ParameterOrRef::Ref {
            ref_path: "#/components/parameters/Limit".to_string(),
        };
        match refs.parameter(&param) {
            Err(ResolveError::CircularRef(path)) => {
                assert_eq!(path, "#/components/parameters/Limit")
            }
            other => panic!("expected CircularRef, got {other:?}"),
        }

        let body = RequestBodyOrRef::Ref {
            ref_path: "#/components/requestBodies/Upload".to_string(),
        };
        assert!(matches!(refs.request_body(&body), Err(ResolveError::CircularRef(_))));

        let gone = ResponseOrRef::Ref {
            ref_path: "#/components/responses/Gone".to_string(),
        };
        assert!(matches!(refs.response(&gone), Err(ResolveError::CircularRef(_))));
    }

    #[test]
    fn test_response_alias_chain() {
        let spec = parse::from_yaml(DOC).unwrap();
        let refs = RefResolver::new(&spec);
        let moved = ResponseOrRef::Ref {
            ref_path: "#/components/responses/Moved".to_string(),
        };
        assert_eq!(refs.response(&moved).unwrap().description, "Relocated.");
    }

    #[test]
    fn test_missing_target() {
        let spec = parse::from_yaml(DOC).unwrap();
        let refs = RefResolver::new(&spec);
        let missing = SchemaOrRef::Ref {
            ref_path: "#/components/schemas/Nope".to_string(),
        };
        match refs.schema(&missing) {
            Err(ResolveError::RefTargetNotFound(path)) => {
                assert_eq!(path, "#/components/schemas/Nope")
            }
            other => panic!("expected RefTargetNotFound, got {other:?}"),
        }
    }
}
