use crate::model::{
    FieldDefinition, NamedKind, ResolvedType, ResponseBindings, StatusCode, TypeKind,
};

use super::policy::MaterializationPolicy;

const INDENT: &str = "    ";

/// Emits TypeScript statements that turn decoded JSON values into
/// instances of generated classes.
///
/// Fragments are multi-line; the first line carries no indentation so
/// templates can place them at any depth.
#[derive(Debug, Clone, Copy)]
pub struct ConversionEmitter<'p> {
    policy: MaterializationPolicy<'p>,
    null_literal: &'static str,
}

impl<'p> ConversionEmitter<'p> {
    pub fn new(policy: MaterializationPolicy<'p>, null_literal: &'static str) -> Self {
        Self {
            policy,
            null_literal,
        }
    }

    pub fn policy(&self) -> &MaterializationPolicy<'p> {
        &self.policy
    }

    /// Statements assigning the converted `source` to `target`, or `None`
    /// when the raw decoded value is used as-is.
    pub fn emit(&self, ty: &ResolvedType, source: &str, target: &str) -> Option<String> {
        if !self.policy.should_materialize(ty) {
            return None;
        }
        let mut out = Vec::new();
        self.assign(ty, source, target, 0, 0, &mut out);
        Some(out.join("\n"))
    }

    /// Initializer statements for a field of a generated class.
    pub fn emit_field(&self, field: &FieldDefinition) -> Option<String> {
        let source = format!("_data[\"{}\"]", field.original_name);
        let target = format!("this.{}", field.name.camel_case);
        self.emit(&field.field_type, &source, &target)
    }

    fn assign(
        &self,
        ty: &ResolvedType,
        source: &str,
        target: &str,
        depth: usize,
        indent: usize,
        out: &mut Vec<String>,
    ) {
        let null = self.null_literal;
        match &ty.kind {
            TypeKind::Named(named) if named.kind == NamedKind::Object => push(
                out,
                indent,
                format!("{target} = {source} ? {}.fromJS({source}) : <any>{null};", named.name),
            ),
            TypeKind::Array { item } => {
                let var = binding("item", depth);
                push(out, indent, format!("if (Array.isArray({source})) {{"));
                push(out, indent + 1, format!("{target} = [] as any;"));
                match self.element(item, &var, false) {
                    Some(expr) => {
                        push(out, indent + 1, format!("for (let {var} of {source})"));
                        push(out, indent + 2, format!("{target}!.push({expr});"));
                    }
                    None => {
                        let temp = binding("converted", depth);
                        push(out, indent + 1, format!("for (let {var} of {source}) {{"));
                        push(out, indent + 2, format!("let {temp}: any;"));
                        self.assign(item, &var, &temp, depth + 1, indent + 2, out);
                        push(out, indent + 2, format!("{target}!.push({temp});"));
                        push(out, indent + 1, "}".to_string());
                    }
                }
                self.close_else(target, indent, out);
            }
            TypeKind::Map { value } => {
                let key = binding("key", depth);
                let element = format!("{source}[{key}]");
                push(out, indent, format!("if ({source}) {{"));
                push(out, indent + 1, format!("{target} = {{}} as any;"));
                push(out, indent + 1, format!("for (let {key} in {source}) {{"));
                push(out, indent + 2, format!("if ({source}.hasOwnProperty({key}))"));
                match self.element(value, &element, true) {
                    Some(expr) => {
                        push(out, indent + 3, format!("(<any>{target})![{key}] = {expr};"));
                    }
                    None => {
                        let temp = binding("converted", depth);
                        push(out, indent + 2, "{".to_string());
                        push(out, indent + 3, format!("let {temp}: any;"));
                        self.assign(value, &element, &temp, depth + 1, indent + 3, out);
                        push(out, indent + 3, format!("(<any>{target})![{key}] = {temp};"));
                        push(out, indent + 2, "}".to_string());
                    }
                }
                push(out, indent + 1, "}".to_string());
                self.close_else(target, indent, out);
            }
            _ => push(out, indent, format!("{target} = {source};")),
        }
    }

    /// Single-expression conversion of a collection element, if one exists.
    fn element(&self, ty: &ResolvedType, source: &str, guarded: bool) -> Option<String> {
        match &ty.kind {
            TypeKind::Named(named) if named.kind == NamedKind::Object => {
                let construct = format!("{}.fromJS({source})", named.name);
                if guarded {
                    Some(format!("{source} ? {construct} : <any>{}", self.null_literal))
                } else {
                    Some(construct)
                }
            }
            TypeKind::Array { .. } | TypeKind::Map { .. } => None,
            _ => Some(source.to_string()),
        }
    }

    fn close_else(&self, target: &str, indent: usize, out: &mut Vec<String>) {
        push(out, indent, "}".to_string());
        push(out, indent, "else {".to_string());
        push(out, indent + 1, format!("{target} = <any>{};", self.null_literal));
        push(out, indent, "}".to_string());
    }
}

/// Bindings for a response body, qualified by status so several responses
/// can live in one generated method.
pub fn response_bindings(status: &StatusCode) -> ResponseBindings {
    let suffix = status.binding_suffix();
    ResponseBindings {
        source: format!("resultData{suffix}"),
        target: format!("result{suffix}"),
    }
}

/// Loop and temporary bindings are qualified by nesting depth.
fn binding(base: &str, depth: usize) -> String {
    if depth == 0 {
        base.to_string()
    } else {
        format!("{base}{depth}")
    }
}

fn push(out: &mut Vec<String>, indent: usize, line: String) {
    out.push(format!("{}{line}", INDENT.repeat(indent)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        DefinitionKind, EnumDefinition, NamedType, ObjectDefinition, TypeDefinition, TypeRegistry,
        TypeStyle,
    };
    use crate::transform::name_normalizer::normalize_name;

    fn named(name: &str, kind: NamedKind, style: TypeStyle) -> ResolvedType {
        ResolvedType::new(TypeKind::Named(NamedType {
            name: name.to_string(),
            kind,
            style,
        }))
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::default();
        registry.reserve(TypeDefinition {
            name: "Pet".to_string(),
            description: None,
            style: TypeStyle::Class,
            kind: DefinitionKind::Object(ObjectDefinition::default()),
        });
        registry.reserve(TypeDefinition {
            name: "Status".to_string(),
            description: None,
            style: TypeStyle::Class,
            kind: DefinitionKind::Enum(EnumDefinition::default()),
        });
        registry
    }

    fn pet() -> ResolvedType {
        named("Pet", NamedKind::Object, TypeStyle::Class)
    }

    #[test]
    fn test_structural_values_emit_nothing() {
        let registry = registry();
        let emitter = ConversionEmitter::new(MaterializationPolicy::new(&registry), "null");
        assert_eq!(
            emitter.emit(&ResolvedType::new(TypeKind::String), "a", "b"),
            None
        );
        let interface = named("Pet", NamedKind::Object, TypeStyle::Interface);
        assert_eq!(emitter.emit(&interface, "a", "b"), None);
    }

    #[test]
    fn test_object_conversion() {
        let registry = registry();
        let emitter = ConversionEmitter::new(MaterializationPolicy::new(&registry), "null");
        assert_eq!(
            emitter.emit(&pet(), "resultData200", "result200").unwrap(),
            "result200 = resultData200 ? Pet.fromJS(resultData200) : <any>null;"
        );
    }

    #[test]
    fn test_enum_passes_through() {
        let registry = registry();
        let emitter = ConversionEmitter::new(MaterializationPolicy::new(&registry), "null");
        let status = named("Status", NamedKind::Enum, TypeStyle::Class);
        assert_eq!(emitter.emit(&status, "s", "t").unwrap(), "t = s;");
    }

    #[test]
    fn test_array_conversion() {
        let registry = registry();
        let emitter = ConversionEmitter::new(MaterializationPolicy::new(&registry), "null");
        let code = emitter
            .emit(&ResolvedType::array(pet()), "resultData200", "result200")
            .unwrap();
        let expected = [
            "if (Array.isArray(resultData200)) {",
            "    result200 = [] as any;",
            "    for (let item of resultData200)",
            "        result200!.push(Pet.fromJS(item));",
            "}",
            "else {",
            "    result200 = <any>null;",
            "}",
        ]
        .join("\n");
        assert_eq!(code, expected);
    }

    #[test]
    fn test_map_conversion_uses_undefined_literal() {
        let registry = registry();
        let emitter = ConversionEmitter::new(MaterializationPolicy::new(&registry), "undefined");
        let code = emitter
            .emit(&ResolvedType::map(pet()), "_data[\"pets\"]", "this.pets")
            .unwrap();
        let expected = [
            "if (_data[\"pets\"]) {",
            "    this.pets = {} as any;",
            "    for (let key in _data[\"pets\"]) {",
            "        if (_data[\"pets\"].hasOwnProperty(key))",
            "            (<any>this.pets)![key] = _data[\"pets\"][key] ? Pet.fromJS(_data[\"pets\"][key]) : <any>undefined;",
            "    }",
            "}",
            "else {",
            "    this.pets = <any>undefined;",
            "}",
        ]
        .join("\n");
        assert_eq!(code, expected);
    }

    #[test]
    fn test_nested_array_uses_depth_qualified_bindings() {
        let registry = registry();
        let emitter = ConversionEmitter::new(MaterializationPolicy::new(&registry), "null");
        let nested = ResolvedType::array(ResolvedType::array(pet()));
        let code = emitter.emit(&nested, "src", "dst").unwrap();
        insta::assert_snapshot!(code, @r"
if (Array.isArray(src)) {
    dst = [] as any;
    for (let item of src) {
        let converted: any;
        if (Array.isArray(item)) {
            converted = [] as any;
            for (let item1 of item)
                converted!.push(Pet.fromJS(item1));
        }
        else {
            converted = <any>null;
        }
        dst!.push(converted);
    }
}
else {
    dst = <any>null;
}
");
    }

    #[test]
    fn test_field_initializer() {
        let registry = registry();
        let emitter = ConversionEmitter::new(MaterializationPolicy::new(&registry), "null");
        let field = FieldDefinition {
            name: normalize_name("best_friend"),
            original_name: "best_friend".to_string(),
            field_type: pet(),
            required: false,
            read_only: false,
            description: None,
        };
        assert_eq!(
            emitter.emit_field(&field).unwrap(),
            "this.bestFriend = _data[\"best_friend\"] ? Pet.fromJS(_data[\"best_friend\"]) : <any>null;"
        );
    }

    #[test]
    fn test_response_bindings_are_status_qualified() {
        let bindings = response_bindings(&StatusCode::Exact(404));
        assert_eq!(bindings.source, "resultData404");
        assert_eq!(bindings.target, "result404");
        let default = response_bindings(&StatusCode::Default);
        assert_eq!(default.source, "resultDataDefault");
        assert_eq!(default.target, "resultDefault");
    }
}
