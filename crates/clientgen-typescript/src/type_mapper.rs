use clientgen_core::model::{ExceptionType, ResolvedType, TypeKind};

/// Where a type appears. Only changes how the built-in file type is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypePosition {
    /// Method parameter (`FileParameter`).
    Parameter,
    /// Raw request body (`Blob`).
    Body,
    /// Response payload (`FileResponse`).
    Response,
    /// Field of a generated type (`Blob`).
    Field,
}

/// Map a `ResolvedType` to its TypeScript type string representation.
pub fn ts_type(ty: &ResolvedType, position: TypePosition) -> String {
    let base = match &ty.kind {
        TypeKind::String => "string".to_string(),
        TypeKind::Number | TypeKind::Integer => "number".to_string(),
        TypeKind::Boolean => "boolean".to_string(),
        TypeKind::Named(named) => named.name.clone(),
        TypeKind::Array { item } => {
            let inner = ts_type(item, position);
            if inner.contains('|') {
                format!("({inner})[]")
            } else {
                format!("{inner}[]")
            }
        }
        TypeKind::Map { value } => {
            format!("{{ [key: string]: {}; }}", ts_type(value, position))
        }
        TypeKind::File => match position {
            TypePosition::Parameter => "FileParameter".to_string(),
            TypePosition::Response => "FileResponse".to_string(),
            TypePosition::Body | TypePosition::Field => "Blob".to_string(),
        },
        TypeKind::Any => return "any".to_string(),
    };
    match ty.null {
        Some(null) => format!("{base} | {}", null.literal()),
        None => base,
    }
}

/// Value type of a method's promise. No value maps to `void`.
pub fn result_ts(result: Option<&ResolvedType>) -> String {
    result.map_or_else(
        || "void".to_string(),
        |ty| ts_type(ty, TypePosition::Response),
    )
}

/// Union of everything an operation may reject with.
pub fn exception_ts(exception: &ExceptionType) -> String {
    let mut alternatives: Vec<String> = Vec::new();
    let rendered = exception
        .alternatives
        .iter()
        .map(|ty| ts_type(ty, TypePosition::Response));
    for ts in rendered.chain(exception.generic_fallback.then(|| "any".to_string())) {
        if !alternatives.contains(&ts) {
            alternatives.push(ts);
        }
    }
    if alternatives.is_empty() {
        alternatives.push("any".to_string());
    }
    alternatives.join(" | ")
}
