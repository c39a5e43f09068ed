use clientgen_core::model::{
    ClientModel, CollectionFormat, ParameterKind, PreparedOperation, PreparedParameter,
    PreparedResponse, StatusCode, TypeKind,
};
use minijinja::{Value, context};

use super::js_string;
use crate::type_mapper::{TypePosition, exception_ts, result_ts, ts_type};

const ERROR_MESSAGE: &str = "A server side error occurred.";
const UNEXPECTED_MESSAGE: &str = "An unexpected server error occurred.";

/// Template context for one client class.
pub fn client_context(client: &ClientModel) -> Value {
    let operations: Vec<Value> = client.operations.iter().map(operation_context).collect();
    context! {
        class_name => client.class_name.clone(),
        base_class => client.base_class.clone(),
        base_url => js_string(&client.base_url),
        transform_options => client.base_class.is_some(),
        operations => operations,
    }
}

fn operation_context(op: &PreparedOperation) -> Value {
    let result_type = result_ts(op.result_type.as_ref());
    let params: Vec<&PreparedParameter> = op
        .parameters
        .iter()
        .filter(|p| {
            let sent = p.parameter.kind != ParameterKind::Cookie;
            if !sent {
                log::debug!(
                    "cookie parameter '{}' of {} is left to the browser",
                    p.parameter.original_name,
                    op.name.camel_case
                );
            }
            sent
        })
        .collect();

    let signature: Vec<String> = params.iter().map(|p| signature_part(p)).collect();
    let path_params: Vec<Value> = params
        .iter()
        .filter(|p| p.parameter.kind == ParameterKind::Path)
        .map(|p| {
            context! {
                name => p.parameter.name.camel_case.clone(),
                placeholder => js_string(&format!("{{{}}}", p.parameter.original_name)),
            }
        })
        .collect();
    let query_params: Vec<Value> = params
        .iter()
        .filter(|p| p.parameter.kind == ParameterKind::Query)
        .map(|p| field_context(p))
        .collect();
    let form_params: Vec<Value> = params
        .iter()
        .filter(|p| matches!(p.parameter.kind, ParameterKind::Form | ParameterKind::File))
        .map(|p| field_context(p))
        .collect();

    let body = if !form_params.is_empty() {
        Some(context! { kind => "form" })
    } else {
        params
            .iter()
            .find(|p| p.parameter.kind == ParameterKind::Body)
            .map(|p| {
                let kind = if p.parameter.param_type.is_file() { "blob" } else { "json" };
                context! { kind => kind, name => p.parameter.name.camel_case.clone() }
            })
    };

    context! {
        method_name => op.name.camel_case.clone(),
        process_name => format!("process{}", op.name.pascal_case),
        http_method => op.method.as_str(),
        path => js_string(&op.path),
        has_query => !query_params.is_empty(),
        signature => signature.join(", "),
        result_type => result_type.clone(),
        docs => doc_lines(op, &params),
        path_params => path_params,
        query_params => query_params,
        form_params => form_params,
        body => body,
        headers => header_entries(op, &params),
        branches => branches(op, &result_type),
    }
}

fn param_position(p: &PreparedParameter) -> TypePosition {
    if p.parameter.kind == ParameterKind::Body {
        TypePosition::Body
    } else {
        TypePosition::Parameter
    }
}

fn signature_part(p: &PreparedParameter) -> String {
    let ty = ts_type(&p.parameter.param_type, param_position(p));
    let name = &p.parameter.name.camel_case;
    if p.parameter.required || ty.ends_with("| undefined") {
        format!("{name}: {ty}")
    } else {
        format!("{name}: {ty} | undefined")
    }
}

/// Query and form parameters share the same value plumbing.
fn field_context(p: &PreparedParameter) -> Value {
    let parameter = &p.parameter;
    let is_array = matches!(parameter.param_type.kind, TypeKind::Array { .. });
    let multi = is_array
        && parameter
            .collection_format
            .is_none_or(|cf| cf == CollectionFormat::Multi);
    let separator = parameter
        .collection_format
        .filter(|_| is_array)
        .and_then(|cf| cf.separator())
        .map(js_string);
    context! {
        name => parameter.name.camel_case.clone(),
        original_name => js_string(&parameter.original_name),
        required => parameter.required,
        file => parameter.kind == ParameterKind::File,
        multi => multi,
        separator => separator,
    }
}

fn header_entries(op: &PreparedOperation, params: &[&PreparedParameter]) -> Vec<String> {
    let mut headers: Vec<String> = params
        .iter()
        .filter(|p| p.parameter.kind == ParameterKind::Header)
        .map(|p| {
            let name = &p.parameter.name.camel_case;
            format!(
                "{}: {name} !== undefined && {name} !== null ? \"\" + {name} : \"\"",
                js_string(&p.parameter.original_name)
            )
        })
        .collect();

    if let Some(body) = params.iter().find(|p| p.parameter.kind == ParameterKind::Body) {
        let content_type = if body.parameter.param_type.is_file() {
            "application/octet-stream"
        } else {
            "application/json"
        };
        headers.push(format!("\"Content-Type\": \"{content_type}\""));
    }

    match &op.result_type {
        Some(ty) if ty.kind == TypeKind::File => {
            headers.push("\"Accept\": \"application/octet-stream\"".to_string())
        }
        Some(_) => headers.push("\"Accept\": \"application/json\"".to_string()),
        None => {}
    }
    headers
}

fn doc_lines(op: &PreparedOperation, params: &[&PreparedParameter]) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(op.summary.iter().flat_map(|s| s.lines()).map(String::from));
    lines.extend(op.description.iter().flat_map(|s| s.lines()).map(String::from));
    if op.deprecated {
        lines.push("@deprecated".to_string());
    }
    for p in params {
        let mut line = format!("@param {}", p.parameter.name.camel_case);
        if !p.parameter.required {
            line.push_str(" (optional)");
        }
        if let Some(description) = &p.parameter.description {
            line.push(' ');
            line.push_str(description.lines().next().unwrap_or_default());
        }
        lines.push(line);
    }
    let success = op
        .responses
        .iter()
        .find(|r| r.is_success)
        .and_then(|r| r.response.description.as_deref());
    match success {
        Some(description) => lines.push(format!("@return {description}")),
        None => lines.push("@return".to_string()),
    }
    lines.push(format!("@throws {{{}}}", exception_ts(&op.exception_type)));
    lines
}

/// Status branches of the generated `process*` method, in declaration
/// order, closed by the default response or a catch-all for unexpected
/// statuses.
fn branches(op: &PreparedOperation, result_type: &str) -> Vec<Value> {
    let empty_return = if result_type == "void" {
        "return;"
    } else {
        "return <any>null;"
    };
    let mut branches: Vec<Value> = op
        .responses
        .iter()
        .enumerate()
        .map(|(i, r)| {
            response_branch(r, opening(i, Some(&condition(&r.response.status))), empty_return)
        })
        .collect();

    let fallback = match op.default_response {
        Some(_) => opening(branches.len(), None),
        None => opening(branches.len(), unexpected_condition(op).as_deref()),
    };
    branches.push(match &op.default_response {
        Some(default) => response_branch(default, fallback, empty_return),
        None => context! {
            opening => fallback,
            kind => "error",
            message => js_string(UNEXPECTED_MESSAGE),
        },
    });
    branches
}

fn opening(index: usize, condition: Option<&str>) -> String {
    match (index, condition) {
        (0, Some(condition)) => format!("if ({condition}) {{"),
        (0, None) => "{".to_string(),
        (_, Some(condition)) => format!("}} else if ({condition}) {{"),
        (_, None) => "} else {".to_string(),
    }
}

/// Guard of the catch-all branch: anything outside the declared success
/// statuses is unexpected. Without declared successes every status is.
fn unexpected_condition(op: &PreparedOperation) -> Option<String> {
    let guards: Vec<String> = op
        .responses
        .iter()
        .filter(|r| r.is_success)
        .map(|r| match r.response.status {
            StatusCode::Exact(code) => format!("status !== {code}"),
            ref range => format!("!({})", condition(range)),
        })
        .collect();
    (!guards.is_empty()).then(|| guards.join(" && "))
}

fn condition(status: &StatusCode) -> String {
    match status {
        StatusCode::Exact(code) => format!("status === {code}"),
        StatusCode::Range(class) => {
            let low = u16::from(*class) * 100;
            format!("status >= {low} && status < {}", low + 100)
        }
        StatusCode::Default => "true".to_string(),
    }
}

fn response_branch(r: &PreparedResponse, opening: String, empty_return: &str) -> Value {
    let message = js_string(r.response.description.as_deref().unwrap_or(ERROR_MESSAGE));
    let kind = match &r.response.response_type {
        None if r.is_success => "empty",
        None => "error",
        Some(ty) if ty.kind == TypeKind::File => {
            if r.is_success {
                "file"
            } else {
                "error"
            }
        }
        Some(_) if r.is_success || r.response.has_typed_body() => "json",
        Some(_) => "error",
    };
    context! {
        opening => opening,
        kind => kind,
        is_success => r.is_success,
        source => r.bindings.source.clone(),
        target => r.bindings.target.clone(),
        conversion => r.conversion.clone(),
        message => message,
        empty_return => empty_return,
    }
}
