use indexmap::IndexMap;

use crate::config::ClientGrouping;
use crate::parse::operation::{HttpMethod, Operation, PathItem};
use crate::parse::parameter::ParameterOrRef;
use crate::parse::spec::OpenApiSpec;

/// An operation borrowed from the description, with its location.
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub method: HttpMethod,
    /// Parameters declared on the enclosing path item.
    pub path_parameters: &'a [ParameterOrRef],
    pub operation: &'a Operation,
}

impl<'a> OperationRef<'a> {
    /// Every operation of a description, in path then method order.
    pub fn collect(spec: &'a OpenApiSpec) -> Vec<OperationRef<'a>> {
        spec.paths
            .iter()
            .flat_map(|(path, item): (&'a String, &'a PathItem)| {
                item.operations().map(move |(method, operation)| OperationRef {
                    path: path.as_str(),
                    method,
                    path_parameters: &item.parameters,
                    operation,
                })
            })
            .collect()
    }
}

/// Group key used by the single-client mode.
pub const SINGLE_CLIENT_KEY: &str = "";

/// Split operations into client groups, in first-appearance order.
pub fn group_operations<'a>(
    operations: impl IntoIterator<Item = OperationRef<'a>>,
    grouping: ClientGrouping,
) -> IndexMap<String, Vec<OperationRef<'a>>> {
    let mut groups: IndexMap<String, Vec<OperationRef<'a>>> = IndexMap::new();
    for op in operations {
        let key = group_key(&op, grouping);
        groups.entry(key).or_default().push(op);
    }
    for (key, ops) in &groups {
        log::debug!("client group '{}' holds {} operation(s)", key, ops.len());
    }
    groups
}

fn group_key(op: &OperationRef<'_>, grouping: ClientGrouping) -> String {
    match grouping {
        ClientGrouping::SingleClient => SINGLE_CLIENT_KEY.to_string(),
        ClientGrouping::FirstTag => op
            .operation
            .tags
            .first()
            .cloned()
            .unwrap_or_else(|| extract_path_prefix(op.path)),
        ClientGrouping::PathSegment => extract_path_prefix(op.path),
    }
}

/// Extract the first non-parameter path segment.
/// `/pets/{id}` -> `pets`, `/{id}` -> `default`.
pub fn extract_path_prefix(path: &str) -> String {
    path.split('/')
        .find(|s| !s.is_empty() && !s.starts_with('{'))
        .unwrap_or("default")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(tags: &[&str]) -> Operation {
        Operation {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    fn at<'a>(path: &'a str, method: HttpMethod, operation: &'a Operation) -> OperationRef<'a> {
        OperationRef {
            path,
            method,
            path_parameters: &[],
            operation,
        }
    }

    #[test]
    fn test_extract_path_prefix() {
        assert_eq!(extract_path_prefix("/pets/{id}"), "pets");
        assert_eq!(extract_path_prefix("/{id}/pets"), "pets");
        assert_eq!(extract_path_prefix("/{id}"), "default");
        assert_eq!(extract_path_prefix("/"), "default");
    }

    #[test]
    fn test_group_by_first_tag_keeps_first_appearance_order() {
        let (a, b, c) = (op(&["store", "pets"]), op(&["pets"]), op(&[]));
        let ops = vec![
            at("/store/order", HttpMethod::Post, &a),
            at("/pets", HttpMethod::Get, &b),
            at("/users/{id}", HttpMethod::Get, &c),
        ];
        let groups = group_operations(ops, ClientGrouping::FirstTag);
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["store", "pets", "users"]);
    }

    #[test]
    fn test_single_client_groups_everything() {
        let (a, b) = (op(&["store"]), op(&["pets"]));
        let ops = vec![
            at("/store", HttpMethod::Get, &a),
            at("/pets", HttpMethod::Get, &b),
        ];
        let groups = group_operations(ops, ClientGrouping::SingleClient);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[SINGLE_CLIENT_KEY].len(), 2);
    }

    #[test]
    fn test_group_by_path_segment_ignores_tags() {
        let a = op(&["store"]);
        let ops = vec![at("/pets/{id}", HttpMethod::Get, &a)];
        let groups = group_operations(ops, ClientGrouping::PathSegment);
        assert!(groups.contains_key("pets"));
    }
}
