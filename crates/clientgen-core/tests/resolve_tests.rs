use clientgen_core::config::GeneratorSettings;
use clientgen_core::error::{GenerateError, ResolveError};
use clientgen_core::model::{DefinitionKind, ResolvedType, TypeKind};
use clientgen_core::parse;
use clientgen_core::transform::{ClientEmitter, ExtensionBundle};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const CYCLIC: &str = include_str!("fixtures/cyclic.yaml");
const BROKEN: &str = include_str!("fixtures/broken-refs.yaml");

fn build(yaml: &str) -> Result<clientgen_core::model::GenerationModel, GenerateError> {
    let spec = parse::from_yaml(yaml).unwrap();
    let settings = GeneratorSettings::default();
    let extensions = ExtensionBundle::default();
    ClientEmitter::new(&spec, &settings, &extensions).build_models()
}

#[test]
fn definitions_register_once_in_visitation_order() {
    let model = build(PETSTORE).unwrap();
    let names: Vec<&str> = model.types.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Pet",
            "PetStatus",
            "Category",
            "Tag",
            "NewPet",
            "Order",
            "Error",
            "NotFound",
            "ValidationError",
        ]
    );
}

#[test]
fn shared_definition_resolves_to_one_identity() {
    let model = build(PETSTORE).unwrap();
    let pets = &model.clients[0];
    let list = &pets.operations[0];
    let get = &pets.operations[2];
    assert_eq!(list.name.camel_case, "listPets");
    assert_eq!(get.name.camel_case, "getPet");

    let listed = list.result_type.as_ref().unwrap();
    let fetched = get.result_type.as_ref().unwrap();
    assert_eq!(listed, &ResolvedType::array(fetched.clone()));
    assert_eq!(fetched.named().unwrap().name, "Pet");

    let order = model.types.get("Order").unwrap();
    let DefinitionKind::Object(order) = &order.kind else {
        panic!("expected object");
    };
    assert_eq!(&order.fields[1].field_type, fetched);
}

#[test]
fn repeated_runs_are_identical() {
    let first = build(PETSTORE).unwrap();
    let second = build(PETSTORE).unwrap();
    assert_eq!(first.clients, second.clients);
    let first_names: Vec<&str> = first.types.iter().map(|d| d.name.as_str()).collect();
    let second_names: Vec<&str> = second.types.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(first_names, second_names);
}

#[test]
fn self_referencing_definition_terminates() {
    let model = build(CYCLIC).unwrap();
    let tree = model.types.get("TreeNode").unwrap();
    let DefinitionKind::Object(tree) = &tree.kind else {
        panic!("expected object");
    };
    let node = tree.fields[1].field_type.clone();
    assert_eq!(node.named().unwrap().name, "TreeNode");
    assert_eq!(tree.fields[2].field_type, ResolvedType::array(node.clone()));
    assert_eq!(tree.fields[3].field_type, ResolvedType::map(node));
}

#[test]
fn mutual_references_and_wrappers_resolve_to_shared_types() {
    let model = build(CYCLIC).unwrap();
    let names: Vec<&str> = model.types.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["TreeNode", "Employee", "Department"]);

    let clients: Vec<&str> = model.clients.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(clients, vec!["TreeClient", "DepartmentsClient"]);
    let department = model.clients[1].operations[0].result_type.as_ref().unwrap();
    assert_eq!(department.named().unwrap().name, "Department");

    let employee = model.types.get("Employee").unwrap();
    let DefinitionKind::Object(employee) = &employee.kind else {
        panic!("expected object");
    };
    assert_eq!(&employee.fields[1].field_type, department);
}

#[test]
fn inline_dictionary_of_arrays() {
    let model = build(PETSTORE).unwrap();
    let validation = model.types.get("ValidationError").unwrap();
    let DefinitionKind::Object(validation) = &validation.kind else {
        panic!("expected object");
    };
    assert_eq!(validation.base.as_ref().unwrap().name, "Error");
    assert_eq!(
        validation.fields[0].field_type,
        ResolvedType::map(ResolvedType::array(ResolvedType::new(TypeKind::String)))
    );
}

#[test]
fn missing_reference_reports_operation() {
    match build(BROKEN) {
        Err(GenerateError::Operation {
            method,
            path,
            source: ResolveError::RefTargetNotFound(target),
        }) => {
            assert_eq!(method, "GET");
            assert_eq!(path, "/things");
            assert_eq!(target, "#/components/schemas/Thing");
        }
        other => panic!("expected operation error, got {other:?}"),
    }
}

#[test]
fn alias_cycle_reports_definition() {
    let yaml = r##"
openapi: "3.0.3"
info: { title: Loop, version: "1" }
paths: {}
components:
  schemas:
    A: { $ref: "#/components/schemas/B" }
    B: { $ref: "#/components/schemas/A" }
"##;
    let err = build(yaml).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Definition {
            source: ResolveError::CircularRef(_),
            ..
        }
    ));
    assert!(err.to_string().starts_with("failed to resolve definition A"));
}
