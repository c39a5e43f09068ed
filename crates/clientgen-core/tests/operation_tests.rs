use clientgen_core::config::{ClientGrouping, GeneratorSettings, NamingStrategy};
use clientgen_core::model::{
    CollectionFormat, GenerationModel, ParameterKind, PreparedOperation, ResolvedType, StatusCode,
    TypeKind, TypeStyle,
};
use clientgen_core::parse;
use clientgen_core::transform::{ClientEmitter, ExtensionBundle};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const FILES: &str = include_str!("fixtures/files.yaml");

fn build_with(yaml: &str, settings: &GeneratorSettings) -> GenerationModel {
    let spec = parse::from_yaml(yaml).unwrap();
    let extensions = ExtensionBundle::default();
    ClientEmitter::new(&spec, settings, &extensions)
        .build_models()
        .unwrap()
}

fn find<'m>(model: &'m GenerationModel, name: &str) -> &'m PreparedOperation {
    model
        .clients
        .iter()
        .flat_map(|c| &c.operations)
        .find(|op| op.name.camel_case == name)
        .unwrap_or_else(|| panic!("no operation {name}"))
}

fn alternative_names(op: &PreparedOperation) -> Vec<&str> {
    op.exception_type
        .alternatives
        .iter()
        .map(|t| t.named().map(|n| n.name.as_str()).unwrap_or("?"))
        .collect()
}

#[test]
fn no_error_responses_yield_generic_marker_alone() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let delete = find(&model, "deletePet");
    assert!(delete.exception_type.is_generic_only());
    assert!(delete.exception_type.generic_fallback);
    assert_eq!(delete.result_type, None);
}

#[test]
fn typed_error_responses_in_declaration_order() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let get = find(&model, "getPet");
    assert_eq!(alternative_names(get), vec!["NotFound", "Error"]);
    assert!(get.exception_type.generic_fallback);

    let create = find(&model, "createPet");
    assert_eq!(alternative_names(create), vec!["ValidationError", "Error"]);
}

#[test]
fn repeated_error_types_keep_one_alternative_per_response() {
    let yaml = r##"
openapi: "3.0.3"
info: { title: Errors, version: "1" }
paths:
  /items:
    get:
      operationId: listItems
      responses:
        "200":
          description: ok
        "404":
          description: missing
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Error" }
        "409":
          description: untyped
          content:
            application/json: {}
        "500":
          description: failed
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Error" }
components:
  schemas:
    Error:
      type: object
      properties:
        message: { type: string }
"##;
    let model = build_with(yaml, &GeneratorSettings::default());
    let list = find(&model, "listItems");
    let alternatives = &list.exception_type.alternatives;
    assert_eq!(alternatives.len(), 3);
    assert_eq!(alternatives[0].named().unwrap().name, "Error");
    assert!(alternatives[1].is_any());
    assert_eq!(alternatives[2], alternatives[0]);
    assert!(list.exception_type.generic_fallback);
}

#[test]
fn default_response_is_last_alternative() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let list = find(&model, "listPets");
    assert_eq!(alternative_names(list), vec!["Error"]);
    let default = list.default_response.as_ref().unwrap();
    assert_eq!(default.response.status, StatusCode::Default);
    assert_eq!(default.bindings.source, "resultDataDefault");
    assert_eq!(
        default.conversion.as_deref(),
        Some("resultDefault = resultDataDefault ? Error.fromJS(resultDataDefault) : <any>null;")
    );
}

#[test]
fn range_status_counts_as_error_alternative() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let order = find(&model, "placeOrder");
    assert_eq!(alternative_names(order), vec!["Error"]);
    assert_eq!(order.responses[1].response.status, StatusCode::Range(4));
    assert_eq!(order.responses[1].bindings.target, "result4XX");
}

#[test]
fn success_without_body_yields_no_value() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let touch = find(&model, "touchPet");
    assert_eq!(touch.result_type, None);
    assert_eq!(alternative_names(touch), vec!["NotFound"]);
    assert!(touch.responses[0].is_success);
    assert!(!touch.responses[0].materialize);
    assert_eq!(touch.responses[0].conversion, None);
}

#[test]
fn binary_response_is_a_file() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let download = find(&model, "downloadPetImage");
    assert_eq!(download.result_type, Some(ResolvedType::file()));
    assert!(!download.responses[0].materialize);
}

#[test]
fn file_parameters_follow_collection_format() {
    let model = build_with(FILES, &GeneratorSettings::default());
    let upload = find(&model, "uploadDocuments");
    let params: Vec<(&str, ParameterKind, &ResolvedType)> = upload
        .parameters
        .iter()
        .map(|p| {
            (
                p.parameter.original_name.as_str(),
                p.parameter.kind,
                &p.parameter.param_type,
            )
        })
        .collect();

    let single_file = ResolvedType::file();
    let many_files = ResolvedType::array(ResolvedType::file());
    let text = ResolvedType::new(TypeKind::String);
    assert_eq!(
        params,
        vec![
            ("single", ParameterKind::File, &single_file),
            ("many", ParameterKind::File, &many_files),
            ("joined", ParameterKind::File, &single_file),
            ("hinted", ParameterKind::File, &many_files),
            ("unhinted", ParameterKind::File, &single_file),
            ("title", ParameterKind::Form, &text),
        ]
    );
    assert!(upload.parameters.iter().all(|p| !p.materialize));
    assert_eq!(
        upload.parameters[1].parameter.collection_format,
        Some(CollectionFormat::Multi)
    );
    assert_eq!(
        upload.parameters[4].parameter.collection_format,
        Some(CollectionFormat::Csv)
    );
}

#[test]
fn binary_request_body_is_a_file_body() {
    let model = build_with(FILES, &GeneratorSettings::default());
    let replace = find(&model, "replaceContent");
    let body = &replace.parameters[1].parameter;
    assert_eq!(body.kind, ParameterKind::Body);
    assert_eq!(body.original_name, "body");
    assert_eq!(body.param_type, ResolvedType::file());
}

#[test]
fn multipart_body_becomes_form_and_file_parameters() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let upload = find(&model, "uploadPetImage");
    let kinds: Vec<(&str, ParameterKind, bool)> = upload
        .parameters
        .iter()
        .map(|p| {
            (
                p.parameter.original_name.as_str(),
                p.parameter.kind,
                p.parameter.required,
            )
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("petId", ParameterKind::Path, true),
            ("image", ParameterKind::File, true),
            ("thumbnails", ParameterKind::File, false),
            ("caption", ParameterKind::Form, false),
        ]
    );
    assert_eq!(
        upload.parameters[2].parameter.param_type,
        ResolvedType::array(ResolvedType::file())
    );
}

#[test]
fn class_style_with_generator_materializes() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let get = find(&model, "getPet");
    assert!(get.responses[0].materialize);
    assert_eq!(
        get.responses[0].conversion.as_deref(),
        Some("result200 = resultData200 ? Pet.fromJS(resultData200) : <any>null;")
    );

    let create = find(&model, "createPet");
    let body = create
        .parameters
        .iter()
        .find(|p| p.parameter.kind == ParameterKind::Body)
        .unwrap();
    assert!(body.materialize);

    let list = find(&model, "listPets");
    assert!(list.responses[0].materialize);
    assert!(
        list.responses[0]
            .conversion
            .as_deref()
            .unwrap()
            .starts_with("if (Array.isArray(resultData200)) {")
    );
}

#[test]
fn interface_style_never_materializes() {
    let mut settings = GeneratorSettings::default();
    settings
        .types
        .styles
        .insert("Pet".to_string(), TypeStyle::Interface);
    let model = build_with(PETSTORE, &settings);

    assert!(model.types.has_generator("Pet"));
    let get = find(&model, "getPet");
    assert!(!get.responses[0].materialize);
    assert_eq!(get.responses[0].conversion, None);
    assert_eq!(
        get.result_type.as_ref().unwrap().named().unwrap().style,
        TypeStyle::Interface
    );

    // Other types keep the default style.
    assert!(get.responses[1].materialize);
}

#[test]
fn structural_default_style_materializes_nothing() {
    let mut settings = GeneratorSettings::default();
    settings.types.default_style = TypeStyle::Interface;
    let model = build_with(PETSTORE, &settings);
    let all_responses = model
        .clients
        .iter()
        .flat_map(|c| &c.operations)
        .flat_map(|op| op.responses.iter().chain(&op.default_response));
    for response in all_responses {
        assert!(!response.materialize);
        assert_eq!(response.conversion, None);
    }
}

#[test]
fn dictionary_of_primitives_is_not_materialized() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let inventory = find(&model, "getInventory");
    assert_eq!(
        inventory.result_type,
        Some(ResolvedType::map(ResolvedType::new(TypeKind::Integer)))
    );
    assert!(!inventory.responses[0].materialize);
}

#[test]
fn clients_are_grouped_by_first_tag() {
    let model = build_with(PETSTORE, &GeneratorSettings::default());
    let clients: Vec<(&str, usize)> = model
        .clients
        .iter()
        .map(|c| (c.class_name.as_str(), c.operations.len()))
        .collect();
    assert_eq!(clients, vec![("PetsClient", 7), ("StoreClient", 2)]);
    assert_eq!(model.clients[0].base_url, "https://petstore.example.com/v1");
}

#[test]
fn single_client_with_custom_template_and_base() {
    let mut settings = GeneratorSettings::default();
    settings.client.grouping = ClientGrouping::SingleClient;
    settings.client.class_name = "PetstoreApi{controller}".to_string();
    settings.client.base_class = Some("ApiBase".to_string());
    settings.client.base_url = Some("http://localhost:8080".to_string());
    let model = build_with(PETSTORE, &settings);

    assert_eq!(model.clients.len(), 1);
    let client = &model.clients[0];
    assert_eq!(client.class_name, "PetstoreApi");
    assert_eq!(client.base_class.as_deref(), Some("ApiBase"));
    assert_eq!(client.base_url, "http://localhost:8080");
    assert_eq!(client.operations.len(), 9);
}

#[test]
fn route_based_names_with_alias_are_unique_per_client() {
    let mut settings = GeneratorSettings::default();
    settings.client.grouping = ClientGrouping::SingleClient;
    settings.naming.strategy = NamingStrategy::UseRouteBased;
    settings
        .naming
        .aliases
        .insert("createPets".to_string(), "listPetsImage".to_string());
    let model = build_with(PETSTORE, &settings);
    let names: Vec<&str> = model.clients[0]
        .operations
        .iter()
        .map(|op| op.name.camel_case.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "listPets",
            "listPetsImage",
            "getPet",
            "updatePet",
            "deletePet",
            "listPetsImage2",
            "createPetsImage",
            "listStoreInventory",
            "createStoreOrders",
        ]
    );
}

#[test]
fn colliding_client_names_are_made_unique() {
    let yaml = r##"
openapi: "3.0.3"
info: { title: Tags, version: "1" }
paths:
  /stores:
    get:
      operationId: listStores
      tags: [pet-store]
      responses:
        "204": { description: ok }
  /stores/open:
    get:
      operationId: listOpenStores
      tags: [pet_store]
      responses:
        "204": { description: ok }
  /pets:
    get:
      operationId: listPets
      tags: [Pet]
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { $ref: "#/components/schemas/Pet" }
components:
  schemas:
    Pet:
      type: object
      properties:
        name: { type: string }
"##;
    let mut settings = GeneratorSettings::default();
    let model = build_with(yaml, &settings);
    let names: Vec<&str> = model.clients.iter().map(|c| c.class_name.as_str()).collect();
    assert_eq!(names, vec!["PetStoreClient", "PetStoreClient2", "PetClient"]);

    settings.client.class_name = "{controller}".to_string();
    let model = build_with(yaml, &settings);
    let names: Vec<&str> = model.clients.iter().map(|c| c.class_name.as_str()).collect();
    assert_eq!(names, vec!["PetStore", "PetStore2", "Pet2"]);
    assert!(model.types.has_generator("Pet"));
}
