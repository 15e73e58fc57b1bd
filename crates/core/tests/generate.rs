#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use socg_core::{
    generate, generate_model, CallInfo, Document, DocumentError, Error, Filter, GenerateContext,
    MemoryWriter, OutputLayout,
};

const PETSTORE: &str = r##"{
  "openapi": "3.0.1",
  "info": { "title": "Petstore", "version": "1.0.0" },
  "tags": [
    { "name": "Pets", "description": "Pet operations" },
    { "name": "Store" },
    { "name": "Admin" }
  ],
  "paths": {
    "/": { "get": { "tags": ["Pets"] } },
    "/api/pets": {
      "get": {
        "tags": ["Pets"],
        "summary": "List pets",
        "parameters": [
          { "name": "limit", "in": "query", "schema": { "type": "integer" } },
          { "name": "status", "in": "query", "required": true, "schema": { "$ref": "#/components/schemas/Status" } }
        ],
        "responses": { "200": { "content": { "application/json": {
          "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Pet" } }
        } } } }
      },
      "post": {
        "tags": ["Pets"],
        "summary": "Create a pet",
        "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewPet" } } } },
        "responses": { "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } } }
      }
    },
    "/api/pets/{petId}": {
      "get": {
        "tags": ["Pets"],
        "summary": "Get a pet",
        "parameters": [{ "name": "petId", "in": "path", "required": true, "description": "pet id", "schema": { "type": "integer" } }],
        "responses": { "200": { "description": "no body" } }
      }
    },
    "/api/store/inventory": {
      "get": {
        "tags": ["Store"],
        "responses": { "200": { "content": { "application/json": {
          "schema": { "type": "object", "additionalProperties": { "type": "integer" } }
        } } } }
      }
    },
    "/api/untagged": { "get": {} }
  },
  "components": {
    "schemas": {
      "Pet": {
        "type": "object",
        "description": "A pet in the store",
        "properties": {
          "name": { "type": "string", "description": "Display name" },
          "id": { "type": "integer" },
          "tag": { "type": "string", "nullable": true },
          "status": { "$ref": "#/components/schemas/Status" }
        }
      },
      "NewPet": {
        "type": "object",
        "properties": { "name": { "type": "string" } }
      },
      "Status": { "type": "string", "enum": ["available", "pending", "sold"] }
    }
  }
}"##;

fn template(call: &CallInfo) -> String {
    let mut args = vec![call.url.clone()];
    if let Some(query) = call.query {
        args.push(format!("{{ params: {query} }}"));
    }
    if let Some(body) = call.body {
        args.push(body.to_string());
    }
    format!("http.{}<{}>({})", call.method, call.response, args.join(", "))
}

fn ctx() -> GenerateContext {
    GenerateContext::new(template)
}

fn layout() -> OutputLayout {
    OutputLayout::new(Some(PathBuf::from("src/api")), None).unwrap()
}

fn run(doc: &Document, ctx: &GenerateContext) -> MemoryWriter {
    let writer = MemoryWriter::new();
    generate(doc, ctx, &layout(), &writer).unwrap();
    writer
}

#[test]
fn generates_model_and_tag_modules() {
    let doc = Document::from_json(PETSTORE).unwrap();
    let writer = run(&doc, &ctx());

    assert_eq!(
        writer.paths(),
        vec![
            PathBuf::from("src/api/model.ts"),
            PathBuf::from("src/api/pets/index.ts"),
            PathBuf::from("src/api/pets/model.ts"),
            PathBuf::from("src/api/store/index.ts"),
        ]
    );

    let model = writer.get("src/api/model.ts").unwrap();
    let expected_model = "/** A pet in the store */
export interface Pet {
  /** Display name */
  name: string;
  id: number;
  tag?: string;
  status: Status;
}

export interface NewPet {
  name: string;
}

export enum Status {
  Enum_0 = \"available\",
  Enum_1 = \"pending\",
  Enum_2 = \"sold\",
}
";
    assert_eq!(model, expected_model);

    let pets = writer.get("src/api/pets/index.ts").unwrap();
    let expected_pets = "import { GetApiPetsQuery } from \"./model\";
import { Pet, NewPet } from \"../model\";

/** List pets */
export function getApiPets(query: GetApiPetsQuery) {
  return http.get<Pet[]>(\"/api/pets\", { params: query });
}

/** Create a pet */
export function postApiPets(data: NewPet) {
  return http.post<Pet>(\"/api/pets\", data);
}

/**
 * Get a pet
 * @param petId pet id
 */
export function getApiPetsByPetId(petId: number) {
  return http.get<unknown>(`/api/pets/${petId}`);
}
";
    assert_eq!(pets, expected_pets);

    let query = writer.get("src/api/pets/model.ts").unwrap();
    assert!(query.starts_with("import { Status } from \"../model\";\n\n"));
    assert!(query.contains("export interface GetApiPetsQuery {"));
    assert!(query.contains("  limit?: number;\n"));
    assert!(query.contains("  status: Status;\n"));

    let store = writer.get("src/api/store/index.ts").unwrap();
    assert!(store.contains("export function getApiStoreInventory() {"));
    assert!(store.contains("http.get<{\n  [prop: string]: number;\n}>"));
    assert!(!store.contains("import"));
}

#[test]
fn regeneration_is_idempotent() {
    let doc = Document::from_json(PETSTORE).unwrap();
    let first = run(&doc, &ctx()).snapshot();
    let second = run(&doc, &ctx()).snapshot();
    assert_eq!(first, second);
}

#[test]
fn generate_report_counts() {
    let doc = Document::from_json(PETSTORE).unwrap();
    let writer = MemoryWriter::new();
    let report = generate(&doc, &ctx(), &layout(), &writer).unwrap();
    assert_eq!(report.model, Some(PathBuf::from("src/api/model.ts")));
    assert_eq!(report.tags.len(), 2);
    assert_eq!(report.function_count(), 4);
    assert_eq!(report.file_count(), 4);
}

#[test]
fn generate_empties_the_output_directory() {
    let doc = Document::from_json(PETSTORE).unwrap();
    let writer = MemoryWriter::new();
    socg_core::FileWriter::write_file(&writer, Path::new("src/api/stale/index.ts"), "old").unwrap();
    socg_core::FileWriter::write_file(&writer, Path::new("README.md"), "keep").unwrap();
    generate(&doc, &ctx(), &layout(), &writer).unwrap();
    assert!(writer.get("src/api/stale/index.ts").is_none());
    assert_eq!(writer.get("README.md").as_deref(), Some("keep"));
}

#[test]
fn endpoint_filter_limits_output() {
    let doc = Document::from_json(PETSTORE).unwrap();
    let ctx = GenerateContext::builder()
        .template(template)
        .filter_endpoint(Filter::allow_list(["/api/store/inventory"]))
        .build()
        .unwrap();
    let writer = run(&doc, &ctx);
    assert!(writer.get("src/api/pets/index.ts").is_none());
    assert!(writer.get("src/api/store/index.ts").is_some());
}

#[test]
fn tag_filter_limits_output() {
    let doc = Document::from_json(PETSTORE).unwrap();
    let ctx = GenerateContext::builder()
        .template(template)
        .filter_tag(Filter::predicate(|tag| tag == "Admin"))
        .build()
        .unwrap();
    let writer = run(&doc, &ctx);
    // Admin owns no operations, so only the model module is written.
    assert_eq!(writer.paths(), vec![PathBuf::from("src/api/model.ts")]);
}

#[test]
fn document_without_paths_is_rejected() {
    let doc = Document::from_json(
        r#"{ "paths": {}, "components": { "schemas": { "A": { "type": "string" } } } }"#,
    )
    .unwrap();
    let writer = MemoryWriter::new();
    let err = generate(&doc, &ctx(), &layout(), &writer).unwrap_err();
    assert!(matches!(err, Error::Document(DocumentError::NoPaths)));
    // The model step is independent of the endpoint step.
    assert!(writer.get("src/api/model.ts").is_some());
}

#[test]
fn document_without_schemas_still_generates_endpoints() {
    let doc = Document::from_json(r#"{ "paths": { "/ping": { "get": { "tags": ["Health"] } } } }"#)
        .unwrap();
    let writer = MemoryWriter::new();
    let report = generate(&doc, &ctx(), &layout(), &writer).unwrap();
    assert!(report.model.is_none());
    assert!(writer.get("src/api/health/index.ts").is_some());

    let err = generate_model(&doc, Path::new("model.ts"), &writer).unwrap_err();
    assert!(matches!(err, Error::Document(DocumentError::NoSchemas)));
}

#[test]
fn broken_operation_is_skipped() {
    let doc = Document::from_json(
        r#"{ "paths": {
  "/bad": { "get": { "tags": ["T"], "responses": { "200": { "content": { "application/json": { "schema": { "type": "array" } } } } } } },
  "/good": { "get": { "tags": ["T"] } }
} }"#,
    )
    .unwrap();
    let writer = run(&doc, &ctx());
    let module = writer.get("src/api/t/index.ts").unwrap();
    assert!(!module.contains("getBad"));
    assert!(module.contains("export function getGood() {"));
}

#[test]
fn template_failure_is_fatal() {
    struct Failing;
    impl socg_core::CallTemplate for Failing {
        fn render(&self, _call: &CallInfo) -> Result<String, String> {
            Err("boom".to_string())
        }
    }
    let doc = Document::from_json(PETSTORE).unwrap();
    let writer = MemoryWriter::new();
    let err = generate(&doc, &GenerateContext::new(Failing), &layout(), &writer).unwrap_err();
    assert!(matches!(err, Error::Render { what: "template", .. }));
}
