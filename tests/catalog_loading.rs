//! Loading connector descriptors from a directory.

mod helpers;

use std::fs;

use flowsmith::catalog::builtin::builtin_catalog;
use flowsmith::catalog::loader::load_dir;
use flowsmith::catalog::{CatalogError, Category, NodeCatalog};
use flowsmith::codegen::{compile_at, ENTRY_FILE};
use flowsmith::validate::{self, has_errors};
use helpers::*;
use serde_json::json;

const NOTION: &str = r#"{
  "app": "notion",
  "operations": [
    {
      "operation": "create_page",
      "name": "Create page",
      "category": "action",
      "description": "Create a page in a Notion database",
      "params": [
        { "name": "database_id", "kind": "string", "required": true },
        { "name": "title", "kind": "string", "required": true }
      ],
      "scopes": ["https://www.googleapis.com/auth/script.external_request"],
      "implementationHint": "POST https://api.notion.com/v1/pages"
    }
  ]
}"#;

#[test]
fn loads_descriptors_and_extends_builtins() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notion.json"), NOTION).unwrap();
    fs::write(dir.path().join("README.txt"), "not a descriptor").unwrap();

    let mut catalog = builtin_catalog();
    let before = catalog.len();
    let loaded = load_dir(&mut catalog, dir.path()).unwrap();

    assert_eq!(loaded, 1);
    assert_eq!(catalog.len(), before + 1);
    let nt = catalog.lookup("notion.create_page").unwrap();
    assert_eq!(nt.category, Category::Action);
    assert_eq!(nt.app, "notion");
    let caps = catalog.capabilities();
    assert!(caps.schemas_by_type["notion.create_page"].get("title").unwrap().required);
}

#[test]
fn loaded_type_without_rule_compiles_to_stub() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("notion.json"), NOTION).unwrap();
    let mut catalog = builtin_catalog();
    load_dir(&mut catalog, dir.path()).unwrap();

    let graph = graph_of(
        &[
            ("start", "builtin.manual", json!({})),
            ("page", "notion.create_page", json!({ "database_id": "db", "title": "Hello" })),
        ],
        &[("start", "page")],
    )
    .with_derived_fields(&catalog);
    assert!(!has_errors(&validate::validate(&graph, &catalog)));

    let output = compile_at(&graph, &catalog, fixed_time()).unwrap();
    assert_eq!(output.warnings.len(), 1);
    let code = &output.file(ENTRY_FILE).unwrap().content;
    assert!(code.contains("POST https://api.notion.com/v1/pages"));
}

#[test]
fn malformed_descriptor_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "{ \"app\": ").unwrap();

    let mut catalog = NodeCatalog::new();
    match load_dir(&mut catalog, dir.path()) {
        Err(CatalogError::Descriptor { file, .. }) => assert!(file.ends_with("broken.json"), "{file}"),
        other => panic!("expected descriptor error, got {:?}", other),
    }
}

#[test]
fn empty_directory_leaves_catalog_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut catalog = NodeCatalog::new();
    assert_eq!(load_dir(&mut catalog, dir.path()).unwrap(), 0);
    assert_eq!(catalog.ensure_ready(), Err(CatalogError::Empty));
}
