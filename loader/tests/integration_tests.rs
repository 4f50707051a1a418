//! End-to-end loading: schema documents referencing each other across files.

use std::fs;
use std::path::PathBuf;

use serde_json::json;

use conforma_core::{ValidateOptions, Validator};
use conforma_loader::FileLoader;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "conforma_loader_test_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn write(&self, name: &str, content: &serde_json::Value) -> PathBuf {
        let path = self.path.join(name);
        fs::write(&path, content.to_string()).expect("failed to write fixture");
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

#[test]
fn test_schema_loaded_from_file_uri() {
    let dir = TempDir::new("file_uri");
    let schema_path = dir.write("schema.json", &json!({"type": "integer"}));

    let mut validator = Validator::with_loader(Box::new(FileLoader::new()));
    let options = ValidateOptions::default();
    let uri = url::Url::from_file_path(&schema_path).unwrap();

    assert!(validator.validate(uri.as_str(), json!(7), &options).unwrap());
    assert!(!validator.validate(uri.as_str(), json!("7"), &options).unwrap());
}

#[test]
fn test_relative_reference_resolves_against_the_schema_file() {
    let dir = TempDir::new("relative_ref");
    dir.write("item.json", &json!({"type": "string", "minLength": 1}));
    let root_path = dir.write(
        "root.json",
        &json!({"type": "array", "items": {"$ref": "item.json"}}),
    );

    let mut validator = Validator::with_loader(Box::new(FileLoader::new()));
    let options = ValidateOptions::default();
    let uri = url::Url::from_file_path(&root_path).unwrap();

    assert!(validator
        .validate(uri.as_str(), json!(["a", "b"]), &options)
        .unwrap());
    assert!(!validator
        .validate(uri.as_str(), json!(["a", ""]), &options)
        .unwrap());
    assert!(!validator
        .validate(uri.as_str(), json!(["a", 3]), &options)
        .unwrap());
}

#[test]
fn test_fragment_reference_into_a_sibling_document() {
    let dir = TempDir::new("fragment_ref");
    dir.write(
        "defs.json",
        &json!({"definitions": {"port": {"type": "integer", "minimum": 1, "maximum": 65535}}}),
    );
    let root_path = dir.write(
        "root.json",
        &json!({
            "type": "object",
            "properties": {"port": {"$ref": "defs.json#/definitions/port", "required": true}}
        }),
    );

    let mut validator = Validator::with_loader(Box::new(FileLoader::new()));
    let options = ValidateOptions::default();
    let uri = url::Url::from_file_path(&root_path).unwrap();

    assert!(validator
        .validate(uri.as_str(), json!({"port": 8080}), &options)
        .unwrap());
    assert!(!validator
        .validate(uri.as_str(), json!({"port": 0}), &options)
        .unwrap());
    assert!(!validator.validate(uri.as_str(), json!({}), &options).unwrap());
}

#[test]
fn test_unresolvable_reference_surfaces_only_when_dereferenced() {
    let dir = TempDir::new("latent_ref");
    let root_path = dir.write(
        "root.json",
        &json!({
            "type": "object",
            "properties": {"a": {"$ref": "missing.json"}}
        }),
    );

    let mut validator = Validator::with_loader(Box::new(FileLoader::new()));
    let options = ValidateOptions::default();
    let uri = url::Url::from_file_path(&root_path).unwrap();

    // The broken reference sits behind an absent property: never exercised.
    assert!(validator.validate(uri.as_str(), json!({}), &options).unwrap());
    // Present property forces the dereference, which now fails.
    assert!(!validator
        .validate(uri.as_str(), json!({"a": 1}), &options)
        .unwrap());
}
