//! Eager schema-graph construction.
//!
//! Before validation begins, the engine walks the root schema once to make
//! every dereferenceable document available: subschemas carrying an `id` are
//! registered under that identifier, and `$ref` targets missing from the
//! registry are fetched through the loader, decoded, registered, and walked
//! in turn. References are never expanded in place; resolution stays lazy at
//! validation time, which is what makes cyclic schema graphs workable.

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::loader::SchemaLoader;
use crate::registry::SchemaRegistry;
use crate::resolver::{registry_key, resolve_reference, without_fragment};
use crate::schema::Schema;
use url::Url;

/// Positions whose mapping value is a single subschema.
const MAPPING_POSITIONS: &[&str] = &["additionalProperties", "additionalItems"];

/// Positions whose value maps arbitrary names to subschemas.
const KEYED_POSITIONS: &[&str] = &["properties", "patternProperties"];

/// Walks `schema` and registers or loads everything it can reach.
///
/// Loader failures are swallowed here: a reference that cannot be fetched is
/// only an error if validation actually dereferences it. Decode failures of
/// fetched schema text are structural and propagate.
pub(crate) fn build_graph(
    schema: &Schema,
    registry: &mut SchemaRegistry,
    loader: &dyn SchemaLoader,
) -> Result<()> {
    walk(schema.root(), schema.uri(), registry, loader)
}

fn walk(
    node: &Value,
    base: &Url,
    registry: &mut SchemaRegistry,
    loader: &dyn SchemaLoader,
) -> Result<()> {
    let Some(map) = node.as_object() else {
        return Ok(());
    };

    // An `id` gives this subschema its own registry entry and rebases every
    // reference beneath it.
    let rebased;
    let base = if let Some(id) = map.get("id").and_then(Value::as_str) {
        rebased = without_fragment(&resolve_reference(id, base));
        registry.register(Schema::new(node.clone(), rebased.clone()));
        &rebased
    } else {
        base
    };

    if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
        preload_reference(reference, base, registry, loader)?;
    }

    for keyword in ["type", "disallow"] {
        if let Some(declarations) = map.get(keyword).and_then(Value::as_array) {
            for declaration in declarations {
                walk(declaration, base, registry, loader)?;
            }
        }
    }

    for keyword in KEYED_POSITIONS {
        if let Some(entries) = map.get(*keyword).and_then(Value::as_object) {
            for subschema in entries.values() {
                walk(subschema, base, registry, loader)?;
            }
        }
    }

    for keyword in MAPPING_POSITIONS {
        if let Some(subschema) = map.get(*keyword) {
            walk(subschema, base, registry, loader)?;
        }
    }

    match map.get("items") {
        Some(Value::Array(positional)) => {
            for subschema in positional {
                walk(subschema, base, registry, loader)?;
            }
        }
        Some(subschema) => walk(subschema, base, registry, loader)?,
        None => {}
    }

    match map.get("extends") {
        Some(Value::Array(parents)) => {
            for subschema in parents {
                walk(subschema, base, registry, loader)?;
            }
        }
        Some(subschema) => walk(subschema, base, registry, loader)?,
        None => {}
    }

    if let Some(dependencies) = map.get("dependencies").and_then(Value::as_object) {
        for dependency in dependencies.values() {
            if dependency.is_object() {
                walk(dependency, base, registry, loader)?;
            }
        }
    }

    Ok(())
}

/// Fetches a `$ref` target the registry does not hold yet.
fn preload_reference(
    reference: &str,
    base: &Url,
    registry: &mut SchemaRegistry,
    loader: &dyn SchemaLoader,
) -> Result<()> {
    let target = resolve_reference(reference, base);
    let key = registry_key(&target);
    if registry.contains(&key) {
        return Ok(());
    }

    let document_uri = without_fragment(&target);
    let bytes = match loader.load(&document_uri) {
        Ok(bytes) => bytes,
        Err(error) => {
            debug!(uri = %key, %error, "external schema load failed; reference stays unresolved");
            return Ok(());
        }
    };

    let root: Value = serde_json::from_slice(&bytes)?;
    debug!(uri = %key, "loaded external schema");
    // Register before walking so mutually referencing documents terminate.
    registry.register(Schema::new(root.clone(), document_uri.clone()));
    walk(&root, &document_uri, registry, loader)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::error::LoadError;
    use crate::loader::NullLoader;

    /// Loader serving canned documents and recording requests.
    struct MapLoader {
        documents: Vec<(String, Value)>,
        requests: RefCell<Vec<String>>,
    }

    impl MapLoader {
        fn new(documents: Vec<(&str, Value)>) -> Self {
            Self {
                documents: documents
                    .into_iter()
                    .map(|(uri, doc)| (uri.to_string(), doc))
                    .collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl SchemaLoader for MapLoader {
        fn load(&self, uri: &Url) -> std::result::Result<Vec<u8>, LoadError> {
            self.requests.borrow_mut().push(uri.to_string());
            self.documents
                .iter()
                .find(|(known, _)| known == uri.as_str())
                .map(|(_, doc)| doc.to_string().into_bytes())
                .ok_or_else(|| LoadError::new(uri.as_str(), "not found"))
        }
    }

    fn schema_at(uri: &str, root: Value) -> Schema {
        Schema::new(root, Url::parse(uri).unwrap())
    }

    #[test]
    fn test_registers_subschemas_with_id() {
        let schema = schema_at(
            "http://example.com/root.json",
            json!({
                "type": "object",
                "properties": {
                    "a": {"id": "nested.json", "type": "integer"}
                }
            }),
        );
        let mut registry = SchemaRegistry::new();
        registry.register(schema.clone());
        build_graph(&schema, &mut registry, &NullLoader).unwrap();

        let nested = registry.get("http://example.com/nested.json").unwrap();
        assert_eq!(nested.root()["type"], json!("integer"));
    }

    #[test]
    fn test_preloads_external_references() {
        let schema = schema_at(
            "http://example.com/root.json",
            json!({"items": {"$ref": "item.json"}}),
        );
        let loader = MapLoader::new(vec![(
            "http://example.com/item.json",
            json!({"type": "string"}),
        )]);
        let mut registry = SchemaRegistry::new();
        registry.register(schema.clone());
        build_graph(&schema, &mut registry, &loader).unwrap();

        assert!(registry.contains("http://example.com/item.json"));
    }

    #[test]
    fn test_load_failures_are_swallowed() {
        let schema = schema_at(
            "http://example.com/root.json",
            json!({"$ref": "missing.json"}),
        );
        let mut registry = SchemaRegistry::new();
        registry.register(schema.clone());

        build_graph(&schema, &mut registry, &NullLoader).unwrap();
        assert!(!registry.contains("http://example.com/missing.json"));
    }

    #[test]
    fn test_undecodable_external_schema_propagates() {
        struct GarbageLoader;
        impl SchemaLoader for GarbageLoader {
            fn load(&self, _uri: &Url) -> std::result::Result<Vec<u8>, LoadError> {
                Ok(b"{not json".to_vec())
            }
        }

        let schema = schema_at(
            "http://example.com/root.json",
            json!({"$ref": "broken.json"}),
        );
        let mut registry = SchemaRegistry::new();
        registry.register(schema.clone());

        let err = build_graph(&schema, &mut registry, &GarbageLoader).unwrap_err();
        assert!(matches!(err, crate::ValidatorError::Decode(_)));
    }

    #[test]
    fn test_mutually_referencing_documents_terminate() {
        let schema = schema_at("http://example.com/a.json", json!({"$ref": "b.json"}));
        let loader = MapLoader::new(vec![
            ("http://example.com/b.json", json!({"$ref": "a.json"})),
            ("http://example.com/a.json", json!({"$ref": "b.json"})),
        ]);
        let mut registry = SchemaRegistry::new();
        registry.register(schema.clone());
        build_graph(&schema, &mut registry, &loader).unwrap();

        assert!(registry.contains("http://example.com/b.json"));
        // b's back-reference to a found it already registered: one load each.
        assert_eq!(loader.requests.borrow().len(), 1);
    }

    #[test]
    fn test_walks_every_subschema_position() {
        let schema = schema_at(
            "http://example.com/root.json",
            json!({
                "type": [{"$ref": "t.json"}, "string"],
                "disallow": [{"$ref": "d.json"}],
                "properties": {"a": {"$ref": "p.json"}},
                "patternProperties": {"^x": {"$ref": "pp.json"}},
                "additionalProperties": {"$ref": "ap.json"},
                "items": [{"$ref": "i.json"}],
                "additionalItems": {"$ref": "ai.json"},
                "dependencies": {"a": {"$ref": "dep.json"}},
                "extends": [{"$ref": "e.json"}]
            }),
        );
        let loader = MapLoader::new(Vec::new());
        let mut registry = SchemaRegistry::new();
        registry.register(schema.clone());
        build_graph(&schema, &mut registry, &loader).unwrap();

        let mut requested = loader.requests.borrow().clone();
        requested.sort();
        let expected: Vec<String> = ["ai", "ap", "d", "dep", "e", "i", "p", "pp", "t"]
            .iter()
            .map(|name| format!("http://example.com/{name}.json"))
            .collect();
        assert_eq!(requested, expected);
    }
}
