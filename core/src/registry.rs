//! URI-keyed registry of loaded schema documents.

use std::collections::HashMap;

use tracing::debug;

use crate::resolver::registry_key;
use crate::schema::Schema;

/// Mapping from absolute, fragmentless URI to a loaded schema root.
///
/// The registry holds every schema document a validation may dereference:
/// the root schema, subschemas that declared an `id`, and externally loaded
/// documents. Writes are first-writer-wins, which makes registration
/// idempotent; readers observe a fully registered document or none.
///
/// The registry is engine-scoped. The facade clears it after each top-level
/// validation unless cache persistence is enabled, so sharing one engine
/// across concurrent validations is the caller's responsibility.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    entries: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its fragmentless URI.
    ///
    /// The first write for a key wins; re-registering the same URI leaves
    /// the existing entry untouched. Returns `true` if the schema was newly
    /// inserted.
    pub fn register(&mut self, schema: Schema) -> bool {
        let key = registry_key(schema.uri());
        if self.entries.contains_key(&key) {
            return false;
        }
        debug!(uri = %key, "registering schema");
        self.entries.insert(key, schema);
        true
    }

    /// Looks up a schema by its fragmentless URI string.
    pub fn get(&self, key: &str) -> Option<&Schema> {
        self.entries.get(key)
    }

    /// Returns `true` if a document is registered under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of registered documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only view of the registered documents.
    pub fn entries(&self) -> &HashMap<String, Schema> {
        &self.entries
    }

    /// Drops every registered document.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
