//! The validation engine facade.
//!
//! [`Validator`] owns the schema registry and the loader, normalizes caller
//! input into [`Schema`] documents, runs the eager graph build, and then
//! applies the keyword validators. Two entry points share identical
//! validation semantics and differ only in the error surface:
//! [`validate`](Validator::validate) folds conformance failures into a
//! boolean, [`validate_strict`](Validator::validate_strict) returns the
//! first violation as an error.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use crate::error::{Result, ValidatorError};
use crate::graph;
use crate::keywords::ValidationContext;
use crate::loader::{NullLoader, SchemaLoader};
use crate::registry::SchemaRegistry;
use crate::resolver::{registry_key, without_fragment};
use crate::schema::Schema;

/// Options accepted by the validation entry points.
///
/// `list` is the only option that affects semantics: when set, the provided
/// schema is wrapped by a synthetic `{"type": "array", "items": {"$ref": …}}`
/// schema and the instance is validated against the wrapper, so a sequence
/// of instances can be checked in one call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ValidateOptions {
    /// Validate the instance as a list of items, each against the schema.
    #[serde(default)]
    pub list: bool,
}

/// Schema input accepted by the facade.
///
/// Raw text is decoded and given a digest-based URI; text that does not
/// decode is treated, best-effort, as a URI to fetch through the loader. An
/// already-decoded value round-trips through canonical text for its digest.
#[derive(Debug, Clone)]
pub enum SchemaInput {
    /// Schema text, or a URI when the text does not decode as JSON.
    Raw(String),
    /// An already-decoded schema tree.
    Value(Value),
}

impl From<&str> for SchemaInput {
    fn from(text: &str) -> Self {
        Self::Raw(text.to_string())
    }
}

impl From<String> for SchemaInput {
    fn from(text: String) -> Self {
        Self::Raw(text)
    }
}

impl From<Value> for SchemaInput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Instance input accepted by the facade; mirrors [`SchemaInput`].
#[derive(Debug, Clone)]
pub enum InstanceInput {
    /// Instance text, or a URI when the text does not decode as JSON.
    Raw(String),
    /// An already-decoded instance tree.
    Value(Value),
}

impl From<&str> for InstanceInput {
    fn from(text: &str) -> Self {
        Self::Raw(text.to_string())
    }
}

impl From<String> for InstanceInput {
    fn from(text: String) -> Self {
        Self::Raw(text)
    }
}

impl From<Value> for InstanceInput {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Draft 3 schema validation engine.
///
/// # Examples
///
/// ```
/// use conforma_core::{ValidateOptions, Validator};
/// use serde_json::json;
///
/// let mut validator = Validator::new();
/// let schema = json!({
///     "type": "object",
///     "properties": {"a": {"type": "integer", "required": true}}
/// });
///
/// let options = ValidateOptions::default();
/// assert!(validator.validate(schema.clone(), json!({"a": 5}), &options).unwrap());
/// assert!(!validator.validate(schema, json!({}), &options).unwrap());
/// ```
pub struct Validator {
    registry: SchemaRegistry,
    loader: Box<dyn SchemaLoader>,
    persist_cache: bool,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Creates an engine with no external loading; references outside the
    /// registered documents stay unresolvable.
    pub fn new() -> Self {
        Self::with_loader(Box::new(NullLoader))
    }

    /// Creates an engine that fetches external schema documents through
    /// `loader`.
    pub fn with_loader(loader: Box<dyn SchemaLoader>) -> Self {
        Self {
            registry: SchemaRegistry::new(),
            loader,
            persist_cache: false,
        }
    }

    /// Validates the instance, returning `Ok(true)` iff it conforms.
    ///
    /// Conformance failures never surface as errors here. Structural
    /// problems — a broken schema, undecodable input, a failed fetch of the
    /// schema itself — still propagate.
    pub fn validate(
        &mut self,
        schema: impl Into<SchemaInput>,
        instance: impl Into<InstanceInput>,
        options: &ValidateOptions,
    ) -> Result<bool> {
        match self.validate_strict(schema, instance, options) {
            Ok(()) => Ok(true),
            Err(error) if error.is_validation() => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Validates the instance, failing with the first violation.
    ///
    /// # Errors
    ///
    /// [`ValidatorError::Validation`] carries the violation message, the
    /// instance path, and the governing schema node;
    /// [`ValidatorError::Schema`] reports a structurally broken schema.
    pub fn validate_strict(
        &mut self,
        schema: impl Into<SchemaInput>,
        instance: impl Into<InstanceInput>,
        options: &ValidateOptions,
    ) -> Result<()> {
        let outcome = self.run(schema.into(), instance.into(), options);
        if !self.persist_cache {
            debug!("clearing schema registry after validation");
            self.registry.clear();
        }
        outcome
    }

    /// Read-only view of the registered schema documents, keyed by
    /// fragmentless absolute URI.
    pub fn schemas(&self) -> &HashMap<String, Schema> {
        self.registry.entries()
    }

    /// Registers a schema document and pre-builds its graph.
    ///
    /// Registration is idempotent: a document already present under the same
    /// URI is left untouched.
    pub fn add_schema(&mut self, schema: Schema) {
        self.registry.register(schema.clone());
        if let Err(error) = graph::build_graph(&schema, &mut self.registry, self.loader.as_ref()) {
            debug!(%error, "graph build during registration left references unresolved");
        }
    }

    /// Controls whether the registry survives across validations.
    ///
    /// Off by default: each top-level validation clears the registry on the
    /// way out. Leaving persistence off while sharing one engine across
    /// concurrent validations is not safe; turn it on for that, or give each
    /// validation its own engine.
    pub fn set_cache_persistence(&mut self, persist: bool) {
        self.persist_cache = persist;
    }

    /// Drops every cached schema document. No-op while persistence is on.
    pub fn clear_cache(&mut self) {
        if !self.persist_cache {
            self.registry.clear();
        }
    }

    fn run(
        &mut self,
        schema: SchemaInput,
        instance: InstanceInput,
        options: &ValidateOptions,
    ) -> Result<()> {
        let schema = self.normalize_schema(schema)?;
        let instance = self.normalize_instance(instance)?;

        self.registry.register(schema.clone());
        graph::build_graph(&schema, &mut self.registry, self.loader.as_ref())?;

        let schema = if options.list {
            self.wrap_for_list(&schema)
        } else {
            schema
        };

        let mut context = ValidationContext::new(&self.registry);
        let outcome = context.validate(schema.root(), schema.uri(), &instance);
        debug_assert_eq!(context.path_depth(), 0, "path buffer must end balanced");
        outcome
    }

    /// Wraps the schema for the `list` option: the instance must be an array
    /// whose every element conforms to the original schema.
    fn wrap_for_list(&mut self, schema: &Schema) -> Schema {
        let wrapper = Schema::anonymous(json!({
            "type": "array",
            "items": {"$ref": schema.uri().to_string()}
        }));
        self.registry.register(wrapper.clone());
        wrapper
    }

    fn normalize_schema(&mut self, input: SchemaInput) -> Result<Schema> {
        match input {
            SchemaInput::Value(root) => Ok(Schema::anonymous(root)),
            SchemaInput::Raw(text) => match serde_json::from_str::<Value>(&text) {
                Ok(root) => Ok(Schema::anonymous(root)),
                // Text that is not JSON may still be a URI; decoding the
                // fetched document can genuinely fail, so only fetch errors
                // fall back to the original decode error.
                Err(decode_error) => match uri_from_text(&text) {
                    Some(uri) => self.fetch_schema(&uri).map_err(|error| match error {
                        ValidatorError::Load(_) => decode_error.into(),
                        other => other,
                    }),
                    None => Err(decode_error.into()),
                },
            },
        }
    }

    fn fetch_schema(&mut self, uri: &Url) -> Result<Schema> {
        let document_uri = without_fragment(uri);
        if let Some(existing) = self.registry.get(&registry_key(uri)) {
            return Ok(existing.clone());
        }
        let bytes = self.loader.load(&document_uri)?;
        let root: Value = serde_json::from_slice(&bytes)?;
        debug!(uri = %document_uri, "loaded schema document");
        Ok(Schema::new(root, document_uri))
    }

    fn normalize_instance(&self, input: InstanceInput) -> Result<Value> {
        match input {
            InstanceInput::Value(value) => Ok(value),
            InstanceInput::Raw(text) => match serde_json::from_str::<Value>(&text) {
                Ok(value) => Ok(value),
                Err(decode_error) => match uri_from_text(&text) {
                    Some(uri) => match self.fetch_instance(&uri) {
                        Ok(value) => Ok(value),
                        Err(ValidatorError::Load(_)) => Err(decode_error.into()),
                        Err(other) => Err(other),
                    },
                    None => Err(decode_error.into()),
                },
            },
        }
    }

    fn fetch_instance(&self, uri: &Url) -> Result<Value> {
        let bytes = self.loader.load(uri)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Interprets non-JSON input text as a URI, resolving relative forms against
/// the process working directory.
fn uri_from_text(text: &str) -> Option<Url> {
    if let Ok(uri) = Url::parse(text) {
        return Some(uri);
    }
    let current_dir = std::env::current_dir().ok()?;
    let base = Url::from_directory_path(current_dir).ok()?;
    base.join(text).ok()
}
