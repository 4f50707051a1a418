//! Draft 3 JSON Schema validation engine.
//!
//! Validates decoded JSON instances against schemas written in the Draft 3
//! schema language: given a schema and an instance, the engine decides
//! whether the instance conforms and, when it does not, reports the first
//! violation with a pointer into the instance and the governing schema node.
//!
//! The crate is organized around a few pieces:
//!
//! - [`Validator`] — the facade: input normalization, registry lifecycle,
//!   and the two entry points (`validate` and `validate_strict`).
//! - [`Schema`] / [`SchemaRegistry`] — schema documents paired with their
//!   base URIs, indexed by absolute fragmentless URI.
//! - [`SchemaLoader`] — the seam for fetching external schema documents
//!   referenced via `$ref`; the `conforma-loader` crate supplies concrete
//!   implementations.
//! - Keyword validators — one per recognized keyword (`type`, `properties`,
//!   `items`, `dependencies`, `extends`, `$ref`, …), applied in a fixed,
//!   observable order with fail-fast reporting.
//!
//! # Example
//!
//! ```
//! use conforma_core::{ValidateOptions, Validator, ValidatorError};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {
//!         "name": {"type": "string", "required": true},
//!         "count": {"type": "integer", "minimum": 0}
//!     }
//! });
//!
//! let mut validator = Validator::new();
//! let options = ValidateOptions::default();
//!
//! assert!(validator
//!     .validate(schema.clone(), json!({"name": "widget", "count": 3}), &options)
//!     .unwrap());
//!
//! let error = validator
//!     .validate_strict(schema, json!({"name": "widget", "count": -1}), &options)
//!     .unwrap_err();
//! match error {
//!     ValidatorError::Validation { path, .. } => assert_eq!(path, "#/count"),
//!     other => panic!("unexpected error: {other}"),
//! }
//! ```

mod engine;
mod error;
mod graph;
mod keywords;
mod loader;
mod path;
mod registry;
mod resolver;
mod schema;
mod value;

pub use engine::{InstanceInput, SchemaInput, ValidateOptions, Validator};
pub use error::{LoadError, Result, ValidatorError};
pub use loader::{NullLoader, SchemaLoader};
pub use path::InstancePath;
pub use registry::SchemaRegistry;
pub use schema::Schema;
pub use value::{deep_equal, type_name, PrimitiveType};
