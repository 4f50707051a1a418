//! Error types for the validation engine.
//!
//! Two failure kinds matter to callers and are kept strictly apart:
//!
//! - [`ValidatorError::Validation`] — the instance does not conform. Carries
//!   the rendered instance path and the governing schema node.
//! - [`ValidatorError::Schema`] — the schema itself is structurally broken
//!   (today: a reference fragment naming a node that does not exist). Never
//!   reported as a `false` validation outcome.
//!
//! The remaining variants surface input-normalization failures from the
//! engine facade: undecodable text and loader errors.

use serde_json::Value;
use thiserror::Error;

/// Errors produced by schema validation and schema loading.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// The instance violates the schema.
    #[error("{path}: {message}")]
    Validation {
        /// Human-readable description of the first violation.
        message: String,
        /// Instance location, rendered as `#/a/b/0`.
        path: String,
        /// The schema node that was being enforced.
        schema: Value,
    },

    /// The schema is structurally defective.
    #[error("schema error: {0}")]
    Schema(String),

    /// Schema or instance text could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A schema document could not be fetched.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl ValidatorError {
    /// Returns `true` for the conformance-failure kind.
    ///
    /// Only [`Validation`](ValidatorError::Validation) errors may be folded
    /// into a boolean result; everything else must keep propagating.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

/// Failure to fetch a schema document by URI.
///
/// Produced by [`SchemaLoader`](crate::SchemaLoader) implementations. During
/// the eager graph build these are swallowed and logged; a reference backed
/// by a failed load surfaces as a [`ValidatorError::Validation`] only when it
/// is actually dereferenced.
#[derive(Debug, Clone, Error)]
#[error("failed to load schema from '{uri}': {reason}")]
pub struct LoadError {
    /// The URI that was requested.
    pub uri: String,
    /// Why the load failed.
    pub reason: String,
}

impl LoadError {
    /// Creates a load error for `uri` with a displayable cause.
    pub fn new(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias for results with [`ValidatorError`].
pub type Result<T> = std::result::Result<T, ValidatorError>;
