//! The loader seam for fetching external schema documents.

use url::Url;

use crate::error::LoadError;

/// Fetches the raw bytes of a schema document by absolute URI.
///
/// The engine calls the loader lazily: during the eager graph build whenever
/// a `$ref` points at a document the registry does not hold, and during
/// facade input normalization when a caller hands over a URI instead of
/// schema text. Loading is synchronous and may block.
///
/// Failures during the graph build are swallowed; the reference simply stays
/// unresolvable and produces a validation error only if it is actually
/// dereferenced.
pub trait SchemaLoader {
    /// Fetches the document at `uri`.
    fn load(&self, uri: &Url) -> std::result::Result<Vec<u8>, LoadError>;
}

/// Loader that refuses every request.
///
/// The engine default. With it, validation works for self-contained schemas
/// and any document registered up front via
/// [`Validator::add_schema`](crate::Validator::add_schema), while external
/// references stay unresolvable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLoader;

impl SchemaLoader for NullLoader {
    fn load(&self, uri: &Url) -> std::result::Result<Vec<u8>, LoadError> {
        Err(LoadError::new(uri.as_str(), "no schema loader configured"))
    }
}
