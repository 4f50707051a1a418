//! Schema documents: a decoded root value paired with its base URI.

use serde_json::Value;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::Result;

/// A schema document with the base URI used to resolve relative references
/// found inside it.
///
/// A schema is owned by its base URI's registry entry. Subschemas reached by
/// descent share the parent's base URI unless they carry an `id` of their
/// own, in which case they are registered separately during the graph build.
///
/// # Examples
///
/// ```
/// use conforma_core::Schema;
/// use serde_json::json;
///
/// // Schemas without a URI of their own get a digest-based file:// URI.
/// let schema = Schema::anonymous(json!({"type": "integer"}));
/// assert_eq!(schema.uri().scheme(), "file");
///
/// // The digest is stable across equal content.
/// let again = Schema::anonymous(json!({"type": "integer"}));
/// assert_eq!(schema.uri(), again.uri());
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    uri: Url,
    root: Value,
}

impl Schema {
    /// Creates a schema rooted at `uri`.
    pub fn new(root: Value, uri: Url) -> Self {
        Self { uri, root }
    }

    /// Creates a schema with a synthetic `file://` URI derived from a digest
    /// of the schema's canonical text.
    ///
    /// Used for schemas handed to the engine without any URI: the digest
    /// gives identical content an identical registry key, which is what
    /// makes repeated registration idempotent.
    pub fn anonymous(root: Value) -> Self {
        let canonical = root.to_string();
        let digest = Sha256::digest(canonical.as_bytes());
        let uri = Url::parse(&format!("file:///{digest:x}")).expect("digest URL is well-formed");
        Self { uri, root }
    }

    /// Parses schema text and assigns a digest-based URI.
    ///
    /// # Errors
    ///
    /// Returns [`Decode`](crate::ValidatorError::Decode) if the text is not
    /// valid JSON.
    pub fn from_text(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)?;
        Ok(Self::anonymous(root))
    }

    /// The base URI for references inside this document.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// The decoded schema tree.
    pub fn root(&self) -> &Value {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_anonymous_uri_is_content_addressed() {
        let a = Schema::anonymous(json!({"type": "string"}));
        let b = Schema::anonymous(json!({"type": "string"}));
        let c = Schema::anonymous(json!({"type": "number"}));

        assert_eq!(a.uri(), b.uri());
        assert_ne!(a.uri(), c.uri());
    }

    #[test]
    fn test_from_text_parses_and_digests() {
        let schema = Schema::from_text(r#"{"type": "integer"}"#).unwrap();
        assert_eq!(schema.root(), &json!({"type": "integer"}));
        assert_eq!(schema.uri().scheme(), "file");
    }

    #[test]
    fn test_from_text_rejects_invalid_json() {
        assert!(Schema::from_text("{not json").is_err());
    }
}
