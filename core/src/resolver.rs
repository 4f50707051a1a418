//! Reference resolution: `$ref` strings to absolute URIs, and fragment
//! navigation into schema documents.
//!
//! Fragments are split naively on `/` with empty tokens skipped; JSON
//! Pointer `~0`/`~1` escapes are deliberately not interpreted.

use serde_json::Value;
use url::Url;

use crate::error::{Result, ValidatorError};

/// Resolves a reference string against a base URI.
///
/// Absolute references are used directly. A relative reference keeps the
/// base's scheme and authority and splices its path: a `/`-rooted path
/// replaces the base path wholesale, anything else is joined onto the
/// directory of the base path. Both forms are cleaned of `.` and `..`
/// segments. The result carries the reference's fragment, or none when the
/// reference has none.
pub(crate) fn resolve_reference(reference: &str, base: &Url) -> Url {
    if let Ok(absolute) = Url::parse(reference) {
        return absolute;
    }

    let mut resolved = base.clone();
    let (path_part, fragment) = match reference.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment)),
        None => (reference, None),
    };

    if !path_part.is_empty() {
        let new_path = if path_part.starts_with('/') {
            collapse_dot_segments(path_part)
        } else {
            let dir = match base.path().rsplit_once('/') {
                Some((dir, _)) => dir,
                None => "",
            };
            collapse_dot_segments(&format!("{dir}/{path_part}"))
        };
        resolved.set_path(&new_path);
    }

    match fragment {
        Some(fragment) if !fragment.is_empty() => resolved.set_fragment(Some(fragment)),
        _ => resolved.set_fragment(None),
    }
    resolved
}

/// Returns the registry key for a URI: its string form with the fragment
/// stripped.
pub(crate) fn registry_key(uri: &Url) -> String {
    if uri.fragment().is_none() {
        return uri.to_string();
    }
    let mut stripped = uri.clone();
    stripped.set_fragment(None);
    stripped.to_string()
}

/// Returns `uri` without its fragment component.
pub(crate) fn without_fragment(uri: &Url) -> Url {
    let mut stripped = uri.clone();
    stripped.set_fragment(None);
    stripped
}

/// Navigates a slash-delimited fragment path into a schema document.
///
/// Empty tokens are skipped. String tokens key mappings, numeric tokens
/// index sequences. A token that names nothing is a schema error: it means
/// the schema graph is broken, not that the instance fails to conform.
pub(crate) fn navigate_fragment<'a>(root: &'a Value, fragment: &str) -> Result<&'a Value> {
    let mut current = root;
    for token in fragment.split('/').filter(|token| !token.is_empty()) {
        current = match current {
            Value::Object(map) => map.get(token).ok_or_else(|| {
                ValidatorError::Schema(format!(
                    "fragment segment '{token}' does not exist in the referenced schema"
                ))
            })?,
            Value::Array(items) => token
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .ok_or_else(|| {
                    ValidatorError::Schema(format!(
                        "fragment segment '{token}' does not index the referenced schema sequence"
                    ))
                })?,
            _ => {
                return Err(ValidatorError::Schema(format!(
                    "fragment segment '{token}' descends into a non-container schema node"
                )))
            }
        };
    }
    Ok(current)
}

fn collapse_dot_segments(path: &str) -> String {
    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            other => stack.push(other),
        }
    }
    format!("/{}", stack.join("/"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn base() -> Url {
        Url::parse("http://example.com/schemas/main.json").unwrap()
    }

    #[test]
    fn test_absolute_reference_passes_through() {
        let resolved = resolve_reference("http://other.com/s.json", &base());
        assert_eq!(resolved.as_str(), "http://other.com/s.json");
    }

    #[test]
    fn test_relative_sibling_reference() {
        let resolved = resolve_reference("other.json", &base());
        assert_eq!(resolved.as_str(), "http://example.com/schemas/other.json");
    }

    #[test]
    fn test_rooted_reference_replaces_path() {
        let resolved = resolve_reference("/top.json", &base());
        assert_eq!(resolved.as_str(), "http://example.com/top.json");
    }

    #[test]
    fn test_dot_dot_segments_collapse() {
        let resolved = resolve_reference("../common/item.json", &base());
        assert_eq!(resolved.as_str(), "http://example.com/common/item.json");
    }

    #[test]
    fn test_fragment_only_reference_keeps_document() {
        let resolved = resolve_reference("#/definitions/x", &base());
        assert_eq!(
            resolved.as_str(),
            "http://example.com/schemas/main.json#/definitions/x"
        );
    }

    #[test]
    fn test_reference_without_fragment_clears_base_fragment() {
        let base = Url::parse("http://example.com/s.json#/definitions/x").unwrap();
        let resolved = resolve_reference("other.json", &base);
        assert_eq!(resolved.as_str(), "http://example.com/other.json");
    }

    #[test]
    fn test_registry_key_strips_fragment() {
        let uri = Url::parse("http://example.com/s.json#/definitions/x").unwrap();
        assert_eq!(registry_key(&uri), "http://example.com/s.json");
    }

    #[test]
    fn test_navigate_fragment_mappings_and_sequences() {
        let doc = json!({"definitions": {"x": {"type": "integer"}}, "items": [{"a": 1}, {"b": 2}]});

        let x = navigate_fragment(&doc, "/definitions/x").unwrap();
        assert_eq!(x, &json!({"type": "integer"}));

        let second = navigate_fragment(&doc, "/items/1").unwrap();
        assert_eq!(second, &json!({"b": 2}));
    }

    #[test]
    fn test_navigate_fragment_skips_empty_tokens() {
        let doc = json!({"a": {"b": 1}});
        let node = navigate_fragment(&doc, "//a//b/").unwrap();
        assert_eq!(node, &json!(1));
    }

    #[test]
    fn test_navigate_fragment_missing_token_is_schema_error() {
        let doc = json!({"definitions": {}});
        let err = navigate_fragment(&doc, "/definitions/missing").unwrap_err();
        assert!(matches!(err, ValidatorError::Schema(_)));
    }

    #[test]
    fn test_navigate_fragment_empty_path_returns_root() {
        let doc = json!({"type": "string"});
        assert_eq!(navigate_fragment(&doc, "").unwrap(), &doc);
    }
}
