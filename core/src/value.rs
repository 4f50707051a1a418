//! Instance and schema node helpers over [`serde_json::Value`].
//!
//! The engine treats `serde_json::Value` (built with the `preserve_order`
//! feature, so mappings keep insertion order) as its value model. This module
//! adds the pieces Draft 3 validation needs on top: the primitive type
//! classes, human-readable type names for error messages, and deep structural
//! equality with numeric number comparison.

use serde_json::Value;

/// Draft 3 primitive type classes.
///
/// These are the names a `type` or `disallow` declaration may use. `Integer`
/// matches only integral numbers, while `Number` matches both integral and
/// floating values; `Any` matches every instance.
///
/// # Examples
///
/// ```
/// use conforma_core::PrimitiveType;
/// use serde_json::json;
///
/// let integer = PrimitiveType::from_name("integer").unwrap();
/// assert!(integer.matches(&json!(5)));
/// assert!(!integer.matches(&json!(5.5)));
///
/// let number = PrimitiveType::from_name("number").unwrap();
/// assert!(number.matches(&json!(5)));
/// assert!(number.matches(&json!(5.5)));
///
/// // Unknown names are not primitive classes
/// assert!(PrimitiveType::from_name("widget").is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    /// Unicode string.
    String,
    /// Any numeric value, integral or floating.
    Number,
    /// Integral numeric value only.
    Integer,
    /// Boolean.
    Boolean,
    /// Mapping with string keys.
    Object,
    /// Ordered sequence.
    Array,
    /// The null value.
    Null,
    /// Matches every instance.
    Any,
}

impl PrimitiveType {
    /// Parses a declaration name into a primitive class.
    ///
    /// Returns `None` for names outside the Draft 3 vocabulary. Callers that
    /// want forward compatibility (the `type` validator does) treat `None` as
    /// a match.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            "any" => Some(Self::Any),
            _ => None,
        }
    }

    /// Returns the declaration name for this class.
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
            Self::Any => "any",
        }
    }

    /// Returns `true` if `instance` belongs to this class.
    pub fn matches(&self, instance: &Value) -> bool {
        match self {
            Self::String => instance.is_string(),
            Self::Integer => matches!(instance, Value::Number(n) if n.is_i64() || n.is_u64()),
            Self::Number => instance.is_number(),
            Self::Boolean => instance.is_boolean(),
            Self::Object => instance.is_object(),
            Self::Array => instance.is_array(),
            Self::Null => instance.is_null(),
            Self::Any => true,
        }
    }
}

/// Returns the human-readable type name of an instance, as used in error
/// messages.
///
/// Integral numbers report `"integer"`, every other number `"number"`.
///
/// # Examples
///
/// ```
/// use conforma_core::type_name;
/// use serde_json::json;
///
/// assert_eq!(type_name(&json!(5)), "integer");
/// assert_eq!(type_name(&json!(5.5)), "number");
/// assert_eq!(type_name(&json!({"a": 1})), "object");
/// ```
pub fn type_name(instance: &Value) -> &'static str {
    match instance {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Deep structural equality with numeric number comparison.
///
/// Differs from `Value`'s own `PartialEq` in one way: numbers compare by
/// numeric value rather than representation, so `1` equals `1.0`. This is the
/// equality used by `enum` and `uniqueItems`.
///
/// # Examples
///
/// ```
/// use conforma_core::deep_equal;
/// use serde_json::json;
///
/// assert!(deep_equal(&json!(1), &json!(1.0)));
/// assert!(deep_equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
/// assert!(!deep_equal(&json!(1), &json!("1")));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(u, v)| deep_equal(u, v))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, u)| y.get(k).is_some_and(|v| deep_equal(u, v)))
        }
        _ => a == b,
    }
}

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}
