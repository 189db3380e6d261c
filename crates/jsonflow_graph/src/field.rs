// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar fields and the composite/scalar split of JSON values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Runtime type of a scalar JSON value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    /// String value
    String,
    /// Integer or floating point value
    Number,
    /// `true` or `false`
    Boolean,
    /// `null`
    Null,
}

impl ScalarType {
    /// Lowercase type name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scalar key/value pair attached to a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The scalar value as it appeared in the source
    pub value: Value,
    /// Its runtime type
    #[serde(rename = "type")]
    pub field_type: ScalarType,
}

impl Field {
    /// Create a field
    pub fn new(value: Value, field_type: ScalarType) -> Self {
        Self { value, field_type }
    }

    /// Build a field from a scalar value, `None` for objects and arrays
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match Entry::classify(value) {
            Entry::Scalar(field) => Some(field),
            Entry::Composite(_) => None,
        }
    }
}

/// A JSON container whose entries are walked by key
#[derive(Debug, Clone, Copy)]
pub enum Container<'a> {
    /// Object, walked in document key order
    Object(&'a Map<String, Value>),
    /// Array, walked by index
    Array(&'a [Value]),
}

impl<'a> Container<'a> {
    /// Entries as `(key, value)`; array indices become decimal keys
    pub fn entries(self) -> Box<dyn Iterator<Item = (String, &'a Value)> + 'a> {
        match self {
            Self::Object(map) => Box::new(map.iter().map(|(k, v)| (k.clone(), v))),
            Self::Array(items) => Box::new(items.iter().enumerate().map(|(i, v)| (i.to_string(), v))),
        }
    }
}

/// What a value becomes in the graph
#[derive(Debug, Clone)]
pub enum Entry<'a> {
    /// A child node, recursed into
    Composite(Container<'a>),
    /// A field on the current node
    Scalar(Field),
}

impl<'a> Entry<'a> {
    /// Classify a value once
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self::Composite(Container::Object(map)),
            Value::Array(items) => Self::Composite(Container::Array(items)),
            Value::String(_) => Self::Scalar(Field::new(value.clone(), ScalarType::String)),
            Value::Number(_) => Self::Scalar(Field::new(value.clone(), ScalarType::Number)),
            Value::Bool(_) => Self::Scalar(Field::new(value.clone(), ScalarType::Boolean)),
            Value::Null => Self::Scalar(Field::new(Value::Null, ScalarType::Null)),
        }
    }
}

/// Whether a key reads as an array index (ASCII digits that fit in `u64`)
pub fn is_index_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) && key.parse::<u64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_types() {
        let cases = [
            (json!("x"), ScalarType::String),
            (json!(1), ScalarType::Number),
            (json!(1.5), ScalarType::Number),
            (json!(false), ScalarType::Boolean),
            (json!(null), ScalarType::Null),
        ];
        for (value, expected) in cases {
            let field = Field::from_scalar(&value).unwrap();
            assert_eq!(field.field_type, expected);
            assert_eq!(field.value, value);
        }
    }

    #[test]
    fn test_composites_are_not_fields() {
        assert!(Field::from_scalar(&json!({})).is_none());
        assert!(Field::from_scalar(&json!([1])).is_none());
    }

    #[test]
    fn test_classify() {
        let object = json!({"a": 1});
        let array = json!([1, 2]);
        let scalar = json!(true);
        assert!(matches!(Entry::classify(&object), Entry::Composite(Container::Object(_))));
        assert!(matches!(Entry::classify(&array), Entry::Composite(Container::Array(_))));
        assert!(matches!(Entry::classify(&scalar), Entry::Scalar(_)));
    }

    #[test]
    fn test_array_entries_use_index_keys() {
        let array = json!(["a", "b"]);
        let Entry::Composite(container) = Entry::classify(&array) else {
            panic!("array should be composite");
        };
        let keys: Vec<_> = container.entries().map(|(k, _)| k).collect();
        assert_eq!(keys, ["0", "1"]);
    }

    #[test]
    fn test_index_key_rule() {
        assert!(is_index_key("0"));
        assert!(is_index_key("42"));
        assert!(!is_index_key(""));
        assert!(!is_index_key("-1"));
        assert!(!is_index_key("1.5"));
        assert!(!is_index_key("1e3"));
        assert!(!is_index_key("list"));
        assert!(!is_index_key("99999999999999999999999"));
    }

    #[test]
    fn test_field_serializes_type_key() {
        let field = Field::from_scalar(&json!(3)).unwrap();
        assert_eq!(
            serde_json::to_value(&field).unwrap(),
            json!({"value": 3, "type": "number"})
        );
    }
}
