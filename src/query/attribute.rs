//! Attribute Extraction Module
//!
//! Typed attribute values, the extractor contract, and the per-entry
//! memoizing value cache used during query evaluation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::store::Element;

// == Attribute Type ==
/// The closed set of types an extracted attribute value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// Boolean attribute
    Bool,
    /// Signed 64-bit integer attribute
    Int,
    /// 64-bit floating point attribute
    Float,
    /// UTF-8 string attribute
    Str,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "string",
        };
        f.write_str(name)
    }
}

// == Attribute Value ==
/// A typed value derived from an entry by an attribute extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Boolean value
    Bool(bool),
    /// Signed 64-bit integer value
    Int(i64),
    /// 64-bit floating point value
    Float(f64),
    /// UTF-8 string value
    Str(String),
}

impl AttributeValue {
    /// Returns the type of this value.
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            Self::Bool(_) => AttributeType::Bool,
            Self::Int(_) => AttributeType::Int,
            Self::Float(_) => AttributeType::Float,
            Self::Str(_) => AttributeType::Str,
        }
    }

    /// Compares two values using their natural ordering.
    ///
    /// Only values of the same type are mutually ordered; comparing across
    /// types is a caller error, not a silent wraparound.
    pub fn compare(&self, other: &Self) -> Result<std::cmp::Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Ok(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Ok(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => Ok(a.total_cmp(b)),
            (Self::Str(a), Self::Str(b)) => Ok(a.cmp(b)),
            _ => Err(StoreError::NotComparable(
                self.attribute_type(),
                other.attribute_type(),
            )),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

// == Attribute Extractor ==
/// Pure function deriving a named, typed value from an entry.
///
/// Registered once per attribute name, immutable after registration.
/// Returning `None` means the attribute resolves to null for that entry.
pub type AttributeExtractor = Arc<dyn Fn(&Element) -> Option<AttributeValue> + Send + Sync>;

/// Builds an extractor that reads a top-level field of a JSON object value.
///
/// Boolean, integer, float and string fields map to the corresponding
/// [`AttributeValue`]; a missing field, a non-object value or an unsupported
/// field type resolves to null.
pub fn json_field_extractor(field: impl Into<String>) -> AttributeExtractor {
    let field = field.into();
    Arc::new(move |element: &Element| match element.value().get(field.as_str())? {
        Value::Bool(b) => Some(AttributeValue::Bool(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(AttributeValue::Int)
            .or_else(|| n.as_f64().map(AttributeValue::Float)),
        Value::String(s) => Some(AttributeValue::Str(s.clone())),
        _ => None,
    })
}

// == Attribute Value Cache ==
/// Per-entry, per-evaluation memoized attribute values.
///
/// The extractor for a given attribute runs at most once per entry per query
/// evaluation, even when criteria, ordering, projection and aggregation all
/// touch the same attribute. A resolved null is cached as `Some(None)` in the
/// map, distinct from "not yet computed" (absent from the map).
pub struct AttributeValues<'a> {
    element: &'a Element,
    extractors: &'a HashMap<String, AttributeExtractor>,
    resolved: HashMap<String, Option<AttributeValue>>,
}

impl<'a> AttributeValues<'a> {
    /// Creates a fresh value cache for one entry.
    pub fn new(element: &'a Element, extractors: &'a HashMap<String, AttributeExtractor>) -> Self {
        Self {
            element,
            extractors,
            resolved: HashMap::new(),
        }
    }

    /// Resolves an attribute without a type expectation.
    ///
    /// Fails with an unknown-attribute error when no extractor is registered
    /// under the name.
    pub fn value(&mut self, name: &str) -> Result<Option<AttributeValue>> {
        if let Some(cached) = self.resolved.get(name) {
            return Ok(cached.clone());
        }

        let extractor = self
            .extractors
            .get(name)
            .ok_or_else(|| StoreError::UnknownAttribute(name.to_string()))?;

        let value = extractor(self.element);
        self.resolved.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Resolves an attribute and checks it against an expected type.
    ///
    /// A resolved null passes any type expectation. A non-null value whose
    /// resolved type differs from the expected type is a type-mismatch error,
    /// never a silent coercion.
    pub fn typed_value(
        &mut self,
        name: &str,
        expected: AttributeType,
    ) -> Result<Option<AttributeValue>> {
        match self.value(name)? {
            Some(value) if value.attribute_type() != expected => Err(StoreError::TypeMismatch {
                attribute: name.to_string(),
                expected,
                actual: value.attribute_type(),
            }),
            other => Ok(other),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn element(value: Value) -> Element {
        Element::new("k".to_string(), value, None, None)
    }

    fn registry(entries: Vec<(&str, AttributeExtractor)>) -> HashMap<String, AttributeExtractor> {
        entries
            .into_iter()
            .map(|(name, extractor)| (name.to_string(), extractor))
            .collect()
    }

    #[test]
    fn test_json_field_extractor() {
        let element = element(json!({"age": 42, "name": "bob", "active": true, "score": 1.5}));
        assert_eq!(
            json_field_extractor("age")(&element),
            Some(AttributeValue::Int(42))
        );
        assert_eq!(
            json_field_extractor("name")(&element),
            Some(AttributeValue::Str("bob".to_string()))
        );
        assert_eq!(
            json_field_extractor("active")(&element),
            Some(AttributeValue::Bool(true))
        );
        assert_eq!(
            json_field_extractor("score")(&element),
            Some(AttributeValue::Float(1.5))
        );
        assert_eq!(json_field_extractor("missing")(&element), None);
    }

    #[test]
    fn test_extractor_invoked_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let extractor: AttributeExtractor = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(AttributeValue::Int(7))
        });

        let element = element(json!({}));
        let extractors = registry(vec![("n", extractor)]);
        let mut values = AttributeValues::new(&element, &extractors);

        assert_eq!(values.value("n").unwrap(), Some(AttributeValue::Int(7)));
        assert_eq!(values.value("n").unwrap(), Some(AttributeValue::Int(7)));
        assert_eq!(
            values.typed_value("n", AttributeType::Int).unwrap(),
            Some(AttributeValue::Int(7))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolved_null_is_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let extractor: AttributeExtractor = Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            None
        });

        let element = element(json!({}));
        let extractors = registry(vec![("n", extractor)]);
        let mut values = AttributeValues::new(&element, &extractors);

        assert_eq!(values.value("n").unwrap(), None);
        assert_eq!(values.value("n").unwrap(), None);
        // Null passes any type expectation
        assert_eq!(values.typed_value("n", AttributeType::Str).unwrap(), None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_attribute() {
        let element = element(json!({}));
        let extractors = registry(vec![]);
        let mut values = AttributeValues::new(&element, &extractors);

        let result = values.value("ghost");
        assert!(matches!(result, Err(StoreError::UnknownAttribute(_))));
    }

    #[test]
    fn test_type_mismatch() {
        let element = element(json!({"age": 42}));
        let extractors = registry(vec![("age", json_field_extractor("age"))]);
        let mut values = AttributeValues::new(&element, &extractors);

        let result = values.typed_value("age", AttributeType::Str);
        assert!(matches!(
            result,
            Err(StoreError::TypeMismatch {
                expected: AttributeType::Str,
                actual: AttributeType::Int,
                ..
            })
        ));
    }

    #[test]
    fn test_cross_type_comparison_fails() {
        let a = AttributeValue::Int(1);
        let b = AttributeValue::Str("1".to_string());
        assert!(matches!(a.compare(&b), Err(StoreError::NotComparable(_, _))));
    }

    #[test]
    fn test_same_type_comparison() {
        assert_eq!(
            AttributeValue::Int(1)
                .compare(&AttributeValue::Int(2))
                .unwrap(),
            std::cmp::Ordering::Less
        );
        assert_eq!(
            AttributeValue::Str("b".to_string())
                .compare(&AttributeValue::Str("a".to_string()))
                .unwrap(),
            std::cmp::Ordering::Greater
        );
    }
}
