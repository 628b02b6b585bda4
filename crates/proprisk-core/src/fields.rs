//! Typed access to optional fields of loosely structured JSON payloads.
//!
//! Market-data responses differ between products and often omit fields.
//! Instead of walking nested keys by hand, callers describe the path once and
//! receive either the present value or an explicit fallback with the reason it
//! was used.

use crate::error::{PropriskError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Dotted path into a JSON document, e.g. `sales.0.price`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self> {
        if path.trim().is_empty() {
            return Err(PropriskError::validation("field_path", "path must not be empty"));
        }

        let segments = path
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(PropriskError::validation(
                        "field_path",
                        format!("empty segment in '{}'", path),
                    ));
                }
                Ok(match segment.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(segment.to_string()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Follow the path, returning `None` at the first missing step
    pub fn resolve<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
        self.segments.iter().try_fold(payload, |current, segment| match segment {
            PathSegment::Key(key) => current.get(key.as_str()),
            PathSegment::Index(index) => match current {
                Value::Array(items) => items.get(*index),
                // numeric keys are legal in objects
                Value::Object(map) => map.get(&index.to_string()),
                _ => None,
            },
        })
    }
}

impl FromStr for FieldPath {
    type Err = PropriskError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                PathSegment::Key(k) => k.clone(),
                PathSegment::Index(i) => i.to_string(),
            })
            .collect();
        write!(f, "{}", rendered.join("."))
    }
}

/// Why a fallback value was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Missing,
    Null,
    WrongType(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Missing => write!(f, "field is missing"),
            FallbackReason::Null => write!(f, "field is null"),
            FallbackReason::WrongType(detail) => write!(f, "unexpected type: {}", detail),
        }
    }
}

/// Result of reading an optional field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<T> {
    Present(T),
    Fallback { value: T, reason: FallbackReason },
}

impl<T> FieldValue<T> {
    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    pub fn value(&self) -> &T {
        match self {
            FieldValue::Present(value) | FieldValue::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            FieldValue::Present(value) | FieldValue::Fallback { value, .. } => value,
        }
    }

    /// The present value, dropping fallbacks
    pub fn present(self) -> Option<T> {
        match self {
            FieldValue::Present(value) => Some(value),
            FieldValue::Fallback { .. } => None,
        }
    }
}

/// Read `path` from `payload` as `T`, using `fallback` when it cannot be read
pub fn get_field<T: DeserializeOwned>(
    payload: &Value,
    path: &FieldPath,
    fallback: T,
) -> FieldValue<T> {
    let reason = match path.resolve(payload) {
        None => FallbackReason::Missing,
        Some(Value::Null) => FallbackReason::Null,
        Some(value) => match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => return FieldValue::Present(parsed),
            Err(e) => FallbackReason::WrongType(e.to_string()),
        },
    };

    tracing::debug!(path = %path, %reason, "Using fallback value");
    FieldValue::Fallback { value: fallback, reason }
}

/// Read a required field, failing with a validation error when absent
pub fn require_field<T: DeserializeOwned>(payload: &Value, path: &FieldPath) -> Result<T> {
    match path.resolve(payload) {
        None | Some(Value::Null) => {
            Err(PropriskError::validation(path.to_string(), FallbackReason::Missing.to_string()))
        }
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| PropriskError::validation(path.to_string(), e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "property": {
                "attributes": { "bedrooms": 3, "landArea": null },
                "sales": [ { "price": 850000 }, { "price": "unknown" } ]
            }
        })
    }

    #[test]
    fn test_present_value() {
        let path = FieldPath::parse("property.attributes.bedrooms").unwrap();
        let value = get_field(&payload(), &path, 0u32);
        assert_eq!(value, FieldValue::Present(3));
    }

    #[test]
    fn test_array_index() {
        let path: FieldPath = "property.sales.0.price".parse().unwrap();
        assert_eq!(get_field(&payload(), &path, 0.0f64).into_value(), 850000.0);
    }

    #[test]
    fn test_missing_null_and_wrong_type_fall_back() {
        let missing = FieldPath::parse("property.attributes.bathrooms").unwrap();
        let null = FieldPath::parse("property.attributes.landArea").unwrap();
        let wrong = FieldPath::parse("property.sales.1.price").unwrap();

        let m = get_field(&payload(), &missing, 1u32);
        assert_eq!(m, FieldValue::Fallback { value: 1, reason: FallbackReason::Missing });

        let n = get_field(&payload(), &null, 0.0f64);
        assert!(matches!(n, FieldValue::Fallback { reason: FallbackReason::Null, .. }));

        let w = get_field(&payload(), &wrong, 0.0f64);
        assert!(!w.is_present());
        assert!(matches!(w, FieldValue::Fallback { reason: FallbackReason::WrongType(_), .. }));
    }

    #[test]
    fn test_require_field() {
        let path = FieldPath::parse("property.sales.0.price").unwrap();
        assert_eq!(require_field::<u64>(&payload(), &path).unwrap(), 850000);

        let absent = FieldPath::parse("property.zone").unwrap();
        assert!(require_field::<String>(&payload(), &absent).is_err());
    }

    #[test]
    fn test_invalid_paths() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert_eq!(FieldPath::parse("a.2.b").unwrap().to_string(), "a.2.b");
    }
}
