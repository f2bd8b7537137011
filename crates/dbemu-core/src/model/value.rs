//! Property values returned by the graph database
//!
//! Properties are a closed set of scalar shapes plus homogeneous lists of
//! scalars, stored in an ordered map so serialization is deterministic.

use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Ordered property name → value mapping
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single property value
///
/// Anything the source returns outside this set (maps, points, nested lists)
/// is coerced to its compact JSON text. The coercion is lossy: a temporal or
/// spatial value does not round-trip back to its database type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Convert a JSON value from a result row into a property value
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Array(items) => PropertyValue::List(items.iter().map(Self::scalar).collect()),
            other => Self::scalar(other),
        }
    }

    fn scalar(value: &Value) -> Self {
        match value {
            Value::Null => PropertyValue::Null,
            Value::Bool(b) => PropertyValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => PropertyValue::Integer(i),
                None => n
                    .as_f64()
                    .map(PropertyValue::Float)
                    .unwrap_or_else(|| PropertyValue::String(n.to_string())),
            },
            Value::String(s) => PropertyValue::String(s.clone()),
            Value::Array(_) | Value::Object(_) => PropertyValue::String(value.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

/// Convert a JSON object into a property map
///
/// # Errors
///
/// `PipelineError::MalformedRow` if `value` is not a JSON object.
pub fn property_map_from_json(value: &Value, what: &str) -> Result<PropertyMap, PipelineError> {
    let object = value.as_object().ok_or_else(|| PipelineError::MalformedRow {
        reason: format!("{} is not a map: {}", what, value),
    })?;
    Ok(object
        .iter()
        .map(|(k, v)| (k.clone(), PropertyValue::from_json(v)))
        .collect())
}
