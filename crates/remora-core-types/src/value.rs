//! Scalar value type for instance property bags
//!
//! Responses arrive as JSON; property bags store them as `Value` so the
//! query translator and token resolver can render protocol literals without
//! re-inspecting raw JSON. Nested objects and arrays that a descriptor does
//! not flatten are kept whole under the `Json` variant.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A property bag value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
    /// Nested JSON kept whole (objects, arrays)
    Json(serde_json::Value),
}

impl Value {
    /// Classify a raw JSON value
    ///
    /// Strings stay strings - GUID and date-time detection is the caller's
    /// business (a descriptor knows its field types; raw JSON does not).
    pub fn from_json(raw: &serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            other => Value::Json(other.clone()),
        }
    }

    /// Render back to JSON for outbound payloads
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Guid(g) => serde_json::Value::String(g.to_string()),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Value::Json(j) => j.clone(),
        }
    }

    /// Canonical literal used as an identity-map key component
    ///
    /// Only key-capable values render: strings, GUIDs and integers. `None`
    /// for anything a remote API would never use as a primary key.
    pub fn key_literal(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Guid(g) => Some(g.to_string()),
            Value::Int(i) => Some(i.to_string()),
            _ => None,
        }
    }

    /// True for the `Null` variant
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Uuid> for Value {
    fn from(g: Uuid) -> Self {
        Value::Guid(g)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}
