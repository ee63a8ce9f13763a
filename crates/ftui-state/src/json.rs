#![forbid(unsafe_code)]

//! JSON boundary for dynamic cell values.
//!
//! Values parsed from JSON carry no static type, so they are stored as
//! [`Value`] and checked by the cell's runtime type guard on every write.
//!
//! Every conversion allocates fresh list/map payloads: a value converted
//! twice from the same JSON is structurally equal but not the same value.

use std::rc::Rc;

use serde_json::{Map, Number};

use crate::value::Value;

impl Value {
    /// Parse a JSON document into a dynamic value.
    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<serde_json::Value>(s).map(Self::from)
    }

    /// Render as a JSON document.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::Value::from(self).to_string()
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            // Integers beyond 2^53 lose precision, same as any f64 number.
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(Rc::new(items.into_iter().map(Self::from).collect()))
            }
            serde_json::Value::Object(entries) => Self::Map(Rc::new(
                entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            )),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Self::String(s.clone()),
            Value::List(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Map(entries) => Self::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect::<Map<String, Self>>(),
            ),
        }
    }
}

/// Whole numbers in `i64` range render as JSON integers, so integer documents
/// survive a parse/render round trip. Non-finite numbers have no JSON form.
fn number_to_json(n: f64) -> serde_json::Value {
    // `i64::MAX as f64` is 2^63, one past the largest i64.
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return serde_json::Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}
