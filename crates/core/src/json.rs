//! JSON document values
//!
//! Regions may hold structured documents next to scalar values. Documents
//! arrive on the wire as custom-encoded payloads and are decoded by the JSON
//! codec into a [`JsonValue`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

/// JSON document wrapper
///
/// Newtype around `serde_json::Value` so documents can live inside
/// [`crate::Value`] without leaking `serde_json` through every API.
///
/// # Examples
///
/// ```
/// use cinder_core::JsonValue;
///
/// let doc: JsonValue = r#"{"name":"alice"}"#.parse().unwrap();
/// assert!(doc.is_object());
/// assert_eq!(doc.to_json_string(), r#"{"name":"alice"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonValue(serde_json::Value);

impl JsonValue {
    /// Create an empty object document
    pub fn object() -> Self {
        JsonValue(serde_json::Value::Object(serde_json::Map::new()))
    }

    /// Compact JSON text, as written by the JSON codec
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }
}

impl FromStr for JsonValue {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(JsonValue)
    }
}

impl Deref for JsonValue {
    type Target = serde_json::Value;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for JsonValue {
    fn default() -> Self {
        JsonValue(serde_json::Value::Null)
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(v: serde_json::Value) -> Self {
        JsonValue(v)
    }
}

impl From<JsonValue> for serde_json::Value {
    fn from(v: JsonValue) -> Self {
        v.0
    }
}
