//! Backend records as seen by the console.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Opaque record id; integer for most resources, string for some.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Only canonical integers become Int; "0012" or "+5" stay text.
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => Ok(RecordId::Int(n)),
            _ => Ok(RecordId::Text(s.to_string())),
        }
    }
}

impl RecordId {
    /// Same id on the wire: `Int(12)` and `Text("12")` both send `12`.
    pub fn same_as(&self, other: &RecordId) -> bool {
        match (self, other) {
            (RecordId::Int(a), RecordId::Int(b)) => a == b,
            (RecordId::Text(a), RecordId::Text(b)) => a == b,
            _ => self.to_string() == other.to_string(),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no usable id")]
    MissingId,
}

/// Keys that may carry a record's id, in order of preference.
const ID_KEYS: [&str; 3] = ["id", "_id", "pk"];

/// A mapping of named fields, identified by an opaque id. Owned by the backend;
/// the console only holds snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub id: RecordId,
    pub fields: Map<String, Value>,
}

impl ResourceRecord {
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let fields = match value {
            Value::Object(map) => map,
            _ => return Err(RecordError::NotAnObject),
        };
        let id = ID_KEYS
            .iter()
            .find_map(|k| fields.get(*k).and_then(id_from_value))
            .ok_or(RecordError::MissingId)?;
        Ok(Self { id, fields })
    }

    /// Unwraps `{ "data": {...} }` single-record envelopes before parsing.
    pub fn from_response(value: Value) -> Result<Self, RecordError> {
        match value {
            Value::Object(mut map) if matches!(map.get("data"), Some(Value::Object(_))) => {
                let inner = map.remove("data").unwrap_or(Value::Null);
                Self::from_value(inner)
            }
            other => Self::from_value(other),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Field rendered for a table cell: strings bare, null/missing as empty.
    pub fn display(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

fn id_from_value(v: &Value) -> Option<RecordId> {
    match v {
        Value::Number(n) => n.as_i64().map(RecordId::Int),
        Value::String(s) if !s.trim().is_empty() => Some(RecordId::Text(s.clone())),
        _ => None,
    }
}
