//! Create/update request bodies.

use crate::transport::{FilePart, FormPart, RequestBody};
use serde_json::{Map, Value};

/// Body of a create or update call.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Map<String, Value>),
    Multipart(Vec<FormPart>),
}

impl Payload {
    /// Multipart body from JSON fields plus newly selected files.
    ///
    /// Null and empty-string fields are omitted rather than sent as empty
    /// strings. Booleans are always sent. Nested values are sent as JSON text.
    pub fn multipart(fields: &Map<String, Value>, files: Vec<FilePart>) -> Self {
        let mut parts: Vec<FormPart> = fields
            .iter()
            .filter_map(|(name, value)| {
                text_value(value).map(|value| FormPart::Text {
                    name: name.clone(),
                    value,
                })
            })
            .collect();
        parts.extend(files.into_iter().map(FormPart::File));
        Payload::Multipart(parts)
    }

    /// Names of the fields/parts carried, in order.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Payload::Json(map) => map.keys().map(String::as_str).collect(),
            Payload::Multipart(parts) => parts.iter().map(FormPart::name).collect(),
        }
    }

    pub fn into_body(self) -> RequestBody {
        match self {
            Payload::Json(map) => RequestBody::Json(Value::Object(map)),
            Payload::Multipart(parts) => RequestBody::Multipart(parts),
        }
    }
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
