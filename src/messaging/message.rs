//! # Queue Message Types
//!
//! The raw delivery handed out by a [`QueueClient`](super::QueueClient) and the
//! decoded `{id, name, status}` envelope carried in its body.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::errors::DecodeError;

/// A single delivery received from a queue
///
/// The receipt handle is only valid for this delivery and expires once the
/// visibility timeout elapses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Queue-assigned message ID
    pub id: String,
    /// Raw message body
    pub body: String,
    /// Token required to delete this delivery
    pub receipt_handle: String,
    /// String-valued message attributes
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl InboundMessage {
    pub fn new(
        id: impl Into<String>,
        body: impl Into<String>,
        receipt_handle: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            receipt_handle: receipt_handle.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Envelope decoded from a message body
///
/// Unknown fields are ignored. Absent or `null` fields decode to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decoder for message bodies
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec;

impl MessageCodec {
    /// Decode a raw body into a [`DecodedRecord`]
    ///
    /// Only structural JSON parsing is performed; there is no schema validation
    /// beyond requiring an object whose known fields are strings.
    pub fn decode(raw: &str) -> Result<DecodedRecord, DecodeError> {
        // The derived visitor also accepts positional arrays, so check the shape first
        match serde_json::from_str::<Value>(raw)? {
            object @ Value::Object(_) => Ok(serde_json::from_value(object)?),
            other => Err(DecodeError::NotAnObject {
                found: json_type(&other),
            }),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
