//! Loosely typed protocol envelope.
//!
//! The backend streams flat JSON objects whose field vocabulary varies by
//! producer. Instead of a fixed struct, an [`Envelope`] keeps the raw object
//! and answers ordered field lookups against it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields that may carry a content token, in priority order.
pub const CONTENT_FIELDS: &[&str] = &[
    "data", "token", "delta", "chunk", "content", "text", "response",
];

/// Fields that may carry the authoritative value of a completion envelope.
pub const FINAL_FIELDS: &[&str] = &["data", "message", "response", "answer"];

/// Fields that may carry the reply of a single buffered JSON document.
pub const BUFFERED_FIELDS: &[&str] = &[
    "data",
    "answer",
    "response",
    "content",
    "assistant_response",
    "reply",
    "text",
    "output",
    "message",
];

/// One parsed JSON object from a protocol line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
    /// Parse a payload candidate into an envelope.
    ///
    /// Returns `None` only when the payload is not JSON. A JSON value that
    /// is not an object has no fields and yields an empty envelope.
    #[must_use]
    pub fn parse(payload: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(map)) => Some(Self(map)),
            Ok(_) => Some(Self::default()),
            Err(_) => None,
        }
    }

    /// Parse a payload that must be a JSON object.
    #[must_use]
    pub fn parse_object(payload: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(payload) {
            Ok(Value::Object(map)) => Some(Self(map)),
            _ => None,
        }
    }

    /// Whether the envelope has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wrap an already-parsed JSON object.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Borrow the underlying JSON object.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Raw value of `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Value of `field` when it is a JSON string.
    #[must_use]
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// The `status` field.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.str_field("status")
    }

    /// The `step` field.
    #[must_use]
    pub fn step(&self) -> Option<&str> {
        self.str_field("step")
    }

    /// The `message` field.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.str_field("message")
    }

    /// The `error` field.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.str_field("error")
    }

    /// The `session_id` field.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.str_field("session_id")
    }

    /// Whether `field` is the JSON literal `true`.
    #[must_use]
    pub fn flag(&self, field: &str) -> bool {
        matches!(self.0.get(field), Some(Value::Bool(true)))
    }

    /// Whether `field` is missing or holds a falsy value
    /// (`null`, `false`, `0`, or `""`).
    #[must_use]
    pub fn is_blank(&self, field: &str) -> bool {
        self.0.get(field).map_or(true, is_falsy)
    }

    /// First value among `fields` that is neither `null` nor an empty string.
    #[must_use]
    pub fn first_present(&self, fields: &[&str]) -> Option<&Value> {
        fields
            .iter()
            .filter_map(|field| self.0.get(*field))
            .find(|value| !is_empty_value(value))
    }

    /// First non-empty string value among `fields`.
    #[must_use]
    pub fn first_string(&self, fields: &[&str]) -> Option<&str> {
        fields
            .iter()
            .filter_map(|field| self.str_field(field))
            .find(|value| !value.is_empty())
    }
}

impl From<Map<String, Value>> for Envelope {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
