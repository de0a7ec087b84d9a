//! Message and record models
//!
//! A [`QueueMessage`] is what the queue hands back, a [`RawMessage`] is its
//! parsed body, and an [`OutputRecord`] is the pseudonymized row written to
//! the sink.

use crate::domain::errors::TransformError;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// A message as received from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Queue-assigned message ID, if any
    pub message_id: Option<String>,

    /// Handle needed to delete the message after processing
    pub receipt_handle: Option<String>,

    /// JSON text body
    pub body: String,
}

impl QueueMessage {
    /// Create a message with only a body
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            message_id: None,
            receipt_handle: None,
            body: body.into(),
        }
    }

    /// Sets the message ID
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Sets the receipt handle
    pub fn with_receipt_handle(mut self, handle: impl Into<String>) -> Self {
        self.receipt_handle = Some(handle.into());
        self
    }

    /// Parse the body into a [`RawMessage`]
    pub fn parse(&self) -> Result<RawMessage, TransformError> {
        RawMessage::parse(&self.body)
    }
}

/// Parsed message body
///
/// Only `ip` and `device_id` are required; everything else is read leniently.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    fields: Map<String, Value>,
}

impl RawMessage {
    /// Parse a JSON object body
    pub fn parse(body: &str) -> Result<Self, TransformError> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(TransformError::MalformedBody(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
            Err(e) => Err(TransformError::MalformedBody(e.to_string())),
        }
    }

    /// Field value; `None` when the key is absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// A required, non-empty string field
    pub fn required_str(&self, field: &str) -> Result<&str, TransformError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(TransformError::MissingField(field.to_string())),
            Some(Value::String(s)) if s.is_empty() => {
                Err(TransformError::MissingField(field.to_string()))
            }
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(TransformError::InvalidFieldType {
                field: field.to_string(),
                found: json_type_name(other).to_string(),
            }),
        }
    }

    /// An optional scalar field rendered as text
    ///
    /// Absent and null both yield `None`; numbers and booleans keep their
    /// JSON spelling.
    pub fn passthrough(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl From<Map<String, Value>> for RawMessage {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Pseudonymized row, in sink column order
///
/// Built once per successfully transformed message and handed to the sink
/// by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub user_id: Option<String>,
    pub app_version: i32,
    pub device_type: Option<String>,
    pub masked_ip: String,
    pub locale: String,
    pub masked_device_id: String,
    pub create_date: NaiveDate,
}
