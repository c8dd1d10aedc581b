//! Normalization of the message shapes different SMS sources hand out.
//!
//! The extractor only understands [`RawMessage`]; every probing of
//! alternative field names happens here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ExtractionError, MessageTimestamp, RawMessage};
use std::str::FromStr;

/// Known message record layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageShape {
    /// Pick per record: Android provider rows carry `_id`
    #[default]
    Auto,
    /// `body|message|text`, `address|sender|from`, `date|timestamp`
    Retriever,
    /// Rows of the Android `content://sms` provider
    AndroidProvider,
}

impl MessageShape {
    pub fn detect(value: &Value) -> MessageShape {
        if value.get("_id").is_some() {
            MessageShape::AndroidProvider
        } else {
            MessageShape::Retriever
        }
    }

    pub fn normalize(self, value: &Value) -> RawMessage {
        match self {
            MessageShape::Auto => MessageShape::detect(value).normalize(value),
            MessageShape::Retriever => from_retriever(value),
            MessageShape::AndroidProvider => from_android_provider(value),
        }
    }
}

impl FromStr for MessageShape {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(MessageShape::Auto),
            "retriever" => Ok(MessageShape::Retriever),
            "android-provider" | "android" => Ok(MessageShape::AndroidProvider),
            other => Err(ExtractionError::InvalidInput(format!(
                "Unknown message shape: {other}"
            ))),
        }
    }
}

pub fn from_retriever(value: &Value) -> RawMessage {
    RawMessage {
        id: first_text(value, &["id"]),
        body: first_text(value, &["body", "message", "text"]),
        sender: first_text(value, &["address", "sender", "from"]),
        timestamp: first_timestamp(value, &["date", "timestamp"]),
    }
}

pub fn from_android_provider(value: &Value) -> RawMessage {
    RawMessage {
        id: first_text(value, &["_id"]),
        body: first_text(value, &["body"]),
        sender: first_text(value, &["address"]),
        timestamp: first_timestamp(value, &["date", "date_sent"]),
    }
}

/// Parse a JSON array of message records.
///
/// Array elements that are not objects become empty messages, which the
/// extractor later skips; anything other than an array is rejected.
pub fn messages_from_json(
    payload: &str,
    shape: MessageShape,
) -> Result<Vec<RawMessage>, ExtractionError> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| ExtractionError::ParseError(format!("Invalid message JSON: {e}")))?;
    messages_from_value(&value, shape)
}

pub fn messages_from_value(
    value: &Value,
    shape: MessageShape,
) -> Result<Vec<RawMessage>, ExtractionError> {
    let items = value.as_array().ok_or_else(|| {
        ExtractionError::InvalidInput(format!(
            "Expected an array of messages, got {}",
            json_kind(value)
        ))
    })?;

    Ok(items.iter().map(|item| shape.normalize(item)).collect())
}

// First populated field wins; empty strings, zero and null count as absent
fn first_text(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_timestamp(value: &Value, keys: &[&str]) -> Option<MessageTimestamp> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .filter(|millis| *millis != 0)
            .map(MessageTimestamp::Millis),
        Value::String(s) if !s.is_empty() => Some(MessageTimestamp::Text(s.clone())),
        _ => None,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
