use serde::{Deserialize, Serialize};

/// Time a message was received, as the message source reported it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageTimestamp {
    Millis(i64),
    Text(String),
}

impl From<i64> for MessageTimestamp {
    fn from(millis: i64) -> Self {
        MessageTimestamp::Millis(millis)
    }
}

impl From<&str> for MessageTimestamp {
    fn from(text: &str) -> Self {
        MessageTimestamp::Text(text.to_string())
    }
}

/// A message as handed over by a message source, after adapter normalization.
///
/// Every field is optional: sources are free to omit any of them and the
/// extractor decides what to do with incomplete records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: Option<String>,
    pub body: Option<String>,
    pub sender: Option<String>,
    pub timestamp: Option<MessageTimestamp>,
}

impl RawMessage {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: None,
            body: Some(body.into()),
            sender: Some(sender.into()),
            timestamp: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<MessageTimestamp>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Time window and size limit applied when listing messages from a source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFilter {
    pub min_timestamp: Option<i64>,
    pub max_timestamp: Option<i64>,
    pub max_count: Option<usize>,
}

impl MessageFilter {
    /// Whether a message received at `millis` falls inside the window.
    /// Messages without a usable timestamp are kept only by an open window.
    pub fn admits(&self, millis: Option<i64>) -> bool {
        match millis {
            Some(ts) => {
                self.min_timestamp.map_or(true, |min| ts >= min)
                    && self.max_timestamp.map_or(true, |max| ts <= max)
            }
            None => self.min_timestamp.is_none() && self.max_timestamp.is_none(),
        }
    }
}
