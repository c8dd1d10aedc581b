pub mod json_export;

pub use json_export::JsonExportSource;

use anyhow::Result;
use async_trait::async_trait;
use extractors::sms_transactions::timestamp_millis;
use shared_types::{MessageFilter, RawMessage};

/// Capability to read the device's message store.
///
/// Availability and permission are asked separately so callers can tell a
/// missing backend apart from a user who declined access.
#[async_trait]
pub trait MessageSource: Send + Sync {
    fn name(&self) -> &str;

    async fn is_available(&self) -> bool;

    async fn request_permission(&self) -> bool;

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<RawMessage>>;
}

/// Apply a filter's time window, then its count limit, keeping input order
pub fn apply_filter(messages: Vec<RawMessage>, filter: &MessageFilter) -> Vec<RawMessage> {
    let in_window = messages.into_iter().filter(|msg| {
        filter.admits(msg.timestamp.as_ref().and_then(timestamp_millis))
    });

    match filter.max_count {
        Some(max) => in_window.take(max).collect(),
        None => in_window.collect(),
    }
}

/// Messages held in memory
pub struct StaticSource {
    messages: Vec<RawMessage>,
    permission_granted: bool,
}

impl StaticSource {
    pub fn new(messages: Vec<RawMessage>) -> Self {
        Self {
            messages,
            permission_granted: true,
        }
    }

    pub fn denying_permission(mut self) -> Self {
        self.permission_granted = false;
        self
    }
}

#[async_trait]
impl MessageSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn request_permission(&self) -> bool {
        self.permission_granted
    }

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<RawMessage>> {
        Ok(apply_filter(self.messages.clone(), filter))
    }
}
