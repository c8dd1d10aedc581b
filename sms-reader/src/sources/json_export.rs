use super::{apply_filter, MessageSource};
use anyhow::{Context, Result};
use async_trait::async_trait;
use extractors::{messages_from_json, MessageShape};
use shared_types::{MessageFilter, RawMessage};
use std::path::PathBuf;

/// Inbox export on disk: a JSON array of message records
pub struct JsonExportSource {
    path: PathBuf,
    shape: MessageShape,
}

impl JsonExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            shape: MessageShape::Auto,
        }
    }

    pub fn with_shape(mut self, shape: MessageShape) -> Self {
        self.shape = shape;
        self
    }
}

#[async_trait]
impl MessageSource for JsonExportSource {
    fn name(&self) -> &str {
        "json-export"
    }

    async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn request_permission(&self) -> bool {
        match tokio::fs::File::open(&self.path).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Cannot open {:?}: {}", self.path, e);
                false
            }
        }
    }

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<RawMessage>> {
        let payload = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read message export at {:?}", self.path))?;

        let messages = messages_from_json(&payload, self.shape)
            .with_context(|| format!("Failed to parse message export at {:?}", self.path))?;

        tracing::debug!(
            "Loaded {} messages from {:?}",
            messages.len(),
            self.path
        );

        Ok(apply_filter(messages, filter))
    }
}
