use crate::database::TransactionSink;
use crate::sources::MessageSource;
use chrono::{Duration, Utc};
use serde::Serialize;
use shared_types::{MessageFilter, TransactionExtractor, TransactionRecord};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Message source '{0}' is not available")]
    SourceUnavailable(String),

    #[error("Permission to read messages from '{0}' was denied")]
    PermissionDenied(String),

    #[error("Failed to retrieve messages: {0}")]
    Retrieval(String),

    #[error("Failed to store transactions: {0}")]
    Storage(String),
}

/// Outcome of one scan over a message source
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub total_messages: usize,
    pub transactions: Vec<TransactionRecord>,
    pub skipped: usize,
}

impl ScanSummary {
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

/// Reads a message source, extracts transactions and hands them to the sink
pub struct ScanManager {
    source: Arc<dyn MessageSource>,
    extractor: Arc<dyn TransactionExtractor>,
    sink: Option<Arc<dyn TransactionSink>>,
}

impl ScanManager {
    pub fn new(source: Arc<dyn MessageSource>, extractor: Arc<dyn TransactionExtractor>) -> Self {
        Self {
            source,
            extractor,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn TransactionSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Scan every message the source holds
    pub async fn scan_all(&self) -> Result<ScanSummary, ScanError> {
        self.scan(MessageFilter::default()).await
    }

    /// Scan messages received during the last `days` days
    pub async fn scan_recent(&self, days: u32) -> Result<ScanSummary, ScanError> {
        let since = Utc::now() - Duration::days(i64::from(days));
        self.scan(MessageFilter {
            min_timestamp: Some(since.timestamp_millis()),
            ..MessageFilter::default()
        })
        .await
    }

    pub async fn scan(&self, filter: MessageFilter) -> Result<ScanSummary, ScanError> {
        let source_name = self.source.name().to_string();

        if !self.source.is_available().await {
            return Err(ScanError::SourceUnavailable(source_name));
        }

        if !self.source.request_permission().await {
            return Err(ScanError::PermissionDenied(source_name));
        }

        let messages = self
            .source
            .list_messages(&filter)
            .await
            .map_err(|e| ScanError::Retrieval(format!("{e:#}")))?;

        tracing::info!("Total SMS count: {}", messages.len());

        let report = self.extractor.process_batch(&messages, Utc::now());
        let skipped = report.skipped().count();
        for (index, reason) in report.skipped() {
            tracing::debug!("Skipped message {}: {}", index, reason);
        }
        let transactions = report.into_records();

        tracing::info!(
            "Found {} transaction SMS out of {} total messages",
            transactions.len(),
            messages.len()
        );

        if let Some(sink) = &self.sink {
            sink.save_transactions(&transactions)
                .await
                .map_err(|e| ScanError::Storage(format!("{e:#}")))?;
        }

        Ok(ScanSummary {
            total_messages: messages.len(),
            transactions,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{open_in_memory, SqliteTransactionStore};
    use crate::sources::StaticSource;
    use async_trait::async_trait;
    use extractors::{DisplayFormat, SmsTransactionExtractor};
    use shared_types::RawMessage;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn extractor() -> Arc<dyn TransactionExtractor> {
        Arc::new(SmsTransactionExtractor::with_format(DisplayFormat::utc()).unwrap())
    }

    fn inbox() -> Vec<RawMessage> {
        let now = Utc::now().timestamp_millis();
        vec![
            RawMessage::new(
                "ICICI",
                "Your account has been debited with Rs. 2,500.00 at AMAZON on 15-Jan",
            )
            .with_id("1")
            .with_timestamp(now - 2 * 86_400_000),
            RawMessage::new("PAYTM", "Received Rs. 100 from JOHN DOE")
                .with_id("2")
                .with_timestamp(now - 60 * 86_400_000),
            RawMessage::new("FRIEND", "Hey, let's meet for dinner")
                .with_id("3")
                .with_timestamp(now - 86_400_000),
        ]
    }

    struct OfflineSource {
        listed: AtomicBool,
    }

    #[async_trait]
    impl MessageSource for OfflineSource {
        fn name(&self) -> &str {
            "offline"
        }

        async fn is_available(&self) -> bool {
            false
        }

        async fn request_permission(&self) -> bool {
            true
        }

        async fn list_messages(
            &self,
            _filter: &MessageFilter,
        ) -> anyhow::Result<Vec<RawMessage>> {
            self.listed.store(true, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl MessageSource for BrokenSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn request_permission(&self) -> bool {
            true
        }

        async fn list_messages(
            &self,
            _filter: &MessageFilter,
        ) -> anyhow::Result<Vec<RawMessage>> {
            Err(anyhow::anyhow!("inbox locked"))
        }
    }

    #[tokio::test]
    async fn test_scan_all_stores_transactions() {
        let store = Arc::new(SqliteTransactionStore::new(open_in_memory().unwrap()));
        let manager = ScanManager::new(Arc::new(StaticSource::new(inbox())), extractor())
            .with_sink(store.clone());

        let summary = manager.scan_all().await.unwrap();
        assert_eq!(summary.total_messages, 3);
        assert_eq!(summary.transaction_count(), 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.transactions[0].id, "1");
        assert_eq!(summary.transactions[1].id, "2");

        assert_eq!(store.count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_scan_recent_limits_window() {
        let manager = ScanManager::new(Arc::new(StaticSource::new(inbox())), extractor());

        let summary = manager.scan_recent(30).await.unwrap();
        assert_eq!(summary.total_messages, 2);
        assert_eq!(summary.transaction_count(), 1);
        assert_eq!(summary.transactions[0].sender, "ICICI");
    }

    #[tokio::test]
    async fn test_unavailable_source_is_never_read() {
        let source = Arc::new(OfflineSource {
            listed: AtomicBool::new(false),
        });
        let manager = ScanManager::new(source.clone(), extractor());

        let err = manager.scan_all().await.unwrap_err();
        assert!(matches!(err, ScanError::SourceUnavailable(name) if name == "offline"));
        assert!(!source.listed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let source = StaticSource::new(inbox()).denying_permission();
        let manager = ScanManager::new(Arc::new(source), extractor());

        let err = manager.scan_all().await.unwrap_err();
        assert!(matches!(err, ScanError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_retrieval_failure() {
        let manager = ScanManager::new(Arc::new(BrokenSource), extractor());

        let err = manager.scan_all().await.unwrap_err();
        assert!(matches!(err, ScanError::Retrieval(msg) if msg.contains("inbox locked")));
    }

    #[tokio::test]
    async fn test_empty_inbox_is_not_an_error() {
        let manager = ScanManager::new(Arc::new(StaticSource::new(Vec::new())), extractor());

        let summary = manager.scan_all().await.unwrap();
        assert_eq!(summary.total_messages, 0);
        assert!(summary.transactions.is_empty());
    }
}
