use crate::database::TransactionSink;
use shared_types::{RawMessage, TransactionExtractor, TransactionRecord};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Transactions shown to the user, newest first
pub type TransactionFeed = Arc<Mutex<Vec<TransactionRecord>>>;

/// Watches incoming messages and prepends detected transactions to a feed
pub struct IncomingListener {
    handle: JoinHandle<()>,
}

impl IncomingListener {
    pub fn start(
        mut incoming: mpsc::Receiver<RawMessage>,
        extractor: Arc<dyn TransactionExtractor>,
        feed: TransactionFeed,
        sink: Option<Arc<dyn TransactionSink>>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            tracing::info!("SMS listener started");

            while let Some(message) = incoming.recv().await {
                let records = extractor.extract(std::slice::from_ref(&message));
                let Some(record) = records.into_iter().next() else {
                    continue;
                };

                tracing::info!(
                    "New transaction SMS from {}: {} {}",
                    record.sender,
                    record.kind,
                    record.amount
                );

                if let Some(sink) = &sink {
                    if let Err(e) = sink.save_transactions(std::slice::from_ref(&record)).await {
                        tracing::error!("Failed to store incoming transaction: {:#}", e);
                    }
                }

                feed.lock().await.insert(0, record);
            }

            tracing::info!("SMS listener stopped: channel closed");
        });

        Self { handle }
    }

    pub fn stop(self) {
        self.handle.abort();
        tracing::info!("SMS listener stopped");
    }

    /// Wait until the incoming channel closes
    pub async fn join(self) -> anyhow::Result<()> {
        self.handle.await?;
        Ok(())
    }
}
