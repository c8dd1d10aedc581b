use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{RawMessage, TransactionRecord};

/// Core trait that all transaction extractors must implement
pub trait TransactionExtractor: Send + Sync {
    /// Classify every message of a batch, keeping the per-message outcome.
    ///
    /// `captured_at` stands in for "now": it seeds synthesized ids and is the
    /// fallback for messages without a usable timestamp.
    fn process_batch(&self, messages: &[RawMessage], captured_at: DateTime<Utc>) -> BatchReport;

    /// Extract transactions from a batch, newest first
    fn extract(&self, messages: &[RawMessage]) -> Vec<TransactionRecord> {
        self.process_batch(messages, Utc::now()).into_records()
    }

    /// Get extractor version for tracking
    fn version(&self) -> String {
        "1.0.0".to_string()
    }
}

/// Extraction error types
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Why a message produced no transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    #[error("message has no body")]
    MissingBody,

    #[error("message has no sender")]
    MissingSender,

    #[error("sender and body match no bank or payment signature")]
    UnrecognizedSource,

    #[error("body contains no transaction keywords")]
    NoTransactionKeywords,
}

/// Result of classifying one message of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    Extracted(TransactionRecord),
    Skipped { index: usize, reason: SkipReason },
}

/// Per-message outcomes of one batch, in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<MessageOutcome>,
}

impl BatchReport {
    pub fn extracted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, MessageOutcome::Extracted(_)))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (usize, SkipReason)> + '_ {
        self.outcomes.iter().filter_map(|o| match o {
            MessageOutcome::Skipped { index, reason } => Some((*index, *reason)),
            MessageOutcome::Extracted(_) => None,
        })
    }

    /// Extracted records sorted newest first. The sort is stable, so records
    /// sharing a timestamp keep their input order.
    pub fn into_records(self) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = self
            .outcomes
            .into_iter()
            .filter_map(|o| match o {
                MessageOutcome::Extracted(record) => Some(record),
                MessageOutcome::Skipped { .. } => None,
            })
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }
}
