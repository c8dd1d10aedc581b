//! Transaction detection for bank and payment-app SMS notifications.
//!
//! A message becomes a [`shared_types::TransactionRecord`] when it passes two
//! gates: its sender or body names a known bank, wallet or payment rail, and
//! its body uses transaction vocabulary or a rupee marker. Amount, direction
//! and merchant are then read with ordered, first-match-wins pattern lists.

mod extractor;
pub mod patterns;
pub mod timestamp;

pub use extractor::{SmsTransactionExtractor, PREVIEW_CHARS};
pub use patterns::{FieldPattern, TransactionPatterns};
pub use timestamp::{resolve_timestamp, timestamp_millis, DisplayFormat, DisplayTimezone};
