pub mod extraction;
pub mod sms;
pub mod transaction;

pub use extraction::{
    BatchReport, ExtractionError, MessageOutcome, SkipReason, TransactionExtractor,
};
pub use sms::{MessageFilter, MessageTimestamp, RawMessage};
pub use transaction::{TransactionKind, TransactionRecord, DEFAULT_DESCRIPTION, UNKNOWN_AMOUNT};
