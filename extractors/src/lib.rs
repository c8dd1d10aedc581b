//! Extractors Crate
//!
//! This crate turns SMS inbox contents into structured transaction records.
//! It is a pure library: it never talks to a message store or a database.
//!
//! # Architecture
//!
//! - **Types**: Message and record types and the extractor trait are defined in
//!   the `shared-types` crate
//! - **Adapters**: `message_adapters` normalizes source-specific JSON shapes
//!   into `RawMessage`
//! - **Implementations**: `sms_transactions` holds the rule-based extractor
//!
//! # Example
//!
//! ```rust,ignore
//! use extractors::{messages_from_json, MessageShape, SmsTransactionExtractor};
//! use shared_types::TransactionExtractor;
//!
//! let messages = messages_from_json(&payload, MessageShape::Auto)?;
//! let extractor = SmsTransactionExtractor::new()?;
//! let records = extractor.extract(&messages);
//! ```

pub mod message_adapters;
pub mod sms_transactions;

// Re-export commonly used types
pub use message_adapters::{messages_from_json, messages_from_value, MessageShape};
pub use sms_transactions::{DisplayFormat, DisplayTimezone, SmsTransactionExtractor};

// Re-export the extractor trait from shared-types for convenience
pub use shared_types::TransactionExtractor;
