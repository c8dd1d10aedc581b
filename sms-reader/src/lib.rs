//! Application layer around the SMS transaction extractor: message sources,
//! scan jobs, the live listener and SQLite persistence.

pub mod config;
pub mod database;
pub mod jobs;
pub mod sources;

pub use config::AppConfig;
pub use database::{SqliteTransactionStore, TransactionSink};
pub use jobs::{IncomingListener, ScanError, ScanManager, ScanSummary};
pub use sources::{JsonExportSource, MessageSource, StaticSource};
