pub mod listener;
pub mod scan_manager;

pub use listener::{IncomingListener, TransactionFeed};
pub use scan_manager::{ScanError, ScanManager, ScanSummary};
