pub mod migrations;
pub mod transactions;

pub use transactions::SqliteTransactionStore;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use shared_types::TransactionRecord;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

pub type DbConnection = Arc<Mutex<Connection>>;

/// Consumer of extracted transaction records
#[async_trait]
pub trait TransactionSink: Send + Sync {
    /// Store records, replacing any with the same id. Returns how many were written.
    async fn save_transactions(&self, records: &[TransactionRecord]) -> Result<usize>;

    /// Stored records, newest first
    async fn list_transactions(&self, limit: Option<usize>) -> Result<Vec<TransactionRecord>>;
}

/// Open (or create) the database file and run migrations
pub fn open_database(db_path: &Path) -> Result<DbConnection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)?;
    migrations::run_migrations(&conn)?;

    tracing::debug!("Database ready at {:?}", db_path);
    Ok(Arc::new(Mutex::new(conn)))
}

pub fn open_in_memory() -> Result<DbConnection> {
    let conn = Connection::open_in_memory()?;
    migrations::run_migrations(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

pub(crate) fn lock(conn: &DbConnection) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| anyhow::anyhow!("Database connection mutex poisoned"))
}
