use super::{lock, DbConnection, TransactionSink};
use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, Row};
use shared_types::{TransactionKind, TransactionRecord};

pub struct SqliteTransactionStore {
    conn: DbConnection,
}

impl SqliteTransactionStore {
    pub fn new(conn: DbConnection) -> Self {
        Self { conn }
    }

    pub fn count(&self) -> Result<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM sms_transactions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[async_trait]
impl TransactionSink for SqliteTransactionStore {
    async fn save_transactions(&self, records: &[TransactionRecord]) -> Result<usize> {
        let mut conn = lock(&self.conn)?;
        let now = chrono::Utc::now().timestamp();

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO sms_transactions
                 (id, sender, amount, kind, date, time, timestamp, description,
                  message_preview, full_message, stored_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.id,
                    record.sender,
                    record.amount,
                    record.kind.as_str(),
                    record.date,
                    record.time,
                    record.timestamp,
                    record.description,
                    record.message_preview,
                    record.full_message,
                    now,
                ])?;
            }
        }
        tx.commit()?;

        tracing::debug!("Stored {} SMS transactions", records.len());
        Ok(records.len())
    }

    async fn list_transactions(&self, limit: Option<usize>) -> Result<Vec<TransactionRecord>> {
        let conn = lock(&self.conn)?;

        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map_or(-1, |l| l as i64);

        let mut stmt = conn.prepare(
            "SELECT id, sender, amount, kind, date, time, timestamp, description,
                    message_preview, full_message
             FROM sms_transactions
             ORDER BY timestamp DESC
             LIMIT ?",
        )?;

        let records = stmt
            .query_map([limit], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    let kind: String = row.get(3)?;
    let kind = kind.parse::<TransactionKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(TransactionRecord {
        id: row.get(0)?,
        sender: row.get(1)?,
        amount: row.get(2)?,
        kind,
        date: row.get(4)?,
        time: row.get(5)?,
        timestamp: row.get(6)?,
        description: row.get(7)?,
        message_preview: row.get(8)?,
        full_message: row.get(9)?,
    })
}
