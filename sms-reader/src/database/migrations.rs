use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS sms_transactions (
            id VARCHAR PRIMARY KEY,
            sender VARCHAR NOT NULL,
            amount VARCHAR NOT NULL,
            kind VARCHAR NOT NULL CHECK (kind IN ('Debit', 'Credit', 'Balance', 'Unknown')),
            date VARCHAR NOT NULL,
            time VARCHAR NOT NULL,
            timestamp BIGINT NOT NULL,
            description VARCHAR NOT NULL,
            message_preview VARCHAR NOT NULL,
            full_message VARCHAR NOT NULL,
            stored_at BIGINT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_sms_transactions_timestamp
         ON sms_transactions (timestamp DESC)",
        [],
    )?;

    Ok(())
}
