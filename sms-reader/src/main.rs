use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use extractors::{MessageShape, SmsTransactionExtractor};
use shared_types::{MessageFilter, TransactionRecord};
use sms_reader::database::{self, SqliteTransactionStore, TransactionSink};
use sms_reader::{AppConfig, JsonExportSource, ScanManager};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Find bank and payment transactions in an SMS inbox export")]
struct Cli {
    #[arg(long, global = true)]
    log_file_path: Option<String>,

    /// Config file to use instead of the per-user one
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transactions from a JSON inbox export
    Scan {
        /// JSON array of messages
        #[arg(long, value_name = "FILE")]
        input: PathBuf,

        /// Layout of the export records
        #[arg(long, default_value = "auto")]
        shape: MessageShape,

        /// Only messages received during the last N days, 0 for all.
        /// Defaults to `scan.days_back` from the config
        #[arg(long)]
        days: Option<u32>,

        #[arg(long)]
        max_count: Option<usize>,

        /// Print records as JSON
        #[arg(long)]
        json: bool,

        /// Do not save records to the database
        #[arg(long)]
        no_store: bool,
    },

    /// Show stored transactions, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file_path.as_deref());

    let (config, config_path) = match &cli.config {
        Some(path) => (AppConfig::load_from(path)?, path.clone()),
        None => AppConfig::load()?,
    };
    tracing::debug!("Loaded config from {:?}", config_path);

    match cli.command {
        Command::Scan {
            input,
            shape,
            days,
            max_count,
            json,
            no_store,
        } => {
            let scan_config = config.scan();
            let extractor = SmsTransactionExtractor::with_format(config.display_format())?;
            let source = JsonExportSource::new(input).with_shape(shape);

            let mut manager = ScanManager::new(Arc::new(source), Arc::new(extractor));
            if !no_store {
                let db_path = config.db_path()?;
                let conn = database::open_database(&db_path)
                    .with_context(|| format!("Failed to open db at {:?}", db_path))?;
                manager = manager.with_sink(Arc::new(SqliteTransactionStore::new(conn)));
            }

            let days = days.unwrap_or(scan_config.days_back);
            let min_timestamp = (days > 0).then(|| {
                (chrono::Utc::now() - chrono::Duration::days(i64::from(days))).timestamp_millis()
            });
            let filter = MessageFilter {
                min_timestamp,
                max_timestamp: None,
                max_count: max_count.or(scan_config.max_count),
            };

            let summary = manager.scan(filter).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&summary.transactions)?);
            } else {
                println!(
                    "Found {} transaction SMS out of {} total messages",
                    summary.transaction_count(),
                    summary.total_messages
                );
                print_transactions(&summary.transactions);
            }
        }
        Command::List { limit, json } => {
            let db_path = config.db_path()?;
            let conn = database::open_database(&db_path)
                .with_context(|| format!("Failed to open db at {:?}", db_path))?;
            let store = SqliteTransactionStore::new(conn);

            let records = store.list_transactions(limit).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_transactions(&records);
            }
        }
    }

    Ok(())
}

fn print_transactions(records: &[TransactionRecord]) {
    for line in transaction_lines(records) {
        println!("{line}");
    }
}

fn transaction_lines(records: &[TransactionRecord]) -> Vec<String> {
    if records.is_empty() {
        return vec!["No transaction SMS found".to_string()];
    }

    records
        .iter()
        .map(|record| {
            format!(
                "{} {}  {}{}  {}  {}  ({})",
                record.date,
                record.time,
                record.kind.sign(),
                format_amount(record),
                record.description,
                record.kind,
                record.sender
            )
        })
        .collect()
}

fn format_amount(record: &TransactionRecord) -> String {
    if record.has_known_amount() {
        format!("₹{}", record.amount)
    } else {
        record.amount.clone()
    }
}

fn init_tracing(log_file_path: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Logs go to stderr so that --json output stays clean on stdout
    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("sms-reader.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
