use crate::sms_transactions::patterns::{
    has_transaction_keywords, matches_source_signature, TransactionPatterns,
};
use crate::sms_transactions::timestamp::{resolve_timestamp, DisplayFormat};
use chrono::{DateTime, Utc};
use shared_types::{
    BatchReport, ExtractionError, MessageOutcome, RawMessage, SkipReason, TransactionExtractor,
    TransactionRecord,
};
use std::collections::HashSet;

/// Longest body kept in `message_preview`, in characters
pub const PREVIEW_CHARS: usize = 100;

/// Rule-based extractor for bank and payment-app SMS notifications
pub struct SmsTransactionExtractor {
    patterns: TransactionPatterns,
    format: DisplayFormat,
}

impl SmsTransactionExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        Self::with_format(DisplayFormat::default())
    }

    pub fn with_format(format: DisplayFormat) -> Result<Self, ExtractionError> {
        format.validate()?;
        let patterns = TransactionPatterns::compile()
            .map_err(|e| ExtractionError::ConfigError(format!("Invalid pattern: {e}")))?;
        Ok(Self { patterns, format })
    }

    pub fn patterns(&self) -> &TransactionPatterns {
        &self.patterns
    }

    /// Extract with an explicit capture time, newest first
    pub fn extract_at(
        &self,
        messages: &[RawMessage],
        captured_at: DateTime<Utc>,
    ) -> Vec<TransactionRecord> {
        self.process_batch(messages, captured_at).into_records()
    }

    fn process_message(
        &self,
        index: usize,
        message: &RawMessage,
        captured_at: DateTime<Utc>,
    ) -> Result<TransactionRecord, SkipReason> {
        let body = non_empty(message.body.as_deref()).ok_or(SkipReason::MissingBody)?;
        let sender = non_empty(message.sender.as_deref()).ok_or(SkipReason::MissingSender)?;

        if !matches_source_signature(sender, body) {
            return Err(SkipReason::UnrecognizedSource);
        }
        if !has_transaction_keywords(body) {
            return Err(SkipReason::NoTransactionKeywords);
        }

        let instant = resolve_timestamp(message.timestamp.as_ref(), captured_at);
        let (date, time) = self.format.render(instant);

        Ok(TransactionRecord {
            id: non_empty(message.id.as_deref())
                .map(str::to_string)
                .unwrap_or_else(|| synthesized_id(captured_at, index)),
            sender: sender.to_string(),
            amount: self.patterns.extract_amount(body),
            kind: self.patterns.classify_kind(body),
            date,
            time,
            timestamp: instant.timestamp_millis(),
            description: self.patterns.extract_description(body),
            message_preview: preview(body),
            full_message: body.to_string(),
        })
    }
}

impl TransactionExtractor for SmsTransactionExtractor {
    fn process_batch(&self, messages: &[RawMessage], captured_at: DateTime<Utc>) -> BatchReport {
        let mut used_ids = HashSet::new();
        let mut outcomes = Vec::with_capacity(messages.len());

        for (index, message) in messages.iter().enumerate() {
            match self.process_message(index, message, captured_at) {
                Ok(mut record) => {
                    if !used_ids.insert(record.id.clone()) {
                        tracing::debug!(id = %record.id, index, "Duplicate message id in batch");
                        record.id = unique_id(&used_ids, captured_at, index);
                        used_ids.insert(record.id.clone());
                    }
                    outcomes.push(MessageOutcome::Extracted(record));
                }
                Err(reason) => {
                    tracing::debug!(index, %reason, "Skipping message");
                    outcomes.push(MessageOutcome::Skipped { index, reason });
                }
            }
        }

        let report = BatchReport { outcomes };
        tracing::debug!(
            total = messages.len(),
            extracted = report.extracted_count(),
            "Processed SMS batch"
        );
        report
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn synthesized_id(captured_at: DateTime<Utc>, index: usize) -> String {
    format!("{}_{}", captured_at.timestamp_millis(), index)
}

// The plain synthesized id can itself be taken by a source id
fn unique_id(used: &HashSet<String>, captured_at: DateTime<Utc>, index: usize) -> String {
    let base = synthesized_id(captured_at, index);
    if !used.contains(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(base)
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{TransactionKind, DEFAULT_DESCRIPTION, UNKNOWN_AMOUNT};

    const JAN_15_2024: i64 = 1_705_314_600_000;

    fn extractor() -> SmsTransactionExtractor {
        SmsTransactionExtractor::with_format(DisplayFormat::utc()).unwrap()
    }

    fn captured_at() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_710_000_000_000).unwrap()
    }

    #[test]
    fn test_hdfc_debit() {
        let messages = vec![RawMessage::new(
            "HDFC-BANK",
            "Rs. 500 debited from a/c XX1234 at AMAZON on 05-01-2024",
        )
        .with_id("sms-1")
        .with_timestamp(JAN_15_2024)];

        let records = extractor().extract_at(&messages, captured_at());
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id, "sms-1");
        assert_eq!(record.sender, "HDFC-BANK");
        assert_eq!(record.amount, "500");
        assert_eq!(record.kind, TransactionKind::Debit);
        assert_eq!(record.description, "AMAZON");
        assert_eq!(record.date, "1/15/2024");
        assert_eq!(record.time, "10:30:00 AM");
        assert_eq!(record.timestamp, JAN_15_2024);
    }

    #[test]
    fn test_upi_credit_strips_commas() {
        let messages = vec![RawMessage::new(
            "AX-PAYTM",
            "You have received Rs. 1,250 from UPI-JOHNDOE",
        )];

        let records = extractor().extract_at(&messages, captured_at());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, "1250");
        assert_eq!(records[0].kind, TransactionKind::Credit);
        assert_eq!(records[0].description, "JOHNDOE");
    }

    #[test]
    fn test_missing_amount_still_produces_record() {
        let messages = vec![RawMessage::new("SBI", "Your UPI payment request has been declined")];

        let records = extractor().extract_at(&messages, captured_at());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount, UNKNOWN_AMOUNT);
        assert_eq!(records[0].description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_missing_body_or_sender_is_skipped() {
        let messages = vec![
            RawMessage {
                sender: Some("HDFC".to_string()),
                ..RawMessage::default()
            },
            RawMessage {
                body: Some("Rs. 10 debited".to_string()),
                ..RawMessage::default()
            },
            RawMessage::new("", "Rs. 10 debited via UPI"),
            RawMessage::default(),
        ];

        let report = extractor().process_batch(&messages, captured_at());
        assert_eq!(report.extracted_count(), 0);
        assert_eq!(
            report.skipped().collect::<Vec<_>>(),
            vec![
                (0, SkipReason::MissingBody),
                (1, SkipReason::MissingSender),
                (2, SkipReason::MissingSender),
                (3, SkipReason::MissingBody),
            ]
        );
        assert!(report.into_records().is_empty());
    }

    #[test]
    fn test_gate_reasons() {
        let messages = vec![
            RawMessage::new("FRIEND", "Rs. 100 for the movie tickets?"),
            RawMessage::new("HDFC", "Your OTP is 482913"),
        ];

        let report = extractor().process_batch(&messages, captured_at());
        assert_eq!(
            report.skipped().collect::<Vec<_>>(),
            vec![
                (0, SkipReason::UnrecognizedSource),
                (1, SkipReason::NoTransactionKeywords),
            ]
        );
    }

    #[test]
    fn test_end_to_end_sorted_newest_first() {
        let messages = vec![
            RawMessage::new("ICICI", "Rs. 200 debited from your account")
                .with_timestamp(JAN_15_2024),
            RawMessage::new("PAYTM", "You have received Rs. 50 from Asha")
                .with_timestamp(JAN_15_2024 + 3_600_000),
            RawMessage::new("FRIEND", "Hey, are we still meeting for lunch tomorrow?")
                .with_timestamp(JAN_15_2024 + 7_200_000),
        ];

        let records = extractor().extract_at(&messages, captured_at());
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].sender, "PAYTM");
        assert_eq!(records[0].kind, TransactionKind::Credit);
        assert_eq!(records[0].amount, "50");
        assert_eq!(records[0].description, "Asha");

        assert_eq!(records[1].sender, "ICICI");
        assert_eq!(records[1].kind, TransactionKind::Debit);
        assert_eq!(records[1].amount, "200");
        assert!(records.iter().all(|r| r.sender != "FRIEND"));
    }

    #[test]
    fn test_synthesized_ids_are_unique() {
        let messages = vec![
            RawMessage::new("SBI", "Rs. 1 debited"),
            RawMessage::new("SBI", "Rs. 2 debited").with_id("dup"),
            RawMessage::new("SBI", "Rs. 3 debited").with_id("dup"),
            RawMessage::new("SBI", "Rs. 4 debited").with_id("1710000000000_4"),
            RawMessage::new("SBI", "Rs. 5 debited").with_id("1710000000000_4"),
        ];

        let records = extractor().extract_at(&messages, captured_at());
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "1710000000000_0",
                "dup",
                "1710000000000_2",
                "1710000000000_4",
                "1710000000000_4_1",
            ]
        );
    }

    #[test]
    fn test_empty_source_id_is_replaced() {
        let messages = vec![RawMessage::new("SBI", "Rs. 9 debited").with_id("")];

        let records = extractor().extract_at(&messages, captured_at());
        assert_eq!(records[0].id, format!("{}_0", captured_at().timestamp_millis()));
    }

    #[test]
    fn test_invalid_timestamp_uses_capture_time() {
        let messages = vec![RawMessage::new("HDFC", "Rs. 5 debited").with_timestamp("not-a-date")];

        let records = extractor().extract_at(&messages, captured_at());
        assert_eq!(records[0].timestamp, captured_at().timestamp_millis());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let body = format!("Rs. 10 debited {}", "₹".repeat(120));
        let messages = vec![RawMessage::new("HDFC", body.clone())];

        let records = extractor().extract_at(&messages, captured_at());
        let record = &records[0];
        assert_eq!(record.full_message, body);
        assert!(record.message_preview.ends_with("..."));
        assert_eq!(record.message_preview.chars().count(), PREVIEW_CHARS + 3);

        let short = preview("Rs. 10 debited");
        assert_eq!(short, "Rs. 10 debited");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let messages = vec![
            RawMessage::new("HDFC", "Rs. 500 debited at SWIGGY on 3rd")
                .with_id("a")
                .with_timestamp(JAN_15_2024),
            RawMessage::new("KOTAK", "INR 20 credited").with_timestamp("1705314000000"),
        ];

        // Synthesized ids embed the capture time, everything else must agree
        let without_ids = |mut records: Vec<TransactionRecord>| {
            records.iter_mut().for_each(|r| r.id.clear());
            records
        };

        let ex = extractor();
        let first = ex.extract(&messages);
        let second = ex.extract(&messages);
        assert_eq!(first[0].id, "a");
        assert_eq!(second[0].id, "a");
        assert_eq!(without_ids(first), without_ids(second));
    }

    #[test]
    fn test_malformed_batch_never_fails() {
        let messages = vec![
            RawMessage::default(),
            RawMessage::new("BANK", "\u{0}\u{FFFF}"),
            RawMessage::new("UPI", "rs.").with_timestamp(i64::MAX),
            RawMessage::new("HDFC", "Rs.,,, debited").with_timestamp("-"),
        ];

        let report = extractor().process_batch(&messages, captured_at());
        assert_eq!(report.outcomes.len(), messages.len());
    }
}
