use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::ExtractionError;

/// Amount value used when no amount pattern matched the message body
pub const UNKNOWN_AMOUNT: &str = "Unknown";

/// Description used when no merchant pattern matched the message body
pub const DEFAULT_DESCRIPTION: &str = "Transaction";

/// Direction of a detected transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
pub enum TransactionKind {
    Debit,
    Credit,
    Balance,
    Unknown,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Debit => "Debit",
            TransactionKind::Credit => "Credit",
            TransactionKind::Balance => "Balance",
            TransactionKind::Unknown => "Unknown",
        }
    }

    /// Sign shown in front of the amount in transaction lists
    pub fn sign(&self) -> char {
        match self {
            TransactionKind::Credit => '+',
            _ => '-',
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Debit" => Ok(TransactionKind::Debit),
            "Credit" => Ok(TransactionKind::Credit),
            "Balance" => Ok(TransactionKind::Balance),
            "Unknown" => Ok(TransactionKind::Unknown),
            other => Err(ExtractionError::ParseError(format!(
                "Unknown transaction kind: {other}"
            ))),
        }
    }
}

/// Transaction detected in a single SMS message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub sender: String,

    // Digits with an optional decimal part, or UNKNOWN_AMOUNT
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,

    // Display components plus the epoch millis they were rendered from
    pub date: String,
    pub time: String,
    #[ts(type = "number")]
    pub timestamp: i64,

    pub description: String,
    pub message_preview: String,
    pub full_message: String,
}

impl TransactionRecord {
    pub fn has_known_amount(&self) -> bool {
        self.amount != UNKNOWN_AMOUNT
    }

    /// Numeric amount, when one was extracted
    pub fn amount_value(&self) -> Option<f64> {
        if !self.has_known_amount() {
            return None;
        }
        self.amount.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransactionRecord {
        TransactionRecord {
            id: "42".to_string(),
            sender: "HDFC-BANK".to_string(),
            amount: "1250.50".to_string(),
            kind: TransactionKind::Debit,
            date: "1/15/2024".to_string(),
            time: "10:30:00 AM".to_string(),
            timestamp: 1_705_314_600_000,
            description: "AMAZON".to_string(),
            message_preview: "Rs. 1250.50 debited".to_string(),
            full_message: "Rs. 1250.50 debited".to_string(),
        }
    }

    #[test]
    fn test_record_serializes_with_ui_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["type"], "Debit");
        assert_eq!(json["messagePreview"], "Rs. 1250.50 debited");
        assert_eq!(json["fullMessage"], "Rs. 1250.50 debited");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [
            TransactionKind::Debit,
            TransactionKind::Credit,
            TransactionKind::Balance,
            TransactionKind::Unknown,
        ] {
            assert_eq!(kind.as_str().parse::<TransactionKind>().unwrap(), kind);
        }
        assert!("debit".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_amount_value() {
        let mut record = sample();
        assert_eq!(record.amount_value(), Some(1250.50));

        record.amount = UNKNOWN_AMOUNT.to_string();
        assert!(!record.has_known_amount());
        assert_eq!(record.amount_value(), None);
    }

    #[test]
    fn test_sign() {
        assert_eq!(TransactionKind::Credit.sign(), '+');
        assert_eq!(TransactionKind::Debit.sign(), '-');
        assert_eq!(TransactionKind::Unknown.sign(), '-');
    }
}
