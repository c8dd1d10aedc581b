use regex::Regex;
use shared_types::{TransactionKind, DEFAULT_DESCRIPTION, UNKNOWN_AMOUNT};

/// Bank, payment-app and transaction-vocabulary names. A message qualifies
/// only if its uppercased sender or body contains one of them.
pub const SOURCE_SIGNATURES: &[&str] = &[
    "HDFC", "ICICI", "SBI", "AXIS", "KOTAK", "CANARA", "BOB", "PNB", "PAYTM", "GPAY", "PHONEPE",
    "BHIM", "AMAZONPAY", "FREECHARGE", "MOBIKWIK", "BANK", "CREDIT", "DEBIT", "TRANSACTION",
    "PAYMENT", "UPI", "NEFT", "RTGS", "IMPS", "WALLET", "CRED", "RAZORPAY",
];

/// Words matched against the lowercased body
pub const TRANSACTION_KEYWORDS: &[&str] = &[
    "debited",
    "credited",
    "transaction",
    "payment",
    "transfer",
    "withdrawn",
    "deposited",
    "spent",
    "received",
    "sent",
    "upi",
    "net banking",
    "balance",
    "account",
];

/// Currency markers, matched as written
pub const CURRENCY_MARKERS: &[&str] = &["Rs.", "INR", "₹"];

// Digits with optional thousands separators and decimal part
const AMOUNT: &str = r"([0-9]+(?:,[0-9]+)*(?:\.[0-9]+)?)";
const CURRENCY: &str = r"(?:Rs\.?|₹|INR)";
// Merchant name and the places it may stop
const NAME: &str = r"([A-Z][A-Z0-9\s]+?)";
const NAME_END: &str = r"(?:\s+on|\s+\d|\s*$)";

/// A regex whose first capture group holds the extracted field
pub struct FieldPattern {
    pub name: &'static str,
    pub regex: Regex,
}

impl FieldPattern {
    fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            regex: Regex::new(pattern)?,
        })
    }

    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Compiled rule set for classifying SMS bodies.
///
/// Amount and merchant patterns are ordered: the first one that matches
/// decides the field, later ones are never consulted.
pub struct TransactionPatterns {
    amount: Vec<FieldPattern>,
    merchant: Vec<FieldPattern>,
    kinds: Vec<(TransactionKind, Regex)>,
}

impl TransactionPatterns {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            amount: create_amount_patterns()?,
            merchant: create_merchant_patterns()?,
            kinds: create_kind_rules()?,
        })
    }

    pub fn amount_patterns(&self) -> &[FieldPattern] {
        &self.amount
    }

    pub fn merchant_patterns(&self) -> &[FieldPattern] {
        &self.merchant
    }

    /// Amount with thousands separators removed, or `"Unknown"`
    pub fn extract_amount(&self, body: &str) -> String {
        self.amount
            .iter()
            .find_map(|p| p.capture(body))
            .map(|raw| raw.replace(',', ""))
            .unwrap_or_else(|| UNKNOWN_AMOUNT.to_string())
    }

    pub fn classify_kind(&self, body: &str) -> TransactionKind {
        self.kinds
            .iter()
            .find(|(_, regex)| regex.is_match(body))
            .map(|(kind, _)| *kind)
            .unwrap_or(TransactionKind::Unknown)
    }

    pub fn extract_description(&self, body: &str) -> String {
        self.merchant
            .iter()
            .find_map(|p| p.capture(body))
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DESCRIPTION)
            .to_string()
    }
}

pub fn matches_source_signature(sender: &str, body: &str) -> bool {
    let sender = sender.to_uppercase();
    let body = body.to_uppercase();
    SOURCE_SIGNATURES
        .iter()
        .any(|sig| sender.contains(sig) || body.contains(sig))
}

pub fn has_transaction_keywords(body: &str) -> bool {
    let lowered = body.to_lowercase();
    TRANSACTION_KEYWORDS.iter().any(|kw| lowered.contains(kw))
        || CURRENCY_MARKERS.iter().any(|marker| body.contains(marker))
}

/// Both gates: a known source and transaction vocabulary
pub fn is_transaction_message(sender: &str, body: &str) -> bool {
    matches_source_signature(sender, body) && has_transaction_keywords(body)
}

/// [`TransactionPatterns::classify_kind`] with a freshly compiled rule set.
/// Prefer holding a [`TransactionPatterns`] when classifying many bodies.
pub fn classify_kind(body: &str) -> Result<TransactionKind, regex::Error> {
    Ok(TransactionPatterns::compile()?.classify_kind(body))
}

pub fn extract_amount(body: &str) -> Result<String, regex::Error> {
    Ok(TransactionPatterns::compile()?.extract_amount(body))
}

pub fn extract_description(body: &str) -> Result<String, regex::Error> {
    Ok(TransactionPatterns::compile()?.extract_description(body))
}

fn create_amount_patterns() -> Result<Vec<FieldPattern>, regex::Error> {
    Ok(vec![
        FieldPattern::new("rs_prefixed", &format!(r"(?i)\bRs\.?\s*{AMOUNT}"))?,
        FieldPattern::new("inr_prefixed", &format!(r"(?i)\bINR\s*{AMOUNT}"))?,
        FieldPattern::new("rupee_sign_prefixed", &format!(r"₹\s*{AMOUNT}"))?,
        FieldPattern::new(
            "currency_suffixed",
            &format!(r"(?i)\b{AMOUNT}\s*(?:Rs\b|INR\b|₹)"),
        )?,
        FieldPattern::new(
            "amount_of",
            &format!(r"(?i)\bamount\s*(?:of\s*)?{CURRENCY}?\s*{AMOUNT}"),
        )?,
        FieldPattern::new(
            "verb_prefixed",
            &format!(r"(?i)\b(?:paid|sent|received|debited|credited)\s*{CURRENCY}?\s*{AMOUNT}"),
        )?,
        FieldPattern::new(
            "balance_prefixed",
            &format!(r"(?i)\b(?:balance|bal)\b\W*(?:is\W*)?{CURRENCY}?\s*{AMOUNT}"),
        )?,
    ])
}

fn create_merchant_patterns() -> Result<Vec<FieldPattern>, regex::Error> {
    Ok(vec![
        FieldPattern::new(
            "preposition",
            &format!(r"(?i)\b(?:at|to|from)\s+{NAME}{NAME_END}"),
        )?,
        // Shadowed by `preposition` above; kept so the list order stays fixed
        FieldPattern::new(
            "paid_to",
            &format!(r"(?i)\b(?:paid to|sent to|received from)\s+{NAME}{NAME_END}"),
        )?,
        FieldPattern::new("upi_handle", &format!(r"(?i)UPI-([A-Z0-9\s]+?){NAME_END}"))?,
        FieldPattern::new("merchant", &format!(r"(?i)\bmerchant\s+{NAME}{NAME_END}"))?,
        // Also shadowed by `preposition`
        FieldPattern::new(
            "purchase_at",
            &format!(r"(?i)\b(?:purchase|txn)\s+at\s+{NAME}{NAME_END}"),
        )?,
    ])
}

// Checked in order; the first category with a hit wins. Keywords match
// anywhere in the body, like the keyword gate does
fn create_kind_rules() -> Result<Vec<(TransactionKind, Regex)>, regex::Error> {
    Ok(vec![
        (
            TransactionKind::Debit,
            Regex::new(r"(?i)(?:debited|withdrawn|sent|paid|spent|purchase)")?,
        ),
        (
            TransactionKind::Credit,
            Regex::new(r"(?i)(?:credited|deposited|received|refund|cashback)")?,
        ),
        (
            TransactionKind::Balance,
            Regex::new(r"(?i)(?:balance|available)")?,
        ),
    ])
}
