use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{ExtractionError, MessageTimestamp};
use std::fmt::{Display, Write};
use std::str::FromStr;

/// Largest distance from the epoch, in milliseconds, that a message
/// timestamp may have before it is treated as invalid
pub const MAX_EPOCH_MILLIS: i64 = 8_640_000_000_000_000;

/// Epoch milliseconds of a source timestamp, if it is numeric and in range
pub fn timestamp_millis(timestamp: &MessageTimestamp) -> Option<i64> {
    let millis = match timestamp {
        MessageTimestamp::Millis(millis) => *millis,
        MessageTimestamp::Text(text) => parse_leading_integer(text)?,
    };
    (millis.checked_abs()? <= MAX_EPOCH_MILLIS).then_some(millis)
}

/// Turn a source timestamp into an instant, falling back to `fallback` when
/// it is absent, not numeric, or out of range.
pub fn resolve_timestamp(
    timestamp: Option<&MessageTimestamp>,
    fallback: DateTime<Utc>,
) -> DateTime<Utc> {
    let Some(timestamp) = timestamp else {
        return fallback;
    };

    match timestamp_millis(timestamp).and_then(DateTime::from_timestamp_millis) {
        Some(instant) => instant,
        None => {
            tracing::warn!(?timestamp, "Unusable message timestamp, using capture time");
            fallback
        }
    }
}

// Accepts surrounding whitespace and trailing garbage ("1700000000000ms"),
// the way message stores tend to hand out stringly timestamps
fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let digits_start = usize::from(trimmed.starts_with(['+', '-']));
    let digits_len = trimmed[digits_start..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return None;
    }
    trimmed[..digits_start + digits_len].parse().ok()
}

/// Timezone the date and time columns are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DisplayTimezone {
    #[default]
    Local,
    Utc,
    /// Seconds east of UTC
    FixedOffset(i32),
}

impl FromStr for DisplayTimezone {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(DisplayTimezone::Local),
            "utc" | "z" => Ok(DisplayTimezone::Utc),
            other => other
                .parse::<FixedOffset>()
                .map(|offset| DisplayTimezone::FixedOffset(offset.local_minus_utc()))
                .map_err(|e| {
                    ExtractionError::ConfigError(format!("Invalid timezone '{s}': {e}"))
                }),
        }
    }
}

impl TryFrom<String> for DisplayTimezone {
    type Error = ExtractionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DisplayTimezone> for String {
    fn from(tz: DisplayTimezone) -> Self {
        match tz {
            DisplayTimezone::Local => "local".to_string(),
            DisplayTimezone::Utc => "utc".to_string(),
            DisplayTimezone::FixedOffset(secs) => match FixedOffset::east_opt(secs) {
                Some(offset) => offset.to_string(),
                None => "utc".to_string(),
            },
        }
    }
}

/// How record dates and times are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayFormat {
    pub date_format: String,
    pub time_format: String,
    pub timezone: DisplayTimezone,
}

impl Default for DisplayFormat {
    fn default() -> Self {
        Self {
            date_format: "%-m/%-d/%Y".to_string(),
            time_format: "%-I:%M:%S %p".to_string(),
            timezone: DisplayTimezone::Local,
        }
    }
}

impl DisplayFormat {
    pub fn utc() -> Self {
        Self {
            timezone: DisplayTimezone::Utc,
            ..Self::default()
        }
    }

    /// Reject strftime strings chrono cannot render
    pub fn validate(&self) -> Result<(), ExtractionError> {
        for (field, format) in [("date_format", &self.date_format), ("time_format", &self.time_format)]
        {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(ExtractionError::ConfigError(format!(
                    "Invalid {field}: '{format}'"
                )));
            }
        }
        Ok(())
    }

    /// Date and time strings for an instant
    pub fn render(&self, instant: DateTime<Utc>) -> (String, String) {
        match self.timezone {
            DisplayTimezone::Local => self.render_in(&instant.with_timezone(&Local)),
            DisplayTimezone::Utc => self.render_in(&instant),
            DisplayTimezone::FixedOffset(secs) => match FixedOffset::east_opt(secs) {
                Some(offset) => self.render_in(&instant.with_timezone(&offset)),
                None => self.render_in(&instant),
            },
        }
    }

    fn render_in<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> (String, String)
    where
        Tz::Offset: Display,
    {
        (
            format_or_rfc3339(instant, &self.date_format),
            format_or_rfc3339(instant, &self.time_format),
        )
    }
}

fn format_or_rfc3339<Tz: TimeZone>(instant: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: Display,
{
    let mut out = String::new();
    if write!(out, "{}", instant.format(format)).is_err() {
        tracing::warn!(format, "Display format failed, falling back to RFC 3339");
        return instant.to_rfc3339();
    }
    out
}
