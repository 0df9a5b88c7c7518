//! Defensive parsing of individual record fields.
//!
//! Each parser degrades to a defined fallback instead of failing, so one bad
//! field never costs the whole record. The fallback is visible in the return
//! type so callers and tests can tell the two outcomes apart.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::types::{ACCESS_KEY_LEN, IssueTimestamp, NOT_IDENTIFIED};

/// Fixed format of the timestamp prefix (`YYYY-MM-DDTHH:MM:SS`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Number of leading characters considered when parsing a timestamp. The
/// UTC offset that follows (e.g. `-03:00`) is ignored.
pub const TIMESTAMP_PREFIX_LEN: usize = 19;

/// Offset of the document number (nNF) inside an access key.
const KEY_NUMBER_OFFSET: usize = 25;
const KEY_NUMBER_LEN: usize = 9;

/// Result of a field parse that cannot fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<T> {
    /// The raw text was parsed successfully.
    Parsed(T),
    /// The raw text was absent or invalid; this is the fallback value.
    Fallback(T),
}

impl<T> FieldValue<T> {
    pub fn into_inner(self) -> T {
        match self {
            FieldValue::Parsed(v) | FieldValue::Fallback(v) => v,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, FieldValue::Fallback(_))
    }
}

/// Parse an issue/event timestamp from its first 19 characters.
///
/// On failure the original string is kept as [`IssueTimestamp::Raw`].
pub fn parse_issue_timestamp(raw: &str) -> IssueTimestamp {
    if raw.is_empty() {
        return IssueTimestamp::Raw(String::new());
    }
    match NaiveDateTime::parse_from_str(char_prefix(raw, TIMESTAMP_PREFIX_LEN), TIMESTAMP_FORMAT)
    {
        Ok(dt) => IssueTimestamp::Parsed(dt),
        Err(_) => IssueTimestamp::Raw(raw.to_string()),
    }
}

/// Parse a monetary amount such as `vNF`.
///
/// Absent, unparsable and negative amounts fall back to zero.
pub fn parse_amount(raw: &str) -> FieldValue<Decimal> {
    let trimmed = raw.trim();
    let parsed = Decimal::from_str(trimmed).or_else(|_| Decimal::from_scientific(trimmed));
    match parsed {
        Ok(d) if !d.is_sign_negative() => FieldValue::Parsed(d),
        _ => FieldValue::Fallback(Decimal::ZERO),
    }
}

/// Derive the document number from characters 26 to 34 of an access key.
///
/// Only keys of exactly 44 characters are sliced; anything else yields
/// [`NOT_IDENTIFIED`].
pub fn number_from_access_key(key: &str) -> FieldValue<String> {
    if key.chars().count() != ACCESS_KEY_LEN {
        return FieldValue::Fallback(NOT_IDENTIFIED.to_string());
    }
    FieldValue::Parsed(
        key.chars()
            .skip(KEY_NUMBER_OFFSET)
            .take(KEY_NUMBER_LEN)
            .collect(),
    )
}

/// Format the key column of a voiding record.
///
/// `"start - end"` when the range spans more than one number, else `start`.
pub fn voiding_range(first: &str, last: &str) -> String {
    if first == last {
        first.to_string()
    } else {
        format!("{first} - {last}")
    }
}

fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
