use std::cmp::Ordering;

use super::types::CanonicalRecord;

/// Records split into the three report sheets.
///
/// Uses the same substring rule as gap detection: a status containing
/// `CANCELADO` goes to `cancelled`, one containing `INUTILIZADO` goes to
/// `voided`, and everything else is `emitted`. A status matching both rules
/// appears in both sheets.
#[derive(Debug, Clone, Default)]
pub struct StatusPartition<'a> {
    pub emitted: Vec<&'a CanonicalRecord>,
    pub voided: Vec<&'a CanonicalRecord>,
    pub cancelled: Vec<&'a CanonicalRecord>,
}

/// Split records by status, preserving input order within each group.
pub fn partition_by_status(records: &[CanonicalRecord]) -> StatusPartition<'_> {
    let mut partition = StatusPartition::default();
    for record in records {
        if record.is_cancelled() {
            partition.cancelled.push(record);
        }
        if record.is_voided() {
            partition.voided.push(record);
        }
        if record.is_live() {
            partition.emitted.push(record);
        }
    }
    partition
}

/// Compare two access keys by numeric value.
///
/// Keys that are not a plain digit string (ranges, blanks) compare as zero.
/// Works for the full 44 digits, which do not fit any primitive integer.
pub fn compare_access_keys(a: &str, b: &str) -> Ordering {
    let (a, b) = (significant_digits(a), significant_digits(b));
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Sort records by the numeric value of their access key.
///
/// The sort is stable, so the result does not depend on arrival order
/// beyond ties between equal keys.
pub fn sort_by_access_key(records: &mut [CanonicalRecord]) {
    records.sort_by(|a, b| compare_access_keys(&a.document_key, &b.document_key));
}

fn significant_digits(key: &str) -> &str {
    let trimmed = key.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return "";
    }
    digits.trim_start_matches('0')
}
