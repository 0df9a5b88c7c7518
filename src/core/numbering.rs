use serde::{Deserialize, Serialize};

use super::types::CanonicalRecord;

/// Separator used between the ends of a compressed interval.
pub const INTERVAL_SEPARATOR: &str = " até ";

/// Missing document numbers in the live (non-cancelled, non-voided) subset.
///
/// Each missing number appears once per gap it belongs to, in ascending
/// order. Records whose document number is not an integer (sentinels,
/// blanks) or exceeds [`MAX_DOCUMENT_NUMBER`](super::MAX_DOCUMENT_NUMBER)
/// are ignored. With fewer than two numeric records there is no
/// meaningful sequence and the result is empty.
///
/// Duplicate numbers are tolerated: equal neighbours produce no gap.
pub fn find_gaps(records: &[CanonicalRecord]) -> Vec<u64> {
    let mut numbers: Vec<u64> = records
        .iter()
        .filter(|r| r.is_live())
        .filter_map(CanonicalRecord::document_number_value)
        .collect();

    if numbers.len() < 2 {
        return Vec::new();
    }

    numbers.sort_unstable();

    let mut missing = Vec::new();
    for pair in numbers.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if next - current > 1 {
            missing.extend(current + 1..next);
        }
    }
    missing
}

/// Compress missing numbers into maximal contiguous runs.
///
/// A run of one is rendered as `"N"`, longer runs as `"START até END"`.
/// The input is sorted (and deduplicated) first, so order does not matter.
pub fn compress_to_intervals(gaps: &[u64]) -> Vec<String> {
    let mut numbers = gaps.to_vec();
    numbers.sort_unstable();
    numbers.dedup();

    let Some((&first, rest)) = numbers.split_first() else {
        return Vec::new();
    };

    let mut intervals = Vec::new();
    let (mut start, mut end) = (first, first);
    for &n in rest {
        if n == end + 1 {
            end = n;
        } else {
            intervals.push(format_interval(start, end));
            start = n;
            end = n;
        }
    }
    intervals.push(format_interval(start, end));
    intervals
}

fn format_interval(start: u64, end: u64) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{start}{INTERVAL_SEPARATOR}{end}")
    }
}

/// Gap detection result for one report run.
///
/// Holds both the raw missing numbers (for counts and alarms) and their
/// compressed ranges (for display). Computed fresh from a record collection,
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapReport {
    pub missing: Vec<u64>,
    pub intervals: Vec<String>,
}

impl GapReport {
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let missing = find_gaps(records);
        let intervals = compress_to_intervals(&missing);
        Self { missing, intervals }
    }

    /// True when the numbering is continuous.
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    /// Number of missing document numbers.
    pub fn count(&self) -> usize {
        self.missing.len()
    }

    /// One-line alert for display next to the report.
    pub fn alert_message(&self) -> String {
        if self.is_empty() {
            "Verificação de numeração: todas as NFCe estão com numeração contínua.".to_string()
        } else {
            format!(
                "ATENÇÃO: foram detectadas {} numeração(ões) pulada(s) nas NFCe. Números pulados: {}",
                self.count(),
                self.intervals.join(", ")
            )
        }
    }
}
