use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::CanonicalRecord;

const MONTH_NAMES_PT: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Headline figures over every record of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub count: usize,
    pub total_value: Decimal,
    /// Mean value per record, rounded to cents; zero for an empty run.
    pub mean_value: Decimal,
}

impl ReportTotals {
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let count = records.len();
        let total_value: Decimal = records.iter().map(|r| r.total_value).sum();
        let mean_value = if count == 0 {
            Decimal::ZERO
        } else {
            (total_value / Decimal::from(count)).round_dp(2)
        };
        Self {
            count,
            total_value,
            mean_value,
        }
    }
}

/// Per-month figures of the condensed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub year: i32,
    /// 1-based month.
    pub month: u32,
    pub authorized_count: usize,
    pub authorized_value: Decimal,
    pub cancelled_count: usize,
}

impl MonthSummary {
    /// Portuguese label, e.g. `"Março/2024"`.
    pub fn label(&self) -> String {
        let name = MONTH_NAMES_PT
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{name}/{}", self.year)
    }
}

/// Condensed report: months in chronological order plus grand totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub months: Vec<MonthSummary>,
    pub authorized_count: usize,
    pub authorized_value: Decimal,
    pub cancelled_count: usize,
    /// Voided records are only counted in the grand total, never per month.
    pub voided_count: usize,
}

/// Group records by issue month.
///
/// Voided records (including statuses that spell out `INUTILIZAÇÃO`) are
/// counted once in the grand total. Of the rest, only records with a parsed
/// timestamp are grouped; each is either cancelled or authorized.
pub fn monthly_summary(records: &[CanonicalRecord]) -> MonthlySummary {
    let mut summary = MonthlySummary::default();
    let mut months: BTreeMap<(i32, u32), MonthSummary> = BTreeMap::new();

    for record in records {
        if is_voided_for_summary(&record.status) {
            summary.voided_count += 1;
            continue;
        }
        let Some(dt) = record.issue_timestamp.as_datetime() else {
            continue;
        };
        let entry = months
            .entry((dt.year(), dt.month()))
            .or_insert_with(|| MonthSummary {
                year: dt.year(),
                month: dt.month(),
                authorized_count: 0,
                authorized_value: Decimal::ZERO,
                cancelled_count: 0,
            });
        if record.is_cancelled() {
            entry.cancelled_count += 1;
        } else {
            entry.authorized_count += 1;
            entry.authorized_value += record.total_value;
        }
    }

    for month in months.into_values() {
        summary.authorized_count += month.authorized_count;
        summary.authorized_value += month.authorized_value;
        summary.cancelled_count += month.cancelled_count;
        summary.months.push(month);
    }
    summary
}

fn is_voided_for_summary(status: &str) -> bool {
    let upper = status.to_uppercase();
    upper.contains("INUTILIZADO") || upper.contains("INUTILIZACAO") || upper.contains("INUTILIZAÇÃO")
}
