use rust_decimal::Decimal;
use std::fmt::Write;

use crate::core::{GapReport, MonthlySummary, ReportTotals};

/// Render the skipped-numbers report.
pub fn gap_report_text(report: &GapReport) -> String {
    let mut out = String::from("Relatório de Numerações Puladas\n\n");
    if report.is_empty() {
        out.push_str("Nenhuma numeração pulada foi encontrada.\n");
        return out;
    }
    out.push_str("Intervalos de Numeração Pulada\n");
    for interval in &report.intervals {
        let _ = writeln!(out, "  {interval}");
    }
    let _ = writeln!(
        out,
        "\nTotal de numerações puladas encontradas: {}",
        report.count()
    );
    out
}

/// Render the "Resumo" block that opens the detailed report.
pub fn totals_text(totals: &ReportTotals) -> String {
    let mut out = String::from("Resumo\n");
    let _ = writeln!(out, "  Total de NFCe: {}", totals.count);
    let _ = writeln!(
        out,
        "  Valor Total das Notas: {}",
        format_brl(totals.total_value)
    );
    let _ = writeln!(out, "  Média por NFCe: {}", format_brl(totals.mean_value));
    out
}

/// Render the condensed monthly report.
pub fn summary_text(summary: &MonthlySummary) -> String {
    let mut out = String::from("Relatório Resumido de NFCe por Mês\n");
    for month in &summary.months {
        let _ = writeln!(out, "\nMês/Ano: {}", month.label());
        let _ = writeln!(out, "  Notas Autorizadas: {}", month.authorized_count);
        let _ = writeln!(
            out,
            "  Valor Total Autorizadas: {}",
            format_brl(month.authorized_value)
        );
        let _ = writeln!(out, "  Notas Canceladas: {}", month.cancelled_count);
    }
    out.push_str("\nTotalizador Geral\n");
    let _ = writeln!(out, "  TOTAL DE NOTAS AUTORIZADAS: {}", summary.authorized_count);
    let _ = writeln!(
        out,
        "  VALOR TOTAL AUTORIZADAS: {}",
        format_brl(summary.authorized_value)
    );
    let _ = writeln!(out, "  TOTAL DE NOTAS INUTILIZADAS: {}", summary.voided_count);
    let _ = writeln!(out, "  TOTAL DE NOTAS CANCELADAS: {}", summary.cancelled_count);
    out
}

/// Format an amount as Brazilian currency: `R$ 1.234,50`.
pub(crate) fn format_brl(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("R$ {sign}{grouped},{frac_part}")
}
