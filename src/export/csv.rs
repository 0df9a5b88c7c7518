//! CSV rendering of the report sheets.
//!
//! Every field is quoted, amounts use a decimal comma and rows end with
//! CRLF, so the files open directly in spreadsheet software with a
//! Portuguese locale whatever separator is configured.

use rust_decimal::Decimal;

use super::{COLUMNS, ExportConfig, Sheet};
use crate::core::{CanonicalRecord, IssueTimestamp, partition_by_status};

/// Render the emitted, voided and cancelled sheets, in that order.
pub fn to_csv_sheets(records: &[CanonicalRecord], config: &ExportConfig) -> Vec<Sheet> {
    let partition = partition_by_status(records);
    let names = &config.sheet_names;
    vec![
        render_sheet(&names.emitted, &partition.emitted, config),
        render_sheet(&names.voided, &partition.voided, config),
        render_sheet(&names.cancelled, &partition.cancelled, config),
    ]
}

fn render_sheet(name: &str, records: &[&CanonicalRecord], config: &ExportConfig) -> Sheet {
    let mut out = String::new();

    if config.include_header {
        push_row(&mut out, &COLUMNS, config.separator);
    }

    for record in records {
        let timestamp = format_timestamp(&record.issue_timestamp);
        let amount = format_amount(record.total_value);
        push_row(
            &mut out,
            &[
                &timestamp,
                &record.document_key,
                &record.document_number,
                &record.recipient_name,
                &record.recipient_tax_id,
                &amount,
                &record.status,
                &record.protocol_number,
                &record.justification,
            ],
            config.separator,
        );
    }

    Sheet {
        name: name.to_string(),
        rows: records.len(),
        content: out,
    }
}

/// Append one CRLF-terminated row. Each field is wrapped in double quotes
/// with embedded quotes doubled, so separators and line breaks inside a
/// value never split it.
fn push_row(out: &mut String, fields: &[&str], separator: char) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    }
    out.push_str("\r\n");
}

fn format_timestamp(ts: &IssueTimestamp) -> String {
    match ts {
        IssueTimestamp::Parsed(dt) => dt.format("%d/%m/%Y %H:%M:%S").to_string(),
        IssueTimestamp::Raw(s) => s.clone(),
    }
}

/// Two decimals with a decimal comma: `1234,50`.
fn format_amount(d: Decimal) -> String {
    format!("{:.2}", d.round_dp(2)).replace('.', ",")
}
