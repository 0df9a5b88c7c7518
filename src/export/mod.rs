//! Report rendering.
//!
//! Produces the three report sheets as CSV and plain-text renderings of the
//! gap report and the monthly summary. All output is returned as strings;
//! writing files is left to the caller.
//!
//! # Example
//!
//! ```ignore
//! use nfce_report::export::*;
//!
//! let sheets = to_csv_sheets(&records, &ExportConfig::default());
//! // sheets[0].name == "NFCe Emitidas"
//! let gaps = gap_report_text(&GapReport::from_records(&records));
//! ```

mod csv;
mod text;

pub use csv::to_csv_sheets;
pub use text::{gap_report_text, summary_text, totals_text};

use serde::{Deserialize, Serialize};

/// Configuration for CSV export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Field separator.
    pub separator: char,
    /// Emit a header row with the column titles.
    pub include_header: bool,
    pub sheet_names: SheetNames,
}

/// Names of the three report sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetNames {
    pub emitted: String,
    pub voided: String,
    pub cancelled: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            separator: ';',
            include_header: true,
            sheet_names: SheetNames::default(),
        }
    }
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            emitted: "NFCe Emitidas".into(),
            voided: "NFCe Inutilizadas".into(),
            cancelled: "NFCe Canceladas".into(),
        }
    }
}

/// One rendered sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    /// Number of data rows (excluding the header).
    pub rows: usize,
    pub content: String,
}

/// Column titles, in output order.
pub const COLUMNS: [&str; 9] = [
    "Data Emissão",
    "Chave da Nota",
    "Número NFCe",
    "Destinatário",
    "CPF/CNPJ Destinatário",
    "Valor Total",
    "Status",
    "Protocolo",
    "Justificativa",
];
