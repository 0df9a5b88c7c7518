use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Recipient or tax id does not apply to this kind of record.
pub const NOT_APPLICABLE: &str = "Não se aplica";
/// The document carries a recipient but no CPF/CNPJ.
pub const NOT_INFORMED: &str = "Não informado";
/// The document carries no recipient block at all.
pub const UNIDENTIFIED_CONSUMER: &str = "Consumidor não identificado";
/// The document number could not be derived from the access key.
pub const NOT_IDENTIFIED: &str = "Não identificado";

/// Status of a cancelled document (cancellation event).
pub const STATUS_CANCELLED: &str = "CANCELADO";
/// Status of a voided number range (inutilização).
pub const STATUS_VOIDED: &str = "INUTILIZADO";
/// Status of a document that was submitted but never received a protocol.
pub const STATUS_SENT_NO_PROTOCOL: &str = "ENVIADO (SEM PROTOCOLO)";

/// Largest document number `nNF` can carry (nine digits).
pub const MAX_DOCUMENT_NUMBER: u64 = 999_999_999;

/// Length of an NF-e/NFC-e access key (chave de acesso).
pub const ACCESS_KEY_LEN: usize = 44;

/// Issue or event timestamp.
///
/// Timestamps that cannot be parsed are kept verbatim rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IssueTimestamp {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl IssueTimestamp {
    /// The parsed value, if parsing succeeded.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            IssueTimestamp::Parsed(dt) => Some(*dt),
            IssueTimestamp::Raw(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, IssueTimestamp::Parsed(_))
    }
}

impl Default for IssueTimestamp {
    fn default() -> Self {
        IssueTimestamp::Raw(String::new())
    }
}

impl std::fmt::Display for IssueTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueTimestamp::Parsed(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            IssueTimestamp::Raw(s) => f.write_str(s),
        }
    }
}

/// One row of the normalized report.
///
/// Every envelope kind is reduced to this shape. All fields are always
/// populated; absent information is represented by the sentinel constants
/// of this module or by an empty string, never by a missing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Issue date (dhEmi), event date (dhEvento) or receipt date (dhRecbto).
    pub issue_timestamp: IssueTimestamp,
    /// 44-digit access key, or the `"start - end"` range of a voiding.
    pub document_key: String,
    /// Sequential document number (nNF) or a sentinel.
    pub document_number: String,
    pub recipient_name: String,
    /// CPF or CNPJ of the recipient, or a sentinel.
    pub recipient_tax_id: String,
    /// Document total (vNF); zero for events and voidings.
    pub total_value: Decimal,
    /// Free-text status. Classified by substring, see [`is_cancelled_status`]
    /// and [`is_voided_status`].
    pub status: String,
    pub protocol_number: String,
    /// Justification text of a cancellation or voiding.
    pub justification: String,
}

impl CanonicalRecord {
    pub fn is_cancelled(&self) -> bool {
        is_cancelled_status(&self.status)
    }

    pub fn is_voided(&self) -> bool {
        is_voided_status(&self.status)
    }

    /// Neither cancelled nor voided: the population over which numbering
    /// continuity is checked.
    pub fn is_live(&self) -> bool {
        !self.is_cancelled() && !self.is_voided()
    }

    /// The document number as an integer, if it is numeric and fits the
    /// nine-digit `nNF` field.
    pub fn document_number_value(&self) -> Option<u64> {
        self.document_number
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|n| *n <= MAX_DOCUMENT_NUMBER)
    }
}

/// Case-insensitive substring test for a cancellation status.
///
/// Matches `"CANCELADO"` as well as issuer variants such as
/// `"Cancelado - duplicidade"`.
pub fn is_cancelled_status(status: &str) -> bool {
    status.to_uppercase().contains(STATUS_CANCELLED)
}

/// Case-insensitive substring test for a voided status.
pub fn is_voided_status(status: &str) -> bool {
    status.to_uppercase().contains(STATUS_VOIDED)
}
