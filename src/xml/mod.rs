//! NFCe XML envelope recognition and extraction.
//!
//! The same fiscal system emits six different envelope shapes over a
//! document's lifecycle. Each is reduced to [`CanonicalRecord`]s:
//!
//! | Priority | Root element | Records |
//! |----------|--------------|---------|
//! | 1 | `procInutNFe` | one voided range, status from the authority's reason text |
//! | 2 | `envEvento` | one per cancellation event (`110111`, `110112`) |
//! | 3 | `inutNFe` | one voided range, status `INUTILIZADO` |
//! | 4 | `enviNFe` | one per submitted document, status `ENVIADO (SEM PROTOCOLO)` |
//! | 5 | `procEventoNFe` | one cancellation (`110111` only) |
//! | 6 | `nfeProc` | one authorized document |
//!
//! Tag names are matched by local name, ignoring namespace prefixes and case.
//!
//! # Example
//!
//! ```
//! use nfce_report::xml::{self, Extraction};
//!
//! match xml::extract("<inutNFe><infInut><nNFIni>10</nNFIni><nNFFin>12</nNFFin></infInut></inutNFe>", "inut.xml") {
//!     Extraction::Records { records, .. } => assert_eq!(records[0].document_key, "10 - 12"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

mod envelope;
mod extract;
mod tree;

pub use envelope::{CLASSIFIERS, Classifier, EnvelopeKind, classify, extract_tree};
pub use extract::{BATCH_CANCELLATION_EVENT_CODES, CANCELLATION_EVENT_CODE};
pub use tree::{Lookup, MAX_DEPTH, XmlNode, local_name_matches, parse_document};

use crate::core::{CanonicalRecord, Diagnostic};

/// Outcome of extracting one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A recognized envelope; `records` is never empty.
    Records {
        kind: EnvelopeKind,
        records: Vec<CanonicalRecord>,
    },
    /// Well-formed XML without usable fiscal data.
    Unrecognized(Diagnostic),
    /// Not well-formed XML.
    Malformed(Diagnostic),
}

impl Extraction {
    pub fn records(&self) -> &[CanonicalRecord] {
        match self {
            Extraction::Records { records, .. } => records,
            _ => &[],
        }
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        match self {
            Extraction::Records { records, .. } => records,
            _ => Vec::new(),
        }
    }

    pub fn kind(&self) -> Option<EnvelopeKind> {
        match self {
            Extraction::Records { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Extraction::Unrecognized(d) | Extraction::Malformed(d) => Some(d),
            Extraction::Records { .. } => None,
        }
    }
}

/// Parse and extract one XML document.
///
/// `filename` is only used in diagnostics, never for classification.
pub fn extract(xml: &str, filename: &str) -> Extraction {
    let root = match parse_document(xml) {
        Ok(root) => root,
        Err(e) => return Extraction::Malformed(Diagnostic::malformed(filename, e.to_string())),
    };
    match extract_tree(&root) {
        Some((kind, records)) => Extraction::Records { kind, records },
        None => Extraction::Unrecognized(Diagnostic::unrecognized(
            filename,
            format!("unrecognized envelope <{}>", root.name()),
        )),
    }
}

/// Like [`extract`], for raw bytes. Invalid UTF-8 sequences are dropped
/// rather than rejected.
pub fn extract_bytes(bytes: &[u8], filename: &str) -> Extraction {
    match std::str::from_utf8(bytes) {
        Ok(xml) => extract(xml, filename),
        Err(_) => {
            let decoded: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
            extract(&decoded, filename)
        }
    }
}
