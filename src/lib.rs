//! # nfce-report
//!
//! Normalization and numbering audit for Brazilian consumer fiscal documents
//! (NFCe) and the envelopes that follow them through their lifecycle:
//! authorization, batch submission, cancellation events and number voiding.
//!
//! Every recognized XML file is reduced to one or more [`CanonicalRecord`]s,
//! the same nine-column shape regardless of which envelope it came from.
//! Over a collection of records, [`find_gaps`] reports document numbers that
//! are missing from the authorized sequence and [`compress_to_intervals`]
//! turns them into ranges such as `"2 até 9"`.
//!
//! Monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use nfce_report::core::*;
//! use nfce_report::xml;
//!
//! let xml = r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe">
//!   <NFe><infNFe Id="NFe35240112345678000190650010000000071000000070">
//!     <ide><nNF>7</nNF><dhEmi>2024-01-15T10:30:00-03:00</dhEmi></ide>
//!     <total><ICMSTot><vNF>25.90</vNF></ICMSTot></total>
//!   </infNFe></NFe>
//!   <protNFe><infProt>
//!     <chNFe>35240112345678000190650010000000071000000070</chNFe>
//!     <nProt>135240000000001</nProt>
//!     <xMotivo>Autorizado o uso da NF-e</xMotivo>
//!   </infProt></protNFe>
//! </nfeProc>"#;
//!
//! let records = xml::extract(xml, "nota-7.xml").into_records();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].document_number, "7");
//! assert_eq!(records[0].recipient_name, UNIDENTIFIED_CONSUMER);
//! assert!(find_gaps(&records).is_empty());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Canonical record, field parsers, gap detection, partition, summaries |
//! | `xml` (default) | XML tree, envelope classification and extraction |
//! | `batch` (default) | Multi-file runs with per-file isolation and `tracing` diagnostics |
//! | `export` | CSV sheets and plain-text gap/summary reports |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "xml")]
pub mod xml;

#[cfg(feature = "batch")]
pub mod batch;

#[cfg(feature = "export")]
pub mod export;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
