//! Multi-file report runs.
//!
//! A [`Batch`] feeds inputs one at a time through [`xml::extract`], keeping
//! every file isolated: a malformed, unrecognized or unreadable file is
//! recorded as a [`Diagnostic`] and the run continues.
//!
//! Diagnostics are also logged through `tracing` (`error!` for malformed and
//! unreadable input, `warn!` for unrecognized input). Installing a subscriber
//! is left to the application.
//!
//! # Example
//!
//! ```
//! use nfce_report::batch::Batch;
//!
//! let mut batch = Batch::new();
//! batch.add_xml("a.xml", "<inutNFe><infInut><nNFIni>3</nNFIni><nNFFin>3</nNFFin></infInut></inutNFe>");
//! batch.add_xml("b.xml", "<broken");
//! let outcome = batch.finish();
//! assert_eq!(outcome.records.len(), 1);
//! assert_eq!(outcome.unprocessed, vec!["b.xml".to_string()]);
//! ```

use std::path::Path;

use crate::core::{
    CanonicalRecord, Diagnostic, DiagnosticKind, GapReport, NfceError, ReportTotals,
    sort_by_access_key,
};
use crate::xml::{self, Extraction};

/// Accumulates records and diagnostics across many inputs.
#[derive(Debug, Default)]
pub struct Batch {
    records: Vec<CanonicalRecord>,
    diagnostics: Vec<Diagnostic>,
    unprocessed: Vec<String>,
}

/// Result of a finished run.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// All extracted records, ordered by numeric access key.
    pub records: Vec<CanonicalRecord>,
    /// One entry per file that produced no records.
    pub diagnostics: Vec<Diagnostic>,
    /// Names of files that produced no records, in input order.
    pub unprocessed: Vec<String>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract one XML document. Returns the number of records it produced.
    pub fn add_xml(&mut self, filename: &str, xml: &str) -> usize {
        self.record(filename, xml::extract(xml, filename))
    }

    /// Extract one document from raw bytes (lossy UTF-8).
    pub fn add_bytes(&mut self, filename: &str, bytes: &[u8]) -> usize {
        self.record(filename, xml::extract_bytes(bytes, filename))
    }

    /// Read and extract one file from disk. Read errors become a
    /// [`DiagnosticKind::ProcessingFailure`].
    pub fn add_path(&mut self, path: &Path) -> usize {
        let filename = path.display().to_string();
        match std::fs::read(path) {
            Ok(bytes) => self.add_bytes(&filename, &bytes),
            Err(e) => {
                let err = NfceError::Io(e.to_string());
                self.reject(Diagnostic::failure(filename, err.to_string()));
                0
            }
        }
    }

    /// Extract every `.xml` file directly inside `dir`, in file name order.
    ///
    /// macOS resource-fork entries (`._*`, `__MACOSX`) are skipped. Returns
    /// the number of records produced; an unreadable directory is reported
    /// as a single diagnostic.
    pub fn add_dir(&mut self, dir: &Path) -> usize {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                let err = NfceError::Io(e.to_string());
                self.reject(Diagnostic::failure(dir.display().to_string(), err.to_string()));
                return 0;
            }
        };
        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_candidate_xml(path))
            .collect();
        paths.sort();
        paths.iter().map(|path| self.add_path(path)).sum()
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Sort the collected records by access key and hand them over.
    pub fn finish(self) -> BatchOutcome {
        let mut records = self.records;
        sort_by_access_key(&mut records);
        tracing::info!(
            records = records.len(),
            unprocessed = self.unprocessed.len(),
            "batch finished"
        );
        BatchOutcome {
            records,
            diagnostics: self.diagnostics,
            unprocessed: self.unprocessed,
        }
    }

    fn record(&mut self, filename: &str, extraction: Extraction) -> usize {
        match extraction {
            Extraction::Records { kind, records } => {
                tracing::debug!(file = filename, %kind, records = records.len(), "extracted");
                let n = records.len();
                self.records.extend(records);
                n
            }
            Extraction::Unrecognized(d) | Extraction::Malformed(d) => {
                self.reject(d);
                0
            }
        }
    }

    fn reject(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::UnrecognizedSchema => {
                tracing::warn!(file = %diagnostic.filename, "{}", diagnostic.message);
            }
            DiagnosticKind::MalformedInput | DiagnosticKind::ProcessingFailure => {
                tracing::error!(file = %diagnostic.filename, "{}", diagnostic.message);
            }
        }
        self.unprocessed.push(diagnostic.filename.clone());
        self.diagnostics.push(diagnostic);
    }
}

impl BatchOutcome {
    /// Number of records produced across all files.
    pub fn processed_items(&self) -> usize {
        self.records.len()
    }

    pub fn gap_report(&self) -> GapReport {
        GapReport::from_records(&self.records)
    }

    pub fn totals(&self) -> ReportTotals {
        ReportTotals::from_records(&self.records)
    }

    /// Diagnostics of a single kind.
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

/// Extract a sequence of `(filename, bytes)` inputs in order.
pub fn process_all<I, N, B>(inputs: I) -> BatchOutcome
where
    I: IntoIterator<Item = (N, B)>,
    N: AsRef<str>,
    B: AsRef<[u8]>,
{
    let mut batch = Batch::new();
    for (name, bytes) in inputs {
        batch.add_bytes(name.as_ref(), bytes.as_ref());
    }
    batch.finish()
}

/// Whether a file name looks like an XML input worth extracting.
pub fn is_candidate_xml(path: &Path) -> bool {
    let hidden = path.components().any(|c| c.as_os_str() == "__MACOSX")
        || path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("._"));
    let is_xml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
    is_xml && !hidden
}
