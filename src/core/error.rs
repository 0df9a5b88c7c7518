use thiserror::Error;

/// Errors that can occur while reading or parsing fiscal XML.
///
/// Field-level problems (an unparsable date or amount) are never errors;
/// they degrade to a fallback value inside the record instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NfceError {
    /// The input is not well-formed XML.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// The input could not be read.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Category of a per-file diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The buffer is not well-formed XML at all.
    MalformedInput,
    /// Well-formed XML that matches none of the known envelope kinds.
    UnrecognizedSchema,
    /// The file could not be processed for another reason (e.g. unreadable).
    ProcessingFailure,
}

impl DiagnosticKind {
    /// Whether this diagnostic should be surfaced as an error rather than a
    /// warning.
    pub fn is_error(&self) -> bool {
        !matches!(self, DiagnosticKind::UnrecognizedSchema)
    }
}

/// A per-file problem reported back to the caller instead of being printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Name of the offending input, used only for reporting.
    pub filename: String,
    /// Human-readable description.
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            DiagnosticKind::MalformedInput => write!(
                f,
                "file {} is corrupted or not valid XML: {}",
                self.filename, self.message
            ),
            DiagnosticKind::UnrecognizedSchema => write!(
                f,
                "file {} contains no usable NFCe data: {}",
                self.filename, self.message
            ),
            DiagnosticKind::ProcessingFailure => {
                write!(f, "error processing file {}: {}", self.filename, self.message)
            }
        }
    }
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        filename: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            filename: filename.into(),
            message: message.into(),
        }
    }

    pub fn malformed(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::MalformedInput, filename, message)
    }

    pub fn unrecognized(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::UnrecognizedSchema, filename, message)
    }

    pub fn failure(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::ProcessingFailure, filename, message)
    }
}
