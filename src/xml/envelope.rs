use serde::{Deserialize, Serialize};

use super::extract;
use super::tree::XmlNode;
use crate::core::CanonicalRecord;

/// The envelope shapes emitted by the SEFAZ web services over a document's
/// lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvelopeKind {
    /// `procInutNFe`: voiding request plus authority response.
    VoidingConfirmation,
    /// `envEvento`: batch of events, possibly several cancellations.
    EventBatch,
    /// `inutNFe`: bare voiding request.
    Voiding,
    /// `enviNFe`: batch submission of unprotocoled documents.
    SubmissionBatch,
    /// `procEventoNFe`: single event plus processing receipt.
    ProcessedEvent,
    /// `nfeProc`: authorized document plus authorization receipt.
    ProcessedDocument,
}

impl EnvelopeKind {
    /// Local name of the root element that identifies this kind.
    pub fn root_element(&self) -> &'static str {
        match self {
            EnvelopeKind::VoidingConfirmation => "ProcInutNFe",
            EnvelopeKind::EventBatch => "envEvento",
            EnvelopeKind::Voiding => "inutNFe",
            EnvelopeKind::SubmissionBatch => "enviNFe",
            EnvelopeKind::ProcessedEvent => "procEventoNFe",
            EnvelopeKind::ProcessedDocument => "nfeProc",
        }
    }
}

impl std::fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.root_element())
    }
}

/// One entry of the classification table: a structural test on the root
/// element and the extractor to run when it matches.
#[derive(Clone, Copy)]
pub struct Classifier {
    pub kind: EnvelopeKind,
    extract: fn(&XmlNode) -> Option<Vec<CanonicalRecord>>,
}

impl Classifier {
    pub fn matches(&self, root: &XmlNode) -> bool {
        root.has_local_name(self.kind.root_element())
    }

    /// Run the extractor. `None` means the envelope matched structurally but
    /// yielded nothing usable.
    pub fn extract(&self, root: &XmlNode) -> Option<Vec<CanonicalRecord>> {
        (self.extract)(root)
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier").field("kind", &self.kind).finish()
    }
}

/// Classification order. The first entry that matches and yields records wins.
pub const CLASSIFIERS: [Classifier; 6] = [
    Classifier {
        kind: EnvelopeKind::VoidingConfirmation,
        extract: extract::voiding_confirmation,
    },
    Classifier {
        kind: EnvelopeKind::EventBatch,
        extract: extract::event_batch,
    },
    Classifier {
        kind: EnvelopeKind::Voiding,
        extract: extract::voiding,
    },
    Classifier {
        kind: EnvelopeKind::SubmissionBatch,
        extract: extract::submission_batch,
    },
    Classifier {
        kind: EnvelopeKind::ProcessedEvent,
        extract: extract::processed_event,
    },
    Classifier {
        kind: EnvelopeKind::ProcessedDocument,
        extract: extract::processed_document,
    },
];

/// The first envelope kind whose structural test matches, regardless of
/// whether extraction would yield records.
pub fn classify(root: &XmlNode) -> Option<EnvelopeKind> {
    CLASSIFIERS
        .iter()
        .find(|c| c.matches(root))
        .map(|c| c.kind)
}

/// Run the classification table over a parsed document.
///
/// Returns the kind that produced the records, or `None` when the document
/// is well-formed but carries no usable fiscal data.
pub fn extract_tree(root: &XmlNode) -> Option<(EnvelopeKind, Vec<CanonicalRecord>)> {
    CLASSIFIERS
        .iter()
        .filter(|c| c.matches(root))
        .find_map(|c| c.extract(root).map(|records| (c.kind, records)))
}
