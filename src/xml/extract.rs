//! Field mapping for each envelope kind.
//!
//! Every extractor returns `None` when the envelope carries nothing usable,
//! which lets classification fall through to the next kind.

use rust_decimal::Decimal;

use super::tree::{Lookup, XmlNode};
use crate::core::{
    CanonicalRecord, NOT_APPLICABLE, NOT_INFORMED, STATUS_CANCELLED, STATUS_SENT_NO_PROTOCOL,
    STATUS_VOIDED, UNIDENTIFIED_CONSUMER, number_from_access_key, parse_amount,
    parse_issue_timestamp, voiding_range,
};

/// Event type codes treated as cancellations inside an `envEvento` batch.
pub const BATCH_CANCELLATION_EVENT_CODES: [&str; 2] = ["110111", "110112"];

/// Event type code treated as a cancellation in a processed `procEventoNFe`.
pub const CANCELLATION_EVENT_CODE: &str = "110111";

/// `procInutNFe`: voiding request paired with the authority's response.
pub(super) fn voiding_confirmation(root: &XmlNode) -> Option<Vec<CanonicalRecord>> {
    let request = root.child("inutNFe").child("infInut");
    let response = root.child("retInutNFe").child("infInut");
    let status = non_empty(response.child_text("xMotivo")).unwrap_or(STATUS_VOIDED);
    Some(vec![voiding_record(
        request,
        response.text_of("dhRecbto"),
        status,
        response.text_of("nProt"),
    )])
}

/// `inutNFe`: a voiding request without the authority's response.
pub(super) fn voiding(root: &XmlNode) -> Option<Vec<CanonicalRecord>> {
    let request = root.child("infInut");
    Some(vec![voiding_record(
        request,
        request.text_of("dhRecbto"),
        STATUS_VOIDED,
        "",
    )])
}

/// `envEvento`: one record per cancellation event, other events are dropped.
pub(super) fn event_batch(root: &XmlNode) -> Option<Vec<CanonicalRecord>> {
    let records: Vec<CanonicalRecord> = root
        .children("evento")
        .map(|event| event.child("infEvento"))
        .filter(|info| BATCH_CANCELLATION_EVENT_CODES.contains(&info.text_of("tpEvento").trim()))
        .map(|info| cancellation_record(info, None))
        .collect();
    non_empty_records(records)
}

/// `procEventoNFe`: a single event with its processing receipt.
pub(super) fn processed_event(root: &XmlNode) -> Option<Vec<CanonicalRecord>> {
    let info = root.child("evento").child("infEvento");
    if info.text_of("tpEvento").trim() != CANCELLATION_EVENT_CODE {
        return None;
    }
    let receipt_protocol = root.child("retEvento").child("infEvento").child_text("nProt");
    Some(vec![cancellation_record(info, receipt_protocol)])
}

/// `enviNFe`: documents submitted in a batch that never got a protocol.
pub(super) fn submission_batch(root: &XmlNode) -> Option<Vec<CanonicalRecord>> {
    let records: Vec<CanonicalRecord> = root
        .children("NFe")
        .map(|document| {
            let info = document.child("infNFe");
            let ide = info.child("ide");
            let (recipient_name, recipient_tax_id) = recipient(info.child("dest"));
            let document_key = info
                .attribute("Id")
                .map(|id| id.strip_prefix("NFe").unwrap_or(id).to_string())
                .unwrap_or_default();
            CanonicalRecord {
                issue_timestamp: parse_issue_timestamp(ide.text_of("dhEmi")),
                document_key,
                document_number: ide.text_of("nNF").to_string(),
                recipient_name,
                recipient_tax_id,
                total_value: document_total(info),
                status: STATUS_SENT_NO_PROTOCOL.to_string(),
                protocol_number: String::new(),
                justification: String::new(),
            }
        })
        .collect();
    non_empty_records(records)
}

/// `nfeProc`: an authorized document with its authorization receipt.
///
/// The access key comes from the receipt (`protNFe/infProt/chNFe`), not from
/// the document's own `Id` attribute.
pub(super) fn processed_document(root: &XmlNode) -> Option<Vec<CanonicalRecord>> {
    let info = Lookup::from(root.child("NFe").child("infNFe").node()?);
    let ide = info.child("ide");
    let receipt = root.child("protNFe").child("infProt");
    let (recipient_name, recipient_tax_id) = recipient(info.child("dest"));
    Some(vec![CanonicalRecord {
        issue_timestamp: parse_issue_timestamp(ide.text_of("dhEmi")),
        document_key: receipt.text_of("chNFe").to_string(),
        document_number: ide.text_of("nNF").to_string(),
        recipient_name,
        recipient_tax_id,
        total_value: document_total(info),
        status: receipt.text_of("xMotivo").to_string(),
        protocol_number: receipt.text_of("nProt").to_string(),
        justification: String::new(),
    }])
}

fn voiding_record(
    request: Lookup<'_>,
    received_at: &str,
    status: &str,
    protocol: &str,
) -> CanonicalRecord {
    let first = request.text_of("nNFIni");
    let last = request.text_of("nNFFin");
    CanonicalRecord {
        issue_timestamp: parse_issue_timestamp(received_at),
        document_key: voiding_range(first, last),
        document_number: first.to_string(),
        recipient_name: NOT_APPLICABLE.to_string(),
        recipient_tax_id: NOT_APPLICABLE.to_string(),
        total_value: Decimal::ZERO,
        status: status.to_string(),
        protocol_number: protocol.to_string(),
        justification: request.text_of("xJust").to_string(),
    }
}

fn cancellation_record(info: Lookup<'_>, receipt_protocol: Option<&str>) -> CanonicalRecord {
    let access_key = info.text_of("chNFe");
    let detail = info.child("detEvento");
    let protocol = non_empty(detail.child_text("nProt"))
        .or(receipt_protocol)
        .unwrap_or("");
    CanonicalRecord {
        issue_timestamp: parse_issue_timestamp(info.text_of("dhEvento")),
        document_key: access_key.to_string(),
        document_number: number_from_access_key(access_key).into_inner(),
        recipient_name: NOT_APPLICABLE.to_string(),
        recipient_tax_id: NOT_APPLICABLE.to_string(),
        total_value: Decimal::ZERO,
        status: STATUS_CANCELLED.to_string(),
        protocol_number: protocol.to_string(),
        justification: detail.text_of("xJust").to_string(),
    }
}

/// Recipient name and CPF/CNPJ from a `dest` block.
fn recipient(dest: Lookup<'_>) -> (String, String) {
    let name = match dest.node() {
        Some(node) if !node.is_empty() => node.child("xNome").node().map_or("", XmlNode::text),
        _ => UNIDENTIFIED_CONSUMER,
    };
    let tax_id = non_empty(dest.child_text("CPF"))
        .or_else(|| non_empty(dest.child_text("CNPJ")))
        .unwrap_or(NOT_INFORMED);
    (name.to_string(), tax_id.to_string())
}

fn document_total(info: Lookup<'_>) -> Decimal {
    parse_amount(info.child("total").child("ICMSTot").text_of("vNF")).into_inner()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn non_empty_records(records: Vec<CanonicalRecord>) -> Option<Vec<CanonicalRecord>> {
    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}
