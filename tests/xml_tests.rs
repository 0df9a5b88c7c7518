#![cfg(feature = "xml")]

use chrono::NaiveDate;
use nfce_report::core::*;
use nfce_report::xml::{self, EnvelopeKind, Extraction};
use rust_decimal_macros::dec;

const KEY_123: &str = "35240112345678000190650010000001231000001234";
const KEY_124: &str = "35240112345678000190650010000001241000001240";

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn nfe_proc(key_in_receipt: &str, dest: &str, vnf: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <NFe>
    <infNFe Id="NFe99999999999999999999999999999999999999999999" versao="4.00">
      <ide>
        <cUF>35</cUF>
        <mod>65</mod>
        <serie>1</serie>
        <nNF>123</nNF>
        <dhEmi>2024-01-15T10:30:00-03:00</dhEmi>
      </ide>
      <emit><CNPJ>12345678000190</CNPJ><xNome>Padaria Central LTDA</xNome></emit>
      {dest}
      <total><ICMSTot><vProd>25.90</vProd><vNF>{vnf}</vNF></ICMSTot></total>
    </infNFe>
  </NFe>
  <protNFe versao="4.00">
    <infProt>
      <tpAmb>1</tpAmb>
      <chNFe>{key_in_receipt}</chNFe>
      <dhRecbto>2024-01-15T10:30:05-03:00</dhRecbto>
      <nProt>135240000012345</nProt>
      <cStat>100</cStat>
      <xMotivo>Autorizado o uso da NF-e</xMotivo>
    </infProt>
  </protNFe>
</nfeProc>"#
    )
}

fn proc_inut(first: &str, last: &str) -> String {
    format!(
        r#"<ProcInutNFe xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <inutNFe versao="4.00">
    <infInut Id="ID35241234567800019065001000000010000000015">
      <tpAmb>1</tpAmb>
      <xServ>INUTILIZAR</xServ>
      <nNFIni>{first}</nNFIni>
      <nNFFin>{last}</nNFFin>
      <xJust>Falha no sistema emissor durante a emissao</xJust>
    </infInut>
  </inutNFe>
  <retInutNFe versao="4.00">
    <infInut>
      <cStat>102</cStat>
      <xMotivo>Inutilizado - numeracao homologada</xMotivo>
      <dhRecbto>2024-02-10T14:00:00-03:00</dhRecbto>
      <nProt>135240000099999</nProt>
    </infInut>
  </retInutNFe>
</ProcInutNFe>"#
    )
}

fn cancellation_event(code: &str, key: &str, seq: u32) -> String {
    format!(
        r#"<evento versao="1.00">
    <infEvento Id="ID{code}{key}0{seq}">
      <cOrgao>35</cOrgao>
      <chNFe>{key}</chNFe>
      <dhEvento>2024-01-16T09:00:00-03:00</dhEvento>
      <tpEvento>{code}</tpEvento>
      <nSeqEvento>{seq}</nSeqEvento>
      <detEvento versao="1.00">
        <descEvento>Cancelamento</descEvento>
        <nProt>13524000001234{seq}</nProt>
        <xJust>Erro na digitacao dos itens</xJust>
      </detEvento>
    </infEvento>
  </evento>"#
    )
}

fn env_evento(events: &[String]) -> String {
    format!(
        r#"<envEvento xmlns="http://www.portalfiscal.inf.br/nfe" versao="1.00"><idLote>1</idLote>{}</envEvento>"#,
        events.join("")
    )
}

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> IssueTimestamp {
    IssueTimestamp::Parsed(
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap(),
    )
}

fn only_record(extraction: Extraction) -> CanonicalRecord {
    let mut records = extraction.into_records();
    assert_eq!(records.len(), 1);
    records.remove(0)
}

fn assert_populated(r: &CanonicalRecord) {
    assert!(!r.document_key.is_empty(), "key empty: {r:?}");
    assert!(!r.document_number.is_empty(), "number empty: {r:?}");
    assert!(!r.recipient_name.is_empty(), "recipient empty: {r:?}");
    assert!(!r.recipient_tax_id.is_empty(), "tax id empty: {r:?}");
    assert!(!r.status.is_empty(), "status empty: {r:?}");
    assert!(!r.total_value.is_sign_negative());
}

// ---------------------------------------------------------------------------
// Priority 6: processed document (nfeProc)
// ---------------------------------------------------------------------------

#[test]
fn processed_document_full() {
    let xml = nfe_proc(
        KEY_123,
        "<dest><CPF>12345678909</CPF><xNome>Maria Silva</xNome></dest>",
        "25.90",
    );
    let extraction = xml::extract(&xml, "nfce-123.xml");
    assert_eq!(extraction.kind(), Some(EnvelopeKind::ProcessedDocument));
    let r = only_record(extraction);
    assert_eq!(r.issue_timestamp, dt(2024, 1, 15, 10, 30, 0));
    assert_eq!(r.document_key, KEY_123);
    assert_eq!(r.document_number, "123");
    assert_eq!(r.recipient_name, "Maria Silva");
    assert_eq!(r.recipient_tax_id, "12345678909");
    assert_eq!(r.total_value, dec!(25.90));
    assert_eq!(r.status, "Autorizado o uso da NF-e");
    assert_eq!(r.protocol_number, "135240000012345");
    assert_eq!(r.justification, "");
}

#[test]
fn processed_document_key_comes_from_receipt_not_body() {
    let r = only_record(xml::extract(&nfe_proc(KEY_124, "", "1.00"), "x.xml"));
    assert_eq!(r.document_key, KEY_124);
    assert!(!r.document_key.contains("9999"));
}

#[test]
fn processed_document_without_dest() {
    let r = only_record(xml::extract(&nfe_proc(KEY_123, "", "10"), "x.xml"));
    assert_eq!(r.recipient_name, UNIDENTIFIED_CONSUMER);
    assert_eq!(r.recipient_tax_id, NOT_INFORMED);
}

#[test]
fn processed_document_cnpj_fallback() {
    let xml = nfe_proc(
        KEY_123,
        "<dest><CNPJ>11222333000181</CNPJ><xNome>Empresa X</xNome></dest>",
        "10",
    );
    let r = only_record(xml::extract(&xml, "x.xml"));
    assert_eq!(r.recipient_tax_id, "11222333000181");
}

#[test]
fn processed_document_dest_without_ids() {
    let xml = nfe_proc(KEY_123, "<dest><xNome>Joao</xNome></dest>", "10");
    let r = only_record(xml::extract(&xml, "x.xml"));
    assert_eq!(r.recipient_name, "Joao");
    assert_eq!(r.recipient_tax_id, NOT_INFORMED);
}

#[test]
fn processed_document_empty_cpf_falls_back_to_cnpj() {
    let xml = nfe_proc(
        KEY_123,
        "<dest><CPF></CPF><CNPJ>11222333000181</CNPJ></dest>",
        "10",
    );
    let r = only_record(xml::extract(&xml, "x.xml"));
    assert_eq!(r.recipient_tax_id, "11222333000181");
    assert_eq!(r.recipient_name, "");
}

#[test]
fn processed_document_degrades_bad_fields() {
    let xml = nfe_proc(KEY_123, "", "vinte reais").replace(
        "2024-01-15T10:30:00-03:00",
        "15/01/2024 10:30",
    );
    let r = only_record(xml::extract(&xml, "x.xml"));
    assert_eq!(r.total_value, dec!(0));
    assert_eq!(r.issue_timestamp, IssueTimestamp::Raw("15/01/2024 10:30".into()));
    assert_eq!(r.document_number, "123");
}

#[test]
fn processed_document_with_prefixed_namespaces() {
    let xml = r#"<nfe:nfeProc xmlns:nfe="http://www.portalfiscal.inf.br/nfe">
      <nfe:NFe><nfe:infNFe Id="NFe1">
        <nfe:ide><nfe:nNF>55</nfe:nNF><nfe:dhEmi>2024-05-01T08:00:00-03:00</nfe:dhEmi></nfe:ide>
        <nfe:total><nfe:ICMSTot><nfe:vNF>3.50</nfe:vNF></nfe:ICMSTot></nfe:total>
      </nfe:infNFe></nfe:NFe>
      <nfe:protNFe><nfe:infProt><nfe:chNFe>35240112345678000190650010000000551000000550</nfe:chNFe>
        <nfe:nProt>1</nfe:nProt><nfe:xMotivo>Autorizado o uso da NF-e</nfe:xMotivo></nfe:infProt></nfe:protNFe>
    </nfe:nfeProc>"#;
    let r = only_record(xml::extract(xml, "ns.xml"));
    assert_eq!(r.document_number, "55");
    assert_eq!(r.total_value, dec!(3.50));
    assert_eq!(r.document_key, "35240112345678000190650010000000551000000550");
}

#[test]
fn processed_document_without_receipt() {
    let xml = r#"<nfeProc><NFe><infNFe><ide><nNF>9</nNF></ide></infNFe></NFe></nfeProc>"#;
    let r = only_record(xml::extract(xml, "x.xml"));
    assert_eq!(r.document_key, "");
    assert_eq!(r.status, "");
    assert_eq!(r.protocol_number, "");
    assert_eq!(r.total_value, dec!(0));
}

#[test]
fn processed_document_missing_inner_levels_is_unrecognized() {
    for xml in [
        "<nfeProc/>",
        "<nfeProc><protNFe/></nfeProc>",
        "<nfeProc><NFe/></nfeProc>",
        "<nfeProc><NFe><Signature/></NFe></nfeProc>",
    ] {
        let extraction = xml::extract(xml, "partial.xml");
        match extraction {
            Extraction::Unrecognized(d) => {
                assert_eq!(d.kind, DiagnosticKind::UnrecognizedSchema);
                assert_eq!(d.filename, "partial.xml");
            }
            other => panic!("expected unrecognized for {xml}, got {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Priority 1: voiding confirmation (procInutNFe)
// ---------------------------------------------------------------------------

#[test]
fn voiding_confirmation_range() {
    let extraction = xml::extract(&proc_inut("10", "15"), "inut.xml");
    assert_eq!(extraction.kind(), Some(EnvelopeKind::VoidingConfirmation));
    let r = only_record(extraction);
    assert_eq!(r.issue_timestamp, dt(2024, 2, 10, 14, 0, 0));
    assert_eq!(r.document_key, "10 - 15");
    assert_eq!(r.document_number, "10");
    assert_eq!(r.recipient_name, NOT_APPLICABLE);
    assert_eq!(r.recipient_tax_id, NOT_APPLICABLE);
    assert_eq!(r.total_value, dec!(0));
    assert_eq!(r.status, "Inutilizado - numeracao homologada");
    assert!(r.is_voided());
    assert_eq!(r.protocol_number, "135240000099999");
    assert_eq!(r.justification, "Falha no sistema emissor durante a emissao");
}

#[test]
fn replacement_characters_in_valid_text_survive_byte_decoding() {
    let mut bytes = proc_inut("7", "8")
        .replace("Falha no sistema", "Falha \u{fffd} no sistema")
        .into_bytes();
    let pos = bytes.windows(7).position(|w| w == b"<nNFIni").unwrap();
    bytes.insert(pos, 0xc3);
    let r = only_record(xml::extract_bytes(&bytes, "mixed.xml"));
    assert_eq!(
        r.justification,
        "Falha \u{fffd} no sistema emissor durante a emissao"
    );
    assert_eq!(r.document_key, "7 - 8");
}

#[test]
fn voiding_confirmation_single_number() {
    let r = only_record(xml::extract(&proc_inut("20", "20"), "inut.xml"));
    assert_eq!(r.document_key, "20");
}

#[test]
fn voiding_confirmation_default_status() {
    let xml = proc_inut("1", "2").replace(
        "<xMotivo>Inutilizado - numeracao homologada</xMotivo>",
        "",
    );
    let r = only_record(xml::extract(&xml, "inut.xml"));
    assert_eq!(r.status, STATUS_VOIDED);
}

// ---------------------------------------------------------------------------
// Priority 3: simple voiding (inutNFe)
// ---------------------------------------------------------------------------

#[test]
fn simple_voiding() {
    let xml = r#"<inutNFe xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
      <infInut Id="ID1"><nNFIni>30</nNFIni><nNFFin>31</nNFFin><xJust>Pulo de numeracao</xJust></infInut>
    </inutNFe>"#;
    let extraction = xml::extract(xml, "inut.xml");
    assert_eq!(extraction.kind(), Some(EnvelopeKind::Voiding));
    let r = only_record(extraction);
    assert_eq!(r.document_key, "30 - 31");
    assert_eq!(r.document_number, "30");
    assert_eq!(r.status, STATUS_VOIDED);
    assert_eq!(r.protocol_number, "");
    assert_eq!(r.justification, "Pulo de numeracao");
    assert_eq!(r.issue_timestamp, IssueTimestamp::Raw(String::new()));
}

// ---------------------------------------------------------------------------
// Priority 2: event batch (envEvento)
// ---------------------------------------------------------------------------

#[test]
fn event_batch_emits_one_record_per_cancellation() {
    let xml = env_evento(&[
        cancellation_event("110111", KEY_123, 1),
        cancellation_event("110110", KEY_124, 1),
        cancellation_event("110112", KEY_124, 2),
    ]);
    let extraction = xml::extract(&xml, "eventos.xml");
    assert_eq!(extraction.kind(), Some(EnvelopeKind::EventBatch));
    let records = extraction.into_records();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].document_key, KEY_123);
    assert_eq!(records[0].document_number, "000000123");
    assert_eq!(records[0].status, STATUS_CANCELLED);
    assert_eq!(records[0].protocol_number, "135240000012341");
    assert_eq!(records[0].justification, "Erro na digitacao dos itens");
    assert_eq!(records[0].issue_timestamp, dt(2024, 1, 16, 9, 0, 0));
    assert_eq!(records[0].recipient_name, NOT_APPLICABLE);
    assert_eq!(records[0].total_value, dec!(0));

    assert_eq!(records[1].document_number, "000000124");
}

#[test]
fn event_batch_single_event() {
    let xml = env_evento(&[cancellation_event("110111", KEY_123, 1)]);
    assert_eq!(xml::extract(&xml, "e.xml").records().len(), 1);
}

#[test]
fn event_batch_short_key_is_not_identified() {
    let xml = env_evento(&[cancellation_event("110111", "3524011234", 1)]);
    let r = only_record(xml::extract(&xml, "e.xml"));
    assert_eq!(r.document_key, "3524011234");
    assert_eq!(r.document_number, NOT_IDENTIFIED);
}

#[test]
fn event_batch_code_is_trimmed() {
    let xml = env_evento(&[cancellation_event("110111", KEY_123, 1)])
        .replace("<tpEvento>110111</tpEvento>", "<tpEvento>\n  110111  \n</tpEvento>");
    assert_eq!(xml::extract(&xml, "e.xml").records().len(), 1);
}

#[test]
fn event_batch_without_cancellations_is_unrecognized() {
    let xml = env_evento(&[cancellation_event("110110", KEY_123, 1)]);
    assert!(matches!(
        xml::extract(&xml, "cce.xml"),
        Extraction::Unrecognized(_)
    ));
}

// ---------------------------------------------------------------------------
// Priority 5: processed event (procEventoNFe)
// ---------------------------------------------------------------------------

fn proc_evento(code: &str, det_prot: &str) -> String {
    format!(
        r#"<procEventoNFe xmlns="http://www.portalfiscal.inf.br/nfe" versao="1.00">
  <evento versao="1.00">
    <infEvento Id="ID1">
      <chNFe>{KEY_124}</chNFe>
      <dhEvento>2024-03-01T12:00:00-03:00</dhEvento>
      <tpEvento>{code}</tpEvento>
      <detEvento versao="1.00">{det_prot}<xJust>Cliente desistiu da compra</xJust></detEvento>
    </infEvento>
  </evento>
  <retEvento versao="1.00">
    <infEvento><cStat>135</cStat><nProt>135240000077777</nProt></infEvento>
  </retEvento>
</procEventoNFe>"#
    )
}

#[test]
fn processed_event_uses_detail_protocol() {
    let xml = proc_evento("110111", "<nProt>135240000012345</nProt>");
    let extraction = xml::extract(&xml, "proc-evento.xml");
    assert_eq!(extraction.kind(), Some(EnvelopeKind::ProcessedEvent));
    let r = only_record(extraction);
    assert_eq!(r.document_key, KEY_124);
    assert_eq!(r.document_number, "000000124");
    assert_eq!(r.status, STATUS_CANCELLED);
    assert_eq!(r.protocol_number, "135240000012345");
    assert_eq!(r.justification, "Cliente desistiu da compra");
    assert_eq!(r.issue_timestamp, dt(2024, 3, 1, 12, 0, 0));
}

#[test]
fn processed_event_falls_back_to_receipt_protocol() {
    let r = only_record(xml::extract(&proc_evento("110111", ""), "p.xml"));
    assert_eq!(r.protocol_number, "135240000077777");
}

#[test]
fn processed_event_only_honors_single_code() {
    // 110112 is a cancellation inside an envEvento batch but not here.
    let extraction = xml::extract(&proc_evento("110112", ""), "p.xml");
    assert!(matches!(extraction, Extraction::Unrecognized(_)));
}

// ---------------------------------------------------------------------------
// Priority 4: submission batch (enviNFe)
// ---------------------------------------------------------------------------

#[test]
fn submission_batch_records() {
    let xml = format!(
        r#"<enviNFe xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
  <idLote>42</idLote>
  <indSinc>1</indSinc>
  <NFe><infNFe Id="NFe{KEY_123}">
    <ide><nNF>123</nNF><dhEmi>2024-01-15T10:30:00-03:00</dhEmi></ide>
    <dest><CPF>12345678909</CPF><xNome>Maria</xNome></dest>
    <total><ICMSTot><vNF>12.34</vNF></ICMSTot></total>
  </infNFe></NFe>
  <NFe><infNFe Id="NFe{KEY_124}">
    <ide><nNF>124</nNF><dhEmi>invalid</dhEmi></ide>
    <total><ICMSTot><vNF></vNF></ICMSTot></total>
  </infNFe></NFe>
</enviNFe>"#
    );
    let extraction = xml::extract(&xml, "lote.xml");
    assert_eq!(extraction.kind(), Some(EnvelopeKind::SubmissionBatch));
    let records = extraction.into_records();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].document_key, KEY_123);
    assert_eq!(records[0].document_number, "123");
    assert_eq!(records[0].recipient_name, "Maria");
    assert_eq!(records[0].recipient_tax_id, "12345678909");
    assert_eq!(records[0].total_value, dec!(12.34));
    assert_eq!(records[0].status, STATUS_SENT_NO_PROTOCOL);
    assert_eq!(records[0].protocol_number, "");
    assert_eq!(records[0].justification, "");

    assert_eq!(records[1].document_key, KEY_124);
    assert_eq!(records[1].recipient_name, UNIDENTIFIED_CONSUMER);
    assert_eq!(records[1].recipient_tax_id, NOT_INFORMED);
    assert_eq!(records[1].total_value, dec!(0));
    assert_eq!(records[1].issue_timestamp, IssueTimestamp::Raw("invalid".into()));
}

// ---------------------------------------------------------------------------
// Negative cases
// ---------------------------------------------------------------------------

#[test]
fn malformed_input_is_distinct_from_unrecognized() {
    let malformed = xml::extract("<nfeProc><NFe></nfeProc>", "broken.xml");
    let unrecognized = xml::extract("<resNFe><chNFe>1</chNFe></resNFe>", "res.xml");

    match &malformed {
        Extraction::Malformed(d) => {
            assert_eq!(d.kind, DiagnosticKind::MalformedInput);
            assert_eq!(d.filename, "broken.xml");
        }
        other => panic!("expected malformed, got {other:?}"),
    }
    match &unrecognized {
        Extraction::Unrecognized(d) => {
            assert_eq!(d.kind, DiagnosticKind::UnrecognizedSchema);
            assert!(d.message.contains("resNFe"));
        }
        other => panic!("expected unrecognized, got {other:?}"),
    }
    assert!(malformed.records().is_empty());
    assert!(unrecognized.records().is_empty());
}

#[test]
fn bare_nfe_document_is_unrecognized() {
    let xml = r#"<NFe><infNFe Id="NFe1"><ide><nNF>1</nNF></ide></infNFe></NFe>"#;
    assert!(matches!(xml::extract(xml, "nfe.xml"), Extraction::Unrecognized(_)));
}

#[test]
fn filename_does_not_influence_classification() {
    let xml = proc_inut("1", "1");
    let a = xml::extract(&xml, "nfeProc.xml");
    let b = xml::extract(&xml, "anything.txt");
    assert_eq!(a.kind(), b.kind());
    assert_eq!(a.into_records(), b.into_records());
}

#[test]
fn invalid_utf8_bytes_are_dropped() {
    let mut bytes = proc_inut("7", "8").into_bytes();
    let pos = bytes.windows(5).position(|w| w == b"Falha").unwrap();
    bytes.insert(pos, 0xff);
    let r = only_record(xml::extract_bytes(&bytes, "latin1.xml"));
    assert_eq!(r.justification, "Falha no sistema emissor durante a emissao");
}

#[test]
fn every_kind_populates_all_fields() {
    let inputs = vec![
        proc_inut("1", "3"),
        env_evento(&[cancellation_event("110111", KEY_123, 1)]),
        "<inutNFe><infInut><nNFIni>4</nNFIni><nNFFin>4</nNFFin></infInut></inutNFe>".to_string(),
        format!(
            "<enviNFe><NFe><infNFe Id=\"NFe{KEY_123}\"><ide><nNF>5</nNF></ide></infNFe></NFe></enviNFe>"
        ),
        proc_evento("110111", ""),
        nfe_proc(KEY_123, "", "1"),
    ];
    for xml in inputs {
        let records = xml::extract(&xml, "f.xml").into_records();
        assert!(!records.is_empty(), "no records for {xml}");
        for r in &records {
            assert_populated(r);
        }
    }
}
