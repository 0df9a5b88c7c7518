#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Every input must yield records or a diagnostic, never a panic.
    let extraction = nfce_report::xml::extract_bytes(data, "fuzz.xml");
    let _ = nfce_report::GapReport::from_records(extraction.records());
});
