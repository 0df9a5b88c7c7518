#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let halves = data.split_at(data.len() / 2);
    let outcome = nfce_report::batch::process_all([("a.xml", halves.0), ("b.xml", halves.1)]);
    let _ = nfce_report::export::to_csv_sheets(&outcome.records, &Default::default());
    let _ = nfce_report::export::summary_text(&nfce_report::monthly_summary(&outcome.records));
});
