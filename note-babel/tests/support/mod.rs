//! Shared helpers for the format tests.

use chrono::{TimeZone, Utc};
use note_babel::{Converter, FixedClock, FormatRegistry, RawDocument, SerializedOutput};
use std::path::PathBuf;

pub fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
}

pub fn converter() -> Converter {
    Converter::new(FormatRegistry::with_defaults()).with_clock(fixed_clock())
}

/// Load `tests/<format>/fixtures/<name>` as a raw document.
pub fn fixture(format: &str, name: &str) -> RawDocument {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", format, "fixtures", name]
        .iter()
        .collect();
    let text = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read fixture {}: {e}", path.display()));
    RawDocument::new(name, text)
}

/// Text of a single-document output.
pub fn document_text(output: &SerializedOutput) -> String {
    match output {
        SerializedOutput::Document { bytes, .. } => String::from_utf8(bytes.clone()).unwrap(),
        SerializedOutput::Archive(_) => panic!("expected a single document"),
    }
}

/// Archive entries as `(name, text)`; binary entries are decoded lossily.
pub fn archive_texts(output: &SerializedOutput) -> Vec<(String, String)> {
    match output {
        SerializedOutput::Archive(entries) => entries
            .iter()
            .map(|e| (e.name.clone(), String::from_utf8_lossy(&e.bytes).into_owned()))
            .collect(),
        SerializedOutput::Document { .. } => panic!("expected an archive"),
    }
}

/// Archive entries turned back into documents, skipping assets.
pub fn archive_documents(output: &SerializedOutput, extension: &str) -> Vec<RawDocument> {
    archive_texts(output)
        .into_iter()
        .filter(|(name, _)| name.ends_with(extension))
        .map(|(name, text)| RawDocument::new(name, text))
        .collect()
}
