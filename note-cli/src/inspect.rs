//! `notebabel inspect`: the canonical notes of a batch as JSON.

use note_babel::{Diagnostic, Note, ReadOutcome};
use serde::Serialize;

#[derive(Serialize)]
struct InspectReport<'a> {
    note_count: usize,
    notes: &'a [Note],
    diagnostics: &'a [Diagnostic],
}

/// Pretty JSON with every note and the diagnostics raised while reading them.
pub fn render_json(outcome: &ReadOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&InspectReport {
        note_count: outcome.notes.len(),
        notes: &outcome.notes,
        diagnostics: outcome.diagnostics.entries(),
    })
}
