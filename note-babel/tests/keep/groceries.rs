//! A Takeout note with a checklist, labels and the archived flag, taken to ENEX.

use crate::support::{converter, document_text, fixture};
use chrono::{TimeZone, Utc};
use note_babel::{RawDocument, SerializedOutput};

#[test]
fn test_keep_note_reads_canonically() {
    let outcome = converter().read("keep", &[fixture("keep", "groceries.html")]).unwrap();
    assert_eq!(outcome.notes.len(), 1);
    let note = &outcome.notes[0];
    assert_eq!(note.title(), "Groceries");
    assert_eq!(note.tags(), ["home", "errands", "archived"]);
    assert!(note.is_archived());
    assert_eq!(note.created(), Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap());
    assert_eq!(
        note.content(),
        "<ul><li data-checked=\"true\">Milk</li><li data-checked=\"false\">Eggs</li></ul>"
    );
}

#[test]
fn test_keep_to_enex() {
    let result = converter()
        .convert("keep", "enex", &[fixture("keep", "groceries.html")])
        .unwrap();
    assert_eq!(result.note_count, 1);
    match &result.output {
        SerializedOutput::Document {
            file_name,
            media_type,
            ..
        } => {
            assert_eq!(file_name, "notes.enex");
            assert_eq!(media_type, "application/enex+xml");
        }
        SerializedOutput::Archive(_) => panic!("ENEX is a single document"),
    }

    let enex = document_text(&result.output);
    assert!(enex.contains("<title>Groceries</title>"));
    assert!(enex.contains("<created>20210103T101500Z</created>"));
    assert!(enex.contains("<en-todo checked=\"true\"/>Milk<br/>"));
    assert!(enex.contains("<en-todo checked=\"false\"/>Eggs<br/>"));
    assert_eq!(enex.matches("<tag>archived</tag>").count(), 1);
    assert!(enex.contains("<tag>home</tag>"));
    assert!(!enex.contains("<ul"));

    let back = converter()
        .read("enex", &[RawDocument::new("notes.enex", enex)])
        .unwrap();
    let note = &back.notes[0];
    assert_eq!(note.tags(), ["home", "errands", "archived"]);
    assert!(note.is_archived());
    assert_eq!(
        note.content(),
        "<ul><li data-checked=\"true\">Milk</li><li data-checked=\"false\">Eggs</li></ul>"
    );
}

#[test]
fn test_keep_to_apple_notes_file_name() {
    let result = converter()
        .convert("keep", "apple-notes", &[fixture("keep", "groceries.html")])
        .unwrap();
    assert!(matches!(
        &result.output,
        SerializedOutput::Document { file_name, .. } if file_name == "notes-for-apple.enex"
    ));
}

#[test]
fn test_plain_text_is_not_a_keep_note() {
    let docs = [
        fixture("keep", "groceries.html"),
        RawDocument::new("readme.html", "just some words"),
    ];
    let result = converter().convert("keep", "enex", &docs).unwrap();
    assert_eq!(result.note_count, 1);
    assert_eq!(result.diagnostics.warning_count(), 1);
}
