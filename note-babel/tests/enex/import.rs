use crate::support::{converter, fixture};
use chrono::{TimeZone, Utc};
use note_babel::{ConversionError, RawDocument};

#[test]
fn test_reads_every_note_of_an_export() {
    let outcome = converter().read("enex", &[fixture("enex", "trip.enex")]).unwrap();
    assert_eq!(outcome.notes.len(), 2);
    assert_eq!(outcome.diagnostics.warning_count(), 0);

    let trip = &outcome.notes[0];
    assert_eq!(trip.title(), "Trip & Plans");
    assert_eq!(trip.tags(), ["travel", "2021"]);
    assert_eq!(trip.created(), Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap());
    assert_eq!(trip.updated(), Utc.with_ymd_and_hms(2021, 1, 4, 8, 0, 0).unwrap());
    assert!(trip.content().contains("<li data-checked=\"true\">Passport</li>"));
    assert!(trip.content().contains("<li data-checked=\"false\">Charger</li>"));

    assert_eq!(trip.attachments().len(), 1);
    let image = &trip.attachments()[0];
    assert_eq!(image.mime_type(), "image/png");
    assert_eq!(image.data().len(), 70);
    assert!(trip
        .content()
        .contains(&format!("hash=\"{}\"", image.content_hash())));
}

#[test]
fn test_html_isms_in_enml_are_repaired() {
    let outcome = converter().read("enex", &[fixture("enex", "trip.enex")]).unwrap();
    let reading = &outcome.notes[1];
    assert_eq!(reading.title(), "Reading");
    assert_eq!(reading.content(), "<p>Finish <b>Dune</b>\u{a0}tonight<br/></p>");
    assert_eq!(reading.updated(), reading.created());
    assert!(reading.tags().is_empty());
}

#[test]
fn test_one_malformed_document_does_not_fail_the_batch() {
    let good = fixture("enex", "trip.enex");
    let docs = vec![
        good.clone(),
        RawDocument::new("broken.enex", "<en-export><note><title>cut off"),
        RawDocument::new("copy.enex", good.text.clone()),
    ];
    let outcome = converter().read("enex", &docs).unwrap();

    assert_eq!(outcome.notes.len(), 4);
    let warnings: Vec<_> = outcome.diagnostics.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].document, "broken.enex");
    // Input order survives parallel reading
    assert_eq!(outcome.notes[0].title(), "Trip & Plans");
    assert_eq!(outcome.notes[2].title(), "Trip & Plans");
}

#[test]
fn test_non_enex_input_yields_no_notes() {
    let docs = [RawDocument::new("note.html", "<html><div class=\"content\">x</div></html>")];
    let err = converter().convert("enex", "markdown", &docs).unwrap_err();
    assert_eq!(err, ConversionError::NoNotesFound);
}

#[test]
fn test_apple_notes_is_write_only() {
    let docs = [fixture("enex", "trip.enex")];
    assert!(converter().read("apple-notes", &docs).is_err());
}
