use crate::support::{converter, document_text, fixed_clock};
use chrono::{TimeZone, Utc};
use note_babel::formats::EnexFormat;
use note_babel::ir::{Element, Node};
use note_babel::{
    ConversionError, ConvertOptions, Diagnostics, Note, NoteFormat, RawDocument, ReadContext,
    WriteContext,
};
use proptest::prelude::*;

fn note(title: &str, tags: &[&str]) -> Note {
    Note::builder(Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap())
        .title(title)
        .content_nodes(vec![Element::new("p").with_text("body").into()])
        .tags(tags.iter().map(|t| t.to_string()).collect())
        .build()
        .unwrap()
}

fn write(notes: &[Note]) -> String {
    let clock = fixed_clock();
    let options = ConvertOptions::default();
    let output = EnexFormat::evernote()
        .generate(notes, &WriteContext::new(&clock, &options))
        .unwrap();
    document_text(&output)
}

fn read(text: &str) -> Vec<Note> {
    let clock = fixed_clock();
    let options = ConvertOptions::default();
    let mut diagnostics = Diagnostics::new();
    let notes = EnexFormat::evernote()
        .parse_document(
            &RawDocument::new("notes.enex", text),
            &ReadContext::new(&clock, &options),
            &mut diagnostics,
        )
        .unwrap();
    assert_eq!(diagnostics.warning_count(), 0);
    notes
}

proptest! {
    #[test]
    fn tags_round_trip_in_order(
        tags in prop::collection::vec("[a-zA-Z0-9 &<>'\"_-]{0,10}", 0..6)
    ) {
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        let original = note("Tagged", &tags);
        let notes = read(&write(std::slice::from_ref(&original)));
        prop_assert_eq!(notes[0].tags(), original.tags());
    }
}

#[test]
fn test_padded_and_blank_tags_round_trip() {
    let original = note("Tagged", &[" padded ", "", "x"]);
    assert_eq!(original.tags(), ["padded", "x"]);
    let notes = read(&write(&[original]));
    assert_eq!(notes[0].tags(), ["padded", "x"]);
}

#[test]
fn test_title_escaped_once_and_read_back() {
    let title = "R&D <draft> \"v2\"";
    let written = write(&[note(title, &[])]);
    assert!(written.contains("<title>R&amp;D &lt;draft&gt; &quot;v2&quot;</title>"));
    assert!(!written.contains("&amp;amp;"));
    assert_eq!(read(&written)[0].title(), title);
}

#[test]
fn test_empty_note_list_is_a_valid_export() {
    let written = write(&[]);
    assert!(written.contains("<en-export"));
    assert!(!written.contains("<note>"));
    assert!(read(&written).is_empty());
}

#[test]
fn test_one_record_per_note() {
    let notes: Vec<Note> = (1..=3).map(|i| note(&format!("n{i}"), &[])).collect();
    let written = write(&notes);
    assert_eq!(written.matches("<note>").count(), 3);
    let titles: Vec<String> = read(&written).iter().map(|n| n.title().to_string()).collect();
    assert_eq!(titles, ["n1", "n2", "n3"]);
}

#[test]
fn test_body_survives_round_trip() {
    let content = vec![
        Element::new("p")
            .with_children(vec![Node::text("a "), Element::new("b").with_text("bold").into()])
            .into(),
        Element::new("ul")
            .with_children(vec![Element::new("li").with_text("plain").into()])
            .into(),
    ];
    let original = Note::builder(Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap())
        .title("Body")
        .content_nodes(content)
        .build()
        .unwrap();
    let back = read(&write(std::slice::from_ref(&original)));
    assert_eq!(back[0].content(), original.content());
    assert_eq!(back[0].created(), original.created());
}

#[test]
fn test_same_underlying_format_rejected() {
    let err = converter()
        .convert("enex", "apple-notes", &[RawDocument::new("a.enex", "<en-export/>")])
        .unwrap_err();
    assert_eq!(
        err,
        ConversionError::SameFormat {
            from: "enex".to_string(),
            to: "apple-notes".to_string()
        }
    );
    assert!(matches!(
        converter().convert("enex", "enex", &[]),
        Err(ConversionError::SameFormat { .. })
    ));
}
