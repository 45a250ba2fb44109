//! Cross-format guarantees of the canonical model.

use crate::support::{converter, fixed_clock, fixture};
use chrono::{TimeZone, Utc};
use note_babel::common::attachments::{media_placeholder, placeholder_hashes, HashAlgorithm};
use note_babel::ir::{Element, Node};
use note_babel::{ConvertOptions, Note, RawDocument, ReadContext};

const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn created() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap()
}

#[test]
fn test_every_placeholder_resolves_and_every_attachment_is_referenced() {
    let clock = fixed_clock();
    let options = ConvertOptions::default();
    let ctx = ReadContext::new(&clock, &options);
    let resource = ctx.attachments().resource("image/png", vec![1, 2, 3], 1);
    let orphan = ctx.attachments().resource("image/gif", vec![9, 9], 2);

    let note = Note::builder(created())
        .content_nodes(vec![
            Element::new("p").with_text("see").into(),
            media_placeholder("image/png", resource.content_hash()).into(),
            media_placeholder("image/png", "no-such-hash").into(),
        ])
        .attachments(vec![resource.clone(), orphan.clone(), resource.clone()])
        .build()
        .unwrap();

    assert_eq!(note.attachments().len(), 2);
    let hashes = placeholder_hashes(&note.content_nodes().unwrap());
    assert_eq!(
        hashes,
        vec![
            resource.content_hash().to_string(),
            orphan.content_hash().to_string()
        ]
    );
    assert!(note.validate().is_ok());
}

#[test]
fn test_configured_hash_algorithm_applies_to_every_reader() {
    let mut options = ConvertOptions::default();
    options.hash_algorithm = HashAlgorithm::Rolling;
    let converter = converter().with_options(options);

    let markdown = RawDocument::new(
        "pic.md",
        format!("# Pic\n\n![dot](data:image/png;base64,{PIXEL})\n"),
    );
    let keep = RawDocument::new(
        "pic.html",
        format!(
            "<html><body><div class=\"note\"><div class=\"content\">\
             <img src=\"data:image/png;base64,{PIXEL}\"></div></div></body></html>"
        ),
    );
    let from_markdown = converter.read("markdown", &[markdown]).unwrap();
    let from_keep = converter.read("keep", &[keep]).unwrap();

    let a = from_markdown.notes[0].attachments()[0].content_hash();
    let b = from_keep.notes[0].attachments()[0].content_hash();
    assert_eq!(a, b);
    assert_eq!(a.len(), 8);
}

#[test]
fn test_untitled_placeholder_is_configurable() {
    let mut options = ConvertOptions::default();
    options.untitled_title = "(no title)".to_string();
    let outcome = converter()
        .with_options(options)
        .read("markdown", &[RawDocument::new("x.md", "just text\n")])
        .unwrap();
    assert_eq!(outcome.notes[0].title(), "(no title)");
}

#[test]
fn test_whitespace_only_body_is_valid() {
    let note = Note::builder(created())
        .title("  Spaced  ")
        .content_nodes(vec![Node::text("  ")])
        .build()
        .unwrap();
    assert_eq!(note.title(), "Spaced");
    assert!(note.validate().is_ok());
}

#[test]
fn test_every_reader_yields_valid_notes() {
    let converter = converter();
    for (format, doc) in [
        ("enex", fixture("enex", "trip.enex")),
        ("keep", fixture("keep", "groceries.html")),
        ("markdown", fixture("markdown", "weekly.md")),
    ] {
        let outcome = converter.read(format, &[doc]).unwrap();
        assert!(!outcome.notes.is_empty(), "{format} produced no notes");
        for note in &outcome.notes {
            assert!(note.validate().is_ok(), "{format}: '{}' invalid", note.title());
            assert!(!note.title().trim().is_empty());
        }
    }
}
