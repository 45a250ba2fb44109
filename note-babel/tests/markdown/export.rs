use crate::support::{archive_documents, archive_texts, converter, fixed_clock, fixture};
use note_babel::formats::MarkdownFormat;
use note_babel::{ConvertOptions, NoteFormat, SerializedOutput, WriteContext};

#[test]
fn test_enex_to_markdown_archive() {
    let result = converter()
        .convert("enex", "markdown", &[fixture("enex", "trip.enex")])
        .unwrap();
    let files = archive_texts(&result.output);
    let names: Vec<&str> = files.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names.len(), 3);
    assert_eq!(names[0], "Trip & Plans.md");
    assert_eq!(names[1], "Reading.md");
    assert!(names[2].starts_with("assets/") && names[2].ends_with(".png"));

    let trip = &files[0].1;
    assert!(trip.starts_with("# Trip & Plans\n\nPack list\n"));
    assert!(trip.contains("- [x] Passport\n- [ ] Charger\n"));
    assert!(trip.contains(&format!("]({})", names[2])));
    assert!(trip.ends_with("\n---\nTags: travel, 2021\n"));

    let reading = &files[1].1;
    assert!(reading.contains("Finish **Dune**"));
    assert!(!reading.contains("Tags:"));
}

#[test]
fn test_markdown_round_trip_preserves_metadata() {
    let mut options = ConvertOptions::default();
    options.markdown.front_matter = true;
    let converter = converter().with_options(options);

    let first = converter
        .convert("enex", "markdown", &[fixture("enex", "trip.enex")])
        .unwrap();
    let outcome = converter
        .read("markdown", &archive_documents(&first.output, ".md"))
        .unwrap();
    assert_eq!(outcome.notes.len(), 2);
    let trip = &outcome.notes[0];
    assert_eq!(trip.title(), "Trip & Plans");
    assert_eq!(trip.tags(), ["travel", "2021"]);
    assert_eq!(trip.created().to_rfc3339(), "2021-01-03T10:15:00+00:00");
    assert_eq!(trip.updated().to_rfc3339(), "2021-01-04T08:00:00+00:00");
    assert!(trip.content().contains("<li data-checked=\"false\">Charger</li>"));
}

#[test]
fn test_duplicate_titles_get_distinct_files() {
    let docs = [fixture("markdown", "weekly.md"), fixture("markdown", "weekly.md")];
    let result = converter().convert("markdown", "keep", &docs).unwrap();
    let names: Vec<String> = archive_texts(&result.output)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, ["Weekly review.html", "Weekly review (2).html"]);
}

#[test]
fn test_empty_note_list_is_an_empty_archive() {
    let clock = fixed_clock();
    let options = ConvertOptions::default();
    let output = MarkdownFormat
        .generate(&[], &WriteContext::new(&clock, &options))
        .unwrap();
    assert!(matches!(&output, SerializedOutput::Archive(entries) if entries.is_empty()));
    assert_eq!(output.entry_count(), 0);
}

#[test]
fn test_tags_with_commas_survive_round_trip() {
    let enex = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<en-export>\
        <note><title>Places</title><content><![CDATA[<en-note>Visited</en-note>]]></content>\
        <tag>Paris, France</tag><tag>travel</tag></note></en-export>";
    let result = converter()
        .convert("enex", "markdown", &[note_babel::RawDocument::new("places.enex", enex)])
        .unwrap();
    let files = archive_texts(&result.output);
    assert!(files[0].1.contains("  - \"Paris, France\"\n"));

    let back = converter()
        .read("markdown", &archive_documents(&result.output, ".md"))
        .unwrap();
    assert_eq!(back.notes[0].tags(), ["Paris, France", "travel"]);
    assert_eq!(back.notes[0].title(), "Places");
}
