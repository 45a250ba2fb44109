use crate::support::{archive_documents, archive_texts, converter, fixture};

#[test]
fn test_keep_writer_marks_archived_without_chip() {
    let enex = converter()
        .convert("keep", "enex", &[fixture("keep", "groceries.html")])
        .unwrap();
    let docs = vec![note_babel::RawDocument::new(
        "notes.enex",
        crate::support::document_text(&enex.output),
    )];
    let keep = converter().convert("enex", "keep", &docs).unwrap();

    let files = archive_texts(&keep.output);
    assert_eq!(files.len(), 1);
    let (name, html) = &files[0];
    assert_eq!(name, "Groceries.html");
    assert!(html.contains("class=\"note archived\""));
    assert!(!html.contains("<span class=\"label-name\">archived</span>"));
    assert!(html.contains("<span class=\"label-name\">home</span>"));
    assert!(html.contains("listitem checked"));

    let back = converter()
        .read("keep", &archive_documents(&keep.output, ".html"))
        .unwrap();
    let note = &back.notes[0];
    assert_eq!(note.title(), "Groceries");
    assert_eq!(note.tags(), ["home", "errands", "archived"]);
    assert_eq!(
        note.content(),
        "<ul><li data-checked=\"true\">Milk</li><li data-checked=\"false\">Eggs</li></ul>"
    );
}

#[test]
fn test_keep_through_markdown_and_back() {
    let markdown = converter()
        .convert("keep", "markdown", &[fixture("keep", "groceries.html")])
        .unwrap();
    let files = archive_texts(&markdown.output);
    assert_eq!(files[0].0, "Groceries.md");
    assert!(files[0].1.contains("- [x] Milk"));
    assert!(files[0].1.ends_with("Tags: home, errands, archived\n"));

    let keep = converter()
        .convert("markdown", "keep", &archive_documents(&markdown.output, ".md"))
        .unwrap();
    let back = converter()
        .read("keep", &archive_documents(&keep.output, ".html"))
        .unwrap();
    let note = &back.notes[0];
    assert_eq!(note.title(), "Groceries");
    assert_eq!(note.tags(), ["home", "errands", "archived"]);
    assert!(note.content().contains("<li data-checked=\"true\">Milk</li>"));
}

#[test]
fn test_quoted_archived_in_body_survives_keep_round_trip() {
    let source = note_babel::RawDocument::new(
        "box.md",
        "# Storage\n\nBox label says \"archived\" on it\n",
    );
    let keep = converter().convert("markdown", "keep", &[source]).unwrap();
    let files = archive_texts(&keep.output);
    assert!(files[0].1.contains("\"archived\""));
    assert!(!files[0].1.contains("class=\"note archived\""));

    let back = converter()
        .read("keep", &archive_documents(&keep.output, ".html"))
        .unwrap();
    let note = &back.notes[0];
    assert!(note.tags().is_empty());
    assert!(!note.is_archived());
    assert!(note.content().contains("Box label says &quot;archived&quot; on it"));
}
