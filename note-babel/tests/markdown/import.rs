use crate::support::{converter, fixture};
use chrono::{TimeZone, Utc};

#[test]
fn test_weekly_review() {
    let outcome = converter()
        .read("markdown", &[fixture("markdown", "weekly.md")])
        .unwrap();
    let note = &outcome.notes[0];
    assert_eq!(note.title(), "Weekly review");
    assert_eq!(note.tags(), ["work", "review"]);
    assert_eq!(note.created(), Utc.with_ymd_and_hms(2021, 3, 1, 9, 30, 0).unwrap());
    assert_eq!(note.updated(), Utc.with_ymd_and_hms(2021, 3, 2, 18, 0, 0).unwrap());

    let content = note.content();
    assert!(content.starts_with("<p>Went <em>well</em>:</p>"));
    assert!(content.contains("<ul><li>Shipped the importer</li><li>Fixed <code>--verbose</code></li></ul>"));
    assert!(content.contains(
        "<ul><li data-checked=\"true\">Book venue</li><li data-checked=\"false\">Send invites</li></ul>"
    ));
    assert!(!content.contains("Tags:"));
    assert!(!content.contains("<hr"));
}

#[test]
fn test_markdown_to_enex_keeps_checklist() {
    let result = converter()
        .convert("markdown", "enex", &[fixture("markdown", "weekly.md")])
        .unwrap();
    let enex = crate::support::document_text(&result.output);
    assert!(enex.contains("<en-todo checked=\"true\"/>Book venue<br/>"));
    assert!(enex.contains("<tag>work</tag>"));
    assert!(enex.contains("<created>20210301T093000Z</created>"));
}
