//! Keep HTML → canonical note

use crate::common::checklist::rewrite_keep_checklists;
use crate::common::dates::DateGrammar;
use crate::common::labels::{collect_labels, strip_chips};
use crate::diagnostics::Diagnostics;
use crate::error::FormatError;
use crate::format::{RawDocument, ReadContext};
use crate::ir::from_html::parse_html_document;
use crate::ir::{Element, Node};
use crate::model::Note;
use once_cell::sync::Lazy;
use regex::Regex;

static KEEP_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class\s*=\s*["'](?:[^"']*\s)?(?:content|note)(?:\s[^"']*)?["']"#)
        .expect("valid regex")
});

/// Marker check run before a full parse.
pub fn looks_like_keep(text: &str) -> bool {
    text.contains("Google Keep") || KEEP_CLASS.is_match(text)
}

/// Parts of the note wrapper that are metadata rather than body.
const NOTE_CHROME: &[&str] = &["heading", "title", "chips", "attachments"];

pub fn parse_keep(
    doc: &RawDocument,
    ctx: &ReadContext,
    diagnostics: &mut Diagnostics,
) -> Result<Note, FormatError> {
    let html = parse_html_document(&doc.text);

    let content = html.find_first(|e| e.has_class("content"));
    let wrapper = html.find_first(|e| e.has_class("note"));
    let mut body: Vec<Node> = match (content, wrapper) {
        (Some(content), _) => content.children.clone(),
        (None, Some(wrapper)) => wrapper
            .children
            .iter()
            .filter(|n| {
                !n.as_element()
                    .is_some_and(|e| NOTE_CHROME.iter().any(|c| e.has_class(c)))
            })
            .cloned()
            .collect(),
        (None, None) => {
            return Err(FormatError::ParseError(
                "no .content or .note element found".to_string(),
            ))
        }
    };

    for attachments in html.find_all(|e| e.has_class("attachments")) {
        for img in attachments.find_all(|e| e.name == "img") {
            body.push(Element::new("div").with_children(vec![img.clone().into()]).into());
        }
    }

    let title = non_empty_text(html.find_first(|e| e.name == "title"))
        .or_else(|| non_empty_text(html.find_first(|e| e.has_class("title"))));

    let created = match date_text(&html) {
        Some(raw) => ctx.normalizer(DateGrammar::Keep).normalize(&raw),
        None => ctx.clock.now(),
    };

    let archived = html
        .find_first(|e| e.has_class("note") && e.has_class("archived"))
        .is_some();
    let tags = collect_labels(&html);

    let extraction = ctx.attachments().extract(body);
    extraction.report(&doc.name, diagnostics);
    let body = strip_chips(rewrite_keep_checklists(extraction.nodes));

    let mut builder = ctx
        .note_builder(created)
        .content_nodes(trim_blank_edges(body))
        .tags(tags)
        .archived(archived)
        .attachments(extraction.resources);
    if let Some(title) = title {
        builder = builder.title(title);
    }
    builder.build()
}

fn non_empty_text(el: Option<&Element>) -> Option<String> {
    el.map(|e| e.text_content().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `.heading` text, or the text of the body's second element (older exports).
fn date_text(html: &Element) -> Option<String> {
    non_empty_text(html.find_first(|e| e.has_class("heading"))).or_else(|| {
        let body = html.find_first(|e| e.name == "body")?;
        non_empty_text(body.child_elements().nth(1))
    })
}

fn trim_blank_edges(mut nodes: Vec<Node>) -> Vec<Node> {
    while nodes.last().is_some_and(Node::is_blank_text) {
        nodes.pop();
    }
    let leading = nodes.iter().take_while(|n| n.is_blank_text()).count();
    nodes.drain(..leading);
    nodes
}
