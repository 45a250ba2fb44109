//! Markdown → canonical note
//!
//! The comrak AST is read in three passes: front matter, title and tag line are detached from
//! the top level, then the remaining blocks are mapped onto the fragment IR.

use super::default_comrak_options;
use crate::common::checklist::checklist_item;
use crate::common::dates::DateGrammar;
use crate::diagnostics::Diagnostics;
use crate::error::FormatError;
use crate::format::{RawDocument, ReadContext};
use crate::ir::from_html::parse_html_fragment;
use crate::ir::{Element, Node};
use crate::model::Note;
use comrak::nodes::{AstNode, ListType, NodeValue};
use comrak::{parse_document, Arena};

const TAGS_PREFIX: &str = "Tags:";

/// Metadata read from a `---` delimited front matter block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub tags: Vec<String>,
    pub archived: bool,
}

pub fn parse_markdown(
    doc: &RawDocument,
    ctx: &ReadContext,
    diagnostics: &mut Diagnostics,
) -> Result<Note, FormatError> {
    let arena = Arena::new();
    let options = default_comrak_options();
    let root = parse_document(&arena, &doc.text, &options);

    let front_matter = take_front_matter(root).unwrap_or_default();
    let heading = take_title(root);
    let line_tags = take_tag_line(root);

    let body = children_to_ir(root);
    let extraction = ctx.attachments().extract(body);
    extraction.report(&doc.name, diagnostics);

    let normalizer = ctx.normalizer(DateGrammar::Iso8601);
    let created = match &front_matter.created {
        Some(raw) => normalizer.normalize(raw),
        None => ctx.clock.now(),
    };
    let updated = front_matter
        .updated
        .as_deref()
        .and_then(|raw| normalizer.try_normalize(raw));

    let mut tags = front_matter.tags;
    for tag in line_tags {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    let mut builder = ctx
        .note_builder(created)
        .content_nodes(extraction.nodes)
        .updated(updated)
        .tags(tags)
        .archived(front_matter.archived)
        .attachments(extraction.resources);
    if let Some(title) = front_matter.title.or(heading) {
        builder = builder.title(title);
    }
    builder.build()
}

/// Parse the inside of a front matter block. Unknown keys are ignored.
pub fn parse_front_matter(raw: &str) -> FrontMatter {
    let mut fm = FrontMatter::default();
    let mut in_tag_list = false;

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == "---" {
            continue;
        }
        if in_tag_list {
            if let Some(item) = trimmed.strip_prefix("- ") {
                push_tag(&mut fm.tags, item);
                continue;
            }
            in_tag_list = false;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim().to_ascii_lowercase().as_str() {
            "title" if !value.is_empty() => fm.title = Some(value),
            "created" | "date" if !value.is_empty() => fm.created = Some(value),
            "updated" | "modified" if !value.is_empty() => fm.updated = Some(value),
            "archived" => fm.archived = matches!(value.as_str(), "true" | "yes"),
            "tags" => {
                let inline = value.trim_start_matches('[').trim_end_matches(']');
                if inline.is_empty() {
                    in_tag_list = true;
                }
                for tag in inline.split(',') {
                    push_tag(&mut fm.tags, tag);
                }
            }
            _ => {}
        }
    }
    fm
}

fn push_tag(tags: &mut Vec<String>, raw: &str) {
    let tag = unquote(raw.trim());
    if !tag.is_empty() {
        tags.push(tag);
    }
}

fn unquote(value: &str) -> String {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if quoted {
        value[1..value.len() - 1].replace("\\\"", "\"")
    } else {
        value.to_string()
    }
}

fn take_front_matter<'a>(root: &'a AstNode<'a>) -> Option<FrontMatter> {
    let first = root.first_child()?;
    let raw = match &first.data.borrow().value {
        NodeValue::FrontMatter(raw) => raw.clone(),
        _ => return None,
    };
    first.detach();
    Some(parse_front_matter(&raw))
}

/// Detach the first top-level H1 and return its text.
fn take_title<'a>(root: &'a AstNode<'a>) -> Option<String> {
    let heading = root
        .children()
        .find(|node| matches!(&node.data.borrow().value, NodeValue::Heading(h) if h.level == 1))?;
    let title = collect_text(heading).trim().to_string();
    heading.detach();
    Some(title).filter(|t| !t.is_empty())
}

/// Detach a trailing `Tags: a, b` paragraph and the thematic break before it.
fn take_tag_line<'a>(root: &'a AstNode<'a>) -> Vec<String> {
    let Some(last) = root.last_child() else {
        return Vec::new();
    };
    if !matches!(last.data.borrow().value, NodeValue::Paragraph) {
        return Vec::new();
    }
    let text = collect_text(last);
    let Some(list) = text.trim().strip_prefix(TAGS_PREFIX) else {
        return Vec::new();
    };
    let tags = list
        .split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    last.detach();
    if let Some(previous) = root.last_child() {
        if matches!(previous.data.borrow().value, NodeValue::ThematicBreak) {
            previous.detach();
        }
    }
    tags
}

fn collect_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for descendant in node.descendants() {
        match &descendant.data.borrow().value {
            NodeValue::Text(t) => text.push_str(t),
            NodeValue::Code(code) => text.push_str(&code.literal),
            NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

fn children_to_ir<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    node.children().flat_map(node_to_ir).collect()
}

fn element(name: &str, children: Vec<Node>) -> Vec<Node> {
    vec![Element::new(name).with_children(children).into()]
}

fn node_to_ir<'a>(node: &'a AstNode<'a>) -> Vec<Node> {
    let value = node.data.borrow().value.clone();
    match value {
        NodeValue::FrontMatter(_) => Vec::new(),
        NodeValue::Paragraph => element("p", children_to_ir(node)),
        NodeValue::Heading(heading) => {
            element(&format!("h{}", heading.level.clamp(1, 6)), children_to_ir(node))
        }
        NodeValue::List(list) => {
            let ordered = matches!(list.list_type, ListType::Ordered);
            let mut el = Element::new(if ordered { "ol" } else { "ul" })
                .with_children(children_to_ir(node));
            if ordered && list.start != 1 {
                el.set_attr("start", list.start.to_string());
            }
            vec![el.into()]
        }
        NodeValue::Item(_) => element("li", item_children(node)),
        NodeValue::TaskItem(symbol) => {
            let checked = symbol.is_some_and(|c| c != ' ');
            vec![checklist_item(checked, item_children(node)).into()]
        }
        NodeValue::BlockQuote => element("blockquote", children_to_ir(node)),
        NodeValue::CodeBlock(block) => {
            let mut code = Element::new("code").with_text(block.literal);
            let language = block.info.split_whitespace().next().unwrap_or("");
            if !language.is_empty() {
                code.set_attr("class", format!("language-{language}"));
            }
            element("pre", vec![code.into()])
        }
        NodeValue::HtmlBlock(block) => parse_html_fragment(&block.literal),
        NodeValue::HtmlInline(html) => parse_html_fragment(&html),
        NodeValue::ThematicBreak => element("hr", Vec::new()),
        NodeValue::Table(_) => element("table", children_to_ir(node)),
        NodeValue::TableRow(_) => element("tr", children_to_ir(node)),
        NodeValue::TableCell => {
            let header = node
                .parent()
                .is_some_and(|row| matches!(row.data.borrow().value, NodeValue::TableRow(true)));
            element(if header { "th" } else { "td" }, children_to_ir(node))
        }
        NodeValue::Text(text) => vec![Node::Text(text)],
        NodeValue::SoftBreak => vec![Node::text(" ")],
        NodeValue::LineBreak => element("br", Vec::new()),
        NodeValue::Code(code) => element("code", vec![Node::Text(code.literal)]),
        NodeValue::Emph => element("em", children_to_ir(node)),
        NodeValue::Strong => element("strong", children_to_ir(node)),
        NodeValue::Strikethrough => element("del", children_to_ir(node)),
        NodeValue::Link(link) => {
            let mut a = Element::new("a")
                .with_attr("href", link.url)
                .with_children(children_to_ir(node));
            if !link.title.is_empty() {
                a.set_attr("title", link.title);
            }
            vec![a.into()]
        }
        NodeValue::Image(link) => {
            let img = Element::new("img")
                .with_attr("src", link.url)
                .with_attr("alt", collect_text(node));
            vec![img.into()]
        }
        _ => children_to_ir(node),
    }
}

/// List item content. Paragraphs of tight lists are unwrapped, with a line break between them.
fn item_children<'a>(item: &'a AstNode<'a>) -> Vec<Node> {
    let tight = item
        .parent()
        .is_some_and(|list| matches!(&list.data.borrow().value, NodeValue::List(l) if l.tight));
    if !tight {
        return children_to_ir(item);
    }

    let mut out = Vec::new();
    let mut after_paragraph = false;
    for child in item.children() {
        if matches!(child.data.borrow().value, NodeValue::Paragraph) {
            if after_paragraph {
                out.push(Element::new("br").into());
            }
            out.extend(children_to_ir(child));
            after_paragraph = true;
        } else {
            out.extend(node_to_ir(child));
            after_paragraph = false;
        }
    }
    out
}
