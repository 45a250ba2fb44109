//! ENEX → canonical notes

use crate::common::attachments::{decode_base64, media_placeholder};
use crate::common::checklist::enml_todos_to_canonical;
use crate::common::cleanup::repair_markup;
use crate::common::dates::DateGrammar;
use crate::diagnostics::Diagnostics;
use crate::error::FormatError;
use crate::format::{RawDocument, ReadContext};
use crate::ir::from_html::parse_html_fragment;
use crate::ir::from_xml::convert_children;
use crate::ir::Node;
use crate::model::{Note, Resource};
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::ParsingOptions;

static EN_NOTE_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<en-note[^>]*>(.*)</en-note>").expect("valid regex"));

fn xml_options() -> ParsingOptions {
    ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    }
}

/// Parse every `<note>` of an export. A note that fails is reported and skipped.
pub fn parse_enex(
    doc: &RawDocument,
    ctx: &ReadContext,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Note>, FormatError> {
    let xml = roxmltree::Document::parse_with_options(&doc.text, xml_options())
        .map_err(|e| FormatError::ParseError(format!("XML parsing error: {e}")))?;

    let root = xml.root_element();
    if root.tag_name().name() != "en-export" {
        return Err(FormatError::ParseError(format!(
            "Root element is <{}>, expected <en-export>",
            root.tag_name().name()
        )));
    }

    let mut notes = Vec::new();
    for (index, node) in children_named(root, "note").enumerate() {
        let label = format!("{}#note{}", doc.name, index + 1);
        match parse_note(node, ctx, &label, diagnostics) {
            Ok(note) => notes.push(note),
            Err(err) => diagnostics.warn(&label, err.to_string()),
        }
    }
    Ok(notes)
}

fn parse_note(
    node: roxmltree::Node,
    ctx: &ReadContext,
    label: &str,
    diagnostics: &mut Diagnostics,
) -> Result<Note, FormatError> {
    let dates = ctx.normalizer(DateGrammar::Enex);
    let created = match child_text(node, "created") {
        Some(raw) => dates.normalize(&raw),
        None => ctx.clock.now(),
    };
    let updated = child_text(node, "updated").and_then(|raw| dates.try_normalize(&raw));

    let tags = children_named(node, "tag")
        .map(|tag| text_of(tag).trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    let processor = ctx.attachments();
    let mut resources = Vec::new();
    for (index, resource) in children_named(node, "resource").enumerate() {
        let mime = child_text(resource, "mime")
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = child_text(resource, "data").unwrap_or_default();
        match decode_base64(&data) {
            Ok(bytes) if !bytes.is_empty() => {
                resources.push(processor.resource(&mime, bytes, resources.len() + 1))
            }
            Ok(_) => diagnostics.warn(label, format!("resource {} is empty, dropped", index + 1)),
            Err(err) => diagnostics.warn(
                label,
                format!("resource {} could not be decoded, dropped: {err}", index + 1),
            ),
        }
    }

    let enml = child_text(node, "content").unwrap_or_default();
    let body = enml_todos_to_canonical(parse_enml(&enml));
    let mut matcher = MediaMatcher::new(&resources);
    let body = matcher.rewrite(body);

    let extraction = processor.extract_after(body, resources.len());
    extraction.report(label, diagnostics);
    resources.extend(extraction.resources);

    let mut builder = ctx
        .note_builder(created)
        .content_nodes(extraction.nodes)
        .updated(updated)
        .tags(tags)
        .attachments(resources);
    if let Some(title) = child_text(node, "title") {
        builder = builder.title(title);
    }
    builder.build()
}

/// Body nodes of an ENML document.
///
/// Tries a strict XML parse, then a parse after repairing HTML-isms (named entities, unclosed
/// void tags), then falls back to the lenient HTML parser on the `<en-note>` body.
pub fn parse_enml(enml: &str) -> Vec<Node> {
    if enml.trim().is_empty() {
        return Vec::new();
    }
    if let Some(nodes) = parse_enml_strict(enml) {
        return nodes;
    }
    let repaired = repair_markup(enml);
    if let Some(nodes) = parse_enml_strict(&repaired) {
        log::debug!("ENML accepted after repair");
        return nodes;
    }
    log::debug!("ENML is not well-formed, using lenient HTML parsing");
    let body = EN_NOTE_BODY
        .captures(enml)
        .and_then(|caps| caps.get(1))
        .map_or(enml, |m| m.as_str());
    unwrap_en_note(parse_html_fragment(body))
}

fn parse_enml_strict(enml: &str) -> Option<Vec<Node>> {
    let xml = roxmltree::Document::parse_with_options(enml.trim(), xml_options()).ok()?;
    let root = xml.root_element();
    if root.tag_name().name() == "en-note" {
        Some(convert_children(root))
    } else {
        root.descendants()
            .find(|n| n.tag_name().name() == "en-note")
            .map(convert_children)
    }
}

fn unwrap_en_note(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(el) if el.name == "en-note" => out.extend(el.children),
            other => out.push(other),
        }
    }
    out
}

/// Pairs `en-media` references with resources.
struct MediaMatcher<'a> {
    resources: &'a [Resource],
    used: Vec<bool>,
}

impl<'a> MediaMatcher<'a> {
    fn new(resources: &'a [Resource]) -> Self {
        Self {
            resources,
            used: vec![false; resources.len()],
        }
    }

    fn find(&mut self, hash: Option<&str>, mime: Option<&str>) -> Option<&'a Resource> {
        let resources = self.resources;
        let index = resources
            .iter()
            .position(|r| Some(r.content_hash()) == hash)
            .or_else(|| {
                (0..resources.len())
                    .find(|&i| !self.used[i] && Some(resources[i].mime_type()) == mime)
            })
            .or_else(|| self.used.iter().position(|used| !used))?;
        self.used[index] = true;
        Some(&resources[index])
    }

    fn rewrite(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Element(el) if el.name == "en-media" => {
                    match self.find(el.attr("hash"), el.attr("type")) {
                        Some(resource) => out.push(
                            media_placeholder(resource.mime_type(), resource.content_hash())
                                .into(),
                        ),
                        None => log::debug!("en-media without a matching resource dropped"),
                    }
                }
                Node::Element(mut el) => {
                    el.children = self.rewrite(el.children);
                    out.push(el.into());
                }
                text => out.push(text),
            }
        }
        out
    }
}

fn children_named<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && child.tag_name().name() == name)
}

fn child_text(node: roxmltree::Node, name: &'static str) -> Option<String> {
    children_named(node, name).next().map(text_of)
}

/// All text of a node, CDATA included.
fn text_of(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}
