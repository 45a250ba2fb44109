//! HTML → IR conversion.
//!
//! HTML is parsed with `html5ever` into a `markup5ever_rcdom` tree, which is then copied into
//! owned IR nodes. The parser is browser-grade, so this path never fails: malformed markup is
//! repaired the way a browser would repair it.

use super::nodes::{Element, Node};
use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse a full HTML document and return its `<html>` element.
pub fn parse_html_document(source: &str) -> Element {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);
    let html = dom
        .document
        .children
        .borrow()
        .iter()
        .filter_map(convert_handle)
        .find_map(|node| match node {
            Node::Element(el) if el.name == "html" => Some(el),
            _ => None,
        });
    html.unwrap_or_else(|| Element::new("html"))
}

/// Parse an HTML snippet and return the nodes the parser placed in `<body>`.
pub fn parse_html_fragment(source: &str) -> Vec<Node> {
    let html = parse_html_document(source);
    html.children
        .into_iter()
        .find_map(|node| match node {
            Node::Element(el) if el.name == "body" => Some(el.children),
            _ => None,
        })
        .unwrap_or_default()
}

/// Copy an rcdom subtree into IR nodes. Comments, doctypes and processing
/// instructions are dropped.
pub fn convert_handle(handle: &Handle) -> Option<Node> {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let children = handle
                .children
                .borrow()
                .iter()
                .filter_map(convert_handle)
                .collect();
            Some(Node::Element(Element {
                name: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        _ => None,
    }
}
