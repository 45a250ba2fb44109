//! Checklist rewriting between dialects.
//!
//! The canonical checklist item is `<li data-checked="true|false">…</li>`, grouped in a `<ul>`.
//! Readers rewrite their dialect into that shape; writers rewrite it back out.

use crate::ir::{Element, Node};

pub const CHECKED_GLYPH: char = '\u{2611}';
pub const UNCHECKED_GLYPH: char = '\u{2610}';

const CHECKED_ATTR: &str = "data-checked";

/// Build a canonical checklist item.
pub fn checklist_item(checked: bool, children: Vec<Node>) -> Element {
    Element::new("li")
        .with_attr(CHECKED_ATTR, if checked { "true" } else { "false" })
        .with_children(children)
}

/// `Some(checked)` when `el` is a canonical checklist item.
pub fn is_checklist_item(el: &Element) -> Option<bool> {
    if el.name != "li" {
        return None;
    }
    el.attr(CHECKED_ATTR).map(|value| value == "true")
}

fn is_list(el: &Element) -> bool {
    el.name == "ul" || el.name == "ol"
}

/// A list holding nothing but canonical checklist items.
fn is_checklist(el: &Element) -> bool {
    let mut items = el.child_elements().peekable();
    is_list(el)
        && items.peek().is_some()
        && items.all(|child| is_checklist_item(child).is_some())
        && el.children.iter().all(|n| n.is_element("li") || n.is_blank_text())
}

/// Collects consecutive checklist items and flushes them as one `<ul>`.
#[derive(Default)]
struct ListGroup {
    items: Vec<Node>,
}

impl ListGroup {
    fn push(&mut self, item: Node) {
        self.items.push(item);
    }

    fn flush_into(&mut self, out: &mut Vec<Node>) {
        if !self.items.is_empty() {
            let items = std::mem::take(&mut self.items);
            out.push(Element::new("ul").with_children(items).into());
        }
    }
}

// ---------------------------------------------------------------------------
// Keep → canonical
// ---------------------------------------------------------------------------

/// Rewrite Keep `li.listitem` markup into canonical checklist items.
///
/// An item is checked when it carries the `checked` class or the ☑ glyph. Items without a
/// `.text` span are kept as plain text followed by `<br/>`. A list left with no items after
/// flattening is removed rather than emitted empty.
pub fn rewrite_keep_checklists(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(el) if is_list(&el) && el.child_elements().any(is_keep_item) => {
                regroup_keep_list(el.children, &mut out);
            }
            Node::Element(mut el) => {
                el.children = rewrite_keep_checklists(el.children);
                out.push(el.into());
            }
            other => out.push(other),
        }
    }
    out
}

fn is_keep_item(el: &Element) -> bool {
    el.name == "li" && el.has_class("listitem")
}

fn regroup_keep_list(children: Vec<Node>, out: &mut Vec<Node>) {
    let mut group = ListGroup::default();
    for child in children {
        match child {
            Node::Element(li) if is_keep_item(&li) => {
                let checked = li.has_class("checked") || li.text_content().contains(CHECKED_GLYPH);
                match li.find_first(|e| e.has_class("text")) {
                    Some(text) => {
                        let content = rewrite_keep_checklists(text.children.clone());
                        group.push(checklist_item(checked, content).into());
                    }
                    None => {
                        group.flush_into(out);
                        let text = li
                            .text_content()
                            .replace([CHECKED_GLYPH, UNCHECKED_GLYPH], "")
                            .trim()
                            .to_string();
                        if !text.is_empty() {
                            out.push(Node::Text(text));
                        }
                        out.push(Element::new("br").into());
                    }
                }
            }
            node if node.is_blank_text() => {}
            Node::Element(mut other) => {
                other.children = rewrite_keep_checklists(other.children);
                group.push(other.into());
            }
            text => group.push(text),
        }
    }
    group.flush_into(out);
}

// ---------------------------------------------------------------------------
// ENML → canonical
// ---------------------------------------------------------------------------

/// Rewrite ENML `<en-todo/>` markers into canonical checklist items.
///
/// An item runs from its `en-todo` to the next `<br/>`, `en-todo`, or block element. Lenient
/// HTML parsing nests the following content inside `en-todo`; that content is hoisted back
/// out before grouping. Wrapper `div`s holding a single checklist are unwrapped so that
/// consecutive items end up in one list.
pub fn enml_todos_to_canonical(nodes: Vec<Node>) -> Vec<Node> {
    let hoisted = hoist_todo_children(nodes);
    let mut out = Vec::with_capacity(hoisted.len());
    let mut group = ListGroup::default();
    let mut iter = hoisted.into_iter().peekable();

    while let Some(node) = iter.next() {
        match node {
            Node::Element(el) if el.name == "en-todo" => {
                let checked = el.attr("checked") == Some("true");
                let mut content = Vec::new();
                while let Some(next) = iter.peek() {
                    match next {
                        Node::Element(e) if e.name == "en-todo" || e.is_block() => break,
                        Node::Element(e) if e.name == "br" => {
                            iter.next();
                            break;
                        }
                        _ => {
                            if let Some(n) = iter.next() {
                                content.push(n);
                            }
                        }
                    }
                }
                trim_edges(&mut content);
                group.push(checklist_item(checked, content).into());
            }
            node if node.is_blank_text() && !group.items.is_empty() => {}
            Node::Element(mut el) => {
                el.children = enml_todos_to_canonical(el.children);
                match unwrap_checklist(el) {
                    Ok(items) => items.into_iter().for_each(|item| group.push(item)),
                    Err(el) => {
                        group.flush_into(&mut out);
                        out.push(el.into());
                    }
                }
            }
            other => {
                group.flush_into(&mut out);
                out.push(other);
            }
        }
    }
    group.flush_into(&mut out);
    out
}

fn hoist_todo_children(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(mut el) if el.name == "en-todo" && !el.children.is_empty() => {
                let children = std::mem::take(&mut el.children);
                out.push(el.into());
                out.extend(hoist_todo_children(children));
            }
            other => out.push(other),
        }
    }
    out
}

/// The checklist items of `el` when it is a checklist, or a `div` holding only one.
fn unwrap_checklist(el: Element) -> Result<Vec<Node>, Element> {
    if is_checklist(&el) {
        return Ok(el.children.into_iter().filter(|n| !n.is_blank_text()).collect());
    }
    let mut non_blank = el.children.iter().filter(|n| !n.is_blank_text());
    let single = match (non_blank.next(), non_blank.next()) {
        (Some(Node::Element(inner)), None) => el.name == "div" && is_checklist(inner),
        _ => false,
    };
    if !single {
        return Err(el);
    }
    let inner = el.children.into_iter().find_map(|n| match n {
        Node::Element(inner) => Some(inner),
        _ => None,
    });
    match inner {
        Some(inner) => unwrap_checklist(inner),
        None => Ok(Vec::new()),
    }
}

fn trim_edges(content: &mut Vec<Node>) {
    if let Some(Node::Text(first)) = content.first_mut() {
        *first = first.trim_start().to_string();
    }
    if let Some(Node::Text(last)) = content.last_mut() {
        *last = last.trim_end().to_string();
    }
    content.retain(|n| !matches!(n, Node::Text(t) if t.is_empty()));
}

// ---------------------------------------------------------------------------
// canonical → ENML
// ---------------------------------------------------------------------------

/// Rewrite canonical checklist items as `<en-todo checked="…"/>text<br/>`.
///
/// A list made only of checklist items is unwrapped entirely. Items inside a mixed list keep
/// their `li` and get the marker prepended.
pub fn canonical_to_enml(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(el) if is_checklist(&el) => {
                for item in el.children {
                    if let Node::Element(li) = item {
                        let checked = is_checklist_item(&li).unwrap_or(false);
                        out.push(en_todo(checked).into());
                        out.extend(canonical_to_enml(li.children));
                        out.push(Element::new("br").into());
                    }
                }
            }
            Node::Element(mut el) => {
                if let Some(checked) = is_checklist_item(&el) {
                    el.attrs.retain(|(name, _)| name != CHECKED_ATTR);
                    let mut children = vec![en_todo(checked).into()];
                    children.extend(canonical_to_enml(el.children));
                    el.children = children;
                } else {
                    el.children = canonical_to_enml(el.children);
                }
                out.push(el.into());
            }
            other => out.push(other),
        }
    }
    out
}

fn en_todo(checked: bool) -> Element {
    Element::new("en-todo").with_attr("checked", if checked { "true" } else { "false" })
}

// ---------------------------------------------------------------------------
// canonical → Keep
// ---------------------------------------------------------------------------

/// Rewrite canonical checklist items into Keep's `li.listitem` markup.
pub fn canonical_to_keep(nodes: Vec<Node>) -> Vec<Node> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(mut el) => {
                let list_class = is_checklist(&el);
                el.children = canonical_to_keep(el.children);
                if list_class {
                    el.set_attr("class", "list");
                }
                match is_checklist_item(&el) {
                    Some(checked) => keep_item(checked, el.children).into(),
                    None => el.into(),
                }
            }
            other => other,
        })
        .collect()
}

fn keep_item(checked: bool, children: Vec<Node>) -> Element {
    let (class, glyph) = if checked {
        ("listitem checked", CHECKED_GLYPH)
    } else {
        ("listitem", UNCHECKED_GLYPH)
    };
    Element::new("li").with_attr("class", class).with_children(vec![
        Element::new("span")
            .with_attr("class", "bullet")
            .with_text(glyph.to_string())
            .into(),
        Element::new("span")
            .with_attr("class", "text")
            .with_children(children)
            .into(),
    ])
}
