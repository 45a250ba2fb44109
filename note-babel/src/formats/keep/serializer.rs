//! Canonical notes → Keep HTML archive
//!
//! Pipeline per note: canonical IR → Keep-flavoured IR → RcDom → HTML string → document shell.

use crate::common::attachments::{data_uri, is_media_placeholder};
use crate::common::checklist::canonical_to_keep;
use crate::common::dates::DateGrammar;
use crate::common::filenames::{sanitize_file_name, FileNameAllocator};
use crate::common::labels::render_chips;
use crate::error::FormatError;
use crate::format::{ArchiveEntry, WriteContext};
use crate::ir::nodes::remove_elements;
use crate::ir::{Element, Node as IrNode};
use crate::model::{Note, ARCHIVED_TAG};
use html5ever::{
    ns, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute, LocalName,
    QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub fn serialize_keep(notes: &[Note], _ctx: &WriteContext) -> Result<Vec<ArchiveEntry>, FormatError> {
    let mut names = FileNameAllocator::new();
    notes
        .iter()
        .map(|note| -> Result<ArchiveEntry, FormatError> {
            let name = names.allocate(&sanitize_file_name(note.title(), "note"), "html");
            Ok(ArchiveEntry {
                name,
                bytes: serialize_note(note)?.into_bytes(),
            })
        })
        .collect()
}

/// One complete Keep HTML document.
pub fn serialize_note(note: &Note) -> Result<String, FormatError> {
    let wrapper = note_to_ir(note)?;
    let body_html = serialize_handle(&ir_to_handle(&IrNode::Element(wrapper)))?;
    Ok(wrap_in_document(&body_html, note.title()))
}

fn note_to_ir(note: &Note) -> Result<Element, FormatError> {
    let mut content = note.content_nodes()?;
    remove_elements(&mut content, is_media_placeholder);
    let content = canonical_to_keep(content);

    let class = if note.is_archived() {
        "note archived"
    } else {
        "note"
    };
    let mut children: Vec<IrNode> = vec![
        Element::new("div")
            .with_attr("class", "heading")
            .with_text(DateGrammar::Keep.render(&note.created()))
            .into(),
        Element::new("div")
            .with_attr("class", "title")
            .with_text(note.title())
            .into(),
        Element::new("div")
            .with_attr("class", "content")
            .with_children(content)
            .into(),
    ];

    if !note.attachments().is_empty() {
        let items: Vec<IrNode> = note
            .attachments()
            .iter()
            .map(|resource| {
                let img = Element::new("img")
                    .with_attr("alt", "")
                    .with_attr("src", data_uri(resource));
                Element::new("li").with_children(vec![img.into()]).into()
            })
            .collect();
        children.push(
            Element::new("div")
                .with_attr("class", "attachments")
                .with_children(vec![Element::new("ul").with_children(items).into()])
                .into(),
        );
    }

    let labels: Vec<String> = note
        .tags()
        .iter()
        .filter(|tag| tag.as_str() != ARCHIVED_TAG)
        .cloned()
        .collect();
    if !labels.is_empty() {
        children.push(render_chips(&labels).into());
    }

    Ok(Element::new("div")
        .with_attr("class", class)
        .with_children(children))
}

fn ir_to_handle(node: &IrNode) -> Handle {
    match node {
        IrNode::Text(text) => create_text(text),
        IrNode::Element(el) => {
            let attrs = el
                .attrs
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()))
                .collect();
            let handle = create_element(&el.name, attrs);
            for child in &el.children {
                handle.children.borrow_mut().push(ir_to_handle(child));
            }
            handle
        }
    }
}

/// Create an HTML element with attributes
fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Serialize a node and its subtree to HTML
fn serialize_handle(handle: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(handle.clone());
    serialize(&mut output, &serializable, opts).map_err(|e| {
        FormatError::SerializationError(format!("HTML serialization failed: {e}"))
    })?;

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}

fn wrap_in_document(body_html: &str, title: &str) -> String {
    let escaped_title = html_escape(title);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<meta name="generator" content="note-babel">
<title>{escaped_title}</title>
</head>
<body>
{body_html}
</body>
</html>
"#
    )
}

/// Escape HTML special characters in text
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
