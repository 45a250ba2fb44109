//! XML → IR conversion, and parsing of canonical note bodies.

use super::nodes::{Element, Node};
use crate::error::FormatError;

const FRAGMENT_ROOT: &str = "note-fragment";

/// Parse canonical note markup into IR nodes.
///
/// The markup is wrapped in a single root element and parsed as XML, so this doubles as the
/// well-formedness check for note bodies.
pub fn parse_fragment(markup: &str) -> Result<Vec<Node>, FormatError> {
    let wrapped = format!("<{FRAGMENT_ROOT}>{markup}</{FRAGMENT_ROOT}>");
    let doc = roxmltree::Document::parse(&wrapped)
        .map_err(|e| FormatError::InvalidNote(format!("content is not well-formed: {e}")))?;
    Ok(convert_children(doc.root_element()))
}

/// Copy a `roxmltree` element into an IR element. Namespaces are dropped and only local
/// names are kept.
pub fn convert_element(node: roxmltree::Node) -> Element {
    Element {
        name: node.tag_name().name().to_string(),
        attrs: node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        children: convert_children(node),
    }
}

pub fn convert_children(node: roxmltree::Node) -> Vec<Node> {
    node.children()
        .filter_map(|child| {
            if child.is_element() {
                Some(Node::Element(convert_element(child)))
            } else if child.is_text() {
                child.text().map(|t| Node::Text(t.to_string()))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fragment_mixed_content() {
        let nodes = parse_fragment("Milk<br/><b>Eggs &amp; ham</b>").unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], Node::text("Milk"));
        assert!(nodes[1].is_element("br"));
        assert_eq!(nodes[2].text_content(), "Eggs & ham");
    }

    #[test]
    fn test_parse_fragment_empty() {
        assert!(parse_fragment("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_fragment_rejects_unbalanced() {
        let err = parse_fragment("<div>open").unwrap_err();
        assert!(matches!(err, FormatError::InvalidNote(_)));
    }

    #[test]
    fn test_parse_fragment_rejects_html_void_syntax() {
        assert!(parse_fragment("Milk<br>").is_err());
    }
}
