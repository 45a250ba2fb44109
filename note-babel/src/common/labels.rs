//! Label chips.
//!
//! Keep renders each label as `<span class="chip label"><span class="label-name">home</span></span>`
//! inside a `.chips` container. Chips are the primary tag source; a bare `.label-name` scan is
//! only consulted when no chip is present.

use crate::ir::nodes::remove_elements;
use crate::ir::{Element, Node};

fn is_label_chip(el: &Element) -> bool {
    el.has_class("chip") && el.has_class("label")
}

fn is_label_name(el: &Element) -> bool {
    el.has_class("label-name")
}

/// Tags from label chips anywhere under `root`, in document order.
pub fn extract_chip_labels(root: &Element) -> Vec<String> {
    root.find_all(is_label_chip)
        .into_iter()
        .filter_map(|chip| chip.find_first(is_label_name))
        .map(|name| name.text_content().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Tags from any `.label-name` element, chip or not.
pub fn scan_label_names(root: &Element) -> Vec<String> {
    root.find_all(is_label_name)
        .into_iter()
        .map(|name| name.text_content().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Tags for a note: chips when there are any, the `.label-name` scan otherwise.
pub fn collect_labels(root: &Element) -> Vec<String> {
    let chips = extract_chip_labels(root);
    if chips.is_empty() {
        scan_label_names(root)
    } else {
        chips
    }
}

/// Remove chip markup (the `.chips` containers and any stray chips) from a body.
pub fn strip_chips(mut nodes: Vec<Node>) -> Vec<Node> {
    remove_elements(&mut nodes, |el| el.has_class("chips") || el.has_class("chip"));
    nodes
}

/// Render tags as Keep label chips.
pub fn render_chips(tags: &[String]) -> Element {
    let chips: Vec<Node> = tags
        .iter()
        .map(|tag| {
            Element::new("span")
                .with_attr("class", "chip label")
                .with_children(vec![Element::new("span")
                    .with_attr("class", "label-name")
                    .with_text(tag.clone())
                    .into()])
                .into()
        })
        .collect();
    Element::new("div").with_attr("class", "chips").with_children(chips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::from_html::parse_html_document;

    #[test]
    fn test_chip_labels_in_order() {
        let html = parse_html_document(
            "<div class=\"chips\">\
               <span class=\"chip label\"><span class=\"label-name\">home</span></span>\
               <span class=\"chip label\"><span class=\"label-name\"> Fish &amp; Chips </span></span>\
             </div>",
        );
        assert_eq!(extract_chip_labels(&html), vec!["home", "Fish & Chips"]);
    }

    #[test]
    fn test_chips_supersede_plain_scan() {
        let html = parse_html_document(
            "<span class=\"label-name\">loose</span>\
             <span class=\"chip label\"><span class=\"label-name\">chip</span></span>",
        );
        assert_eq!(collect_labels(&html), vec!["chip"]);
    }

    #[test]
    fn test_plain_scan_without_chips() {
        let html = parse_html_document("<p><span class=\"label-name\">work</span></p>");
        assert_eq!(collect_labels(&html), vec!["work"]);
    }

    #[test]
    fn test_strip_chips_removes_container() {
        let nodes = vec![
            Node::text("Milk"),
            render_chips(&["home".to_string()]).into(),
        ];
        assert_eq!(strip_chips(nodes), vec![Node::text("Milk")]);
    }

    #[test]
    fn test_rendered_chips_read_back() {
        let chips = render_chips(&["a".to_string(), "b".to_string()]);
        assert_eq!(extract_chip_labels(&chips), vec!["a", "b"]);
    }
}
