//! Residual markup cleanup for ENML output and lenient ENML input.
//!
//! The repair pass only knows the common HTML entities in `HTML_ENTITIES`. ENML using any
//! other named entity stays malformed XML after repair, so the ENEX reader hands it to the
//! html5ever parser, which decodes the full HTML entity set.

use crate::ir::{Element, Node};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Elements dropped together with their content.
const DROPPED_ELEMENTS: &[&str] = &[
    "script", "style", "head", "noscript", "object", "applet", "iframe", "frame", "frameset",
    "noframes", "embed", "param", "select", "textarea", "meta", "link", "base", "xml",
];

/// Elements replaced by their children.
const UNWRAPPED_ELEMENTS: &[&str] = &[
    "html", "body", "form", "fieldset", "legend", "label", "button", "input", "option",
    "optgroup", "menu", "dir", "marquee", "blink", "basefont", "bgsound", "layer", "ilayer",
    "isindex", "plaintext", "media",
];

const STRIPPED_ATTRS: &[&str] = &["class", "style", "id"];

static VOID_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(br|hr|img|input|meta|link|col|area|wbr)(\s[^<>]*?)?\s*/?>")
        .expect("valid regex")
});
static NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("valid regex"));

/// HTML named entities that XML does not predefine, with their code points.
const HTML_ENTITIES: &[(&str, u32)] = &[
    ("nbsp", 160),
    ("iexcl", 161),
    ("cent", 162),
    ("pound", 163),
    ("yen", 165),
    ("sect", 167),
    ("copy", 169),
    ("laquo", 171),
    ("shy", 173),
    ("reg", 174),
    ("deg", 176),
    ("plusmn", 177),
    ("para", 182),
    ("middot", 183),
    ("raquo", 187),
    ("frac14", 188),
    ("frac12", 189),
    ("frac34", 190),
    ("iquest", 191),
    ("times", 215),
    ("divide", 247),
    ("ndash", 8211),
    ("mdash", 8212),
    ("lsquo", 8216),
    ("rsquo", 8217),
    ("ldquo", 8220),
    ("rdquo", 8221),
    ("bull", 8226),
    ("hellip", 8230),
    ("euro", 8364),
    ("trade", 8482),
    ("larr", 8592),
    ("uarr", 8593),
    ("rarr", 8594),
    ("darr", 8595),
];

/// Strip presentation attributes and elements ENML does not allow.
pub fn sanitize_for_enml(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Element(el) if DROPPED_ELEMENTS.contains(&el.name.as_str()) => {}
            Node::Element(el) if UNWRAPPED_ELEMENTS.contains(&el.name.as_str()) => {
                out.extend(sanitize_for_enml(el.children));
            }
            Node::Element(mut el) => {
                strip_attributes(&mut el);
                el.children = sanitize_for_enml(el.children);
                out.push(el.into());
            }
            text => out.push(text),
        }
    }
    out
}

fn strip_attributes(el: &mut Element) {
    el.attrs.retain(|(name, _)| {
        let name = name.to_ascii_lowercase();
        !(STRIPPED_ATTRS.contains(&name.as_str())
            || name.starts_with("data-")
            || name.starts_with("on"))
    });
}

/// Self-close HTML void tags (`<br>` → `<br/>`).
pub fn close_void_tags(markup: &str) -> String {
    VOID_TAG
        .replace_all(markup, |caps: &Captures| {
            let attrs = caps.get(2).map_or("", |m| m.as_str().trim_end());
            format!("<{}{}/>", &caps[1], attrs)
        })
        .into_owned()
}

/// Replace HTML-only named entities with numeric references so XML parsers accept them.
pub fn html_entities_to_numeric(markup: &str) -> String {
    NAMED_ENTITY
        .replace_all(markup, |caps: &Captures| {
            let name = &caps[1];
            match HTML_ENTITIES.iter().find(|(entity, _)| *entity == name) {
                Some((_, code)) => format!("&#{code};"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Make sloppy HTML-flavoured ENML acceptable to a strict XML parser.
pub fn repair_markup(markup: &str) -> String {
    close_void_tags(&html_entities_to_numeric(markup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::from_xml::parse_fragment;
    use crate::ir::to_xml;

    #[test]
    fn test_sanitize_strips_attributes_and_scripts() {
        let nodes = parse_fragment(
            "<div class=\"content\" id=\"x\" style=\"color:red\" data-checked=\"true\" onclick=\"x()\" title=\"t\">\
             Hi<script>alert(1)</script><form><b>kept</b></form></div>",
        )
        .unwrap();
        assert_eq!(
            to_xml(&sanitize_for_enml(nodes)),
            "<div title=\"t\">Hi<b>kept</b></div>"
        );
    }

    #[test]
    fn test_close_void_tags() {
        assert_eq!(
            close_void_tags("a<br>b<BR/><img src=\"x/y.png\" alt=\"\" >c<hr />"),
            "a<br/>b<BR/><img src=\"x/y.png\" alt=\"\"/>c<hr/>"
        );
    }

    #[test]
    fn test_entities_to_numeric() {
        assert_eq!(
            html_entities_to_numeric("a&nbsp;b &amp; c&mdash;&unknown;"),
            "a&#160;b &amp; c&#8212;&unknown;"
        );
    }

    #[test]
    fn test_repaired_markup_parses() {
        let repaired = repair_markup("Milk&nbsp;<br>Eggs");
        let nodes = parse_fragment(&repaired).unwrap();
        assert_eq!(nodes[0], Node::text("Milk\u{a0}"));
        assert!(nodes[1].is_element("br"));
    }
}
