//! Core data structures for the Intermediate Representation (IR).

/// A node of a note body.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Elements serialized as `<name/>` rather than `<name></name>`.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr", "media", "en-media", "en-todo",
];

/// Elements that start a new block when they appear inside flowing text.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "div",
    "dl",
    "dt",
    "figure",
    "footer",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn text_content(&self) -> String {
        match self {
            Node::Text(text) => text.clone(),
            Node::Element(el) => el.text_content(),
        }
    }

    /// True for text nodes holding only whitespace.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }

    pub fn is_element(&self, name: &str) -> bool {
        matches!(self, Node::Element(el) if el.name == name)
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    pub fn is_block(&self) -> bool {
        BLOCK_ELEMENTS.contains(&self.name.as_str())
    }

    pub fn text_content(&self) -> String {
        text_content(&self.children)
    }

    /// Child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First element in document order (self included) matching `pred`.
    pub fn find_first<P>(&self, pred: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool + Copy,
    {
        if pred(self) {
            return Some(self);
        }
        self.child_elements().find_map(|child| child.find_first(pred))
    }

    /// All elements in document order (self included) matching `pred`.
    pub fn find_all<P>(&self, pred: P) -> Vec<&Element>
    where
        P: Fn(&Element) -> bool + Copy,
    {
        let mut found = Vec::new();
        self.collect_matching(pred, &mut found);
        found
    }

    fn collect_matching<'a, P>(&'a self, pred: P, found: &mut Vec<&'a Element>)
    where
        P: Fn(&Element) -> bool + Copy,
    {
        if pred(self) {
            found.push(self);
        }
        for child in self.child_elements() {
            child.collect_matching(pred, found);
        }
    }
}

/// Concatenated text of a node list.
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => out.push_str(&el.text_content()),
        }
    }
    out
}

/// Remove every element matching `pred`, at any depth. Returns the number removed.
pub fn remove_elements<P>(nodes: &mut Vec<Node>, pred: P) -> usize
where
    P: Fn(&Element) -> bool + Copy,
{
    let before = nodes.len();
    nodes.retain(|node| !matches!(node, Node::Element(el) if pred(el)));
    let mut removed = before - nodes.len();
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            removed += remove_elements(&mut el.children, pred);
        }
    }
    removed
}

/// Visit every element mutably, parents before children.
pub fn walk_elements_mut<F>(nodes: &mut [Node], f: &mut F)
where
    F: FnMut(&mut Element),
{
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            f(el);
            walk_elements_mut(&mut el.children, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("div").with_attr("class", "note archived").with_children(vec![
            Element::new("div")
                .with_attr("class", "title")
                .with_text("Groceries")
                .into(),
            Element::new("div")
                .with_attr("class", "content")
                .with_children(vec![Node::text("Milk"), Element::new("br").into()])
                .into(),
        ])
    }

    #[test]
    fn test_has_class_matches_tokens() {
        let el = sample();
        assert!(el.has_class("note"));
        assert!(el.has_class("archived"));
        assert!(!el.has_class("arch"));
    }

    #[test]
    fn test_find_first_and_text() {
        let el = sample();
        let title = el.find_first(|e| e.has_class("title")).unwrap();
        assert_eq!(title.text_content(), "Groceries");
        assert_eq!(el.text_content(), "GroceriesMilk");
    }

    #[test]
    fn test_remove_elements_nested() {
        let mut nodes = vec![Node::Element(sample())];
        let removed = remove_elements(&mut nodes, |e| e.name == "br");
        assert_eq!(removed, 1);
        assert_eq!(text_content(&nodes), "GroceriesMilk");
        let root = nodes[0].as_element().unwrap();
        assert!(root.find_first(|e| e.name == "br").is_none());
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut el = Element::new("li").with_attr("data-checked", "false");
        el.set_attr("data-checked", "true");
        assert_eq!(el.attrs.len(), 1);
        assert_eq!(el.attr("data-checked"), Some("true"));
    }
}
