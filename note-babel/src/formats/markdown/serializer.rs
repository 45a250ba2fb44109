//! Canonical notes → Markdown archive
//!
//! The body IR is rebuilt as a comrak AST and rendered with `format_commonmark`; the title line,
//! optional front matter and tag line are added around it.

use super::default_comrak_options;
use crate::common::attachments::{extension_for_mime, is_media_placeholder};
use crate::common::checklist::is_checklist_item;
use crate::common::dates::DateGrammar;
use crate::common::filenames::{sanitize_file_name, FileNameAllocator};
use crate::error::FormatError;
use crate::format::{ArchiveEntry, WriteContext};
use crate::ir::{to_xml, Element, Node as IrNode};
use crate::model::{Note, Resource};
use comrak::nodes::{
    Ast, AstNode, ListDelimType, ListType, NodeCode, NodeCodeBlock, NodeHeading, NodeHtmlBlock,
    NodeLink, NodeList, NodeValue,
};
use comrak::{format_commonmark, Arena};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Hex digits of the content hash used in asset file names.
const ASSET_HASH_PREFIX: usize = 16;

/// Asset path and display name per content hash.
type AssetLinks = HashMap<String, (String, String)>;

pub fn serialize_markdown(
    notes: &[Note],
    ctx: &WriteContext,
) -> Result<Vec<ArchiveEntry>, FormatError> {
    let mut names = FileNameAllocator::new();
    let mut documents = Vec::with_capacity(notes.len());
    let mut assets = Vec::new();
    let mut written = HashSet::new();

    for note in notes {
        let mut links = AssetLinks::new();
        for resource in note.attachments() {
            let path = asset_path(&ctx.options.markdown.assets_dir, resource);
            if written.insert(path.clone()) {
                assets.push(ArchiveEntry {
                    name: path.clone(),
                    bytes: resource.data().to_vec(),
                });
            }
            links.insert(
                resource.content_hash().to_string(),
                (path, resource.file_name().to_string()),
            );
        }

        let name = names.allocate(&sanitize_file_name(note.title(), "note"), "md");
        documents.push(ArchiveEntry {
            name,
            bytes: serialize_note(note, ctx, &links)?.into_bytes(),
        });
    }

    documents.extend(assets);
    Ok(documents)
}

/// `assets/<hash prefix>.<ext>`; identical payloads share one path.
pub fn asset_path(assets_dir: &str, resource: &Resource) -> String {
    let hash = resource.content_hash();
    let stem = &hash[..hash.len().min(ASSET_HASH_PREFIX)];
    let file = format!("{stem}.{}", extension_for_mime(resource.mime_type()));
    match assets_dir.trim_matches('/') {
        "" => file,
        dir => format!("{dir}/{file}"),
    }
}

fn serialize_note(
    note: &Note,
    ctx: &WriteContext,
    links: &AssetLinks,
) -> Result<String, FormatError> {
    let body = render_body(&note.content_nodes()?, links)?;

    // The Tags line is comma separated, so such tags go to a front matter list instead
    let tags_in_front_matter = note.tags().iter().any(|t| t.contains(','));

    let mut markdown = String::new();
    if ctx.options.markdown.front_matter || tags_in_front_matter {
        markdown.push_str("---\n");
        if ctx.options.markdown.front_matter {
            markdown.push_str(&format!(
                "created: {}\n",
                DateGrammar::Iso8601.render(&note.created())
            ));
            markdown.push_str(&format!(
                "updated: {}\n",
                DateGrammar::Iso8601.render(&note.updated())
            ));
        }
        if tags_in_front_matter {
            markdown.push_str("tags:\n");
            for tag in note.tags() {
                markdown.push_str(&format!("  - \"{}\"\n", tag.replace('"', "\\\"")));
            }
        }
        markdown.push_str("---\n\n");
    }

    markdown.push_str(&format!("# {}\n", note.title().replace('\n', " ")));
    let body = body.trim_start_matches('\n').trim_end();
    if !body.is_empty() {
        markdown.push('\n');
        markdown.push_str(body);
        markdown.push('\n');
    }
    if !note.tags().is_empty() && !tags_in_front_matter {
        markdown.push_str(&format!("\n---\nTags: {}\n", note.tags().join(", ")));
    }
    Ok(markdown)
}

fn render_body(nodes: &[IrNode], links: &AssetLinks) -> Result<String, FormatError> {
    let arena = Arena::new();
    let builder = AstBuilder {
        arena: &arena,
        links,
    };
    let root = builder.alloc(NodeValue::Document);
    builder.append_blocks(root, nodes);

    let mut output = Vec::new();
    let options = default_comrak_options();
    format_commonmark(root, &options, &mut output).map_err(|e| {
        FormatError::SerializationError(format!("Comrak serialization failed: {e}"))
    })?;
    let markdown = String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))?;

    // Comrak separates consecutive lists with a marker comment
    Ok(markdown.replace("<!-- end list -->\n\n", ""))
}

struct AstBuilder<'a, 'l> {
    arena: &'a Arena<AstNode<'a>>,
    links: &'l AssetLinks,
}

impl<'a, 'l> AstBuilder<'a, 'l> {
    fn alloc(&self, value: NodeValue) -> &'a AstNode<'a> {
        self.arena
            .alloc(AstNode::new(RefCell::new(Ast::new(value, (0, 0).into()))))
    }

    fn append(&self, parent: &'a AstNode<'a>, value: NodeValue) -> &'a AstNode<'a> {
        let node = self.alloc(value);
        parent.append(node);
        node
    }

    /// Append a run of nodes to a block container. Inline runs are gathered into paragraphs.
    fn append_blocks(&self, parent: &'a AstNode<'a>, nodes: &[IrNode]) {
        let mut paragraph: Option<&'a AstNode<'a>> = None;
        for node in nodes {
            match node {
                IrNode::Element(el) if el.is_block() => {
                    close_paragraph(paragraph.take());
                    self.append_block(parent, el);
                }
                IrNode::Text(text) if paragraph.is_none() && text.trim().is_empty() => {}
                inline => {
                    let target =
                        *paragraph.get_or_insert_with(|| self.append(parent, NodeValue::Paragraph));
                    self.append_inline(target, inline);
                }
            }
        }
        close_paragraph(paragraph);
    }

    fn append_block(&self, parent: &'a AstNode<'a>, el: &Element) {
        match el.name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = el.name[1..].parse().unwrap_or(1);
                let heading = self.append(
                    parent,
                    NodeValue::Heading(NodeHeading {
                        level,
                        setext: false,
                    }),
                );
                self.append_inlines(heading, &el.children);
            }
            "ul" | "ol" => self.append_list(parent, el),
            "li" => {
                let list = self.append(parent, NodeValue::List(list_data(ListType::Bullet, 1)));
                self.append_item(list, el, ListType::Bullet);
            }
            "blockquote" => {
                let quote = self.append(parent, NodeValue::BlockQuote);
                self.append_blocks(quote, &el.children);
            }
            "pre" => {
                let mut literal = el.text_content();
                if !literal.ends_with('\n') {
                    literal.push('\n');
                }
                let info = el
                    .find_first(|e| e.name == "code")
                    .and_then(|code| {
                        code.classes()
                            .find_map(|c| c.strip_prefix("language-"))
                            .map(str::to_string)
                    })
                    .unwrap_or_default();
                self.append(
                    parent,
                    NodeValue::CodeBlock(NodeCodeBlock {
                        fenced: true,
                        fence_char: b'`',
                        fence_length: 3,
                        fence_offset: 0,
                        info,
                        literal,
                    }),
                );
            }
            "hr" => {
                self.append(parent, NodeValue::ThematicBreak);
            }
            "table" => {
                let literal = format!("{}\n", to_xml(&[el.clone().into()]));
                self.append(
                    parent,
                    NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type: 6,
                        literal,
                    }),
                );
            }
            _ => self.append_blocks(parent, &el.children),
        }
    }

    fn append_list(&self, parent: &'a AstNode<'a>, el: &Element) {
        let (list_type, start) = if el.name == "ol" {
            let start = el.attr("start").and_then(|s| s.parse().ok()).unwrap_or(1);
            (ListType::Ordered, start)
        } else {
            (ListType::Bullet, 1)
        };
        let list = self.append(parent, NodeValue::List(list_data(list_type, start)));
        for child in el.child_elements() {
            self.append_item(list, child, list_type);
        }
        if list.first_child().is_none() {
            list.detach();
        }
    }

    fn append_item(&self, list: &'a AstNode<'a>, el: &Element, list_type: ListType) {
        let value = match is_checklist_item(el) {
            Some(checked) => NodeValue::TaskItem(checked.then_some('x')),
            None => NodeValue::Item(list_data(list_type, 1)),
        };
        let item = self.append(list, value);
        if el.name == "li" {
            self.append_blocks(item, &el.children);
        } else {
            self.append_blocks(item, &[el.clone().into()]);
        }
    }

    fn append_inlines(&self, parent: &'a AstNode<'a>, nodes: &[IrNode]) {
        for node in nodes {
            self.append_inline(parent, node);
        }
    }

    fn append_inline(&self, parent: &'a AstNode<'a>, node: &IrNode) {
        let el = match node {
            IrNode::Text(text) => {
                self.append(parent, NodeValue::Text(text.replace('\n', " ")));
                return;
            }
            IrNode::Element(el) => el,
        };

        match el.name.as_str() {
            "br" => {
                self.append(parent, NodeValue::LineBreak);
            }
            "strong" | "b" => {
                let strong = self.append(parent, NodeValue::Strong);
                self.append_inlines(strong, &el.children);
            }
            "em" | "i" => {
                let emph = self.append(parent, NodeValue::Emph);
                self.append_inlines(emph, &el.children);
            }
            "del" | "s" | "strike" => {
                let strike = self.append(parent, NodeValue::Strikethrough);
                self.append_inlines(strike, &el.children);
            }
            "code" | "kbd" | "tt" => {
                self.append(
                    parent,
                    NodeValue::Code(NodeCode {
                        num_backticks: 1,
                        literal: el.text_content(),
                    }),
                );
            }
            "a" => match el.attr("href") {
                Some(href) => {
                    let link = self.append(
                        parent,
                        NodeValue::Link(NodeLink {
                            url: href.to_string(),
                            title: el.attr("title").unwrap_or("").to_string(),
                        }),
                    );
                    self.append_inlines(link, &el.children);
                }
                None => self.append_inlines(parent, &el.children),
            },
            "img" => {
                if let Some(src) = el.attr("src") {
                    self.append_image(parent, src, el.attr("alt").unwrap_or(""));
                }
            }
            _ if is_media_placeholder(el) => {
                let link = el.attr("hash").and_then(|hash| self.links.get(hash));
                if let Some((path, name)) = link {
                    self.append_image(parent, path, name);
                }
            }
            _ => self.append_inlines(parent, &el.children),
        }
    }

    fn append_image(&self, parent: &'a AstNode<'a>, url: &str, alt: &str) {
        let image = self.append(
            parent,
            NodeValue::Image(NodeLink {
                url: url.to_string(),
                title: String::new(),
            }),
        );
        if !alt.is_empty() {
            self.append(image, NodeValue::Text(alt.to_string()));
        }
    }
}

fn list_data(list_type: ListType, start: usize) -> NodeList {
    NodeList {
        list_type,
        marker_offset: 0,
        padding: 0,
        start,
        delimiter: ListDelimType::Period,
        bullet_char: b'-',
        tight: true,
    }
}

fn is_blank<'a>(node: &'a AstNode<'a>) -> bool {
    match &node.data.borrow().value {
        NodeValue::LineBreak | NodeValue::SoftBreak => true,
        NodeValue::Text(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Drop line breaks and whitespace at the paragraph edges, then the paragraph itself if empty.
fn close_paragraph<'a>(paragraph: Option<&'a AstNode<'a>>) {
    let Some(paragraph) = paragraph else {
        return;
    };
    while let Some(first) = paragraph.first_child().filter(|n| is_blank(n)) {
        first.detach();
    }
    while let Some(last) = paragraph.last_child().filter(|n| is_blank(n)) {
        last.detach();
    }
    if paragraph.first_child().is_none() {
        paragraph.detach();
    }
}
