//! The canonical note model shared by every reader and writer.
//!
//! A [`Note`] is an immutable value: readers assemble one through [`NoteBuilder`], which
//! applies the defaulting rules (title placeholder, `updated` falling back to `created`, the
//! archived tag, attachment dedup and placeholder closure) and validates the result.

use crate::common::attachments::{media_placeholder, placeholder_hashes, resolve_placeholders};
use crate::error::FormatError;
use crate::ir::from_xml::parse_fragment;
use crate::ir::{to_xml, Node};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

pub const DEFAULT_UNTITLED_TITLE: &str = "Untitled Note";
pub const ARCHIVED_TAG: &str = "archived";

/// An embedded binary asset.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    mime_type: String,
    #[serde(rename = "size", serialize_with = "serialize_len")]
    data: Vec<u8>,
    content_hash: String,
    file_name: String,
}

fn serialize_len<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(data.len() as u64)
}

impl Resource {
    pub fn new(
        mime_type: impl Into<String>,
        data: Vec<u8>,
        content_hash: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
            content_hash: content_hash.into(),
            file_name: file_name.into(),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .field("content_hash", &self.content_hash)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// A single note in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Note {
    title: String,
    content: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    tags: Vec<String>,
    attachments: Vec<Resource>,
}

impl Note {
    pub fn builder(created: DateTime<Utc>) -> NoteBuilder {
        NoteBuilder::new(created)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Canonical body markup (a fragment, no root element).
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn attachments(&self) -> &[Resource] {
        &self.attachments
    }

    pub fn is_archived(&self) -> bool {
        self.tags.iter().any(|t| t == ARCHIVED_TAG)
    }

    pub fn resource(&self, hash: &str) -> Option<&Resource> {
        self.attachments.iter().find(|r| r.content_hash == hash)
    }

    /// The body parsed into IR nodes.
    pub fn content_nodes(&self) -> Result<Vec<Node>, FormatError> {
        parse_fragment(&self.content)
    }

    /// Check the model contract: non-empty title, well-formed body, and every media
    /// placeholder resolving to an attachment.
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.title.trim().is_empty() {
            return Err(FormatError::InvalidNote("title is empty".to_string()));
        }
        let nodes = self.content_nodes()?;
        if let Some(missing) = placeholder_hashes(&nodes)
            .into_iter()
            .find(|hash| self.resource(hash).is_none())
        {
            return Err(FormatError::InvalidNote(format!(
                "'{}' references unknown attachment {missing}",
                self.title
            )));
        }
        Ok(())
    }
}

/// The only way to construct a [`Note`].
#[derive(Debug, Clone)]
pub struct NoteBuilder {
    title: Option<String>,
    untitled_title: String,
    content: Vec<Node>,
    created: DateTime<Utc>,
    updated: Option<DateTime<Utc>>,
    tags: Vec<String>,
    archived: bool,
    attachments: Vec<Resource>,
}

impl NoteBuilder {
    pub fn new(created: DateTime<Utc>) -> Self {
        Self {
            title: None,
            untitled_title: DEFAULT_UNTITLED_TITLE.to_string(),
            content: Vec::new(),
            created,
            updated: None,
            tags: Vec::new(),
            archived: false,
            attachments: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title used when the source has none.
    pub fn untitled_title(mut self, placeholder: impl Into<String>) -> Self {
        self.untitled_title = placeholder.into();
        self
    }

    pub fn content_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.content = nodes;
        self
    }

    pub fn updated(mut self, updated: Option<DateTime<Utc>>) -> Self {
        self.updated = updated;
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self
    }

    pub fn attachments(mut self, attachments: Vec<Resource>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn build(self) -> Result<Note, FormatError> {
        let title = match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => self.untitled_title.trim().to_string(),
        };

        let mut tags: Vec<String> = Vec::with_capacity(self.tags.len() + 1);
        for tag in self.tags {
            let tag = tag.trim();
            if tag.is_empty() || (tag == ARCHIVED_TAG && tags.iter().any(|t| t == ARCHIVED_TAG)) {
                continue;
            }
            tags.push(tag.to_string());
        }
        if self.archived && !tags.iter().any(|t| t == ARCHIVED_TAG) {
            tags.push(ARCHIVED_TAG.to_string());
        }

        let mut attachments: Vec<Resource> = Vec::with_capacity(self.attachments.len());
        for resource in self.attachments {
            if !attachments
                .iter()
                .any(|r| r.content_hash == resource.content_hash)
            {
                attachments.push(resource);
            }
        }

        let mut content = self.content;
        let known: Vec<&str> = attachments.iter().map(Resource::content_hash).collect();
        let dropped = resolve_placeholders(&mut content, &known);
        if dropped > 0 {
            log::debug!("'{title}': dropped {dropped} unresolved media placeholder(s)");
        }
        let referenced = placeholder_hashes(&content);
        for resource in &attachments {
            if !referenced.iter().any(|h| h == resource.content_hash()) {
                content.push(
                    media_placeholder(resource.mime_type(), resource.content_hash()).into(),
                );
            }
        }

        let note = Note {
            title,
            content: to_xml(&content),
            created: self.created,
            updated: self.updated.unwrap_or(self.created),
            tags,
            attachments,
        };
        note.validate()?;
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Element;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 3, 10, 15, 0).unwrap()
    }

    fn png(hash: &str) -> Resource {
        Resource::new("image/png", vec![1, 2, 3], hash, "attachment-1.png")
    }

    #[test]
    fn test_defaults() {
        let note = Note::builder(created()).build().unwrap();
        assert_eq!(note.title(), DEFAULT_UNTITLED_TITLE);
        assert_eq!(note.updated(), note.created());
        assert!(note.tags().is_empty());
        assert_eq!(note.content(), "");
    }

    #[test]
    fn test_blank_title_uses_placeholder() {
        let note = Note::builder(created())
            .title("   ")
            .untitled_title("Sans titre")
            .build()
            .unwrap();
        assert_eq!(note.title(), "Sans titre");
    }

    #[test]
    fn test_archived_tag_appended_once() {
        let note = Note::builder(created())
            .tags(vec!["home".into(), "archived".into()])
            .archived(true)
            .build()
            .unwrap();
        assert_eq!(note.tags(), ["home", "archived"]);

        let note = Note::builder(created())
            .tags(vec!["home".into()])
            .archived(true)
            .build()
            .unwrap();
        assert_eq!(note.tags(), ["home", "archived"]);
        assert!(note.is_archived());
    }

    #[test]
    fn test_repeated_archived_tags_collapse() {
        let note = Note::builder(created())
            .tags(vec!["archived".into(), "home".into(), "archived".into()])
            .archived(true)
            .build()
            .unwrap();
        assert_eq!(note.tags(), ["archived", "home"]);
    }

    #[test]
    fn test_tags_are_trimmed_and_blank_ones_dropped() {
        let note = Note::builder(created())
            .tags(vec![" padded ".into(), "".into(), "  ".into(), "x".into()])
            .build()
            .unwrap();
        assert_eq!(note.tags(), ["padded", "x"]);
    }

    #[test]
    fn test_duplicate_attachments_collapse() {
        let note = Note::builder(created())
            .content_nodes(vec![media_placeholder("image/png", "h1").into()])
            .attachments(vec![png("h1"), png("h1")])
            .build()
            .unwrap();
        assert_eq!(note.attachments().len(), 1);
    }

    #[test]
    fn test_unknown_placeholder_dropped() {
        let note = Note::builder(created())
            .content_nodes(vec![
                Node::text("x"),
                media_placeholder("image/png", "missing").into(),
            ])
            .build()
            .unwrap();
        assert_eq!(note.content(), "x");
    }

    #[test]
    fn test_unreferenced_attachment_gets_placeholder() {
        let note = Note::builder(created())
            .content_nodes(vec![Element::new("p").with_text("body").into()])
            .attachments(vec![png("h1")])
            .build()
            .unwrap();
        assert_eq!(
            note.content(),
            "<p>body</p><media type=\"image/png\" hash=\"h1\"/>"
        );
        note.validate().unwrap();
    }

    #[test]
    fn test_text_is_stored_unescaped_and_serialized_once() {
        let note = Note::builder(created())
            .title("<Fish & Chips>")
            .content_nodes(vec![Node::text("a < b & c")])
            .build()
            .unwrap();
        assert_eq!(note.title(), "<Fish & Chips>");
        assert_eq!(note.content(), "a &lt; b &amp; c");
        assert_eq!(note.content_nodes().unwrap(), vec![Node::text("a < b & c")]);
    }

    #[test]
    fn test_serializes_resource_size_not_bytes() {
        let note = Note::builder(created())
            .attachments(vec![png("h1")])
            .build()
            .unwrap();
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["attachments"][0]["size"], 3);
        assert_eq!(json["created"], "2021-01-03T10:15:00Z");
    }
}
