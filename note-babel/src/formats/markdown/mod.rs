//! Markdown format implementation
//!
//! One Markdown file per note. We use the `comrak` crate for both directions: parsing into a
//! comrak AST that is then mapped onto the canonical IR, and building a comrak AST from the IR
//! that `format_commonmark` renders.
//!
//! # Note Layout
//!
//! ```text
//! ---                      (optional front matter: title, created, updated, tags, archived)
//! created: 2021-01-03T10:15:00Z
//! ---
//!
//! # Title
//!
//! Body…
//!
//! ---
//! Tags: home, errands
//! ```
//!
//! # Element Mapping
//!
//! | Canonical                     | Markdown                                   |
//! |-------------------------------|--------------------------------------------|
//! | `li[data-checked]`            | `- [x] item` / `- [ ] item`                |
//! | `media`                       | `![file](assets/<hash>.<ext>)` + asset file |
//! | `p`, `h1`–`h6`, lists, quotes | native blocks                              |
//! | `strong`/`b`, `em`/`i`, `del` | `**`, `*`, `~~`                            |
//! | `br`                          | hard line break                            |
//! | tables, unknown blocks        | raw HTML blocks                            |
//!
//! # Lossy Conversions
//!
//! - Soft line breaks read as spaces (CommonMark semantics)
//! - Attachments are written as separate files; reading Markdown only resolves `data:` images
//! - Classes and other attributes are dropped on write

pub mod parser;
pub mod serializer;

use crate::diagnostics::Diagnostics;
use crate::error::FormatError;
use crate::format::{NoteFormat, RawDocument, ReadContext, SerializedOutput, WriteContext};
use crate::model::Note;
use comrak::ComrakOptions;

/// Format implementation for Markdown
pub struct MarkdownFormat;

impl NoteFormat for MarkdownFormat {
    fn name(&self) -> &str {
        "markdown"
    }

    fn display_name(&self) -> &str {
        "Markdown"
    }

    fn description(&self) -> &str {
        "CommonMark Markdown, one file per note"
    }

    fn file_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn sniff(&self, doc: &RawDocument) -> bool {
        !doc.text.trim().is_empty()
    }

    fn parse_document(
        &self,
        doc: &RawDocument,
        ctx: &ReadContext,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Note>, FormatError> {
        parser::parse_markdown(doc, ctx, diagnostics).map(|note| vec![note])
    }

    fn generate(&self, notes: &[Note], ctx: &WriteContext) -> Result<SerializedOutput, FormatError> {
        serializer::serialize_markdown(notes, ctx).map(SerializedOutput::Archive)
    }
}

fn default_comrak_options() -> ComrakOptions<'static> {
    let mut options = ComrakOptions::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.front_matter_delimiter = Some("---".to_string());
    // Raw HTML blocks carry tables and markup Markdown cannot express
    options.render.unsafe_ = true;
    options
}
