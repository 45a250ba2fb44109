//! Google Keep (Takeout) format implementation
//!
//! Takeout exports one HTML file per note:
//!
//! ```text
//! <div class="note [archived]">
//!   <div class="heading">Jan 3, 2021, 10:15:00 AM</div>
//!   <div class="title">Groceries</div>
//!   <div class="content">…</div>
//!   <div class="attachments"><ul><li><img src="data:…"></li></ul></div>
//!   <div class="chips"><span class="chip label"><span class="label-name">home</span></span></div>
//! </div>
//! ```
//!
//! Checklist items are `li.listitem` with a `.bullet` glyph and a `.text` span. Reading
//! produces one note per file; writing produces an archive of such files.
//!
//! Keep shows attachments below the body, so media placeholders are not kept inline on write:
//! the images move to the `.attachments` block.

pub mod parser;
pub mod serializer;

use crate::diagnostics::Diagnostics;
use crate::error::FormatError;
use crate::format::{NoteFormat, RawDocument, ReadContext, SerializedOutput, WriteContext};
use crate::model::Note;

/// Format implementation for Google Keep HTML
pub struct KeepFormat;

impl NoteFormat for KeepFormat {
    fn name(&self) -> &str {
        "keep"
    }

    fn display_name(&self) -> &str {
        "Google Keep"
    }

    fn description(&self) -> &str {
        "Google Keep Takeout HTML (one file per note)"
    }

    fn file_extensions(&self) -> &[&str] {
        &["html", "htm"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn sniff(&self, doc: &RawDocument) -> bool {
        parser::looks_like_keep(&doc.text)
    }

    fn parse_document(
        &self,
        doc: &RawDocument,
        ctx: &ReadContext,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Note>, FormatError> {
        parser::parse_keep(doc, ctx, diagnostics).map(|note| vec![note])
    }

    fn generate(&self, notes: &[Note], ctx: &WriteContext) -> Result<SerializedOutput, FormatError> {
        serializer::serialize_keep(notes, ctx).map(SerializedOutput::Archive)
    }
}
