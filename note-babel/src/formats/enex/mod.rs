//! Evernote ENEX format implementation
//!
//! An ENEX export is one XML document holding any number of `<note>` records. Each note body
//! is ENML, itself an XML document, stored in a CDATA section of `<content>`.
//!
//! # Element Mapping
//!
//! | Canonical                         | ENML                                      |
//! |-----------------------------------|-------------------------------------------|
//! | `<li data-checked="…">` in a `ul` | `<en-todo checked="…"/>text<br/>`         |
//! | `<media type hash/>`              | `<en-media type hash/>` + `<resource>`    |
//! | tags                              | `<tag>` elements                          |
//! | `class`/`style`/`id` attributes   | stripped (ENML rejects them)              |
//!
//! Evernote hashes resources with MD5, which we never compute. `en-media` elements whose
//! hash matches no resource are paired with the next unused resource of the same type, in
//! document order, and rewritten to the canonical content hash.
//!
//! The same writer is also registered as `apple-notes`: Apple Notes imports ENEX, it only
//! wants its own file name.

pub mod parser;
pub mod serializer;

use crate::diagnostics::Diagnostics;
use crate::error::FormatError;
use crate::format::{NoteFormat, RawDocument, ReadContext, SerializedOutput, WriteContext};
use crate::model::Note;

pub const ENEX_MEDIA_TYPE: &str = "application/enex+xml";

/// Format implementation for ENEX exports
pub struct EnexFormat {
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    file_name: &'static str,
    readable: bool,
}

impl EnexFormat {
    /// Evernote export, read and write.
    pub fn evernote() -> Self {
        Self {
            name: "enex",
            display_name: "Evernote (ENEX)",
            description: "Evernote XML export (.enex)",
            file_name: "notes.enex",
            readable: true,
        }
    }

    /// ENEX meant for import into Apple Notes, write only.
    pub fn apple_notes() -> Self {
        Self {
            name: "apple-notes",
            display_name: "Apple Notes (ENEX)",
            description: "ENEX file for import into Apple Notes",
            file_name: "notes-for-apple.enex",
            readable: false,
        }
    }
}

impl Default for EnexFormat {
    fn default() -> Self {
        Self::evernote()
    }
}

impl NoteFormat for EnexFormat {
    fn name(&self) -> &str {
        self.name
    }

    fn display_name(&self) -> &str {
        self.display_name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn file_extensions(&self) -> &[&str] {
        &["enex"]
    }

    fn supports_parsing(&self) -> bool {
        self.readable
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn underlying_format(&self) -> &str {
        "enex"
    }

    fn sniff(&self, doc: &RawDocument) -> bool {
        doc.text.contains("<en-export")
    }

    fn parse_document(
        &self,
        doc: &RawDocument,
        ctx: &ReadContext,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Note>, FormatError> {
        if !self.readable {
            return Err(FormatError::NotSupported(format!(
                "Format '{}' does not support parsing",
                self.name
            )));
        }
        parser::parse_enex(doc, ctx, diagnostics)
    }

    fn generate(&self, notes: &[Note], ctx: &WriteContext) -> Result<SerializedOutput, FormatError> {
        let xml = serializer::serialize_enex(notes, ctx)?;
        Ok(SerializedOutput::Document {
            file_name: self.file_name.to_string(),
            media_type: ENEX_MEDIA_TYPE.to_string(),
            bytes: xml.into_bytes(),
        })
    }
}
