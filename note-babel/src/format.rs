//! NoteFormat trait definition
//!
//! Every supported export format implements [`NoteFormat`]. A format may read notes, write
//! notes, or both; the capability flags tell the registry which directions are available.

use crate::clock::Clock;
use crate::common::attachments::AttachmentProcessor;
use crate::common::dates::{DateGrammar, DateNormalizer};
use crate::diagnostics::Diagnostics;
use crate::error::FormatError;
use crate::model::{Note, NoteBuilder};
use crate::options::ConvertOptions;
use chrono::{DateTime, Utc};

/// One input file, already decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Path or archive entry name, used in diagnostics
    pub name: String,
    pub text: String,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// A file inside an archive output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// What a writer produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedOutput {
    /// A single file
    Document {
        file_name: String,
        media_type: String,
        bytes: Vec<u8>,
    },
    /// Several files meant to be packed together
    Archive(Vec<ArchiveEntry>),
}

impl SerializedOutput {
    /// Number of files in the output.
    pub fn entry_count(&self) -> usize {
        match self {
            SerializedOutput::Document { .. } => 1,
            SerializedOutput::Archive(entries) => entries.len(),
        }
    }
}

/// Shared inputs for readers.
#[derive(Clone, Copy)]
pub struct ReadContext<'a> {
    pub clock: &'a dyn Clock,
    pub options: &'a ConvertOptions,
}

impl<'a> ReadContext<'a> {
    pub fn new(clock: &'a dyn Clock, options: &'a ConvertOptions) -> Self {
        Self { clock, options }
    }

    pub fn normalizer(&self, grammar: DateGrammar) -> DateNormalizer<'a> {
        DateNormalizer::new(grammar, self.clock)
    }

    pub fn attachments(&self) -> AttachmentProcessor {
        AttachmentProcessor::new(self.options.hash_algorithm)
    }

    /// A builder with the configured untitled placeholder.
    pub fn note_builder(&self, created: DateTime<Utc>) -> NoteBuilder {
        Note::builder(created).untitled_title(self.options.untitled_title.clone())
    }
}

/// Shared inputs for writers.
#[derive(Clone, Copy)]
pub struct WriteContext<'a> {
    pub clock: &'a dyn Clock,
    pub options: &'a ConvertOptions,
}

impl<'a> WriteContext<'a> {
    pub fn new(clock: &'a dyn Clock, options: &'a ConvertOptions) -> Self {
        Self { clock, options }
    }
}

/// Trait for note export formats
///
/// # Examples
///
/// ```ignore
/// struct PlainText;
///
/// impl NoteFormat for PlainText {
///     fn name(&self) -> &str {
///         "plain"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn generate(&self, notes: &[Note], _ctx: &WriteContext) -> Result<SerializedOutput, FormatError> {
///         // One file per note
///         todo!()
///     }
/// }
/// ```
pub trait NoteFormat: Send + Sync {
    /// Registry key (e.g., "enex", "keep", "markdown")
    fn name(&self) -> &str;

    /// Human-readable name for listings
    fn display_name(&self) -> &str {
        self.name()
    }

    fn description(&self) -> &str {
        ""
    }

    /// File extensions without the leading dot, used for input detection
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    fn supports_parsing(&self) -> bool {
        false
    }

    fn supports_serialization(&self) -> bool {
        false
    }

    /// The document format this entry reads or writes.
    ///
    /// Aliases (an ENEX flavour under another name) return the format they share, so that
    /// converting between them can be refused.
    fn underlying_format(&self) -> &str {
        self.name()
    }

    /// Cheap check that a document looks like this format before full extraction.
    fn sniff(&self, _doc: &RawDocument) -> bool {
        true
    }

    /// Read every note in one document.
    ///
    /// Problems that only affect part of the document (one bad note, one bad attachment) go
    /// to `diagnostics`; an `Err` means nothing in the document could be used.
    fn parse_document(
        &self,
        _doc: &RawDocument,
        _ctx: &ReadContext,
        _diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Note>, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Render a batch of notes.
    fn generate(&self, _notes: &[Note], _ctx: &WriteContext) -> Result<SerializedOutput, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }
}
