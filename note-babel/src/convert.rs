//! Conversion orchestration.
//!
//! [`read_batch`] runs one reader over many documents on a bounded thread pool; a failing
//! document is reported and skipped without touching its siblings. [`Converter`] ties a reader
//! and a writer together and applies the whole-batch rules: same-format requests are refused,
//! an empty read is an error, and a cancelled batch produces no output.

use crate::clock::{Clock, SystemClock};
use crate::diagnostics::Diagnostics;
use crate::error::{ConversionError, FormatError};
use crate::format::{NoteFormat, RawDocument, ReadContext, SerializedOutput, WriteContext};
use crate::model::Note;
use crate::options::ConvertOptions;
use crate::registry::FormatRegistry;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation switch. Checked before each document starts.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Notes read from a batch, in input order.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub notes: Vec<Note>,
    pub diagnostics: Diagnostics,
    /// At least one document was not started because the batch was cancelled
    pub cancelled: bool,
}

/// Read every document with `format`.
pub fn read_batch(
    format: &dyn NoteFormat,
    docs: &[RawDocument],
    ctx: &ReadContext,
    cancel: &CancelFlag,
) -> ReadOutcome {
    let threads = ctx.options.max_parallel_documents.max(1);
    let per_document: Vec<Option<(Vec<Note>, Diagnostics)>> =
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| {
                docs.par_iter()
                    .map(|doc| read_document(format, doc, ctx, cancel))
                    .collect()
            }),
            Err(err) => {
                log::warn!("thread pool unavailable ({err}), reading sequentially");
                docs.iter()
                    .map(|doc| read_document(format, doc, ctx, cancel))
                    .collect()
            }
        };

    let mut outcome = ReadOutcome::default();
    for result in per_document {
        match result {
            Some((notes, diagnostics)) => {
                outcome.notes.extend(notes);
                outcome.diagnostics.extend(diagnostics);
            }
            None => outcome.cancelled = true,
        }
    }
    outcome
}

/// `None` when cancelled before starting.
fn read_document(
    format: &dyn NoteFormat,
    doc: &RawDocument,
    ctx: &ReadContext,
    cancel: &CancelFlag,
) -> Option<(Vec<Note>, Diagnostics)> {
    if cancel.is_cancelled() {
        return None;
    }
    let mut diagnostics = Diagnostics::new();
    if !format.sniff(doc) {
        diagnostics.warn(
            &doc.name,
            format!("not a {} document, skipped", format.display_name()),
        );
        return Some((Vec::new(), diagnostics));
    }
    match format.parse_document(doc, ctx, &mut diagnostics) {
        Ok(notes) => {
            for note in &notes {
                log::debug!("{}: read note '{}'", doc.name, note.title());
            }
            Some((notes, diagnostics))
        }
        Err(err) => {
            diagnostics.warn(&doc.name, err.to_string());
            Some((Vec::new(), diagnostics))
        }
    }
}

/// Output of a successful conversion.
#[derive(Debug)]
pub struct ConversionResult {
    pub output: SerializedOutput,
    pub note_count: usize,
    pub diagnostics: Diagnostics,
}

/// Converts batches of documents between two registered formats.
pub struct Converter {
    registry: FormatRegistry,
    options: ConvertOptions,
    clock: Box<dyn Clock>,
    cancel: CancelFlag,
}

impl Converter {
    pub fn new(registry: FormatRegistry) -> Self {
        Self {
            registry,
            options: ConvertOptions::default(),
            clock: Box::new(SystemClock),
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// A handle that cancels this converter's batches.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Read notes without writing them.
    pub fn read(&self, from: &str, docs: &[RawDocument]) -> Result<ReadOutcome, ConversionError> {
        let reader = self.registry.reader(from)?;
        let ctx = ReadContext::new(self.clock.as_ref(), &self.options);
        let outcome = read_batch(reader, docs, &ctx, &self.cancel);
        if outcome.cancelled {
            return Err(ConversionError::Cancelled);
        }
        Ok(outcome)
    }

    /// Read `docs` as `from` and render them as `to`.
    pub fn convert(
        &self,
        from: &str,
        to: &str,
        docs: &[RawDocument],
    ) -> Result<ConversionResult, ConversionError> {
        let reader = self.registry.reader(from)?;
        let writer = self.registry.writer(to)?;
        if reader.underlying_format() == writer.underlying_format() {
            return Err(ConversionError::SameFormat {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let outcome = self.read(from, docs)?;
        if outcome.notes.is_empty() {
            return Err(ConversionError::NoNotesFound);
        }
        for note in &outcome.notes {
            note.validate().map_err(|err| {
                FormatError::SerializationError(format!("cannot write '{}': {err}", note.title()))
            })?;
        }

        let ctx = WriteContext::new(self.clock.as_ref(), &self.options);
        let output = writer.generate(&outcome.notes, &ctx)?;
        log::info!(
            "converted {} note(s) from {from} to {to} ({} warning(s))",
            outcome.notes.len(),
            outcome.diagnostics.warning_count()
        );
        Ok(ConversionResult {
            output,
            note_count: outcome.notes.len(),
            diagnostics: outcome.diagnostics,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(FormatRegistry::with_defaults())
    }
}
