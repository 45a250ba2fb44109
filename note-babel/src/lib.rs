//! Conversion between note-taking application exports
//!
//!     This crate reads Evernote ENEX exports, Google Keep Takeout HTML and Markdown files into a
//!     canonical note model, and writes that model back out as ENEX (also in the Apple Notes
//!     import flavour), Keep HTML or Markdown.
//!
//!     TLDR: For format authors:
//!         - Formats never hand-roll a parser or serializer, they adapt the format library's tree
//!           (roxmltree, html5ever, comrak) to and from the IR.
//!         - Everything two formats share (dates, checklists, label chips, attachments, markup
//!           repair, file names) lives in ./common and is tested there in isolation.
//!         - Reading a document never fails the batch: failures become diagnostics.
//!
//! Architecture
//!
//!     source text ──▶ format tree ──▶ IR fragment ──▶ Note ──▶ IR fragment ──▶ target output
//!
//!     A Note's body is a canonical XHTML fragment (see ./ir). Checklists are `<li data-checked>`
//!     items and attachments are `<media type hash/>` placeholders resolved against the note's
//!     resources. Each format rewrites its native markup into that shape on read and back out on
//!     write, so no format knows about any other.
//!
//!     This is a pure lib: it powers note-cli but makes no assumptions about a shell, stdout,
//!     environment variables or the file system.
//!
//!     The file structure :
//!     .
//!     ├── clock.rs                # Time source (injectable for tests)
//!     ├── convert.rs              # Batch reading and the Converter pipeline
//!     ├── diagnostics.rs          # Per-document warnings
//!     ├── error.rs
//!     ├── format.rs               # NoteFormat trait and read/write contexts
//!     ├── model.rs                # Note, Resource, NoteBuilder
//!     ├── options.rs              # ConvertOptions
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── formats
//!     │   ├── <format>
//!     │   │   ├── parser.rs
//!     │   │   ├── serializer.rs
//!     │   │   └── mod.rs
//!     ├── ir                      # Fragment IR, XML/HTML in and out
//!     ├── common                  # Shared mapping code
//!
//! Testing
//!     tests
//!     └── <format>
//!         └── <testname>.rs
//!
//!     Rust does not discover tests in subdirectories, so tests/lib.rs includes them as modules.
//!
//! Formats
//!
//!     | name          | read | write | output                        |
//!     |---------------|------|-------|-------------------------------|
//!     | `enex`        | yes  | yes   | `notes.enex`                  |
//!     | `apple-notes` | no   | yes   | `notes-for-apple.enex`        |
//!     | `keep`        | yes  | yes   | archive of `.html` files      |
//!     | `markdown`    | yes  | yes   | archive of `.md` + `assets/`  |
//!
//!     Converting a format to itself, or between two formats sharing an underlying format
//!     (`enex` → `apple-notes`), is rejected.

pub mod clock;
pub mod common;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod formats;
pub mod ir;
pub mod model;
pub mod options;
pub mod registry;

pub use clock::{Clock, FixedClock, SystemClock};
pub use convert::{read_batch, CancelFlag, ConversionResult, Converter, ReadOutcome};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ConversionError, FormatError};
pub use format::{
    ArchiveEntry, NoteFormat, RawDocument, ReadContext, SerializedOutput, WriteContext,
};
pub use model::{Note, NoteBuilder, Resource};
pub use options::{ConvertOptions, EnexOptions, MarkdownOptions};
pub use registry::{Direction, FormatRegistry};
