//! Format implementations
//!
//! Each format lives in its own module with a `parser.rs` (source → canonical notes) and a
//! `serializer.rs` (canonical notes → output files).

pub mod enex;
pub mod keep;
pub mod markdown;

pub use enex::EnexFormat;
pub use keep::KeepFormat;
pub use markdown::MarkdownFormat;
