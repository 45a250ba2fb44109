//! Knobs for reading and writing notes.
//!
//! These are plain library types; `note-config` fills them from layered TOML.

use crate::common::attachments::HashAlgorithm;
use crate::model::DEFAULT_UNTITLED_TITLE;

pub const DEFAULT_MAX_PARALLEL_DOCUMENTS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Title given to notes whose source has none
    pub untitled_title: String,
    /// Upper bound on documents parsed at once
    pub max_parallel_documents: usize,
    pub hash_algorithm: HashAlgorithm,
    pub enex: EnexOptions,
    pub markdown: MarkdownOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            untitled_title: DEFAULT_UNTITLED_TITLE.to_string(),
            max_parallel_documents: DEFAULT_MAX_PARALLEL_DOCUMENTS,
            hash_algorithm: HashAlgorithm::default(),
            enex: EnexOptions::default(),
            markdown: MarkdownOptions::default(),
        }
    }
}

/// Values stamped on the `<en-export>` root and each note's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct EnexOptions {
    pub application: String,
    pub version: String,
}

impl Default for EnexOptions {
    fn default() -> Self {
        Self {
            application: "note-babel".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownOptions {
    /// Emit a YAML front matter block with the timestamps
    pub front_matter: bool,
    /// Archive folder for attachment files
    pub assets_dir: String,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            front_matter: false,
            assets_dir: "assets".to_string(),
        }
    }
}
