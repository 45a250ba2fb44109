//! Shared configuration loader for the note-babel toolchain.
//!
//! `defaults/notebabel.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`NoteBabelConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use note_babel::common::attachments::HashAlgorithm;
use note_babel::{ConvertOptions, EnexOptions, FormatRegistry, MarkdownOptions};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/notebabel.default.toml");

/// Top-level configuration consumed by note-babel applications.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteBabelConfig {
    pub notes: NotesConfig,
    pub read: ReadConfig,
    pub attachments: AttachmentsConfig,
    pub enex: EnexConfig,
    pub markdown: MarkdownConfig,
    pub formats: FormatsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    pub untitled_title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadConfig {
    pub max_parallel_documents: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsConfig {
    pub hash: HashAlgorithm,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnexConfig {
    pub application: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub front_matter: bool,
    pub assets_dir: String,
}

/// Formats hidden from both directions.
#[derive(Debug, Clone, Deserialize)]
pub struct FormatsConfig {
    pub disabled: Vec<String>,
}

impl From<&NoteBabelConfig> for ConvertOptions {
    fn from(config: &NoteBabelConfig) -> Self {
        ConvertOptions {
            untitled_title: config.notes.untitled_title.clone(),
            max_parallel_documents: config.read.max_parallel_documents.max(1),
            hash_algorithm: config.attachments.hash,
            enex: EnexOptions::from(&config.enex),
            markdown: MarkdownOptions::from(&config.markdown),
        }
    }
}

impl From<NoteBabelConfig> for ConvertOptions {
    fn from(config: NoteBabelConfig) -> Self {
        ConvertOptions::from(&config)
    }
}

impl From<&EnexConfig> for EnexOptions {
    fn from(config: &EnexConfig) -> Self {
        EnexOptions {
            application: config.application.clone(),
            version: config.version.clone(),
        }
    }
}

impl From<&MarkdownConfig> for MarkdownOptions {
    fn from(config: &MarkdownConfig) -> Self {
        MarkdownOptions {
            front_matter: config.front_matter,
            assets_dir: config.assets_dir.clone(),
        }
    }
}

impl NoteBabelConfig {
    /// The default registry with `[formats] disabled` applied.
    pub fn registry(&self) -> FormatRegistry {
        let mut registry = FormatRegistry::with_defaults();
        for name in &self.formats.disabled {
            if !registry.disable(name) {
                log::warn!("cannot disable unknown format '{name}'");
            }
        }
        registry
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<NoteBabelConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<NoteBabelConfig, ConfigError> {
    Loader::new().build()
}
