//! Format registry for format discovery and selection
//!
//! The registry maps a format name to its implementation plus an `enabled` flag. It is built
//! once (defaults, then configuration disables entries) and only read afterwards, so it can be
//! shared freely across reader threads.

use crate::error::FormatError;
use crate::format::NoteFormat;
use serde::Serialize;
use std::collections::HashMap;

/// Which conversion directions a format offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Read,
    Write,
    Both,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Direction::Read => "read",
            Direction::Write => "write",
            Direction::Both => "read/write",
        };
        f.write_str(label)
    }
}

/// A registered format.
pub struct FormatEntry {
    format: Box<dyn NoteFormat>,
    enabled: bool,
}

impl FormatEntry {
    pub fn format(&self) -> &dyn NoteFormat {
        self.format.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `None` for a format that neither reads nor writes.
    pub fn direction(&self) -> Option<Direction> {
        match (
            self.format.supports_parsing(),
            self.format.supports_serialization(),
        ) {
            (true, true) => Some(Direction::Both),
            (true, false) => Some(Direction::Read),
            (false, true) => Some(Direction::Write),
            (false, false) => None,
        }
    }
}

/// Registry of note formats
///
/// # Examples
///
/// ```ignore
/// let registry = FormatRegistry::with_defaults();
/// let reader = registry.reader("keep")?;
/// let writer = registry.writer("enex")?;
/// ```
pub struct FormatRegistry {
    formats: HashMap<String, FormatEntry>,
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        FormatRegistry {
            formats: HashMap::new(),
        }
    }

    /// Register a format, enabled
    ///
    /// If a format with the same name already exists, it will be replaced.
    pub fn register<F: NoteFormat + 'static>(&mut self, format: F) {
        self.formats.insert(
            format.name().to_string(),
            FormatEntry {
                format: Box::new(format),
                enabled: true,
            },
        );
    }

    /// Mark a format as unavailable. Returns `false` when no such format is registered.
    pub fn disable(&mut self, name: &str) -> bool {
        match self.formats.get_mut(name) {
            Some(entry) => {
                entry.enabled = false;
                true
            }
            None => false,
        }
    }

    /// Get a format by name, enabled or not
    pub fn get(&self, name: &str) -> Result<&dyn NoteFormat, FormatError> {
        self.entry(name).map(FormatEntry::format)
    }

    pub fn entry(&self, name: &str) -> Result<&FormatEntry, FormatError> {
        self.formats
            .get(name)
            .ok_or_else(|| FormatError::FormatNotFound(name.to_string()))
    }

    /// Check if a format exists
    pub fn has(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// List all registered format names (sorted)
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formats.keys().cloned().collect();
        names.sort();
        names
    }

    /// All entries, sorted by name
    pub fn entries(&self) -> Vec<&FormatEntry> {
        let mut entries: Vec<_> = self.formats.values().collect();
        entries.sort_by(|a, b| a.format.name().cmp(b.format.name()));
        entries
    }

    /// An enabled format that can read notes
    pub fn reader(&self, name: &str) -> Result<&dyn NoteFormat, FormatError> {
        let entry = self.enabled_entry(name)?;
        if !entry.format.supports_parsing() {
            return Err(FormatError::NotSupported(format!(
                "Format '{name}' does not support parsing"
            )));
        }
        Ok(entry.format())
    }

    /// An enabled format that can write notes
    pub fn writer(&self, name: &str) -> Result<&dyn NoteFormat, FormatError> {
        let entry = self.enabled_entry(name)?;
        if !entry.format.supports_serialization() {
            return Err(FormatError::NotSupported(format!(
                "Format '{name}' does not support serialization"
            )));
        }
        Ok(entry.format())
    }

    fn enabled_entry(&self, name: &str) -> Result<&FormatEntry, FormatError> {
        let entry = self.entry(name)?;
        if !entry.enabled {
            return Err(FormatError::NotSupported(format!(
                "Format '{name}' is disabled"
            )));
        }
        Ok(entry)
    }

    /// Detect the input format of a file from its extension
    ///
    /// Only enabled formats that can read are considered; ties are broken by name.
    pub fn detect_format_from_filename(&self, filename: &str) -> Option<String> {
        let extension = std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase();

        self.entries()
            .into_iter()
            .filter(|entry| entry.enabled && entry.format.supports_parsing())
            .find(|entry| entry.format.file_extensions().contains(&extension.as_str()))
            .map(|entry| entry.format.name().to_string())
    }

    /// Create a registry with default formats
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(crate::formats::EnexFormat::evernote());
        registry.register(crate::formats::EnexFormat::apple_notes());
        registry.register(crate::formats::KeepFormat);
        registry.register(crate::formats::MarkdownFormat);

        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
