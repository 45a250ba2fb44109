//! Error types for format and conversion operations

use std::fmt;

/// Errors that can occur during format operations
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Format not found in registry
    FormatNotFound(String),
    /// Error during parsing
    ParseError(String),
    /// Error during serialization
    SerializationError(String),
    /// Format does not support the requested direction, or is disabled
    NotSupported(String),
    /// A note violates the canonical model contract
    InvalidNote(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Format '{name}' not found"),
            FormatError::ParseError(msg) => write!(f, "Parse error: {msg}"),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            FormatError::NotSupported(msg) => write!(f, "Operation not supported: {msg}"),
            FormatError::InvalidNote(msg) => write!(f, "Invalid note: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Errors that abort a whole conversion request
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// Source and target resolve to the same underlying format
    SameFormat { from: String, to: String },
    /// Every input was skipped or failed; nothing to write
    NoNotesFound,
    /// The batch was cancelled before all documents were read
    Cancelled,
    /// Registry lookup or writer failure
    Format(FormatError),
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::SameFormat { from, to } => {
                write!(f, "Cannot convert '{from}' to '{to}': same format")
            }
            ConversionError::NoNotesFound => write!(f, "No valid notes were found in the input"),
            ConversionError::Cancelled => write!(f, "Conversion cancelled"),
            ConversionError::Format(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConversionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConversionError::Format(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FormatError> for ConversionError {
    fn from(err: FormatError) -> Self {
        ConversionError::Format(err)
    }
}
