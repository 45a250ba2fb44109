//! Structured channel for recoverable conversion events.
//!
//! Readers never fail a batch because of one bad document or attachment. Instead they
//! record a [`Diagnostic`] here, and the orchestrator hands the collected list back to the
//! caller next to the converted output. Every diagnostic is also mirrored to the `log` facade.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A single non-fatal event, tied to the document that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub document: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.document, self.message)
    }
}

/// Ordered collection of diagnostics for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, document: &str, message: impl Into<String>) {
        self.push(Severity::Warning, document, message.into());
    }

    pub fn info(&mut self, document: &str, message: impl Into<String>) {
        self.push(Severity::Info, document, message.into());
    }

    fn push(&mut self, severity: Severity, document: &str, message: String) {
        match severity {
            Severity::Warning => log::warn!("{document}: {message}"),
            Severity::Info => log::info!("{document}: {message}"),
        }
        self.entries.push(Diagnostic {
            severity,
            document: document.to_string(),
            message,
        });
    }

    /// Append another batch's entries, keeping their order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
