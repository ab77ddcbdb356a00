//! Error handling for the C-to-Go transpiler
//!
//! Every error in the taxonomy is recoverable at translation-unit
//! granularity: the translator emits a best-effort placeholder plus a
//! diagnostic and keeps going. Only I/O failures abort a unit.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main transpiler error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranspileError {
    #[error("unknown type at {location}: {name}")]
    UnknownType {
        name: String,
        location: SourceLocation,
    },

    #[error("incompatible operands at {location}: {message}")]
    IncompatibleOperands {
        message: String,
        location: SourceLocation,
    },

    #[error("layout error at {location}: {message}")]
    LayoutError {
        message: String,
        location: SourceLocation,
    },

    #[error("unsupported construct at {location}: {construct}")]
    UnsupportedConstruct {
        construct: String,
        location: SourceLocation,
    },

    #[error("unresolved symbol at {location}: {name}")]
    UnresolvedSymbol {
        name: String,
        location: SourceLocation,
    },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("internal transpiler error: {message}")]
    Internal { message: String },
}

impl TranspileError {
    /// The source location the error points at, if it has one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            TranspileError::UnknownType { location, .. }
            | TranspileError::IncompatibleOperands { location, .. }
            | TranspileError::LayoutError { location, .. }
            | TranspileError::UnsupportedConstruct { location, .. }
            | TranspileError::UnresolvedSymbol { location, .. } => Some(location),
            TranspileError::Io { .. } | TranspileError::Internal { .. } => None,
        }
    }

    /// True for errors the translator recovers from with a placeholder
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TranspileError::Io { .. })
    }
}

impl From<std::io::Error> for TranspileError {
    fn from(err: std::io::Error) -> Self {
        TranspileError::Io {
            message: err.to_string(),
        }
    }
}

impl From<String> for TranspileError {
    fn from(message: String) -> Self {
        TranspileError::Internal { message }
    }
}

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Error,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: String, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn note(message: String, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Note,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)?;

        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }

        Ok(())
    }
}

/// Collects diagnostics emitted while translating one unit
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error diagnostic
    pub fn error(&mut self, message: String, location: SourceLocation) {
        self.diagnostics.push(Diagnostic::error(message, location));
        self.error_count += 1;
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, message: String, location: SourceLocation) {
        self.diagnostics.push(Diagnostic::warning(message, location));
        self.warning_count += 1;
    }

    /// Report a note diagnostic
    pub fn note(&mut self, message: String, location: SourceLocation) {
        self.diagnostics.push(Diagnostic::note(message, location));
    }

    /// Record a recovered error as a warning diagnostic.
    ///
    /// The translator carries on with a placeholder after any recoverable
    /// error, so the surviving record is a warning pointing at the construct.
    pub fn recovered(&mut self, err: &TranspileError) {
        let location = err
            .location()
            .cloned()
            .unwrap_or_else(SourceLocation::dummy);
        self.warning(err.to_string(), location);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "no errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}
