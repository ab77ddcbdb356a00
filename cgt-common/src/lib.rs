//! Common types for the C-to-Go transpiler
//!
//! This crate holds the pieces shared by every stage of the transpiler:
//! source locations for diagnostics and the error/diagnostic types.

pub mod error;
pub mod source_loc;

pub use error::{Diagnostic, DiagnosticSink, Severity, TranspileError};
pub use source_loc::SourceLocation;
