//! # Weft Compiler Diagnostics
//!
//! Diagnostic values shared by every phase of the compiler core, plus
//! rendering helpers for callers that still hold the source text.

mod diagnostics;
mod reporting;

pub use diagnostics::{
    Diagnostic, DiagnosticCode, DiagnosticCollection, DiagnosticSeverity, DiagnosticSink,
};
pub use reporting::build_diagnostic_message;
