//! # Diagnostic System for Semantic Analysis
//!
//! This module provides the diagnostic infrastructure for reporting semantic errors
//! and warnings found while resolving a Weft program.

use ariadne::ReportKind;
use chumsky::span::SimpleSpan;
use std::fmt;

/// A diagnostic message from semantic analysis
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Source span where this diagnostic applies. Opaque to the compiler core.
    pub span: SimpleSpan<usize>,
    /// Optional related spans for additional context
    pub related_spans: Vec<(SimpleSpan<usize>, String)>,
}

/// Severity of a diagnostic. The ordering is the ranking order: errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

impl From<DiagnosticSeverity> for ReportKind<'static> {
    fn from(severity: DiagnosticSeverity) -> Self {
        match severity {
            DiagnosticSeverity::Error => ReportKind::Error,
            DiagnosticSeverity::Warning => ReportKind::Warning,
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Registry errors (1000-1999)
    /// Two declarations of the same kind share a name. Fatal.
    DuplicateDeclaration,
    /// A model, query or component reference names nothing.
    NameResolution,

    // Structural errors (2000-2999)
    /// A relation's foreign key is missing, mistyped, or points nowhere.
    RelationIntegrity,
    /// A declaration body does not match the contract of its variant.
    Shape,

    // Access control errors (3000-3999)
    /// Unknown permission tag, or `OwnsRecord` without an ownership path.
    PermissionConfig,
    /// Auth configuration is missing or references absent fields.
    AuthConfig,

    // Warnings (4000-4999)
    /// A bound query's data field has no matching form input.
    MissingFormInput,
}

impl From<DiagnosticCode> for u32 {
    fn from(code: DiagnosticCode) -> Self {
        match code {
            DiagnosticCode::DuplicateDeclaration => 1001,
            DiagnosticCode::NameResolution => 1002,
            DiagnosticCode::RelationIntegrity => 2001,
            DiagnosticCode::Shape => 2002,
            DiagnosticCode::PermissionConfig => 3001,
            DiagnosticCode::AuthConfig => 3002,
            DiagnosticCode::MissingFormInput => 4001,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self {
            Self::MissingFormInput => 'W',
            _ => 'E',
        };
        write!(f, "{prefix}{}", u32::from(*self))
    }
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(code: DiagnosticCode, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code,
            message,
            span: SimpleSpan::from(0..0),
            related_spans: Vec::new(),
        }
    }

    /// Create a warning diagnostic
    pub fn warning(code: DiagnosticCode, message: String) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code,
            message,
            span: SimpleSpan::from(0..0),
            related_spans: Vec::new(),
        }
    }

    /// Add location information to this diagnostic
    pub const fn with_location(mut self, span: SimpleSpan<usize>) -> Self {
        self.span = span;
        self
    }

    /// Add a related span with context message
    pub fn with_related_span(mut self, span: SimpleSpan<usize>, message: String) -> Self {
        self.related_spans.push((span, message));
        self
    }

    pub const fn is_error(&self) -> bool {
        matches!(self.severity, DiagnosticSeverity::Error)
    }

    /// Convenience method for duplicate declaration errors
    pub fn duplicate_declaration(
        kind: &str,
        name: &str,
        span: SimpleSpan<usize>,
        first: SimpleSpan<usize>,
    ) -> Self {
        Self::error(
            DiagnosticCode::DuplicateDeclaration,
            format!("{kind} '{name}' is declared more than once"),
        )
        .with_location(span)
        .with_related_span(first, format!("first declaration of '{name}' is here"))
    }

    /// Convenience method for unresolved references
    pub fn unresolved(
        kind: &str,
        name: &str,
        referrer: &str,
        span: SimpleSpan<usize>,
    ) -> Self {
        Self::error(
            DiagnosticCode::NameResolution,
            format!("{referrer} references unknown {kind} '{name}'"),
        )
        .with_location(span)
    }

    /// Convenience method for relation integrity errors on `model.field`
    pub fn relation_integrity(
        model: &str,
        field: &str,
        reason: &str,
        span: SimpleSpan<usize>,
    ) -> Self {
        Self::error(
            DiagnosticCode::RelationIntegrity,
            format!("relation field '{model}.{field}' {reason}"),
        )
        .with_location(span)
    }

    /// Convenience method for shape errors
    pub fn shape(message: String, span: SimpleSpan<usize>) -> Self {
        Self::error(DiagnosticCode::Shape, message).with_location(span)
    }

    /// Convenience method for permission configuration errors
    pub fn permission_config(message: String, span: SimpleSpan<usize>) -> Self {
        Self::error(DiagnosticCode::PermissionConfig, message).with_location(span)
    }

    /// Convenience method for auth configuration errors
    pub fn auth_config(message: String, span: SimpleSpan<usize>) -> Self {
        Self::error(DiagnosticCode::AuthConfig, message).with_location(span)
    }

    /// Convenience method for missing form input warnings
    pub fn missing_form_input(
        component: &str,
        field: &str,
        query: &str,
        span: SimpleSpan<usize>,
    ) -> Self {
        Self::warning(
            DiagnosticCode::MissingFormInput,
            format!(
                "component '{component}' has no form input for field '{field}' of query '{query}'"
            ),
        )
        .with_location(span)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        write!(f, " (at {}:{})", self.span.start, self.span.end)?;
        for (span, message) in &self.related_spans {
            write!(f, "\n  note: {} (at {}:{})", message, span.start, span.end)?;
        }
        Ok(())
    }
}

/// Anything diagnostics can be pushed into.
///
/// Resolvers write into a local sink per declaration so that tiers can be
/// validated in parallel and merged afterwards.
pub trait DiagnosticSink {
    fn push(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn push(&mut self, diagnostic: Diagnostic) {
        Vec::push(self, diagnostic);
    }
}

impl DiagnosticSink for DiagnosticCollection {
    fn push(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}

/// Collection of diagnostics from semantic analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic to the collection
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add multiple diagnostics
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Get all diagnostics in their current order
    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get only error diagnostics
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .collect()
    }

    /// Get only warning diagnostics
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .collect()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Get the total number of diagnostics
    pub const fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Check if the collection is empty
    pub const fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Rank diagnostics: errors before warnings. The sort is stable, so
    /// within a severity the emission order (declaration order) is kept.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by_key(|d| d.severity);
    }

    /// Codes of all diagnostics, in order
    pub fn codes(&self) -> Vec<DiagnosticCode> {
        self.diagnostics.iter().map(|d| d.code).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> String {
        let errors = self.errors().len();
        let warnings = self.warnings().len();
        let total = self.diagnostics.len();

        if total == 0 {
            "No issues found".to_string()
        } else {
            format!("{errors} errors, {warnings} warnings")
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }
}

impl From<Vec<Diagnostic>> for DiagnosticCollection {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl IntoIterator for DiagnosticCollection {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl<'a> IntoIterator for &'a DiagnosticCollection {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
