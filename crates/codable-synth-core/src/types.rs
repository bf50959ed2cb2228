//! Core types for synthesis diagnostics and fix-its.

use serde::{Deserialize, Serialize};

/// Severity level for synthesis diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, never affects the expansion.
    Info,
    /// Warning surfaced to the user; expansion still succeeds.
    Warning,
    /// Error that fails the expansion of the declaration.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location of a diagnostic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Line number (1-indexed, 0 when unknown).
    pub line: usize,
    /// Column number (1-indexed, 0 when unknown).
    pub column: usize,
}

impl Location {
    /// Creates a location from span information.
    ///
    /// Inside a compiler expansion the line information may be unavailable,
    /// in which case both fields are zero.
    #[must_use]
    pub fn from_span(span: proc_macro2::Span) -> Self {
        let start = span.start();
        Self {
            line: start.line,
            column: if start.line == 0 { 0 } else { start.column + 1 },
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An automatic source replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Location of the text to replace.
    pub location: Location,
    /// New text to insert.
    pub new_text: String,
}

impl Replacement {
    /// Creates a new replacement.
    #[must_use]
    pub fn new(location: Location, new_text: impl Into<String>) -> Self {
        Self {
            location,
            new_text: new_text.into(),
        }
    }
}

/// A suggested source edit attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixIt {
    /// Human-readable description of the edit.
    pub description: String,
    /// The replacement tooling can apply.
    pub replacement: Replacement,
}

impl FixIt {
    /// Creates a new fix-it.
    #[must_use]
    pub fn new(description: impl Into<String>, replacement: Replacement) -> Self {
        Self {
            description: description.into(),
            replacement,
        }
    }
}

/// A diagnostic produced during synthesis.
///
/// Diagnostics are returned as values from the synthesis stages and reported
/// by the caller; they are never emitted out-of-band.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Diagnostic code (e.g., "CS001").
    pub code: String,
    /// Diagnostic name (e.g., "immutable-default").
    pub name: String,
    /// Severity of this diagnostic.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Primary location.
    pub location: Location,
    /// Span the diagnostic is attached to.
    #[serde(skip)]
    pub span: proc_macro2::Span,
    /// Optional suggested edit.
    pub fix_it: Option<FixIt>,
}

impl Diagnostic {
    /// Creates a new diagnostic at the given span.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        severity: Severity,
        span: proc_macro2::Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            severity,
            message: message.into(),
            location: Location::from_span(span),
            span,
            fix_it: None,
        }
    }

    /// Attaches a fix-it to this diagnostic.
    #[must_use]
    pub fn with_fix_it(mut self, fix_it: FixIt) -> Self {
        self.fix_it = Some(fix_it);
        self
    }

    /// Returns true if this diagnostic fails the expansion.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Formats the diagnostic as a single note, suitable for compiler output.
    #[must_use]
    pub fn note(&self) -> String {
        let mut note = format!("[{}] {}", self.code, self.message);
        if let Some(fix_it) = &self.fix_it {
            note.push_str(&format!(
                " (fix: {}: `{}`)",
                fix_it.description, fix_it.replacement.new_text
            ));
        }
        note
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location, self.severity, self.code, self.message
        )
    }
}
