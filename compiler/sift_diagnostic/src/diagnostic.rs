//! Core diagnostic types.
//!
//! Defines [`Diagnostic`], [`Label`], [`Severity`] and [`FixIt`], the
//! building blocks the failure diagnoser uses to report inference failures.

use std::fmt;

use sift_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
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

/// How confident we are that a fix-it is correct.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Applicability {
    /// The edit is definitely correct and can be auto-applied
    /// (inserting a missing label, removing a stray `&`).
    MachineApplicable,

    /// The edit is plausible but changes meaning
    /// (force-unwrapping an optional).
    MaybeIncorrect,

    /// The edit contains a placeholder the user must fill in.
    HasPlaceholders,

    #[default]
    Unspecified,
}

impl Applicability {
    /// Check if this fix-it can be safely auto-applied.
    pub fn is_machine_applicable(self) -> bool {
        matches!(self, Applicability::MachineApplicable)
    }
}

/// A single text edit: replace `span` with `snippet`.
///
/// An empty span is an insertion, an empty snippet a deletion.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Substitution {
    pub span: Span,
    pub snippet: String,
}

impl Substitution {
    pub fn new(span: Span, snippet: impl Into<String>) -> Self {
        Substitution {
            span,
            snippet: snippet.into(),
        }
    }

    /// Insert `snippet` at `offset`.
    pub fn insert(offset: u32, snippet: impl Into<String>) -> Self {
        Self::new(Span::point(offset), snippet)
    }

    /// Delete the text covered by `span`.
    pub fn remove(span: Span) -> Self {
        Self::new(span, "")
    }

    pub fn is_insertion(&self) -> bool {
        self.span.is_empty()
    }

    pub fn is_removal(&self) -> bool {
        self.snippet.is_empty()
    }
}

/// A suggested source edit attached to a diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FixIt {
    /// Human-readable description of the edit.
    pub message: String,
    /// The edits to apply together.
    pub edits: Vec<Substitution>,
    pub applicability: Applicability,
}

impl FixIt {
    pub fn new(
        message: impl Into<String>,
        edit: Substitution,
        applicability: Applicability,
    ) -> Self {
        FixIt {
            message: message.into(),
            edits: vec![edit],
            applicability,
        }
    }

    /// A fix-it that is safe to auto-apply.
    pub fn machine_applicable(message: impl Into<String>, edit: Substitution) -> Self {
        Self::new(message, edit, Applicability::MachineApplicable)
    }

    /// A fix-it that needs human review.
    pub fn maybe_incorrect(message: impl Into<String>, edit: Substitution) -> Self {
        Self::new(message, edit, Applicability::MaybeIncorrect)
    }

    /// Add another edit applied together with this one.
    #[must_use]
    pub fn with_edit(mut self, edit: Substitution) -> Self {
        self.edits.push(edit);
        self
    }
}

/// A labeled span with a message.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
    /// Whether this is the primary error location.
    pub is_primary: bool,
}

impl Label {
    /// Create a primary label (the main error location).
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a secondary label (related context).
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
            is_primary: false,
        }
    }
}

/// A diagnostic produced for one failed expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    /// Labeled spans; the first primary label is the diagnostic's location.
    pub labels: Vec<Label>,
    /// Secondary notes. Informational, never counted as failures.
    pub notes: Vec<String>,
    /// Suggested source edits.
    pub fixits: Vec<FixIt>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            message: String::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            fixits: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add a primary label at the error location.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label for context.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_fixit(mut self, fixit: FixIt) -> Self {
        self.fixits.push(fixit);
        self
    }

    /// Get the primary span (first primary label's span).
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.iter().find(|l| l.is_primary).map(|l| l.span)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }

    /// All edits of all fix-its, in attachment order.
    pub fn edits(&self) -> impl Iterator<Item = &Substitution> {
        self.fixits.iter().flat_map(|f| f.edits.iter())
    }

    pub fn has_machine_applicable_fix(&self) -> bool {
        self.fixits
            .iter()
            .any(|f| f.applicability.is_machine_applicable())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.code, self.message)?;

        for label in &self.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            write!(f, "\n  {} {:?}: {}", marker, label.span, label.message)?;
        }

        for note in &self.notes {
            write!(f, "\n  = note: {note}")?;
        }

        for fixit in &self.fixits {
            write!(f, "\n  = fix: {}", fixit.message)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
