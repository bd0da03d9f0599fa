//! Diagnostic emitters.
//!
//! [`TerminalEmitter`] prints for people and [`JsonEmitter`] prints one JSON
//! array for tools and fixture comparison. Both resolve spans to
//! `line:column` when given a [`SourceFile`](crate::SourceFile).

mod json;
mod terminal;

pub use json::JsonEmitter;
pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// A sink for finished diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    /// Emit a batch in order, typically the result of a queue flush.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        diagnostics.iter().for_each(|d| self.emit(d));
    }

    fn flush(&mut self);

    /// Close the output with a count of what was emitted.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
