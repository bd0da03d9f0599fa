//! Diagnostic queue for collecting, deduplicating, and sorting diagnostics.
//!
//! - Error limit so a badly broken file doesn't bury the first error
//! - One diagnostic per primary span; the first one reported wins
//! - Stable source-order flush
//! - `ErrorGuaranteed` proof that errors were emitted

use rustc_hash::FxHashSet;
use sift_ir::Span;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors before stopping (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics whose primary span already has one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 20,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// A config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting, deduplicating, and sorting diagnostics.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    /// Whether the too-many-errors diagnostic has been queued.
    limit_reported: bool,
    /// Primary spans already reported.
    seen: FxHashSet<Span>,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            limit_reported: false,
            seen: FxHashSet::default(),
            config,
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if it was queued, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();

        if is_error && self.limit_reached() {
            if !self.limit_reported {
                self.limit_reported = true;
                let span = diag.primary_span().unwrap_or_default();
                self.diagnostics
                    .push(too_many_errors(self.config.error_limit, span));
            }
            return false;
        }

        if self.config.deduplicate {
            if let Some(span) = diag.primary_span() {
                if !self.seen.insert(span) {
                    return false;
                }
            }
        }

        if is_error {
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// A filtered duplicate still yields proof: an error at the same
    /// span is already in the queue.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error(), "emit_error called with {}", diag.severity);
        self.add(diag);
        ErrorGuaranteed::new()
    }

    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Proof that errors were emitted, if any were.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Sort diagnostics by primary span and return them, clearing the queue.
    ///
    /// The sort is stable: diagnostics at the same position keep their
    /// emission order. Diagnostics without a span sort last.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| d.primary_span().map_or((1, 0, 0), |s| (0, s.start, s.end)));

        self.error_count = 0;
        self.limit_reported = false;
        self.seen.clear();

        result
    }

    /// Queued diagnostics in emission order, without clearing.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E9002)
        .with_message(format!("aborting after {limit} errors"))
        .with_label(span, "error limit reached here")
        .with_note("raise `DiagnosticConfig::error_limit` to see more")
}
