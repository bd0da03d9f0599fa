//! Terminal Emitter
//!
//! Human-readable diagnostic output with optional ANSI color support.
//! With a [`SourceFile`] attached, spans print as `path:line:col` and
//! fix-its print their edits in `{{start-end=text}}` form.

use std::io::Write;

use sift_ir::Span;

use crate::{Diagnostic, Severity, SourceFile};

use super::DiagnosticEmitter;

mod colors {
    pub const ERROR: &str = "\x1b[1;31m"; // Bold red
    pub const WARNING: &str = "\x1b[1;33m"; // Bold yellow
    pub const NOTE: &str = "\x1b[1;36m"; // Bold cyan
    pub const FIX: &str = "\x1b[1;32m"; // Bold green
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m"; // Bold blue
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode for terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Use colors when writing to a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// Resolve to a boolean. `is_tty` only matters for `Auto`.
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Terminal emitter with optional color support.
pub struct TerminalEmitter<'src, W: Write> {
    writer: W,
    colors: bool,
    source: Option<&'src SourceFile>,
}

impl<'src, W: Write> TerminalEmitter<'src, W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Resolve spans against `source` when printing.
    #[must_use]
    pub fn with_source(mut self, source: &'src SourceFile) -> Self {
        self.source = Some(source);
        self
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        self.write_colored(&severity.to_string(), color);
    }

    fn write_code(&mut self, code: &str) {
        self.write_colored(&format!("[{code}]"), colors::BOLD);
    }

    fn location(&self, span: Span) -> String {
        match self.source {
            Some(src) => format!("{}:{}", src.path(), src.location(span.start)),
            None => format!("{span:?}"),
        }
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        // Header: severity[CODE]: message
        self.write_severity(diagnostic.severity);
        self.write_code(diagnostic.code.as_str());
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let location = self.location(label.span);
            let _ = write!(self.writer, "  {marker} {location}: ");
            let color = if label.is_primary {
                colors::ERROR
            } else {
                colors::SECONDARY
            };
            self.write_colored(&label.message, color);
            let _ = writeln!(self.writer);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::NOTE);
            let _ = writeln!(self.writer, ": {note}");
        }

        for fixit in &diagnostic.fixits {
            let _ = write!(self.writer, "  = ");
            self.write_colored("fix", colors::FIX);
            let _ = write!(self.writer, ": {}", fixit.message);
            if let Some(src) = self.source {
                for edit in &fixit.edits {
                    let _ = write!(self.writer, " {}", src.render_edit(edit));
                }
            }
            let _ = writeln!(self.writer);
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count == 0 && warning_count == 0 {
            return;
        }
        let mut parts = Vec::new();
        if error_count > 0 {
            parts.push(format!("{error_count} error{}", plural_s(error_count)));
        }
        if warning_count > 0 {
            parts.push(format!(
                "{warning_count} warning{}",
                plural_s(warning_count)
            ));
        }
        let summary = format!("type checking failed: {}", parts.join(", "));
        if error_count > 0 {
            self.write_colored(&summary, colors::ERROR);
        } else {
            self.write_colored(&summary, colors::WARNING);
        }
        let _ = writeln!(self.writer);
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
