//! JSON output: one array, one object per diagnostic.

use std::fmt::{self, Write as _};
use std::io::Write;

use crate::{Diagnostic, SourceFile};

use super::DiagnosticEmitter;

/// A string with JSON escapes applied, written without allocating.
struct Escaped<'a>(&'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c))?,
                c => f.write_char(c)?,
            }
        }
        Ok(())
    }
}

/// Separator after element `index` of a list of `len`.
fn separator(index: usize, len: usize) -> &'static str {
    if index + 1 < len {
        ","
    } else {
        ""
    }
}

/// JSON emitter for machine-readable output.
///
/// Without a source file, positions are raw byte offsets. With one, each
/// label and edit also carries 1-based `line`/`column`.
pub struct JsonEmitter<'src, W: Write> {
    writer: W,
    first: bool,
    source: Option<&'src SourceFile>,
}

impl<'src, W: Write> JsonEmitter<'src, W> {
    pub fn new(writer: W) -> Self {
        JsonEmitter {
            writer,
            first: true,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: &'src SourceFile) -> Self {
        self.source = Some(source);
        self
    }

    /// Begin the JSON array output.
    pub fn begin(&mut self) {
        let _ = writeln!(self.writer, "[");
    }

    /// End the JSON array output.
    pub fn end(&mut self) {
        let _ = writeln!(self.writer, "\n]");
    }

    fn write_position(&mut self, offset: u32, indent: &str) {
        if let Some(src) = self.source {
            let loc = src.location(offset);
            let _ = writeln!(self.writer, "{indent}\"line\": {},", loc.line);
            let _ = writeln!(self.writer, "{indent}\"column\": {},", loc.column);
        }
    }
}

impl<W: Write> DiagnosticEmitter for JsonEmitter<'_, W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        if !self.first {
            let _ = writeln!(self.writer, ",");
        }
        self.first = false;

        let _ = writeln!(self.writer, "  {{");
        let _ = writeln!(
            self.writer,
            "    \"code\": \"{}\",",
            diagnostic.code.as_str()
        );
        let _ = writeln!(
            self.writer,
            "    \"severity\": \"{}\",",
            diagnostic.severity
        );
        let _ = writeln!(
            self.writer,
            "    \"message\": \"{}\",",
            Escaped(&diagnostic.message)
        );

        let _ = writeln!(self.writer, "    \"labels\": [");
        for (i, label) in diagnostic.labels.iter().enumerate() {
            let comma = separator(i, diagnostic.labels.len());
            let _ = writeln!(self.writer, "      {{");
            self.write_position(label.span.start, "        ");
            let _ = writeln!(self.writer, "        \"start\": {},", label.span.start);
            let _ = writeln!(self.writer, "        \"end\": {},", label.span.end);
            let _ = writeln!(
                self.writer,
                "        \"message\": \"{}\",",
                Escaped(&label.message)
            );
            let _ = writeln!(self.writer, "        \"primary\": {}", label.is_primary);
            let _ = writeln!(self.writer, "      }}{comma}");
        }
        let _ = writeln!(self.writer, "    ],");

        let _ = writeln!(self.writer, "    \"notes\": [");
        for (i, note) in diagnostic.notes.iter().enumerate() {
            let comma = separator(i, diagnostic.notes.len());
            let _ = writeln!(self.writer, "      \"{}\"{}", Escaped(note), comma);
        }
        let _ = writeln!(self.writer, "    ],");

        let _ = writeln!(self.writer, "    \"fixits\": [");
        for (i, fixit) in diagnostic.fixits.iter().enumerate() {
            let comma = separator(i, diagnostic.fixits.len());
            let _ = writeln!(self.writer, "      {{");
            let _ = writeln!(
                self.writer,
                "        \"message\": \"{}\",",
                Escaped(&fixit.message)
            );
            let _ = writeln!(
                self.writer,
                "        \"applicability\": \"{:?}\",",
                fixit.applicability
            );
            let _ = writeln!(self.writer, "        \"edits\": [");
            for (j, edit) in fixit.edits.iter().enumerate() {
                let edit_comma = separator(j, fixit.edits.len());
                let _ = writeln!(self.writer, "          {{");
                self.write_position(edit.span.start, "            ");
                let _ = writeln!(self.writer, "            \"start\": {},", edit.span.start);
                let _ = writeln!(self.writer, "            \"end\": {},", edit.span.end);
                let _ = writeln!(
                    self.writer,
                    "            \"text\": \"{}\"",
                    Escaped(&edit.snippet)
                );
                let _ = writeln!(self.writer, "          }}{edit_comma}");
            }
            let _ = writeln!(self.writer, "        ]");
            let _ = writeln!(self.writer, "      }}{comma}");
        }
        let _ = writeln!(self.writer, "    ]");

        let _ = write!(self.writer, "  }}");
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, _error_count: usize, _warning_count: usize) {
        // The array itself is the summary.
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
