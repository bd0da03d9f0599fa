//! Line and column lookup for diagnostics.
//!
//! Spans are byte offsets; everything a human reads (the `file:line:col`
//! prefix, fix-it columns) is 1-based and counts characters, not bytes.

use std::fmt;

use sift_ir::Span;

use crate::Substitution;

/// Pre-computed line start offsets for O(log L) line/column lookup.
///
/// # Example
///
/// ```
/// use sift_diagnostic::LineOffsetTable;
///
/// let source = "line1\nline2\nline3";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
/// assert_eq!(table.offset_to_line_col(source, 14), (3, 3));
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineOffsetTable {
    /// `offsets[i]` is the byte offset where line `i + 1` starts.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based (line, column). Columns count characters from the line start.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.line_start_offset(line).unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len());
        let col = source
            .get(line_start..end)
            .map_or(0, |prefix| prefix.chars().count());
        (line, u32::try_from(col).unwrap_or(u32::MAX - 1) + 1)
    }

    /// Byte offset of a 1-based line start, or `None` if out of range.
    pub fn line_start_offset(&self, line: u32) -> Option<u32> {
        if line == 0 {
            return None;
        }
        self.offsets.get((line - 1) as usize).copied()
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// A human-readable source position.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source text plus its line table, as consumed by emitters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceFile {
    path: String,
    text: String,
    lines: LineOffsetTable,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = LineOffsetTable::build(&text);
        SourceFile {
            path: path.into(),
            text,
            lines,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn location(&self, offset: u32) -> SourceLocation {
        let (line, column) = self.lines.offset_to_line_col(&self.text, offset);
        SourceLocation { line, column }
    }

    /// Text of a 1-based line, without its newline.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let start = self.lines.line_start_offset(line)? as usize;
        let end = self
            .lines
            .line_start_offset(line + 1)
            .map_or(self.text.len(), |next| next as usize);
        self.text
            .get(start..end)
            .map(|l| l.trim_end_matches(['\n', '\r']))
    }

    /// Source text covered by `span`, or `""` if the span is out of range.
    pub fn snippet(&self, span: Span) -> &str {
        self.text.get(span.to_range()).unwrap_or("")
    }

    /// Render an edit in the compact `{{start-end=text}}` form.
    ///
    /// Columns are 1-based and the end column is exclusive, so an insertion
    /// at column 16 is `{{16-16=?}}`. Edits spanning lines spell out
    /// `line:col` on both ends.
    pub fn render_edit(&self, edit: &Substitution) -> String {
        let start = self.location(edit.span.start);
        let end = self.location(edit.span.end);
        if start.line == end.line {
            format!("{{{{{}-{}={}}}}}", start.column, end.column, edit.snippet)
        } else {
            format!("{{{{{start}-{end}={}}}}}", edit.snippet)
        }
    }
}
