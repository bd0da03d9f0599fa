//! Source location spans.
//!
//! Compact 8-byte byte-offset spans. Line and column are derived on demand by
//! the diagnostic crate; the IR never stores them.

use std::fmt;

/// Error when creating a span from a range that exceeds `u32::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanError {
    /// Span start position exceeds `u32::MAX`.
    StartTooLarge(usize),
    /// Span end position exceeds `u32::MAX`.
    EndTooLarge(usize),
}

impl fmt::Display for SpanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanError::StartTooLarge(v) => write!(f, "span start {v} exceeds u32::MAX"),
            SpanError::EndTooLarge(v) => write!(f, "span end {v} exceeds u32::MAX"),
        }
    }
}

impl std::error::Error for SpanError {}

/// Source location span.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from file start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for synthesized nodes.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Try to create a span from a byte range.
    #[inline]
    pub fn try_from_range(range: std::ops::Range<usize>) -> Result<Self, SpanError> {
        let start =
            u32::try_from(range.start).map_err(|_| SpanError::StartTooLarge(range.start))?;
        let end = u32::try_from(range.end).map_err(|_| SpanError::EndTooLarge(range.end))?;
        Ok(Span { start, end })
    }

    /// Length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if another span is fully contained within this span.
    #[inline]
    pub fn contains_span(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Merge two spans to create one covering both.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Create a point span (zero-length), used for insertion fix-its.
    #[inline]
    pub const fn point(offset: u32) -> Span {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Zero-length span at the start of this span.
    #[inline]
    pub const fn start_point(self) -> Span {
        Span::point(self.start)
    }

    /// Zero-length span at the end of this span.
    #[inline]
    pub const fn end_point(self) -> Span {
        Span::point(self.end)
    }

    /// Convert to a `std::ops::Range`.
    #[inline]
    pub fn to_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::Span;
    crate::static_assert_size!(Span, 8);
}
