//! Expression IDs for the flat expression tree.

use std::fmt;

/// Index into the expression arena.
///
/// 4 bytes, O(1) equality, and contiguous storage instead of `Box<Expr>`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    /// Invalid expression ID (sentinel value).
    pub const INVALID: ExprId = ExprId(u32::MAX);

    /// Create a new `ExprId`.
    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Check if this is a valid ID.
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for ExprId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "ExprId({})", self.0)
        } else {
            write!(f, "ExprId::INVALID")
        }
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::INVALID
    }
}
