//! Proof that an error diagnostic was emitted.

use std::fmt;

/// Zero-sized proof that at least one error reached the queue.
///
/// Only the queue hands these out, so a function returning
/// `Result<T, ErrorGuaranteed>` cannot fail without reporting.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Proof from an error count; `None` when nothing was emitted.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
