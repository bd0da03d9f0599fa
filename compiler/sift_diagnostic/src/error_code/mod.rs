//! Error codes for inference diagnostics.
//!
//! Each code is a unique identifier (e.g. `E2001`) usable for lookups and
//! documentation. The first digit is the category:
//! - E2xxx: type-inference failures
//! - E9xxx: internal errors

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Value type does not match the expected type
    E2001,
    /// Wrong number of arguments in a call
    E2002,
    /// Argument labels do not match the parameter labels
    E2003,
    /// Type has no member with the referenced name
    E2004,
    /// Several overloads fit equally well
    E2005,
    /// Several solutions fit equally well, or a type could not be inferred
    E2006,
    /// Optional value used where its wrapped value is required
    E2007,
    /// Expression does not fit its contextual type
    E2008,
    /// Reference to an unavailable declaration
    E2009,
    /// Type that would contain itself
    E2010,
    /// Solver gave up before reaching a verdict
    E2011,
    /// Value called as a function but is not one
    E2012,

    /// Internal error
    E9001,
    /// Too many errors
    E9002,
}

impl ErrorCode {
    /// All variants, for exhaustive testing.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// Check if this is a type-inference error code (E2xxx).
    pub fn is_type_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    /// Check if this is an internal error code (E9xxx).
    pub fn is_internal(&self) -> bool {
        self.as_str().starts_with("E9")
    }

    /// Short human-readable category title.
    pub fn title(&self) -> &'static str {
        match self {
            ErrorCode::E2001 => "type mismatch",
            ErrorCode::E2002 => "argument count mismatch",
            ErrorCode::E2003 => "argument label mismatch",
            ErrorCode::E2004 => "missing member",
            ErrorCode::E2005 => "ambiguous overload",
            ErrorCode::E2006 => "ambiguous inference",
            ErrorCode::E2007 => "optional unwrap required",
            ErrorCode::E2008 => "contextual type mismatch",
            ErrorCode::E2009 => "unavailable declaration",
            ErrorCode::E2010 => "recursive type",
            ErrorCode::E2011 => "incomplete solve",
            ErrorCode::E2012 => "value is not callable",
            ErrorCode::E9001 => "internal error",
            ErrorCode::E9002 => "too many errors",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
