//! Error taxonomy.
//!
//! [`TypeErrorKind`] classifies every diagnostic the checker emits and fixes
//! its error code. [`SolveError`] covers the internal ways a solve can end
//! without a verdict; the checker turns those into diagnostics too, so
//! nothing here ever reaches the caller as a panic.

use sift_diagnostic::ErrorCode;

/// The category of a reported inference failure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeErrorKind {
    /// A value's type cannot be converted to the required type.
    TypeMismatch,
    /// Too many or too few arguments, or tuples of different sizes.
    ArityMismatch,
    /// Argument count matches but a label differs.
    LabelMismatch,
    /// Member lookup failed, or the member was used the wrong way.
    MissingMember,
    /// Several overloads fit equally well.
    AmbiguousOverload,
    /// A type could not be determined from the expression.
    AmbiguousInference,
    /// An optional is used where its wrapped value is required, or an
    /// unwrap is applied to a non-optional.
    OptionalUnwrapRequired,
    /// The expression does not produce what its context expects.
    ContextualMismatch,
    /// The expression calls something that is not a function.
    NotCallable,
    /// Reference to a declaration marked unavailable.
    UnavailableSymbol,
    /// Substitution did not terminate within the depth limit.
    RecursiveTypeError,
    /// The solver ran out of budget.
    IncompleteSolve,
}

impl TypeErrorKind {
    pub const ALL: &[TypeErrorKind] = &[
        TypeErrorKind::TypeMismatch,
        TypeErrorKind::ArityMismatch,
        TypeErrorKind::LabelMismatch,
        TypeErrorKind::MissingMember,
        TypeErrorKind::AmbiguousOverload,
        TypeErrorKind::AmbiguousInference,
        TypeErrorKind::OptionalUnwrapRequired,
        TypeErrorKind::ContextualMismatch,
        TypeErrorKind::NotCallable,
        TypeErrorKind::UnavailableSymbol,
        TypeErrorKind::RecursiveTypeError,
        TypeErrorKind::IncompleteSolve,
    ];

    /// The stable error code for this category.
    pub fn code(self) -> ErrorCode {
        match self {
            TypeErrorKind::TypeMismatch => ErrorCode::E2001,
            TypeErrorKind::ArityMismatch => ErrorCode::E2002,
            TypeErrorKind::LabelMismatch => ErrorCode::E2003,
            TypeErrorKind::MissingMember => ErrorCode::E2004,
            TypeErrorKind::AmbiguousOverload => ErrorCode::E2005,
            TypeErrorKind::AmbiguousInference => ErrorCode::E2006,
            TypeErrorKind::OptionalUnwrapRequired => ErrorCode::E2007,
            TypeErrorKind::ContextualMismatch => ErrorCode::E2008,
            TypeErrorKind::UnavailableSymbol => ErrorCode::E2009,
            TypeErrorKind::RecursiveTypeError => ErrorCode::E2010,
            TypeErrorKind::IncompleteSolve => ErrorCode::E2011,
            TypeErrorKind::NotCallable => ErrorCode::E2012,
        }
    }
}

/// A solve that ended without a verdict.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SolveError {
    /// More constraints were processed than the step budget allows.
    #[error("solver exceeded its budget of {budget} steps")]
    StepBudgetExceeded { budget: u32 },

    /// Overload choices nested deeper than the backtracking limit.
    #[error("solver exceeded the backtracking depth limit of {limit}")]
    BacktrackLimitExceeded { limit: u32 },

    /// Substituting bindings did not bottom out within the depth limit.
    #[error("type substitution exceeded depth {limit}")]
    RecursiveType { limit: u32 },
}

impl SolveError {
    /// The diagnostic category this error is reported under.
    pub fn kind(&self) -> TypeErrorKind {
        match self {
            SolveError::StepBudgetExceeded { .. } | SolveError::BacktrackLimitExceeded { .. } => {
                TypeErrorKind::IncompleteSolve
            }
            SolveError::RecursiveType { .. } => TypeErrorKind::RecursiveTypeError,
        }
    }
}
