//! Failures and relaxations recorded while solving.
//!
//! The solver never stops at the first problem. It records a [`Failure`]
//! and keeps going with a best-effort binding, so that every attempt ends
//! with a complete picture the diagnoser can rank. Some failures are
//! relaxations (the solver assumed a label or an unwrap the user will have
//! to write); those count as fixes rather than hard failures when attempts
//! are scored.

use sift_ir::{ExprId, Name, Span};

use crate::constraint::{LabelIssue, LiteralKind, Locator};
use crate::ty::{Param, Type};

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum FailureKind {
    // ════════════════════════════════════════════════════════════════
    // Conversions
    // ════════════════════════════════════════════════════════════════
    /// `from` does not convert to `to`.
    Mismatch { from: Type, to: Type },

    /// A literal was bound to a type that cannot express it.
    LiteralMismatch {
        literal: LiteralKind,
        to: Type,
        expr: ExprId,
    },

    /// Tuples with different element counts.
    TupleArity { from: Type, to: Type },

    /// `ty` lacks a conformance a generic parameter requires.
    NoConformance { ty: Type, protocol: Name },

    // ════════════════════════════════════════════════════════════════
    // Calls
    // ════════════════════════════════════════════════════════════════
    ExtraArgument {
        call: ExprId,
        label: Option<Name>,
        /// The callee takes no arguments at all.
        takes_none: bool,
    },

    MissingArgument {
        call: ExprId,
        param_index: usize,
        label: Option<Name>,
    },

    Label(LabelIssue),

    /// In-out parameter given a plain value: insert `&`.
    MissingInOut { ty: Type, insert_at: u32 },

    /// `&` on a by-value parameter: remove it.
    ExtraInOut { ty: Type, amp: Span },

    NotCallable { ty: Type },

    // ════════════════════════════════════════════════════════════════
    // Closures
    // ════════════════════════════════════════════════════════════════
    /// The closure's parameter count differs from its contextual type's.
    ClosureArity {
        contextual: Type,
        expected: usize,
        used: usize,
    },

    /// Nothing determined the type a closure returns.
    ClosureResultUnresolved,

    /// Nothing determined the type of closure parameter `$index`.
    ClosureParamUnresolved { index: u32 },

    // ════════════════════════════════════════════════════════════════
    // Members and names
    // ════════════════════════════════════════════════════════════════
    MissingMember {
        ty: Type,
        name: Name,
        /// Looked up on the type itself rather than on a value.
        on_type: bool,
    },

    NoSubscript { ty: Type },

    /// A nullary function used as if it were its result: insert `()`.
    MethodAsProperty {
        name: Name,
        is_method: bool,
        insert_at: u32,
    },

    /// `.member` naming something that needs arguments.
    ContextualMemberArgs { name: Name, params: Vec<Param> },

    /// `.member` with no contextual type to look it up in.
    UnresolvedImplicitMember { name: Name },

    UnresolvedIdentifier { name: Name },

    UnresolvedOperator { op: Name },

    Unavailable { name: Name, message: String },

    // ════════════════════════════════════════════════════════════════
    // Optionals
    // ════════════════════════════════════════════════════════════════
    /// Optional used where its wrapped value is needed: insert `?` or `!`.
    UnwrapRequired {
        optional: Type,
        insert_at: u32,
        suggestion: char,
    },

    /// `x!` on a non-optional: remove the `!`.
    ForceUnwrapNonOptional { ty: Type, bang: Span },

    /// `x?` on a non-optional: remove the `?`.
    ChainingNonOptional { ty: Type, question: Span },

    // ════════════════════════════════════════════════════════════════
    // Underdetermined
    // ════════════════════════════════════════════════════════════════
    CouldNotInfer { param: Name, decl: Name },

    NilRequiresContext,

    /// Nothing determined the type of the expression.
    Underdetermined,
}

impl FailureKind {
    /// Whether the solver continued by assuming an edit the user must make.
    ///
    /// Relaxations rank below hard failures when attempts are compared.
    pub fn is_relaxation(&self) -> bool {
        matches!(
            self,
            FailureKind::Label(_)
                | FailureKind::MissingInOut { .. }
                | FailureKind::ExtraInOut { .. }
                | FailureKind::MethodAsProperty { .. }
                | FailureKind::UnwrapRequired { .. }
                | FailureKind::ForceUnwrapNonOptional { .. }
                | FailureKind::ChainingNonOptional { .. }
        )
    }
}

/// A failure with the location it was recorded at.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Failure {
    pub kind: FailureKind,
    pub locator: Locator,
    /// Where to point the diagnostic.
    pub span: Span,
}

impl Failure {
    pub fn new(kind: FailureKind, locator: Locator, span: Span) -> Self {
        Failure {
            kind,
            locator,
            span,
        }
    }

    pub fn is_relaxation(&self) -> bool {
        self.kind.is_relaxation()
    }
}
