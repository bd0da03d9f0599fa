//! Expression nodes.
//!
//! The shapes mirror what a parser for a Swift-like surface syntax hands to
//! the type checker: calls carry labeled arguments (with the label's own span
//! so fix-its can rewrite just the label), optional chains are split into the
//! `x?` binding and the evaluation node that closes the chain, and `&x` is a
//! node of its own.

use crate::{ExprId, Name, Span};

/// An expression with its source span.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// A call argument: `label: value` or just `value`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallArg {
    pub label: Option<Name>,
    /// Span of the label identifier (without the colon).
    pub label_span: Option<Span>,
    pub value: ExprId,
}

impl CallArg {
    /// An unlabeled argument.
    pub fn positional(value: ExprId) -> Self {
        CallArg {
            label: None,
            label_span: None,
            value,
        }
    }

    /// A labeled argument.
    pub fn labeled(label: Name, label_span: Span, value: ExprId) -> Self {
        CallArg {
            label: Some(label),
            label_span: Some(label_span),
            value,
        }
    }
}

/// A tuple literal element.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TupleElement {
    pub label: Option<Name>,
    pub label_span: Option<Span>,
    pub value: ExprId,
}

impl TupleElement {
    pub fn positional(value: ExprId) -> Self {
        TupleElement {
            label: None,
            label_span: None,
            value,
        }
    }

    pub fn labeled(label: Name, label_span: Span, value: ExprId) -> Self {
        TupleElement {
            label: Some(label),
            label_span: Some(label_span),
            value,
        }
    }
}

/// Expression variants.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// Integer literal: `42`
    Int(i64),
    /// Floating-point literal stored as `f64::to_bits`: `1.0`
    Float(u64),
    /// String literal: `"abc"`
    Str(Name),
    /// Boolean literal
    Bool(bool),
    /// `nil`
    Nil,
    /// Reference to a declared value or type: `f0`, `CurriedClass`
    Ident(Name),
    /// Member access: `base.name`
    Member {
        base: ExprId,
        name: Name,
        name_span: Span,
    },
    /// Member looked up in the contextual type: `.name`
    ImplicitMember { name: Name },
    /// Application of one argument list: `callee(args)`.
    ///
    /// Curried calls nest: `f(1)(b: 2)` is a call whose callee is a call.
    Call { callee: ExprId, args: Vec<CallArg> },
    /// Tuple literal: `(a, b: c)`
    Tuple(Vec<TupleElement>),
    /// Array literal: `[a, b]`
    Array(Vec<ExprId>),
    /// Subscript: `base[index]`
    Subscript { base: ExprId, index: ExprId },
    /// Optional binding inside a chain: `x?`
    BindOptional(ExprId),
    /// Root of an optional chain; wraps the chain result back into an optional.
    OptionalEvaluation(ExprId),
    /// Force unwrap: `x!`
    ForceUnwrap(ExprId),
    /// Address-of for in-out arguments: `&x`
    InOut(ExprId),
    /// Assignment: `target = value`
    Assign { target: ExprId, value: ExprId },
    /// Binary operator application: `lhs op rhs`
    Binary {
        op: Name,
        op_span: Span,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// Prefix operator application: `op operand`
    Unary {
        op: Name,
        op_span: Span,
        operand: ExprId,
    },
    /// Ternary conditional: `cond ? then_expr : else_expr`
    Ternary {
        cond: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    /// Single-expression closure: `{ $0 + $1 }` or `{ _ in body }`.
    ///
    /// `params` is the closure's arity: the explicit parameter count, or
    /// one more than the highest `$N` the body uses.
    Closure { params: u32, body: ExprId },
    /// Anonymous closure parameter `$N` of the innermost enclosing closure.
    ClosureParam(u32),
}
