//! Constraints and the graph they live in.
//!
//! [`ConstraintGen`] walks an expression tree once and fills a
//! [`ConstraintGraph`]; the solver then works through the graph's
//! constraints. Every constraint carries a [`Locator`] naming the
//! expression it came from and the path inside that expression, which is
//! what the failure diagnoser uses to decide where and how to report.

mod gen;
mod graph;
mod literal;

pub use gen::ConstraintGen;
pub use graph::{CallKind, CallSite, ClosureSlot, ConstraintGraph, LiteralSlot};
pub use literal::LiteralKind;

use sift_ir::{ExprId, Name, Span};
use smallvec::SmallVec;

use crate::env::{GenericParam, MemberDecl, MemberKind, ValueDecl, ValueKind};
use crate::ty::{Type, TypeVar};

/// One step from an anchor expression towards the constrained position.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LocatorElem {
    /// The application of one argument list; `layer` counts from the
    /// innermost callee of a curried chain.
    ApplyFunction { layer: u32 },
    /// The `index`th argument of `call`.
    ApplyArgument { call: ExprId, index: u32 },
    /// Conversion of the whole expression to its contextual type.
    ContextualType,
    /// Conversion of an assigned value to the assignment target.
    AssignSource,
    /// The two result branches of `? :`.
    TernaryBranches,
    /// The condition of `? :`.
    Condition,
    TupleElement(u32),
    ArrayElement(u32),
    SubscriptIndex,
    Member,
    /// `x!` or `x?`.
    OptionalObject,
    /// Binding an overload set to one of its candidates.
    OverloadChoice,
    /// The `n`th generic parameter of the chosen declaration.
    GenericParam(u32),
}

impl LocatorElem {
    /// Whether this element names the conversion a failure belongs to.
    pub fn is_conversion_context(self) -> bool {
        matches!(
            self,
            LocatorElem::ApplyArgument { .. }
                | LocatorElem::ContextualType
                | LocatorElem::AssignSource
                | LocatorElem::TernaryBranches
                | LocatorElem::Condition
                | LocatorElem::ArrayElement(_)
                | LocatorElem::SubscriptIndex
        )
    }
}

/// Where a constraint came from: an anchor expression plus a path into it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Locator {
    pub anchor: ExprId,
    pub path: SmallVec<[LocatorElem; 4]>,
}

impl Locator {
    pub fn new(anchor: ExprId) -> Self {
        Locator {
            anchor,
            path: SmallVec::new(),
        }
    }

    /// This locator extended by one element.
    #[must_use]
    pub fn with(&self, elem: LocatorElem) -> Self {
        let mut path = self.path.clone();
        path.push(elem);
        Locator {
            anchor: self.anchor,
            path,
        }
    }

    /// The first element describing which conversion this is.
    pub fn conversion_context(&self) -> Option<LocatorElem> {
        self.path.iter().copied().find(|e| e.is_conversion_context())
    }

    pub fn last(&self) -> Option<LocatorElem> {
        self.path.last().copied()
    }

    /// The call this locator points into, if any.
    pub fn call(&self) -> Option<ExprId> {
        self.path.iter().find_map(|e| match e {
            LocatorElem::ApplyArgument { call, .. } => Some(*call),
            _ => None,
        })
    }
}

/// A declaration an overload set may resolve to.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Candidate {
    /// Name used in diagnostics (the type name for initializers).
    pub name: Name,
    pub kind: CandidateKind,
    pub ty: Type,
    pub generics: Vec<GenericParam>,
    pub unavailable: Option<String>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CandidateKind {
    Function,
    Variable,
    Operator,
    Property,
    Method,
    StaticMethod,
    Case,
    Initializer,
}

impl Candidate {
    pub fn from_value(decl: &ValueDecl) -> Self {
        let kind = match decl.kind {
            ValueKind::Function => CandidateKind::Function,
            ValueKind::Variable => CandidateKind::Variable,
            ValueKind::Operator => CandidateKind::Operator,
        };
        Candidate {
            name: decl.name,
            kind,
            ty: decl.ty.clone(),
            generics: decl.generics.clone(),
            unavailable: decl.unavailable.clone(),
        }
    }

    pub fn from_member(decl: &MemberDecl, display_name: Name) -> Self {
        let kind = match decl.kind {
            MemberKind::Property => CandidateKind::Property,
            MemberKind::Method => CandidateKind::Method,
            MemberKind::StaticMethod => CandidateKind::StaticMethod,
            MemberKind::Case => CandidateKind::Case,
            MemberKind::Initializer => CandidateKind::Initializer,
        };
        Candidate {
            name: display_name,
            kind,
            ty: decl.ty.clone(),
            generics: decl.generics.clone(),
            unavailable: decl.unavailable.clone(),
        }
    }

    /// The parameters of the outermost layer, if the candidate is a function.
    pub fn params(&self) -> Option<&[crate::ty::Param]> {
        match &self.ty {
            Type::Function { params, .. } => Some(params),
            _ => None,
        }
    }
}

/// One argument of one call layer.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Argument {
    pub label: Option<Name>,
    pub label_span: Option<Span>,
    /// Type of the argument value (the operand of `&` for in-out arguments).
    pub ty: Type,
    /// The argument expression as written, `&x` included.
    pub expr: ExprId,
    /// Span of the `&` when the argument is written `&x`.
    pub inout_span: Option<Span>,
}

/// One call layer: `callee(args) -> result`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ArgumentMatch {
    pub call: ExprId,
    pub layer: u32,
    pub callee: Type,
    pub args: Vec<Argument>,
    pub result: Type,
}

/// An overload set: `var` becomes the type of one candidate.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct OverloadSet {
    pub var: TypeVar,
    /// The expression that refers to the overloaded name.
    pub owner: ExprId,
    pub candidates: Vec<Candidate>,
}

/// A label that does not match, and the edit that fixes it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LabelIssue {
    /// The parameter has a label the argument omits.
    Missing { expected: Name, insert_at: u32 },
    /// Both have labels and they differ.
    Wrong {
        have: Name,
        expected: Name,
        label_span: Span,
    },
    /// The argument has a label the parameter does not.
    Extraneous { have: Name, remove: Span },
    /// Tuple positions match but element labels differ.
    Tuple {
        from: Type,
        to: Type,
        /// Written labels to rewrite: label span and the expected label.
        relabel: Vec<(Span, Name)>,
    },
    /// Function types whose parameter labels differ in one call layer.
    Function {
        /// Curried layer, counting from the outermost parameter list.
        layer: u32,
        have: Name,
        expected: Name,
    },
}

/// Member lookup deferred until the base type is known.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemberLookup {
    pub base: Type,
    pub name: Name,
    pub result: Type,
    /// The member expression.
    pub expr: ExprId,
    /// The base expression; `None` for implicit members.
    pub base_expr: Option<ExprId>,
    /// Span of the member name.
    pub name_span: Span,
    pub implicit: bool,
    /// Whether the member is immediately applied to arguments.
    pub called: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnwrapKind {
    /// `x!`
    Force,
    /// `x?`
    Chain,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConstraintKind {
    /// Both sides are the same type.
    Equal(Type, Type),
    /// `from` converts to `to`: equality plus value-to-optional promotion.
    Convert { from: Type, to: Type },
    Conforms { ty: Type, protocol: Name },
    ArgumentMatch(ArgumentMatch),
    Overload(OverloadSet),
    /// Marker emitted when positions match but labels differ.
    LabelMismatch(LabelIssue),
    Member(MemberLookup),
    Subscript {
        base: Type,
        index: Type,
        result: Type,
        base_expr: ExprId,
        index_expr: ExprId,
    },
    OptionalObject {
        optional: Type,
        object: Type,
        expr: ExprId,
        unwrap: UnwrapKind,
    },
    /// A literal placeholder, bound to its preferred type if nothing else
    /// decides it.
    Defaultable { var: TypeVar, kind: LiteralKind },
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub locator: Locator,
    pub span: Span,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, locator: Locator, span: Span) -> Self {
        Constraint {
            kind,
            locator,
            span,
        }
    }
}

#[cfg(test)]
mod tests;
