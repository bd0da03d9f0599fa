//! Arena storage for expressions.

use crate::{CallArg, Expr, ExprId, ExprKind, Name, Span, TupleElement};

/// Contiguous storage for all expressions of one compilation unit.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        ExprArena { exprs: Vec::new() }
    }

    /// Allocate an expression, returning its ID.
    ///
    /// # Panics
    /// Panics if the arena holds more than `u32::MAX - 1` expressions.
    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let index = u32::try_from(self.exprs.len())
            .ok()
            .filter(|&i| i != u32::MAX)
            .unwrap_or_else(|| panic!("expression arena overflow"));
        self.exprs.push(Expr::new(kind, span));
        ExprId::new(index)
    }

    /// Get an expression by ID.
    ///
    /// # Panics
    /// Panics if the ID does not belong to this arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// Get an expression by ID, or `None` for foreign/invalid IDs.
    #[inline]
    pub fn try_get(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    /// The span of an expression.
    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.get(id).span
    }

    /// The kind of an expression.
    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.get(id).kind
    }

    /// Number of expressions.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// Direct children of an expression, in source order.
    pub fn children(&self, id: ExprId) -> Vec<ExprId> {
        match self.kind(id) {
            ExprKind::Int(_)
            | ExprKind::Float(_)
            | ExprKind::Str(_)
            | ExprKind::Bool(_)
            | ExprKind::Nil
            | ExprKind::Ident(_)
            | ExprKind::ImplicitMember { .. }
            | ExprKind::ClosureParam(_) => Vec::new(),
            ExprKind::Member { base, .. } => vec![*base],
            ExprKind::Call { callee, args } => std::iter::once(*callee)
                .chain(args.iter().map(|a| a.value))
                .collect(),
            ExprKind::Tuple(elems) => elems.iter().map(|e| e.value).collect(),
            ExprKind::Array(elems) => elems.clone(),
            ExprKind::Subscript { base, index } => vec![*base, *index],
            ExprKind::BindOptional(inner)
            | ExprKind::OptionalEvaluation(inner)
            | ExprKind::ForceUnwrap(inner)
            | ExprKind::InOut(inner)
            | ExprKind::Closure { body: inner, .. } => vec![*inner],
            ExprKind::Assign { target, value } => vec![*target, *value],
            ExprKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            ExprKind::Unary { operand, .. } => vec![*operand],
            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => vec![*cond, *then_expr, *else_expr],
        }
    }

    // Convenience constructors used by tree builders.

    pub fn int(&mut self, value: i64, span: Span) -> ExprId {
        self.alloc(ExprKind::Int(value), span)
    }

    pub fn float(&mut self, value: f64, span: Span) -> ExprId {
        self.alloc(ExprKind::Float(value.to_bits()), span)
    }

    pub fn ident(&mut self, name: Name, span: Span) -> ExprId {
        self.alloc(ExprKind::Ident(name), span)
    }

    pub fn member(&mut self, base: ExprId, name: Name, name_span: Span) -> ExprId {
        let span = self.span(base).merge(name_span);
        self.alloc(
            ExprKind::Member {
                base,
                name,
                name_span,
            },
            span,
        )
    }

    /// Allocate a call. `span` covers the callee through the closing paren.
    pub fn call(&mut self, callee: ExprId, args: Vec<CallArg>, span: Span) -> ExprId {
        self.alloc(ExprKind::Call { callee, args }, span)
    }

    pub fn tuple(&mut self, elems: Vec<TupleElement>, span: Span) -> ExprId {
        self.alloc(ExprKind::Tuple(elems), span)
    }

    /// Allocate a closure. `span` covers the braces.
    pub fn closure(&mut self, params: u32, body: ExprId, span: Span) -> ExprId {
        self.alloc(ExprKind::Closure { params, body }, span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StringInterner;

    #[test]
    fn alloc_and_children() {
        let interner = StringInterner::new();
        let mut arena = ExprArena::new();
        let f = arena.ident(interner.intern("f"), Span::new(0, 1));
        let a = arena.int(1, Span::new(2, 3));
        let b = arena.int(2, Span::new(8, 9));
        let call = arena.call(
            f,
            vec![
                CallArg::positional(a),
                CallArg::labeled(interner.intern("b"), Span::new(5, 6), b),
            ],
            Span::new(0, 10),
        );

        assert_eq!(arena.len(), 4);
        assert_eq!(arena.children(call), vec![f, a, b]);
        assert!(arena.children(a).is_empty());
        assert_eq!(arena.span(call), Span::new(0, 10));
    }

    #[test]
    fn member_span_covers_base_and_name() {
        let interner = StringInterner::new();
        let mut arena = ExprArena::new();
        let base = arena.ident(interner.intern("i"), Span::new(0, 1));
        let member = arena.member(base, interner.intern("wobble"), Span::new(2, 8));
        assert_eq!(arena.span(member), Span::new(0, 8));
    }

    #[test]
    fn closure_body_is_its_only_child() {
        let mut arena = ExprArena::new();
        let param = arena.alloc(ExprKind::ClosureParam(0), Span::new(2, 4));
        let closure = arena.closure(1, param, Span::new(0, 6));
        assert_eq!(arena.children(closure), vec![param]);
        assert!(arena.children(param).is_empty());
    }

    #[test]
    fn try_get_rejects_invalid() {
        let arena = ExprArena::new();
        assert!(arena.try_get(ExprId::INVALID).is_none());
    }
}
