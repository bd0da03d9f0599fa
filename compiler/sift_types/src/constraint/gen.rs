//! Constraint generation.
//!
//! One traversal of the expression tree. Each node gets a type (often a
//! fresh variable) recorded in the graph, and the constraints relating it to
//! its children. Nothing is solved here; the only failures recorded are
//! names that resolve to nothing at all.

use rustc_hash::FxHashMap;
use sift_ir::{CallArg, ExprArena, ExprId, ExprKind, Name, Span};

use super::{
    Argument, ArgumentMatch, CallKind, CallSite, Candidate, ClosureSlot, Constraint, ConstraintGraph,
    ConstraintKind, LiteralKind, LiteralSlot, Locator, LocatorElem, MemberLookup, OverloadSet,
    UnwrapKind,
};
use crate::check::CheckContext;
use crate::env::{Env, ValueDecl};
use crate::failure::{Failure, FailureKind};
use crate::stack::ensure_sufficient_stack;
use crate::ty::{Param, TupleElem, Type};

/// Builds the [`ConstraintGraph`] for one expression.
pub struct ConstraintGen<'a> {
    env: &'a Env,
    arena: &'a ExprArena,
    graph: ConstraintGraph,
    /// Base variable of each `.member` expression; a call of the member
    /// produces that type.
    implicit_bases: FxHashMap<ExprId, Type>,
    /// Parameter types of the closures being visited, innermost last.
    closure_params: Vec<Vec<Type>>,
}

impl<'a> ConstraintGen<'a> {
    /// Generate constraints for the tree rooted at `root`.
    #[tracing::instrument(level = "debug", skip_all, fields(root = ?root))]
    pub fn generate(
        env: &'a Env,
        arena: &'a ExprArena,
        root: ExprId,
        cx: &CheckContext,
    ) -> ConstraintGraph {
        let mut gen = ConstraintGen {
            env,
            arena,
            graph: ConstraintGraph::new(root),
            implicit_bases: FxHashMap::default(),
            closure_params: Vec::new(),
        };
        let ty = gen.visit(root, 0, false);
        if let Some(contextual) = &cx.contextual {
            gen.add(
                ConstraintKind::Convert {
                    from: ty,
                    to: contextual.clone(),
                },
                Locator::new(root).with(LocatorElem::ContextualType),
                arena.span(root),
            );
        }
        tracing::debug!(
            constraints = gen.graph.constraints().len(),
            vars = gen.graph.var_count(),
            "generated constraints"
        );
        gen.graph
    }

    fn add(&mut self, kind: ConstraintKind, locator: Locator, span: Span) {
        self.graph.add(Constraint::new(kind, locator, span));
    }

    fn fresh(&mut self) -> Type {
        Type::Var(self.graph.fresh_var())
    }

    fn enter(&mut self, id: ExprId, depth: u32) {
        self.graph.record_depth(id, depth);
        for child in self.arena.children(id) {
            self.graph.record_parent(child, id);
        }
    }

    fn visit(&mut self, id: ExprId, depth: u32, called: bool) -> Type {
        ensure_sufficient_stack(|| {
            self.enter(id, depth);
            let ty = self.visit_kind(id, depth, called);
            self.graph.record_type(id, ty.clone());
            ty
        })
    }

    fn visit_kind(&mut self, id: ExprId, depth: u32, called: bool) -> Type {
        let arena = self.arena;
        let span = arena.span(id);
        match arena.kind(id) {
            ExprKind::Int(_) => self.literal(id, LiteralKind::Integer),
            ExprKind::Float(_) => self.literal(id, LiteralKind::Float),
            ExprKind::Str(_) => self.literal(id, LiteralKind::String),
            ExprKind::Nil => self.literal(id, LiteralKind::Nil),
            ExprKind::Bool(_) => Type::bool(),

            ExprKind::Ident(name) => self.ident(id, *name, span),

            ExprKind::Member {
                base,
                name,
                name_span,
            } => {
                let (base, name, name_span) = (*base, *name, *name_span);
                let base_ty = self.visit(base, depth + 1, false);
                let result = self.fresh();
                self.add(
                    ConstraintKind::Member(MemberLookup {
                        base: base_ty,
                        name,
                        result: result.clone(),
                        expr: id,
                        base_expr: Some(base),
                        name_span,
                        implicit: false,
                        called,
                    }),
                    Locator::new(id).with(LocatorElem::Member),
                    name_span,
                );
                result
            }

            ExprKind::ImplicitMember { name } => {
                let name = *name;
                let base = self.fresh();
                let result = self.fresh();
                self.add(
                    ConstraintKind::Member(MemberLookup {
                        base: Type::metatype(base.clone()),
                        name,
                        result: result.clone(),
                        expr: id,
                        base_expr: None,
                        name_span: span,
                        implicit: true,
                        called,
                    }),
                    Locator::new(id).with(LocatorElem::Member),
                    span,
                );
                if !called {
                    self.add(
                        ConstraintKind::Equal(result.clone(), base.clone()),
                        Locator::new(id),
                        span,
                    );
                }
                self.implicit_bases.insert(id, base);
                result
            }

            ExprKind::Call { callee, args } => {
                self.call(id, *callee, args, depth, span)
            }

            ExprKind::Tuple(elems) => {
                let tys = elems
                    .iter()
                    .map(|e| TupleElem {
                        label: e.label,
                        ty: self.visit(e.value, depth + 1, false),
                    })
                    .collect();
                Type::Tuple(tys)
            }

            ExprKind::Array(elems) => {
                let elem = self.fresh();
                for (i, value) in elems.iter().enumerate() {
                    let ty = self.visit(*value, depth + 1, false);
                    self.add(
                        ConstraintKind::Convert {
                            from: ty,
                            to: elem.clone(),
                        },
                        Locator::new(*value).with(LocatorElem::ArrayElement(index_u32(i))),
                        arena.span(*value),
                    );
                }
                self.env.array_of(elem)
            }

            ExprKind::Subscript { base, index } => {
                let (base, index) = (*base, *index);
                let base_ty = self.visit(base, depth + 1, false);
                let index_ty = self.visit(index, depth + 1, false);
                let result = self.fresh();
                self.add(
                    ConstraintKind::Subscript {
                        base: base_ty,
                        index: index_ty,
                        result: result.clone(),
                        base_expr: base,
                        index_expr: index,
                    },
                    Locator::new(id),
                    span,
                );
                result
            }

            ExprKind::BindOptional(inner) => self.unwrap(id, *inner, UnwrapKind::Chain, depth),
            ExprKind::ForceUnwrap(inner) => self.unwrap(id, *inner, UnwrapKind::Force, depth),

            ExprKind::OptionalEvaluation(inner) => match self.visit(*inner, depth + 1, false) {
                ty @ Type::Optional(_) => ty,
                ty => Type::optional(ty),
            },

            // Outside an argument list `&x` is just `x`.
            ExprKind::InOut(inner) => self.visit(*inner, depth + 1, false),

            ExprKind::Assign { target, value } => {
                let (target, value) = (*target, *value);
                let target_ty = self.visit(target, depth + 1, false);
                let value_ty = self.visit(value, depth + 1, false);
                self.add(
                    ConstraintKind::Convert {
                        from: value_ty,
                        to: target_ty,
                    },
                    Locator::new(value).with(LocatorElem::AssignSource),
                    self.arena.span(value),
                );
                Type::void()
            }

            ExprKind::Binary {
                op,
                op_span,
                lhs,
                rhs,
            } => {
                let (op, op_span, lhs, rhs) = (*op, *op_span, *lhs, *rhs);
                let lhs_ty = self.visit(lhs, depth + 1, false);
                let rhs_ty = self.visit(rhs, depth + 1, false);
                let env = self.env;
                let decls = env.infix_operators(op);
                self.operator(
                    id,
                    op,
                    op_span,
                    decls,
                    vec![(lhs, lhs_ty), (rhs, rhs_ty)],
                    false,
                )
            }

            ExprKind::Unary {
                op,
                op_span,
                operand,
            } => {
                let (op, op_span, operand) = (*op, *op_span, *operand);
                let operand_ty = self.visit(operand, depth + 1, false);
                let env = self.env;
                let decls = env.prefix_operators(op);
                self.operator(id, op, op_span, decls, vec![(operand, operand_ty)], true)
            }

            ExprKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let (cond, then_expr, else_expr) = (*cond, *then_expr, *else_expr);
                let cond_ty = self.visit(cond, depth + 1, false);
                let then_ty = self.visit(then_expr, depth + 1, false);
                let else_ty = self.visit(else_expr, depth + 1, false);
                self.add(
                    ConstraintKind::Convert {
                        from: cond_ty,
                        to: Type::bool(),
                    },
                    Locator::new(cond).with(LocatorElem::Condition),
                    self.arena.span(cond),
                );
                self.add(
                    ConstraintKind::Equal(then_ty.clone(), else_ty),
                    Locator::new(id).with(LocatorElem::TernaryBranches),
                    span,
                );
                then_ty
            }

            ExprKind::Closure { params, body } => self.closure(id, *params, *body, depth),

            ExprKind::ClosureParam(index) => {
                let param = self
                    .closure_params
                    .last()
                    .and_then(|params| params.get(usize::try_from(*index).ok()?))
                    .cloned();
                param.unwrap_or_else(|| {
                    tracing::debug!(?id, index, "closure parameter outside its closure");
                    Type::Error
                })
            }
        }
    }

    /// `{ body }` with `count` parameters: a function from fresh variables
    /// to the body's type.
    fn closure(&mut self, id: ExprId, count: u32, body: ExprId, depth: u32) -> Type {
        let params: Vec<Type> = (0..count).map(|_| self.fresh()).collect();
        self.closure_params.push(params.clone());
        let result = self.visit(body, depth + 1, false);
        self.closure_params.pop();
        self.graph.record_closure(ClosureSlot {
            expr: id,
            params: params.clone(),
            result: result.clone(),
        });
        Type::function(params.into_iter().map(Param::new).collect(), result)
    }

    fn literal(&mut self, id: ExprId, kind: LiteralKind) -> Type {
        let var = self.graph.fresh_var();
        self.graph.record_literal(LiteralSlot {
            var,
            expr: id,
            kind,
        });
        self.add(
            ConstraintKind::Defaultable { var, kind },
            Locator::new(id),
            self.arena.span(id),
        );
        Type::Var(var)
    }

    fn ident(&mut self, id: ExprId, name: Name, span: Span) -> Type {
        let env = self.env;
        let values = env.values(name);
        if !values.is_empty() {
            let candidates = values.iter().map(Candidate::from_value).collect();
            return self.overload(id, candidates, span);
        }
        if let Some(decl) = env.type_decl(name) {
            return Type::metatype(decl.ty.clone());
        }
        self.graph.record_failure(Failure::new(
            FailureKind::UnresolvedIdentifier { name },
            Locator::new(id),
            span,
        ));
        Type::Error
    }

    fn overload(&mut self, owner: ExprId, candidates: Vec<Candidate>, span: Span) -> Type {
        let var = self.graph.fresh_var();
        self.add(
            ConstraintKind::Overload(OverloadSet {
                var,
                owner,
                candidates,
            }),
            Locator::new(owner),
            span,
        );
        Type::Var(var)
    }

    /// `Name(...)` where `Name` is a type: an overload over its initializers.
    fn initializer_callee(&mut self, callee: ExprId, depth: u32) -> Option<Type> {
        let (env, arena) = (self.env, self.arena);
        let ExprKind::Ident(name) = arena.kind(callee) else {
            return None;
        };
        if !env.values(*name).is_empty() {
            return None;
        }
        let decl = env.type_decl(*name)?;
        let candidates = decl
            .initializers()
            .iter()
            .map(|init| Candidate::from_member(init, decl.name))
            .collect();
        let metatype = Type::metatype(decl.ty.clone());
        self.enter(callee, depth);
        self.graph.record_type(callee, metatype);
        Some(self.overload(callee, candidates, self.arena.span(callee)))
    }

    fn call(
        &mut self,
        id: ExprId,
        callee: ExprId,
        args: &[CallArg],
        depth: u32,
        span: Span,
    ) -> Type {
        let (layer, callee_ref) = self.curried_layer(callee);
        let initializer = if layer == 0 {
            self.initializer_callee(callee, depth + 1)
        } else {
            None
        };
        let is_initializer = initializer.is_some();
        let callee_ty = match initializer {
            Some(ty) => ty,
            None => self.visit(callee, depth + 1, true),
        };

        let arena = self.arena;
        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            let (ty, inout_span) = match arena.kind(arg.value) {
                ExprKind::InOut(inner) => {
                    let inner = *inner;
                    let amp = self.arena.span(arg.value);
                    self.enter(arg.value, depth + 1);
                    let ty = self.visit(inner, depth + 2, false);
                    self.graph.record_type(arg.value, ty.clone());
                    (ty, Some(Span::new(amp.start, amp.start + 1)))
                }
                _ => (self.visit(arg.value, depth + 1, false), None),
            };
            arguments.push(Argument {
                label: arg.label,
                label_span: arg.label_span,
                ty,
                expr: arg.value,
                inout_span,
            });
        }

        let result = self.fresh();
        self.add(
            ConstraintKind::ArgumentMatch(ArgumentMatch {
                call: id,
                layer,
                callee: callee_ty,
                args: arguments,
                result: result.clone(),
            }),
            Locator::new(id).with(LocatorElem::ApplyFunction { layer }),
            span,
        );

        if layer == 0 {
            if let Some(base) = self.implicit_bases.get(&callee).cloned() {
                self.add(
                    ConstraintKind::Equal(result.clone(), base),
                    Locator::new(id),
                    span,
                );
            }
        }

        let (kind, name) = match arena.kind(callee_ref) {
            ExprKind::Ident(name) if is_initializer => (CallKind::Initializer, Some(*name)),
            ExprKind::Ident(name) => (CallKind::Function, Some(*name)),
            ExprKind::Member { name, .. } | ExprKind::ImplicitMember { name } => {
                (CallKind::Method, Some(*name))
            }
            _ => (CallKind::Function, None),
        };
        self.graph.record_call(
            id,
            CallSite {
                callee_ref,
                callee,
                layer,
                kind,
                name,
            },
        );
        result
    }

    /// How many call layers sit below this one, and the innermost callee.
    fn curried_layer(&self, callee: ExprId) -> (u32, ExprId) {
        let mut layer = 0;
        let mut cur = callee;
        while let ExprKind::Call { callee: inner, .. } = self.arena.kind(cur) {
            layer += 1;
            cur = *inner;
        }
        (layer, cur)
    }

    fn operator(
        &mut self,
        id: ExprId,
        op: Name,
        op_span: Span,
        decls: &[ValueDecl],
        operands: Vec<(ExprId, Type)>,
        prefix: bool,
    ) -> Type {
        if decls.is_empty() {
            self.graph.record_failure(Failure::new(
                FailureKind::UnresolvedOperator { op },
                Locator::new(id),
                op_span,
            ));
            return Type::Error;
        }
        let candidates = decls.iter().map(Candidate::from_value).collect();
        let callee = self.overload(id, candidates, op_span);
        let args = operands
            .into_iter()
            .map(|(expr, ty)| Argument {
                label: None,
                label_span: None,
                ty,
                expr,
                inout_span: None,
            })
            .collect();
        let result = self.fresh();
        self.add(
            ConstraintKind::ArgumentMatch(ArgumentMatch {
                call: id,
                layer: 0,
                callee,
                args,
                result: result.clone(),
            }),
            Locator::new(id).with(LocatorElem::ApplyFunction { layer: 0 }),
            self.arena.span(id),
        );
        self.graph.record_call(
            id,
            CallSite {
                callee_ref: id,
                callee: id,
                layer: 0,
                kind: CallKind::Operator { prefix },
                name: Some(op),
            },
        );
        result
    }

    fn unwrap(&mut self, id: ExprId, inner: ExprId, unwrap: UnwrapKind, depth: u32) -> Type {
        let optional = self.visit(inner, depth + 1, false);
        let object = self.fresh();
        self.add(
            ConstraintKind::OptionalObject {
                optional,
                object: object.clone(),
                expr: id,
                unwrap,
            },
            Locator::new(id).with(LocatorElem::OptionalObject),
            self.arena.span(id),
        );
        object
    }
}

fn index_u32(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}
