//! What the solver does with each kind of constraint.
//!
//! A rule either makes progress (binds variables, pushes simpler
//! constraints), defers the constraint until a variable it needs is bound,
//! or records a failure and poisons the affected result so the rest of the
//! expression keeps solving.

use rustc_hash::FxHashMap;
use sift_ir::{ExprId, ExprKind, Name, Span, TupleElement};

use super::state::{LiteralInfo, MemberRef, OpenedGeneric, PendingOverload, SolverState};
use super::unify::{ArityKind, UnifyError};
use super::Solver;
use crate::constraint::{
    Argument, ArgumentMatch, Candidate, Constraint, ConstraintKind, LabelIssue, LiteralKind, Locator,
    LocatorElem, MemberLookup, OverloadSet, UnwrapKind,
};
use crate::env::{MemberDecl, MemberKind};
use crate::error::SolveError;
use crate::failure::{Failure, FailureKind};
use crate::ty::{Param, TupleElem, Type, TypeVar};

impl Solver<'_> {
    pub(super) fn process(
        &mut self,
        state: &mut SolverState,
        c: Constraint,
    ) -> Result<(), SolveError> {
        tracing::trace!(kind = Self::dispatch_name(&c.kind), "processing constraint");
        match &c.kind {
            ConstraintKind::Equal(a, b) => self.equal(state, a, b, &c),
            ConstraintKind::Convert { from, to } => self.convert(state, from, to, &c),
            ConstraintKind::Conforms { ty, protocol } => self.conforms(state, ty, *protocol, &c),
            ConstraintKind::ArgumentMatch(m) => self.argument_match(state, m, &c),
            ConstraintKind::Overload(set) => {
                self.overload(state, set, c.span);
                Ok(())
            }
            ConstraintKind::LabelMismatch(issue) => {
                state.record(Failure::new(
                    FailureKind::Label(issue.clone()),
                    c.locator.clone(),
                    c.span,
                ));
                Ok(())
            }
            ConstraintKind::Member(m) => self.member(state, m, &c),
            ConstraintKind::Subscript {
                base,
                index,
                result,
                base_expr,
                index_expr,
            } => self.subscript(state, base, index, result, *base_expr, *index_expr, &c),
            ConstraintKind::OptionalObject {
                optional,
                object,
                expr,
                unwrap,
            } => self.optional_object(state, optional, object, *expr, *unwrap, &c),
            ConstraintKind::Defaultable { var, kind } => {
                self.defaultable(state, *var, *kind, &c);
                Ok(())
            }
        }
    }

    fn resolved(&self, state: &SolverState, ty: &Type) -> Result<Type, SolveError> {
        ty.simplify(&state.bindings, self.config.max_simplify_depth)
    }

    fn record_mismatch(
        &self,
        state: &mut SolverState,
        err: &UnifyError,
        from: &Type,
        to: &Type,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        let from = self.resolved(state, from)?;
        let to = self.resolved(state, to)?;
        let kind = match err {
            UnifyError::ArityMismatch {
                kind: ArityKind::Tuple,
            } => FailureKind::TupleArity { from, to },
            UnifyError::ArityMismatch {
                kind: ArityKind::Function,
            } if matches!(self.arena.kind(c.locator.anchor), ExprKind::Closure { .. }) => {
                closure_arity(self.arena.kind(c.locator.anchor), from, to)
            }
            UnifyError::Mismatch
            | UnifyError::InfiniteType
            | UnifyError::ArityMismatch { .. } => FailureKind::Mismatch { from, to },
        };
        state.record(Failure::new(kind, c.locator.clone(), c.span));
        Ok(())
    }

    // ========================================
    // Equality and conversion
    // ========================================

    fn equal(
        &mut self,
        state: &mut SolverState,
        a: &Type,
        b: &Type,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        let ra = state.bindings.shallow_resolve(a);
        let rb = state.bindings.shallow_resolve(b);
        if let (Type::Tuple(xs), Type::Tuple(ys)) = (&ra, &rb) {
            if xs.len() == ys.len() {
                self.decompose_tuple(state, xs, ys, c, false);
                return Ok(());
            }
        }
        if let Err(err) = self.unify(state, &ra, &rb, &c.locator) {
            self.record_mismatch(state, &err, a, b, c)?;
        }
        Ok(())
    }

    /// Positionally matched tuples: one constraint per element, plus a
    /// label marker when labels differ.
    fn decompose_tuple(
        &self,
        state: &mut SolverState,
        xs: &[TupleElem],
        ys: &[TupleElem],
        c: &Constraint,
        convert: bool,
    ) {
        let labels_differ = xs
            .iter()
            .zip(ys)
            .any(|(x, y)| matches!((x.label, y.label), (Some(l), Some(r)) if l != r));
        if labels_differ {
            let from = Type::Tuple(xs.to_vec());
            let to = Type::Tuple(ys.to_vec());
            let written = self.written_tuple(&c.locator).unwrap_or_default();
            let relabel = xs
                .iter()
                .zip(ys)
                .zip(written)
                .filter_map(|((x, y), elem)| match (x.label, y.label, elem.label_span) {
                    (Some(have), Some(expected), Some(span)) if have != expected => {
                        Some((span, expected))
                    }
                    _ => None,
                })
                .collect();
            state.push(Constraint::new(
                ConstraintKind::LabelMismatch(LabelIssue::Tuple { from, to, relabel }),
                c.locator.clone(),
                c.span,
            ));
        }
        for (i, (x, y)) in xs.iter().zip(ys).enumerate() {
            let kind = if convert {
                ConstraintKind::Convert {
                    from: x.ty.clone(),
                    to: y.ty.clone(),
                }
            } else {
                ConstraintKind::Equal(x.ty.clone(), y.ty.clone())
            };
            state.push(Constraint::new(
                kind,
                c.locator.with(LocatorElem::TupleElement(index_u32(i))),
                c.span,
            ));
        }
    }

    /// The tuple literal a locator points at, following tuple element
    /// steps from the anchor.
    fn written_tuple(&self, locator: &Locator) -> Option<&[TupleElement]> {
        let mut expr = locator.anchor;
        for elem in &locator.path {
            if let LocatorElem::TupleElement(index) = elem {
                let ExprKind::Tuple(elems) = self.arena.kind(expr) else {
                    return None;
                };
                expr = elems.get(usize::try_from(*index).ok()?)?.value;
            }
        }
        match self.arena.kind(expr) {
            ExprKind::Tuple(elems) => Some(elems),
            _ => None,
        }
    }

    fn convert(
        &mut self,
        state: &mut SolverState,
        from: &Type,
        to: &Type,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        let f = state.bindings.shallow_resolve(from);
        let t = state.bindings.shallow_resolve(to);
        match (&f, &t) {
            (Type::Error, _) | (_, Type::Error) => Ok(()),
            (Type::Var(a), Type::Var(b)) => {
                if a != b {
                    self.defer_convert(state, f.clone(), t.clone(), c);
                }
                Ok(())
            }
            (Type::Var(v), Type::Optional(inner)) => {
                match state.literal_reps.get(v).map(LiteralInfo::is_nil) {
                    Some(true) => self.bind_or_mismatch(state, *v, &t, from, to, c),
                    Some(false) => self.convert(state, &f, inner, c),
                    // Could still become the optional itself or its payload.
                    None => {
                        self.defer_convert(state, f.clone(), t.clone(), c);
                        Ok(())
                    }
                }
            }
            (Type::Var(v), _) if state.literal_reps.contains_key(v) => {
                self.bind_or_mismatch(state, *v, &t, from, to, c)
            }
            // Wait for whatever produces the value, so a mismatch is
            // reported at this conversion rather than at the producer.
            (Type::Var(_), _) => {
                self.defer_convert(state, f.clone(), t.clone(), c);
                Ok(())
            }
            (_, Type::Var(v)) => self.bind_or_mismatch(state, *v, &f, from, to, c),
            (Type::Optional(a), Type::Optional(b)) => self.convert(state, a, b, c),
            (_, Type::Optional(inner)) => self.convert(state, &f, inner, c),
            (Type::Optional(inner), _) => {
                if self.would_unify(state, inner, &t) {
                    let optional = self.resolved(state, &f)?;
                    let anchor = self.arena.span(c.locator.anchor);
                    state.record(Failure::new(
                        FailureKind::UnwrapRequired {
                            optional,
                            insert_at: anchor.end,
                            suggestion: '!',
                        },
                        c.locator.clone(),
                        anchor,
                    ));
                    if let Err(err) = self.unify(state, inner, &t, &c.locator) {
                        self.record_mismatch(state, &err, from, to, c)?;
                    }
                } else {
                    self.record_mismatch(state, &UnifyError::Mismatch, from, to, c)?;
                }
                Ok(())
            }
            (Type::Tuple(xs), Type::Tuple(ys)) if xs.len() == ys.len() => {
                self.decompose_tuple(state, xs, ys, c, true);
                Ok(())
            }
            _ => {
                if let Err(err) = self.unify(state, &f, &t, &c.locator) {
                    self.record_mismatch(state, &err, from, to, c)?;
                }
                Ok(())
            }
        }
    }

    fn defer_convert(&self, state: &mut SolverState, from: Type, to: Type, c: &Constraint) {
        state.defer(Constraint::new(
            ConstraintKind::Convert { from, to },
            c.locator.clone(),
            c.span,
        ));
    }

    fn bind_or_mismatch(
        &self,
        state: &mut SolverState,
        var: TypeVar,
        ty: &Type,
        from: &Type,
        to: &Type,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        if let Err(err) = self.bind(state, var, ty, &c.locator) {
            self.record_mismatch(state, &err, from, to, c)?;
        }
        Ok(())
    }

    fn conforms(
        &self,
        state: &mut SolverState,
        ty: &Type,
        protocol: Name,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        if state.bindings.unbound_var(ty).is_some() {
            state.defer(c.clone());
            return Ok(());
        }
        let ty = self.resolved(state, ty)?;
        if !self.env.conforms(&ty, protocol) {
            state.record(Failure::new(
                FailureKind::NoConformance { ty, protocol },
                c.locator.clone(),
                c.span,
            ));
        }
        Ok(())
    }

    // ========================================
    // Calls
    // ========================================

    fn argument_match(
        &mut self,
        state: &mut SolverState,
        m: &ArgumentMatch,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        let callee_span = self
            .graph
            .call_site(m.call)
            .map_or(c.span, |site| self.arena.span(site.callee));
        let callee = state.bindings.shallow_resolve(&m.callee);
        let (params, result) = match &callee {
            Type::Var(_) => {
                state.defer(c.clone());
                return Ok(());
            }
            Type::Error => {
                self.poison(state, &m.result);
                return Ok(());
            }
            Type::Function { params, result } => (params.clone(), (**result).clone()),
            Type::Optional(inner) => match state.bindings.shallow_resolve(inner) {
                Type::Function { params, result } => {
                    let optional = self.resolved(state, &callee)?;
                    state.record(Failure::new(
                        FailureKind::UnwrapRequired {
                            optional,
                            insert_at: callee_span.end,
                            suggestion: '!',
                        },
                        c.locator.clone(),
                        callee_span,
                    ));
                    (params, *result)
                }
                _ => return self.not_callable(state, &callee, m, c, callee_span),
            },
            _ => return self.not_callable(state, &callee, m, c, callee_span),
        };

        let (found, expected) = (m.args.len(), params.len());
        if found > expected {
            let extra = &m.args[expected];
            let mut span = self.arena.span(extra.expr);
            if let Some(label_span) = extra.label_span {
                span = span.merge(label_span);
            }
            state.record(Failure::new(
                FailureKind::ExtraArgument {
                    call: m.call,
                    label: extra.label,
                    takes_none: expected == 0,
                },
                c.locator.clone(),
                span,
            ));
        } else if found < expected {
            state.record(Failure::new(
                FailureKind::MissingArgument {
                    call: m.call,
                    param_index: found,
                    label: params[found].label,
                },
                c.locator.clone(),
                c.span,
            ));
        } else {
            for (index, (arg, param)) in m.args.iter().zip(&params).enumerate() {
                self.match_argument(state, m.call, index, arg, param);
            }
        }

        state.push(Constraint::new(
            ConstraintKind::Equal(m.result.clone(), result),
            c.locator.clone(),
            c.span,
        ));
        Ok(())
    }

    fn not_callable(
        &self,
        state: &mut SolverState,
        callee: &Type,
        m: &ArgumentMatch,
        c: &Constraint,
        callee_span: Span,
    ) -> Result<(), SolveError> {
        let ty = self.resolved(state, callee)?;
        state.record(Failure::new(
            FailureKind::NotCallable { ty },
            c.locator.clone(),
            callee_span,
        ));
        self.poison(state, &m.result);
        Ok(())
    }

    /// Label and value are checked independently. Both failures anchor at
    /// the argument, so the label (which comes first in the source) is the
    /// one reported when both go wrong.
    fn match_argument(
        &self,
        state: &mut SolverState,
        call: ExprId,
        index: usize,
        arg: &Argument,
        param: &Param,
    ) {
        let elem = LocatorElem::ApplyArgument {
            call,
            index: index_u32(index),
        };
        let arg_span = self.arena.span(arg.expr);
        let locator = Locator::new(arg.expr).with(elem);

        let issue = match (arg.label, param.label) {
            (None, Some(expected)) => Some(LabelIssue::Missing {
                expected,
                insert_at: arg_span.start,
            }),
            (Some(have), Some(expected)) if have != expected => Some(LabelIssue::Wrong {
                have,
                expected,
                label_span: arg.label_span.unwrap_or(arg_span),
            }),
            (Some(have), None) => {
                let start = arg.label_span.map_or(arg_span.start, |s| s.start);
                Some(LabelIssue::Extraneous {
                    have,
                    remove: Span::new(start, arg_span.start),
                })
            }
            _ => None,
        };
        if let Some(issue) = issue {
            let span = arg.label_span.unwrap_or(arg_span);
            state.push(Constraint::new(
                ConstraintKind::LabelMismatch(issue),
                locator.clone(),
                span,
            ));
        }

        let kind = match (param.inout, arg.inout_span) {
            (true, Some(_)) => ConstraintKind::Equal(arg.ty.clone(), param.ty.clone()),
            (true, None) => {
                state.record(Failure::new(
                    FailureKind::MissingInOut {
                        ty: arg.ty.clone(),
                        insert_at: arg_span.start,
                    },
                    locator.clone(),
                    arg_span,
                ));
                ConstraintKind::Equal(arg.ty.clone(), param.ty.clone())
            }
            (false, Some(amp)) => {
                state.record(Failure::new(
                    FailureKind::ExtraInOut {
                        ty: arg.ty.clone(),
                        amp,
                    },
                    locator.clone(),
                    amp,
                ));
                ConstraintKind::Convert {
                    from: arg.ty.clone(),
                    to: param.ty.clone(),
                }
            }
            (false, None) => ConstraintKind::Convert {
                from: arg.ty.clone(),
                to: param.ty.clone(),
            },
        };
        state.push(Constraint::new(kind, locator, arg_span));
    }

    // ========================================
    // Overloads
    // ========================================

    fn overload(&mut self, state: &mut SolverState, set: &OverloadSet, span: Span) {
        state
            .overload_sets
            .push((set.owner, set.candidates.clone()));
        match set.candidates.len() {
            0 => self.poison(state, &Type::Var(set.var)),
            1 => self.bind_choice(state, set, 0, span),
            _ => state.overloads.push(PendingOverload {
                set: set.clone(),
                span,
            }),
        }
    }

    /// Commit to candidate `index` of `set`, opening its generic parameters.
    pub(super) fn bind_choice(
        &mut self,
        state: &mut SolverState,
        set: &OverloadSet,
        index: usize,
        span: Span,
    ) {
        let Some(candidate) = set.candidates.get(index) else {
            return;
        };
        state.choices.push((set.owner, index));

        let mut ty = candidate.ty.clone();
        if !candidate.generics.is_empty() {
            let mut opened: FxHashMap<Name, Type> = FxHashMap::default();
            for (i, param) in candidate.generics.iter().enumerate() {
                let var = self.fresh_var();
                opened.insert(param.name, Type::Var(var));
                state.opened.push(OpenedGeneric {
                    var,
                    param: param.name,
                    owner: set.owner,
                    decl: candidate.name,
                });
                for &protocol in &param.bounds {
                    state.push(Constraint::new(
                        ConstraintKind::Conforms {
                            ty: Type::Var(var),
                            protocol,
                        },
                        Locator::new(set.owner).with(LocatorElem::GenericParam(index_u32(i))),
                        span,
                    ));
                }
            }
            ty = ty.map(&mut |t| match t {
                Type::Param(name) => opened.get(&name).cloned().unwrap_or(Type::Param(name)),
                other => other,
            });
        }

        if let Some(message) = &candidate.unavailable {
            state.record(Failure::new(
                FailureKind::Unavailable {
                    name: candidate.name,
                    message: message.clone(),
                },
                Locator::new(set.owner),
                self.arena.span(set.owner),
            ));
        }

        state.push(Constraint::new(
            ConstraintKind::Equal(Type::Var(set.var), ty),
            Locator::new(set.owner).with(LocatorElem::OverloadChoice),
            span,
        ));
    }

    // ========================================
    // Members
    // ========================================

    fn member(
        &mut self,
        state: &mut SolverState,
        m: &MemberLookup,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        match state.bindings.shallow_resolve(&m.base) {
            Type::Var(_) => {
                state.defer(c.clone());
                Ok(())
            }
            Type::Error => {
                self.poison(state, &m.result);
                Ok(())
            }
            Type::Metatype(inner) => {
                let mut inner = state.bindings.shallow_resolve(&inner);
                if m.implicit {
                    if let Type::Optional(wrapped) = &inner {
                        inner = state.bindings.shallow_resolve(wrapped);
                    }
                }
                match inner {
                    Type::Var(_) => {
                        state.defer(c.clone());
                        Ok(())
                    }
                    Type::Error => {
                        self.poison(state, &m.result);
                        Ok(())
                    }
                    inner => self.member_on_type(state, m, &inner, c),
                }
            }
            base => self.member_on_value(state, m, &base, c),
        }
    }

    /// `Type.name` or `.name`.
    fn member_on_type(
        &mut self,
        state: &mut SolverState,
        m: &MemberLookup,
        inner: &Type,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        let env = self.env;
        let members: Vec<&MemberDecl> = env
            .type_decl_of(inner)
            .map(|decl| decl.members_named(m.name).collect())
            .unwrap_or_default();

        let statics: Vec<&MemberDecl> = members
            .iter()
            .copied()
            .filter(|d| matches!(d.kind, MemberKind::StaticMethod | MemberKind::Case))
            .collect();
        if !statics.is_empty() {
            if m.implicit && !m.called && statics.iter().all(|d| d.ty.is_function()) {
                let params = match &statics[0].ty {
                    Type::Function { params, .. } => params.clone(),
                    _ => Vec::new(),
                };
                state.record(Failure::new(
                    FailureKind::ContextualMemberArgs {
                        name: m.name,
                        params,
                    },
                    c.locator.clone(),
                    m.name_span,
                ));
                state.push(Constraint::new(
                    ConstraintKind::Equal(m.result.clone(), inner.clone()),
                    c.locator.clone(),
                    c.span,
                ));
                return Ok(());
            }
            state.member_refs.insert(m.expr, MemberRef::Static);
            let candidates = statics
                .iter()
                .map(|d| Candidate::from_member(d, m.name))
                .collect();
            self.member_overload(state, m, candidates, c);
            return Ok(());
        }

        let instance: Vec<Candidate> = members
            .iter()
            .filter(|d| is_instance_member(d))
            .map(|d| {
                let mut candidate = Candidate::from_member(d, m.name);
                candidate.ty = Type::function(vec![Param::new(inner.clone())], candidate.ty);
                candidate
            })
            .collect();
        if !instance.is_empty() {
            state.member_refs.insert(m.expr, MemberRef::InstanceOnType);
            self.member_overload(state, m, instance, c);
            return Ok(());
        }

        let ty = self.resolved(state, inner)?;
        self.missing_member(state, m, ty, true, c);
        Ok(())
    }

    /// `value.name`.
    fn member_on_value(
        &mut self,
        state: &mut SolverState,
        m: &MemberLookup,
        base: &Type,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        let base_end = self.base_span(m).end;
        match base {
            Type::Optional(wrapped) => {
                let wrapped = state.bindings.shallow_resolve(wrapped);
                if self.has_member(&wrapped, m.name) {
                    let optional = self.resolved(state, base)?;
                    state.record(Failure::new(
                        FailureKind::UnwrapRequired {
                            optional,
                            insert_at: base_end,
                            suggestion: '?',
                        },
                        c.locator.clone(),
                        self.base_span(m),
                    ));
                    return self.member_on_value(state, m, &wrapped, c);
                }
            }
            Type::Function { params, result } if params.is_empty() => {
                let result = state.bindings.shallow_resolve(result);
                if self.has_member(&result, m.name) {
                    let (name, is_method) = self.base_name(m);
                    state.record(Failure::new(
                        FailureKind::MethodAsProperty {
                            name,
                            is_method,
                            insert_at: base_end,
                        },
                        c.locator.clone(),
                        self.base_span(m),
                    ));
                    return self.member_on_value(state, m, &result, c);
                }
            }
            Type::Tuple(elems) => {
                if let Some(elem) = self.tuple_element(elems, m.name) {
                    state.push(Constraint::new(
                        ConstraintKind::Equal(m.result.clone(), elem.ty.clone()),
                        c.locator.clone(),
                        c.span,
                    ));
                    return Ok(());
                }
            }
            _ => {
                let env = self.env;
                if let Some(decl) = env.type_decl_of(base) {
                    let candidates: Vec<Candidate> = decl
                        .members_named(m.name)
                        .filter(|d| is_instance_member(d))
                        .map(|d| Candidate::from_member(d, m.name))
                        .collect();
                    if !candidates.is_empty() {
                        state.member_refs.insert(m.expr, MemberRef::Instance);
                        self.member_overload(state, m, candidates, c);
                        return Ok(());
                    }
                }
            }
        }
        let ty = self.resolved(state, base)?;
        self.missing_member(state, m, ty, false, c);
        Ok(())
    }

    fn member_overload(
        &mut self,
        state: &mut SolverState,
        m: &MemberLookup,
        candidates: Vec<Candidate>,
        c: &Constraint,
    ) {
        let var = self.fresh_var();
        state.push(Constraint::new(
            ConstraintKind::Equal(m.result.clone(), Type::Var(var)),
            c.locator.clone(),
            c.span,
        ));
        state.push(Constraint::new(
            ConstraintKind::Overload(OverloadSet {
                var,
                owner: m.expr,
                candidates,
            }),
            Locator::new(m.expr),
            m.name_span,
        ));
    }

    fn missing_member(
        &self,
        state: &mut SolverState,
        m: &MemberLookup,
        ty: Type,
        on_type: bool,
        c: &Constraint,
    ) {
        state.record(Failure::new(
            FailureKind::MissingMember {
                ty,
                name: m.name,
                on_type,
            },
            c.locator.clone(),
            m.name_span,
        ));
        self.poison(state, &m.result);
    }

    fn has_member(&self, ty: &Type, name: Name) -> bool {
        match ty {
            Type::Tuple(elems) => self.tuple_element(elems, name).is_some(),
            Type::Primitive(_) | Type::Nominal { .. } => self
                .env
                .type_decl_of(ty)
                .is_some_and(|decl| decl.members_named(name).any(is_instance_member)),
            _ => false,
        }
    }

    /// Tuple element by label, or by position for `.0`, `.1`, ...
    fn tuple_element<'t>(&self, elems: &'t [TupleElem], name: Name) -> Option<&'t TupleElem> {
        elems.iter().find(|e| e.label == Some(name)).or_else(|| {
            self.env
                .interner()
                .lookup(name)
                .parse::<usize>()
                .ok()
                .and_then(|i| elems.get(i))
        })
    }

    fn base_span(&self, m: &MemberLookup) -> Span {
        m.base_expr
            .map_or(m.name_span.start_point(), |base| self.arena.span(base))
    }

    /// Name of the function a member was looked up on, and whether it is a
    /// method rather than a free function.
    fn base_name(&self, m: &MemberLookup) -> (Name, bool) {
        match m.base_expr.map(|base| self.arena.kind(base)) {
            Some(ExprKind::Member { name, .. } | ExprKind::ImplicitMember { name }) => {
                (*name, true)
            }
            Some(ExprKind::Ident(name)) => (*name, false),
            _ => (m.name, false),
        }
    }

    // ========================================
    // Subscripts and optionals
    // ========================================

    #[expect(clippy::too_many_arguments, reason = "mirrors the constraint's fields")]
    fn subscript(
        &mut self,
        state: &mut SolverState,
        base: &Type,
        index: &Type,
        result: &Type,
        base_expr: ExprId,
        index_expr: ExprId,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        let resolved_base = state.bindings.shallow_resolve(base);
        let elem = match &resolved_base {
            Type::Var(_) => {
                state.defer(c.clone());
                return Ok(());
            }
            Type::Error => {
                self.poison(state, result);
                return Ok(());
            }
            Type::Optional(wrapped) => {
                let wrapped = state.bindings.shallow_resolve(wrapped);
                match self.env.array_element(&wrapped) {
                    Some(elem) => {
                        let optional = self.resolved(state, &resolved_base)?;
                        let base_span = self.arena.span(base_expr);
                        state.record(Failure::new(
                            FailureKind::UnwrapRequired {
                                optional,
                                insert_at: base_span.end,
                                suggestion: '!',
                            },
                            c.locator.clone(),
                            base_span,
                        ));
                        Some(elem.clone())
                    }
                    None => None,
                }
            }
            other => self.env.array_element(other).cloned(),
        };

        let Some(elem) = elem else {
            let ty = self.resolved(state, &resolved_base)?;
            state.record(Failure::new(
                FailureKind::NoSubscript { ty },
                c.locator.clone(),
                c.span,
            ));
            self.poison(state, result);
            return Ok(());
        };
        state.push(Constraint::new(
            ConstraintKind::Convert {
                from: index.clone(),
                to: Type::int(),
            },
            Locator::new(index_expr).with(LocatorElem::SubscriptIndex),
            self.arena.span(index_expr),
        ));
        state.push(Constraint::new(
            ConstraintKind::Equal(result.clone(), elem),
            c.locator.clone(),
            c.span,
        ));
        Ok(())
    }

    fn optional_object(
        &mut self,
        state: &mut SolverState,
        optional: &Type,
        object: &Type,
        expr: ExprId,
        unwrap: UnwrapKind,
        c: &Constraint,
    ) -> Result<(), SolveError> {
        match state.bindings.shallow_resolve(optional) {
            Type::Var(_) => state.defer(c.clone()),
            Type::Error => self.poison(state, object),
            Type::Optional(inner) => state.push(Constraint::new(
                ConstraintKind::Equal(object.clone(), *inner),
                c.locator.clone(),
                c.span,
            )),
            other => {
                let span = self.arena.span(expr);
                let mark = Span::new(span.end.saturating_sub(1), span.end);
                let ty = self.resolved(state, &other)?;
                let kind = match unwrap {
                    UnwrapKind::Force => FailureKind::ForceUnwrapNonOptional { ty, bang: mark },
                    UnwrapKind::Chain => FailureKind::ChainingNonOptional { ty, question: mark },
                };
                state.record(Failure::new(kind, c.locator.clone(), mark));
                state.push(Constraint::new(
                    ConstraintKind::Equal(object.clone(), other),
                    c.locator.clone(),
                    c.span,
                ));
            }
        }
        Ok(())
    }

    // ========================================
    // Literals and stuck constraints
    // ========================================

    fn defaultable(&self, state: &mut SolverState, var: TypeVar, kind: LiteralKind, c: &Constraint) {
        let info = LiteralInfo::new(kind, c.locator.anchor);
        match state.bindings.shallow_resolve(&Type::Var(var)) {
            Type::Var(rep) => match state.literal_reps.get_mut(&rep) {
                Some(existing) => existing.merge(info),
                None => {
                    state.literal_reps.insert(rep, info);
                }
            },
            bound => self.check_literal(state, &info, &bound, &c.locator),
        }
    }

    /// Bind one unbound literal to its default type.
    ///
    /// Returns whether a binding was made.
    pub(super) fn apply_defaults(&self, state: &mut SolverState) -> bool {
        let mut reps: Vec<TypeVar> = state.literal_reps.keys().copied().collect();
        reps.sort_unstable();
        for var in reps {
            let Some(info) = state.literal_reps.get(&var) else {
                continue;
            };
            let default = info
                .kinds
                .iter()
                .filter_map(|kind| kind.default_type())
                .find(|ty| info.kinds.iter().all(|kind| kind.accepts(ty, self.env)));
            let Some(ty) = default else {
                continue;
            };
            let locator = Locator::new(info.expr);
            if self.bind(state, var, &ty, &locator).is_ok() {
                tracing::trace!(?var, ?ty, "defaulted literal");
                return true;
            }
        }
        false
    }

    /// Turn the oldest stuck conversion into an equality.
    ///
    /// Runs before literal defaulting, so a contextual type reaches an
    /// implicit member or a literal before any default does.
    pub(super) fn degrade_conversion(&self, state: &mut SolverState) -> Result<bool, SolveError> {
        let Some(index) = state
            .deferred
            .iter()
            .position(|c| matches!(c.kind, ConstraintKind::Convert { .. }))
        else {
            return Ok(false);
        };
        let c = state.deferred.remove(index);
        self.force(state, c)?;
        Ok(true)
    }

    /// Force progress on the oldest stuck constraint.
    pub(super) fn degrade(&self, state: &mut SolverState) -> Result<bool, SolveError> {
        if state.deferred.is_empty() {
            return Ok(false);
        }
        let c = state.deferred.remove(0);
        self.force(state, c)?;
        Ok(true)
    }

    /// Conversions become equalities, unwraps of unknown values assume an
    /// optional, and lookups or calls on something still unknown are
    /// reported as underdetermined.
    fn force(&self, state: &mut SolverState, c: Constraint) -> Result<(), SolveError> {
        tracing::trace!(kind = Self::dispatch_name(&c.kind), "degrading stuck constraint");
        match &c.kind {
            ConstraintKind::Convert { from, to } => {
                if let Err(err) = self.unify(state, from, to, &c.locator) {
                    self.record_mismatch(state, &err, from, to, &c)?;
                }
            }
            ConstraintKind::OptionalObject {
                optional, object, ..
            } => {
                let wrapped = Type::optional(object.clone());
                if self.unify(state, optional, &wrapped, &c.locator).is_err() {
                    self.poison(state, object);
                }
            }
            ConstraintKind::Member(m) => {
                let kind = if m.implicit {
                    FailureKind::UnresolvedImplicitMember { name: m.name }
                } else {
                    FailureKind::Underdetermined
                };
                state.record(Failure::new(kind, c.locator.clone(), c.span));
                self.poison(state, &m.result);
            }
            ConstraintKind::ArgumentMatch(m) => {
                state.record(Failure::new(
                    FailureKind::Underdetermined,
                    c.locator.clone(),
                    c.span,
                ));
                self.poison(state, &m.result);
            }
            ConstraintKind::Subscript { result, .. } => {
                state.record(Failure::new(
                    FailureKind::Underdetermined,
                    c.locator.clone(),
                    c.span,
                ));
                self.poison(state, result);
            }
            // A bound on a variable nothing else constrains holds trivially.
            ConstraintKind::Conforms { .. }
            | ConstraintKind::Equal(..)
            | ConstraintKind::Overload(_)
            | ConstraintKind::LabelMismatch(_)
            | ConstraintKind::Defaultable { .. } => {}
        }
        state.progress = true;
        Ok(())
    }

    /// Failures only visible once everything else is done: generic
    /// parameters, `nil` literals or closures nothing pinned down.
    pub(super) fn check_underdetermined(&self, state: &mut SolverState) {
        if !state.failures.is_empty() {
            return;
        }
        let unbound_generic = state
            .opened
            .iter()
            .find(|g| state.bindings.unbound_var(&Type::Var(g.var)).is_some())
            .copied();
        if let Some(generic) = unbound_generic {
            state.record(Failure::new(
                FailureKind::CouldNotInfer {
                    param: generic.param,
                    decl: generic.decl,
                },
                Locator::new(generic.owner),
                self.arena.span(generic.owner),
            ));
            return;
        }

        let mut nil_literals: Vec<(TypeVar, ExprId)> = state
            .literal_reps
            .iter()
            .filter(|(_, info)| info.is_nil())
            .map(|(var, info)| (*var, info.expr))
            .collect();
        nil_literals.sort_unstable();
        if let Some((_, expr)) = nil_literals.first() {
            state.record(Failure::new(
                FailureKind::NilRequiresContext,
                Locator::new(*expr),
                self.arena.span(*expr),
            ));
            return;
        }

        if let Some(failure) = self.unresolved_closure(state) {
            state.record(failure);
            return;
        }

        let root = self.graph.root();
        let unresolved = self
            .graph
            .expr_type(root)
            .and_then(|ty| self.resolved(state, ty).ok())
            .is_some_and(|ty| ty.has_vars());
        if unresolved {
            state.record(Failure::new(
                FailureKind::Underdetermined,
                Locator::new(root),
                self.arena.span(root),
            ));
        }
    }

    /// The first closure whose result, or failing that one of whose
    /// parameters, nothing pinned down.
    fn unresolved_closure(&self, state: &SolverState) -> Option<Failure> {
        let open = |ty: &Type| {
            self.resolved(state, ty)
                .is_ok_and(|resolved| resolved.has_vars())
        };
        self.graph.closures().iter().find_map(|slot| {
            let kind = if open(&slot.result) {
                FailureKind::ClosureResultUnresolved
            } else {
                let index = slot.params.iter().position(|param| open(param))?;
                FailureKind::ClosureParamUnresolved {
                    index: index_u32(index),
                }
            };
            Some(Failure::new(
                kind,
                Locator::new(slot.expr),
                self.arena.span(slot.expr),
            ))
        })
    }
}

/// A closure's parameter count against the function type it had to match.
fn closure_arity(closure: &ExprKind, from: Type, to: Type) -> FailureKind {
    let used = match closure {
        ExprKind::Closure { params, .. } => usize::try_from(*params).unwrap_or(usize::MAX),
        _ => 0,
    };
    let expected_of = |ty: &Type| match ty {
        Type::Function { params, .. } if params.len() != used => Some(params.len()),
        _ => None,
    };
    if let Some(expected) = expected_of(&to) {
        return FailureKind::ClosureArity {
            contextual: to,
            expected,
            used,
        };
    }
    if let Some(expected) = expected_of(&from) {
        return FailureKind::ClosureArity {
            contextual: from,
            expected,
            used,
        };
    }
    FailureKind::Mismatch { from, to }
}

fn is_instance_member(decl: &MemberDecl) -> bool {
    matches!(decl.kind, MemberKind::Property | MemberKind::Method)
}

fn index_u32(i: usize) -> u32 {
    u32::try_from(i).unwrap_or(u32::MAX)
}
