//! Structural unification over one branch's bindings.
//!
//! Unification is atomic at the level of single variables: a failed
//! `unify` may leave bindings it made before hitting the mismatch, which is
//! what the solver wants when it keeps going after recording a failure.

use super::state::{LiteralInfo, SolverState};
use super::Solver;
use crate::constraint::{LabelIssue, Locator};
use crate::failure::{Failure, FailureKind};
use crate::ty::{Type, TypeVar};

/// Error from type unification.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum UnifyError {
    /// Types could not be unified.
    Mismatch,
    /// Binding would create an infinite type.
    InfiniteType,
    /// Different number of parameters or elements.
    ArityMismatch { kind: ArityKind },
}

/// What kind of construct has an arity mismatch.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum ArityKind {
    Function,
    Tuple,
    TypeArgs,
}

impl Solver<'_> {
    // ========================================
    // Binding
    // ========================================

    /// Bind `var` to `ty` in `state`.
    ///
    /// Literal placeholders stay representatives: binding a plain variable
    /// to a literal variable links the plain one, and two literal variables
    /// merge their literal kinds. Binding a literal variable to a concrete
    /// type checks the literal can express it and charges its penalty.
    pub(crate) fn bind(
        &self,
        state: &mut SolverState,
        var: TypeVar,
        ty: &Type,
        locator: &Locator,
    ) -> Result<(), UnifyError> {
        let ty = state.bindings.shallow_resolve(ty);
        if let Type::Var(other) = ty {
            if other == var {
                return Ok(());
            }
            let (from, to) = if state.literal_reps.contains_key(&var) {
                (other, var)
            } else {
                (var, other)
            };
            if let Some(info) = state.literal_reps.remove(&from) {
                match state.literal_reps.get_mut(&to) {
                    Some(rep) => rep.merge(info),
                    None => {
                        state.literal_reps.insert(to, info);
                    }
                }
            }
            tracing::trace!(?from, ?to, "linked variables");
            state.bindings.bind(from, Type::Var(to));
            state.progress = true;
            return Ok(());
        }

        if state.bindings.occurs(var, &ty) {
            return Err(UnifyError::InfiniteType);
        }

        if let Some(info) = state.literal_reps.remove(&var) {
            self.check_literal(state, &info, &ty, locator);
        }
        tracing::trace!(?var, ?ty, "bound variable");
        state.bindings.bind(var, ty);
        state.progress = true;
        Ok(())
    }

    pub(crate) fn check_literal(
        &self,
        state: &mut SolverState,
        info: &LiteralInfo,
        ty: &Type,
        locator: &Locator,
    ) {
        for &kind in &info.kinds {
            if kind.accepts(ty, self.env) {
                state.penalty = state.penalty.saturating_add(kind.penalty(ty));
            } else {
                state.record(Failure::new(
                    FailureKind::LiteralMismatch {
                        literal: kind,
                        to: ty.clone(),
                        expr: info.expr,
                    },
                    locator.clone(),
                    self.arena.span(info.expr),
                ));
            }
        }
    }

    /// Bind `ty` to the error type if it is an unbound variable.
    ///
    /// Used after a failure so the rest of the expression stops complaining.
    pub(crate) fn poison(&self, state: &mut SolverState, ty: &Type) {
        if let Some(var) = state.bindings.unbound_var(ty) {
            state.literal_reps.remove(&var);
            state.bindings.bind(var, Type::Error);
            state.progress = true;
        }
    }

    // ========================================
    // Unification
    // ========================================

    /// Unify two types, making them equivalent.
    pub(crate) fn unify(
        &self,
        state: &mut SolverState,
        a: &Type,
        b: &Type,
        locator: &Locator,
    ) -> Result<(), UnifyError> {
        let a = state.bindings.shallow_resolve(a);
        let b = state.bindings.shallow_resolve(b);
        match (&a, &b) {
            (Type::Error, _) | (_, Type::Error) => Ok(()),
            (Type::Var(x), Type::Var(y)) if x == y => Ok(()),
            (Type::Var(v), other) | (other, Type::Var(v)) => self.bind(state, *v, other, locator),
            (Type::Primitive(p), Type::Primitive(q)) if p == q => Ok(()),
            (Type::Param(p), Type::Param(q)) if p == q => Ok(()),

            (Type::Tuple(xs), Type::Tuple(ys)) => {
                if xs.len() != ys.len() {
                    return Err(UnifyError::ArityMismatch {
                        kind: ArityKind::Tuple,
                    });
                }
                for (x, y) in xs.iter().zip(ys) {
                    if let (Some(l), Some(r)) = (x.label, y.label) {
                        if l != r {
                            return Err(UnifyError::Mismatch);
                        }
                    }
                    self.unify(state, &x.ty, &y.ty, locator)?;
                }
                Ok(())
            }

            (Type::Function { .. }, Type::Function { .. }) => {
                self.unify_functions(state, &a, &b, 0, locator)
            }

            (Type::Optional(x), Type::Optional(y)) | (Type::Metatype(x), Type::Metatype(y)) => {
                self.unify(state, x, y, locator)
            }

            (Type::Nominal { name: n, args: xa }, Type::Nominal { name: m, args: ya })
                if n == m =>
            {
                if xa.len() != ya.len() {
                    return Err(UnifyError::ArityMismatch {
                        kind: ArityKind::TypeArgs,
                    });
                }
                for (x, y) in xa.iter().zip(ya) {
                    self.unify(state, x, y, locator)?;
                }
                Ok(())
            }

            _ => Err(UnifyError::Mismatch),
        }
    }

    /// Unify function types one parameter list at a time.
    ///
    /// Labels that differ are recorded as a relaxation naming the layer,
    /// and unification carries on with the types.
    fn unify_functions(
        &self,
        state: &mut SolverState,
        a: &Type,
        b: &Type,
        layer: u32,
        locator: &Locator,
    ) -> Result<(), UnifyError> {
        let (
            Type::Function {
                params: xp,
                result: xr,
            },
            Type::Function {
                params: yp,
                result: yr,
            },
        ) = (a, b)
        else {
            return self.unify(state, a, b, locator);
        };
        if xp.len() != yp.len() {
            return Err(UnifyError::ArityMismatch {
                kind: ArityKind::Function,
            });
        }
        let relabeled = xp.iter().zip(yp).find_map(|(x, y)| match (x.label, y.label) {
            (Some(have), Some(expected)) if have != expected => Some((have, expected)),
            _ => None,
        });
        if let Some((have, expected)) = relabeled {
            state.record(Failure::new(
                FailureKind::Label(LabelIssue::Function {
                    layer,
                    have,
                    expected,
                }),
                locator.clone(),
                self.arena.span(locator.anchor),
            ));
        }
        for (x, y) in xp.iter().zip(yp) {
            if x.inout != y.inout {
                return Err(UnifyError::Mismatch);
            }
            self.unify(state, &x.ty, &y.ty, locator)?;
        }
        let xr = state.bindings.shallow_resolve(xr);
        let yr = state.bindings.shallow_resolve(yr);
        self.unify_functions(state, &xr, &yr, layer + 1, locator)
    }

    /// Whether `a` and `b` would unify, without touching `state`.
    pub(crate) fn would_unify(&self, state: &SolverState, a: &Type, b: &Type) -> bool {
        let mut trial = state.clone();
        self.unify(&mut trial, a, b, &Locator::new(self.graph.root()))
            .is_ok()
            && trial.failures.len() == state.failures.len()
    }
}
