//! Per-branch solver state.
//!
//! A [`SolverState`] is cloned at every overload choice. Everything a branch
//! learns lives in here, so dropping a clone is the whole of backtracking.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use sift_ir::{ExprId, Name, Span};
use smallvec::SmallVec;

use super::Score;
use crate::constraint::{Candidate, Constraint, LiteralKind, OverloadSet};
use crate::failure::Failure;
use crate::ty::{Bindings, TypeVar};

/// What a literal placeholder variable still has to satisfy.
///
/// Unbound literal variables merge when unified; the representative keeps
/// the kinds of every literal folded into it.
#[derive(Clone, Debug)]
pub(crate) struct LiteralInfo {
    pub kinds: SmallVec<[LiteralKind; 2]>,
    /// The first literal expression folded into this variable.
    pub expr: ExprId,
}

impl LiteralInfo {
    pub fn new(kind: LiteralKind, expr: ExprId) -> Self {
        let mut kinds = SmallVec::new();
        kinds.push(kind);
        LiteralInfo { kinds, expr }
    }

    pub fn is_nil(&self) -> bool {
        self.kinds.contains(&LiteralKind::Nil)
    }

    pub fn merge(&mut self, other: LiteralInfo) {
        for kind in other.kinds {
            if !self.kinds.contains(&kind) {
                self.kinds.push(kind);
            }
        }
    }
}

/// How a member reference reached its declaration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MemberRef {
    /// `value.member`
    Instance,
    /// `Type.member` or `.member` naming a static member or case.
    Static,
    /// `Type.member` naming an instance member: a curried `(Self) -> ...`.
    InstanceOnType,
}

/// A generic parameter replaced by a fresh variable when its declaration
/// was chosen.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct OpenedGeneric {
    pub var: TypeVar,
    pub param: Name,
    /// The expression referring to the generic declaration.
    pub owner: ExprId,
    pub decl: Name,
}

/// An overload set waiting for the solver to branch on it.
#[derive(Clone, Debug)]
pub(crate) struct PendingOverload {
    pub set: OverloadSet,
    pub span: Span,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SolverState {
    pub bindings: Bindings,
    pub literal_reps: FxHashMap<TypeVar, LiteralInfo>,
    pub pending: VecDeque<Constraint>,
    /// Constraints waiting for a variable to be bound.
    pub deferred: Vec<Constraint>,
    pub overloads: Vec<PendingOverload>,
    /// Overload choices made so far: owner expression and candidate index.
    pub choices: Vec<(ExprId, usize)>,
    /// Every overload set seen, with its candidates.
    pub overload_sets: Vec<(ExprId, Vec<Candidate>)>,
    pub failures: Vec<Failure>,
    pub penalty: u32,
    pub member_refs: FxHashMap<ExprId, MemberRef>,
    pub opened: Vec<OpenedGeneric>,
    /// Set whenever a binding is made; cleared when deferred work is retried.
    pub progress: bool,
}

impl SolverState {
    pub fn score(&self) -> Score {
        let fixes = self.failures.iter().filter(|f| f.is_relaxation()).count();
        Score {
            failures: saturate(self.failures.len() - fixes),
            fixes: saturate(fixes),
            penalty: self.penalty,
        }
    }

    pub fn record(&mut self, failure: Failure) {
        tracing::trace!(kind = ?failure.kind, "recorded failure");
        self.failures.push(failure);
    }

    pub fn defer(&mut self, constraint: Constraint) {
        self.deferred.push(constraint);
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.pending.push_back(constraint);
    }

    /// Re-run deferred constraints after new bindings.
    ///
    /// Returns `false` when there was nothing new to learn from.
    pub fn requeue_deferred(&mut self) -> bool {
        if !self.progress || self.deferred.is_empty() {
            self.progress = false;
            return false;
        }
        self.progress = false;
        self.pending.extend(self.deferred.drain(..));
        true
    }
}

fn saturate(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
