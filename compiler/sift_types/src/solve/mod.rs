//! Constraint solver.
//!
//! Works through a [`ConstraintGraph`] by unification, backtracking over
//! overload sets in declaration order. Every branch runs to completion:
//! problems are recorded as failures (or relaxations) rather than aborting
//! the branch, so each finished branch becomes a scored [`Attempt`].
//!
//! # Search
//!
//! ```text
//! explore(state):
//!   run pending constraints to a fixpoint
//!   if the state already scores worse than the best attempt: abandon
//!   if an overload set is pending: branch on each candidate
//!   else force one stuck conversion, or default one literal, or force
//!     any other stuck constraint, and repeat
//!   else record the attempt
//! ```
//!
//! Scores only grow along a branch, so once a fully satisfying attempt is
//! known, any branch that has recorded a failure is abandoned.

mod rules;
mod state;
mod unify;

pub use state::{MemberRef, OpenedGeneric};

use rustc_hash::FxHashMap;
use sift_ir::{ExprArena, ExprId};

use crate::config::SolverConfig;
use crate::constraint::{Candidate, ConstraintGraph, ConstraintKind};
use crate::env::Env;
use crate::error::SolveError;
use crate::failure::Failure;
use crate::stack::ensure_sufficient_stack;
use crate::ty::{Bindings, Type, TypeVar};
use state::SolverState;

/// Attempts kept when several tie for the best score.
const MAX_TIED_ATTEMPTS: usize = 16;

/// Ranking of a finished attempt; lower is better.
///
/// Ordered by hard failures, then relaxations, then literal penalties.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Score {
    pub failures: u32,
    pub fixes: u32,
    pub penalty: u32,
}

impl Score {
    /// No failures and no relaxations: the attempt type-checks as written.
    pub fn is_solution(self) -> bool {
        self.failures == 0 && self.fixes == 0
    }
}

/// One finished branch of the search.
#[derive(Clone, Debug)]
pub struct Attempt {
    pub score: Score,
    pub bindings: Bindings,
    pub failures: Vec<Failure>,
    /// Overload choices: owner expression and candidate index.
    pub choices: Vec<(ExprId, usize)>,
    pub member_refs: FxHashMap<ExprId, MemberRef>,
    pub overload_sets: Vec<(ExprId, Vec<Candidate>)>,
    pub opened: Vec<OpenedGeneric>,
    simplify_limit: u32,
}

impl Attempt {
    /// Candidate index chosen for the overload set owned by `owner`.
    pub fn choice(&self, owner: ExprId) -> Option<usize> {
        self.choices
            .iter()
            .find(|(o, _)| *o == owner)
            .map(|(_, index)| *index)
    }

    pub fn candidates(&self, owner: ExprId) -> Option<&[Candidate]> {
        self.overload_sets
            .iter()
            .find(|(o, _)| *o == owner)
            .map(|(_, c)| c.as_slice())
    }

    /// The chosen candidate of the overload set owned by `owner`.
    pub fn chosen(&self, owner: ExprId) -> Option<&Candidate> {
        self.candidates(owner)?.get(self.choice(owner)?)
    }

    pub fn member_ref(&self, expr: ExprId) -> Option<MemberRef> {
        self.member_refs.get(&expr).copied()
    }

    /// `ty` with this attempt's bindings substituted.
    ///
    /// A runaway substitution shows as the error type.
    pub fn resolve(&self, ty: &Type) -> Type {
        ty.simplify(&self.bindings, self.simplify_limit)
            .unwrap_or(Type::Error)
    }
}

/// A complete, failure-free assignment of types.
#[derive(Clone, Debug)]
pub struct Solution {
    pub expr_types: FxHashMap<ExprId, Type>,
    pub choices: Vec<(ExprId, usize)>,
    pub score: Score,
}

impl Solution {
    pub fn type_of(&self, expr: ExprId) -> Option<&Type> {
        self.expr_types.get(&expr)
    }

    pub fn choice(&self, owner: ExprId) -> Option<usize> {
        self.choices
            .iter()
            .find(|(o, _)| *o == owner)
            .map(|(_, index)| *index)
    }
}

/// How a solve ended.
#[derive(Clone, Debug)]
pub enum SolveOutcome {
    Solved(Solution),
    /// Several failure-free attempts that chose differently.
    Ambiguous(Vec<Attempt>),
    /// The best attempts, all with failures or relaxations.
    Unsatisfiable(Vec<Attempt>),
}

/// Solves one constraint graph.
pub struct Solver<'a> {
    env: &'a Env,
    arena: &'a ExprArena,
    graph: &'a ConstraintGraph,
    config: SolverConfig,
    steps: u32,
    next_var: u32,
    best: Vec<Attempt>,
    best_score: Option<Score>,
}

impl<'a> Solver<'a> {
    pub fn new(
        env: &'a Env,
        arena: &'a ExprArena,
        graph: &'a ConstraintGraph,
        config: SolverConfig,
    ) -> Self {
        Solver {
            env,
            arena,
            graph,
            config,
            steps: 0,
            next_var: graph.var_count(),
            best: Vec::new(),
            best_score: None,
        }
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn solve(mut self) -> Result<SolveOutcome, SolveError> {
        let mut state = SolverState::default();
        state.pending.extend(self.graph.constraints().iter().cloned());
        state.failures.extend(self.graph.failures().iter().cloned());

        self.explore(state, 0)?;

        let best = std::mem::take(&mut self.best);
        let score = self.best_score.unwrap_or_default();
        tracing::debug!(
            steps = self.steps,
            attempts = best.len(),
            ?score,
            "solve finished"
        );

        if !score.is_solution() || best.is_empty() {
            return Ok(SolveOutcome::Unsatisfiable(best));
        }
        let first = &best[0];
        if best.iter().any(|a| a.choices != first.choices) {
            return Ok(SolveOutcome::Ambiguous(best));
        }
        let solution = self.solution(first)?;
        Ok(SolveOutcome::Solved(solution))
    }

    fn solution(&self, attempt: &Attempt) -> Result<Solution, SolveError> {
        let mut expr_types = FxHashMap::default();
        for (expr, ty) in self.graph.expr_types() {
            expr_types.insert(
                expr,
                ty.simplify(&attempt.bindings, self.config.max_simplify_depth)?,
            );
        }
        Ok(Solution {
            expr_types,
            choices: attempt.choices.clone(),
            score: attempt.score,
        })
    }

    // ========================================
    // Search
    // ========================================

    fn explore(&mut self, mut state: SolverState, depth: u32) -> Result<(), SolveError> {
        if depth > self.config.max_backtrack_depth {
            return Err(SolveError::BacktrackLimitExceeded {
                limit: self.config.max_backtrack_depth,
            });
        }
        ensure_sufficient_stack(|| loop {
            self.run(&mut state)?;
            if self.pruned(&state) {
                tracing::trace!(score = ?state.score(), "abandoned branch");
                return Ok(());
            }

            if !state.overloads.is_empty() {
                let pending = state.overloads.remove(0);
                for index in 0..pending.set.candidates.len() {
                    tracing::trace!(owner = ?pending.set.owner, index, "trying overload");
                    let mut branch = state.clone();
                    self.bind_choice(&mut branch, &pending.set, index, pending.span);
                    self.explore(branch, depth + 1)?;
                }
                return Ok(());
            }

            if self.degrade_conversion(&mut state)?
                || self.apply_defaults(&mut state)
                || self.degrade(&mut state)?
            {
                continue;
            }

            self.finish_attempt(state);
            return Ok(());
        })
    }

    /// Process pending constraints until nothing new can be learned.
    fn run(&mut self, state: &mut SolverState) -> Result<(), SolveError> {
        loop {
            while let Some(constraint) = state.pending.pop_front() {
                self.step()?;
                self.process(state, constraint)?;
            }
            if !state.requeue_deferred() {
                return Ok(());
            }
        }
    }

    fn step(&mut self) -> Result<(), SolveError> {
        self.steps += 1;
        if self.steps > self.config.step_budget {
            return Err(SolveError::StepBudgetExceeded {
                budget: self.config.step_budget,
            });
        }
        Ok(())
    }

    fn pruned(&self, state: &SolverState) -> bool {
        self.best_score.is_some_and(|best| state.score() > best)
    }

    fn fresh_var(&mut self) -> TypeVar {
        let var = TypeVar::new(self.next_var);
        self.next_var += 1;
        var
    }

    fn finish_attempt(&mut self, mut state: SolverState) {
        self.check_underdetermined(&mut state);
        let score = state.score();
        match self.best_score.map(|best| score.cmp(&best)) {
            Some(std::cmp::Ordering::Greater) => return,
            Some(std::cmp::Ordering::Equal) => {
                if self.best.len() >= MAX_TIED_ATTEMPTS {
                    return;
                }
            }
            Some(std::cmp::Ordering::Less) | None => {
                self.best.clear();
                self.best_score = Some(score);
            }
        }
        tracing::trace!(?score, choices = ?state.choices, "recorded attempt");
        self.best.push(Attempt {
            score,
            bindings: state.bindings,
            failures: state.failures,
            choices: state.choices,
            member_refs: state.member_refs,
            overload_sets: state.overload_sets,
            opened: state.opened,
            simplify_limit: self.config.max_simplify_depth,
        });
    }

    fn dispatch_name(kind: &ConstraintKind) -> &'static str {
        match kind {
            ConstraintKind::Equal(..) => "equal",
            ConstraintKind::Convert { .. } => "convert",
            ConstraintKind::Conforms { .. } => "conforms",
            ConstraintKind::ArgumentMatch(_) => "argument-match",
            ConstraintKind::Overload(_) => "overload",
            ConstraintKind::LabelMismatch(_) => "label-mismatch",
            ConstraintKind::Member(_) => "member",
            ConstraintKind::Subscript { .. } => "subscript",
            ConstraintKind::OptionalObject { .. } => "optional-object",
            ConstraintKind::Defaultable { .. } => "defaultable",
        }
    }
}
