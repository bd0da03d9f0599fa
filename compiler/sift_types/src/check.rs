//! Type checker entry point.
//!
//! One [`TypeChecker`] checks any number of expressions against one
//! environment. Each expression is generated, solved and, when solving
//! fails, diagnosed to completion before the next one starts; diagnostics
//! accumulate in the checker's queue until [`TypeChecker::finish`].

use sift_diagnostic::{Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorGuaranteed};
use sift_ir::{ExprArena, ExprId};

use crate::config::SolverConfig;
use crate::constraint::ConstraintGen;
use crate::diagnose::Diagnoser;
use crate::env::Env;
use crate::solve::{Solution, SolveOutcome, Solver};
use crate::ty::Type;

/// What the checked expression is for. Changes the wording of contextual
/// type mismatches.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Purpose {
    /// An expression statement, or `_ = expr`.
    #[default]
    Discarded,
    /// The initializer of `let x: T = expr`.
    Initialization,
    /// `return expr`.
    Return,
}

/// The context an expression is checked in.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CheckContext {
    pub purpose: Purpose,
    /// The type the expression must convert to, if its context fixes one.
    pub contextual: Option<Type>,
}

impl CheckContext {
    /// No contextual type: the result is discarded.
    pub fn discarded() -> Self {
        CheckContext::default()
    }

    /// `let _: ty = expr`.
    pub fn initialization(ty: Type) -> Self {
        CheckContext {
            purpose: Purpose::Initialization,
            contextual: Some(ty),
        }
    }

    /// `return expr` in a function returning `ty`.
    pub fn returning(ty: Type) -> Self {
        CheckContext {
            purpose: Purpose::Return,
            contextual: Some(ty),
        }
    }
}

/// Checks expressions against one environment.
pub struct TypeChecker<'env> {
    env: &'env Env,
    config: SolverConfig,
    queue: DiagnosticQueue,
}

impl<'env> TypeChecker<'env> {
    /// A checker with limits from [`SolverConfig::from_env`].
    pub fn new(env: &'env Env) -> Self {
        Self::with_config(env, SolverConfig::from_env(), DiagnosticConfig::default())
    }

    pub fn with_config(
        env: &'env Env,
        config: SolverConfig,
        diagnostics: DiagnosticConfig,
    ) -> Self {
        TypeChecker {
            env,
            config,
            queue: DiagnosticQueue::with_config(diagnostics),
        }
    }

    /// Check one expression tree.
    ///
    /// On failure exactly one error diagnostic is queued for the expression
    /// and the returned proof says so.
    #[tracing::instrument(level = "debug", skip_all, fields(root = ?root))]
    pub fn check_expr(
        &mut self,
        arena: &ExprArena,
        root: ExprId,
        cx: &CheckContext,
    ) -> Result<Solution, ErrorGuaranteed> {
        let graph = ConstraintGen::generate(self.env, arena, root, cx);
        let outcome = Solver::new(self.env, arena, &graph, self.config).solve();
        let diagnoser = Diagnoser::new(self.env, arena, &graph, cx);
        let diagnostic = match outcome {
            Ok(SolveOutcome::Solved(solution)) => {
                tracing::debug!(score = ?solution.score, "expression solved");
                return Ok(solution);
            }
            Ok(SolveOutcome::Ambiguous(attempts)) => diagnoser.diagnose_ambiguous(&attempts),
            Ok(SolveOutcome::Unsatisfiable(attempts)) => diagnoser.diagnose(&attempts),
            Err(err) => {
                tracing::debug!(%err, "solve ended without a verdict");
                diagnoser.solve_error(&err)
            }
        };
        Err(self.queue.emit_error(diagnostic))
    }

    pub fn error_count(&self) -> usize {
        self.queue.error_count()
    }

    /// All diagnostics so far, sorted by position.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.queue.flush()
    }
}
