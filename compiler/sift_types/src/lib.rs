//! Constraint-based type inference with failure diagnosis.
//!
//! # Pipeline
//!
//! ```text
//! ExprArena + root ──> ConstraintGen ──> ConstraintGraph
//!                                             │
//!                                             ▼
//!                                          Solver ──> Solution
//!                                             │
//!                                  failed attempts
//!                                             ▼
//!                                        Diagnoser ──> Diagnostic
//! ```
//!
//! [`TypeChecker`] drives the pipeline for one expression at a time and
//! queues the diagnostics. The solver never stops at the first problem:
//! every branch of the overload search finishes with its failures
//! recorded, and the diagnoser picks the single most useful report from the
//! best-scoring attempts.

mod check;
mod config;
pub mod constraint;
mod diagnose;
pub mod env;
mod error;
pub mod failure;
pub mod solve;
mod stack;
pub mod ty;

pub use check::{CheckContext, Purpose, TypeChecker};
pub use config::{SolverConfig, BUDGET_ENV_VAR};
pub use constraint::{ConstraintGen, ConstraintGraph};
pub use diagnose::{Diagnoser, FailureCategory};
pub use env::{Env, GenericParam, MemberDecl, TypeDecl, ValueDecl};
pub use error::{SolveError, TypeErrorKind};
pub use solve::{Attempt, Score, Solution, SolveOutcome, Solver};
pub use ty::{Param, Primitive, TupleElem, Type, TypeVar};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=sift_types=debug` or `RUST_LOG=sift_types=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
