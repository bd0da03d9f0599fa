//! Failure diagnosis.
//!
//! Turns the best attempts of a failed solve into one diagnostic. The work
//! is a small state machine:
//!
//! ```text
//! Start ─> LocateFailurePoint ─> ClassifyFailure ─> Categorized ─> RenderDiagnostic ─> End
//!              │                                                        ▲
//!              └──────────── no failure to point at ────────────────────┘
//! ```
//!
//! - **Locate** picks the deepest failure of the best attempt: greatest
//!   expression depth of its anchor, then longest locator path, then
//!   earliest span.
//! - **Classify** assigns exactly one [`FailureCategory`]. When the best
//!   attempts tie and chose differently at the overload set that owns the
//!   failure point, the category is [`FailureCategory::AmbiguousOverload`]
//!   whatever the failure itself was.
//! - **Render** writes the message with resolved type names, the fix-its
//!   and any notes.

mod render;

use rustc_hash::FxHashSet;
use sift_diagnostic::{Diagnostic, FixIt};
use sift_ir::{ExprArena, ExprId, ExprKind, Span};

use crate::check::CheckContext;
use crate::constraint::{ConstraintGraph, LocatorElem};
use crate::env::Env;
use crate::error::{SolveError, TypeErrorKind};
use crate::failure::{Failure, FailureKind};
use crate::solve::{Attempt, MemberRef};

/// What kind of problem a failure point is reported as.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FailureCategory {
    ArgumentArityMismatch,
    LabelMismatch,
    TypeConversionFailure,
    MissingMember,
    AmbiguousOverload,
    OptionalUnwrapRequired,
    ContextualTypeMismatch,
    NotCallable,
    UnavailableSymbol,
    AmbiguousInference,
}

impl FailureCategory {
    /// The error taxonomy entry the category reports under.
    pub fn error_kind(self) -> TypeErrorKind {
        match self {
            FailureCategory::ArgumentArityMismatch => TypeErrorKind::ArityMismatch,
            FailureCategory::LabelMismatch => TypeErrorKind::LabelMismatch,
            FailureCategory::TypeConversionFailure => TypeErrorKind::TypeMismatch,
            FailureCategory::MissingMember => TypeErrorKind::MissingMember,
            FailureCategory::AmbiguousOverload => TypeErrorKind::AmbiguousOverload,
            FailureCategory::OptionalUnwrapRequired => TypeErrorKind::OptionalUnwrapRequired,
            FailureCategory::ContextualTypeMismatch => TypeErrorKind::ContextualMismatch,
            FailureCategory::NotCallable => TypeErrorKind::NotCallable,
            FailureCategory::UnavailableSymbol => TypeErrorKind::UnavailableSymbol,
            FailureCategory::AmbiguousInference => TypeErrorKind::AmbiguousInference,
        }
    }
}

/// The failure chosen for reporting, with the attempt it came from.
#[derive(Copy, Clone, Debug)]
struct FailurePoint<'x> {
    failure: &'x Failure,
    attempt: &'x Attempt,
}

/// A diagnostic under construction.
#[derive(Clone, Debug)]
struct Draft {
    kind: TypeErrorKind,
    message: String,
    span: Span,
    notes: Vec<String>,
    fixits: Vec<FixIt>,
}

impl Draft {
    fn new(kind: TypeErrorKind, message: impl Into<String>, span: Span) -> Self {
        Draft {
            kind,
            message: message.into(),
            span,
            notes: Vec::new(),
            fixits: Vec::new(),
        }
    }

    #[must_use]
    fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    #[must_use]
    fn with_fixit(mut self, fixit: FixIt) -> Self {
        self.fixits.push(fixit);
        self
    }

    fn into_diagnostic(self) -> Diagnostic {
        let code = self.kind.code();
        let mut diagnostic = Diagnostic::error(code)
            .with_message(self.message)
            .with_label(self.span, code.title());
        for note in self.notes {
            diagnostic = diagnostic.with_note(note);
        }
        for fixit in self.fixits {
            diagnostic = diagnostic.with_fixit(fixit);
        }
        diagnostic
    }
}

enum Step<'x> {
    Start,
    LocateFailurePoint,
    ClassifyFailure(FailurePoint<'x>),
    Categorized(FailureCategory, FailurePoint<'x>),
    RenderDiagnostic(Draft),
    End(Diagnostic),
}

/// Explains why one expression failed to solve.
pub struct Diagnoser<'a> {
    env: &'a Env,
    arena: &'a ExprArena,
    graph: &'a ConstraintGraph,
    cx: &'a CheckContext,
}

impl<'a> Diagnoser<'a> {
    pub fn new(
        env: &'a Env,
        arena: &'a ExprArena,
        graph: &'a ConstraintGraph,
        cx: &'a CheckContext,
    ) -> Self {
        Diagnoser {
            env,
            arena,
            graph,
            cx,
        }
    }

    /// The diagnostic for an unsatisfiable expression, given its
    /// best-scoring attempts.
    #[tracing::instrument(level = "debug", skip_all, fields(attempts = attempts.len()))]
    pub fn diagnose(&self, attempts: &[Attempt]) -> Diagnostic {
        let mut step = Step::Start;
        loop {
            step = match step {
                Step::Start => Step::LocateFailurePoint,
                Step::LocateFailurePoint => {
                    match attempts.first().and_then(|attempt| self.locate(attempt)) {
                        Some(point) => Step::ClassifyFailure(point),
                        None => Step::RenderDiagnostic(self.generic_mismatch()),
                    }
                }
                Step::ClassifyFailure(point) => {
                    let category = self.classify(point, attempts);
                    tracing::debug!(
                        ?category,
                        failure = ?point.failure.kind,
                        anchor = ?point.failure.locator.anchor,
                        "classified failure point"
                    );
                    Step::Categorized(category, point)
                }
                Step::Categorized(category, point) => {
                    Step::RenderDiagnostic(self.render(category, point, attempts))
                }
                Step::RenderDiagnostic(draft) => Step::End(draft.into_diagnostic()),
                Step::End(diagnostic) => return diagnostic,
            };
        }
    }

    /// The diagnostic for several failure-free attempts that disagree.
    #[tracing::instrument(level = "debug", skip_all, fields(attempts = attempts.len()))]
    pub fn diagnose_ambiguous(&self, attempts: &[Attempt]) -> Diagnostic {
        let draft = match diverging_owner(attempts) {
            Some(owner) => self.render_ambiguous_solution(owner, attempts),
            None => self.generic_mismatch(),
        };
        draft.into_diagnostic()
    }

    /// The diagnostic for a solve that ended without a verdict.
    pub fn solve_error(&self, err: &SolveError) -> Diagnostic {
        let span = self.arena.span(self.graph.root());
        let message = match err {
            SolveError::StepBudgetExceeded { .. } | SolveError::BacktrackLimitExceeded { .. } => {
                "expression was too complex to be solved in reasonable time".to_string()
            }
            SolveError::RecursiveType { limit } => {
                format!("type of expression is recursive; substitution exceeded depth {limit}")
            }
        };
        Draft::new(err.kind(), message, span)
            .with_note(err.to_string())
            .into_diagnostic()
    }

    // ════════════════════════════════════════════════════════════════
    // Locate
    // ════════════════════════════════════════════════════════════════

    fn locate<'x>(&self, attempt: &'x Attempt) -> Option<FailurePoint<'x>> {
        let mut best: Option<(&Failure, (u32, usize))> = None;
        for failure in &attempt.failures {
            let key = (
                self.graph.depth(failure.locator.anchor),
                failure.locator.path.len(),
            );
            let better = match best {
                None => true,
                Some((current, current_key)) => {
                    key > current_key
                        || (key == current_key && failure.span.start < current.span.start)
                }
            };
            if better {
                best = Some((failure, key));
            }
        }
        best.map(|(failure, _)| FailurePoint { failure, attempt })
    }

    // ════════════════════════════════════════════════════════════════
    // Classify
    // ════════════════════════════════════════════════════════════════

    fn classify(&self, point: FailurePoint<'_>, attempts: &[Attempt]) -> FailureCategory {
        if self
            .owner_of(point.failure)
            .is_some_and(|owner| tied_choices(owner, attempts).len() > 1)
        {
            return FailureCategory::AmbiguousOverload;
        }
        if self.instance_member_on_type(point).is_some() {
            return FailureCategory::MissingMember;
        }
        let contextual_or_conversion = || {
            if point
                .failure
                .locator
                .path
                .contains(&LocatorElem::ContextualType)
            {
                FailureCategory::ContextualTypeMismatch
            } else {
                FailureCategory::TypeConversionFailure
            }
        };
        match &point.failure.kind {
            FailureKind::Mismatch { .. } | FailureKind::LiteralMismatch { .. } => {
                contextual_or_conversion()
            }
            FailureKind::TupleArity { .. }
            | FailureKind::ExtraArgument { .. }
            | FailureKind::MissingArgument { .. }
            | FailureKind::ClosureArity { .. } => FailureCategory::ArgumentArityMismatch,
            FailureKind::Label(_) => FailureCategory::LabelMismatch,
            FailureKind::NoConformance { .. }
            | FailureKind::MissingInOut { .. }
            | FailureKind::ExtraInOut { .. } => FailureCategory::TypeConversionFailure,
            FailureKind::MissingMember { .. }
            | FailureKind::NoSubscript { .. }
            | FailureKind::MethodAsProperty { .. }
            | FailureKind::UnresolvedIdentifier { .. }
            | FailureKind::UnresolvedOperator { .. } => FailureCategory::MissingMember,
            FailureKind::ContextualMemberArgs { .. } => FailureCategory::ContextualTypeMismatch,
            FailureKind::UnwrapRequired { .. }
            | FailureKind::ForceUnwrapNonOptional { .. }
            | FailureKind::ChainingNonOptional { .. } => FailureCategory::OptionalUnwrapRequired,
            FailureKind::NotCallable { .. } => FailureCategory::NotCallable,
            FailureKind::Unavailable { .. } => FailureCategory::UnavailableSymbol,
            FailureKind::CouldNotInfer { .. }
            | FailureKind::NilRequiresContext
            | FailureKind::UnresolvedImplicitMember { .. }
            | FailureKind::ClosureResultUnresolved
            | FailureKind::ClosureParamUnresolved { .. }
            | FailureKind::Underdetermined => FailureCategory::AmbiguousInference,
        }
    }

    /// The expression owning the overload set a failure depends on.
    fn owner_of(&self, failure: &Failure) -> Option<ExprId> {
        if let Some(call) = call_of(failure) {
            return self.graph.call_site(call).map(|site| site.callee_ref);
        }
        match failure.kind {
            FailureKind::Unavailable { .. } | FailureKind::CouldNotInfer { .. } => {
                Some(failure.locator.anchor)
            }
            _ => None,
        }
    }

    /// `Type.member(...)` where the member is an instance member: the
    /// member expression, when the failure belongs to that first call.
    fn instance_member_on_type(&self, point: FailurePoint<'_>) -> Option<ExprId> {
        let call = call_of(point.failure)?;
        let site = self.graph.call_site(call)?;
        if site.layer != 0 {
            return None;
        }
        let is_member = matches!(self.arena.kind(site.callee), ExprKind::Member { .. });
        (is_member && point.attempt.member_ref(site.callee) == Some(MemberRef::InstanceOnType))
            .then_some(site.callee)
    }
}

/// The call a failure belongs to: the call of an argument, or the call
/// whose argument list as a whole failed.
fn call_of(failure: &Failure) -> Option<ExprId> {
    let locator = &failure.locator;
    locator.call().or_else(|| {
        locator
            .path
            .iter()
            .any(|e| matches!(e, LocatorElem::ApplyFunction { .. }))
            .then_some(locator.anchor)
    })
}

/// Distinct candidate indices the attempts chose for `owner`, sorted.
fn tied_choices(owner: ExprId, attempts: &[Attempt]) -> Vec<usize> {
    let mut choices: Vec<usize> = attempts
        .iter()
        .filter_map(|attempt| attempt.choice(owner))
        .collect::<FxHashSet<_>>()
        .into_iter()
        .collect();
    choices.sort_unstable();
    choices
}

/// The first overload set, in solving order, where failure-free attempts
/// disagree.
fn diverging_owner(attempts: &[Attempt]) -> Option<ExprId> {
    let first = attempts.first()?;
    first
        .choices
        .iter()
        .map(|(owner, _)| *owner)
        .find(|owner| tied_choices(*owner, attempts).len() > 1)
}

#[cfg(test)]
mod tests;
