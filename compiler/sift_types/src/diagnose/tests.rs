use pretty_assertions::assert_eq;
use sift_diagnostic::ErrorCode;
use sift_ir::{CallArg, ExprArena, Name, Span, StringInterner};

use super::*;
use crate::config::SolverConfig;
use crate::constraint::ConstraintGen;
use crate::env::ValueDecl;
use crate::solve::{SolveOutcome, Solver};
use crate::ty::Type;

struct Fixture {
    env: Env,
    arena: ExprArena,
    root: ExprId,
    cx: CheckContext,
}

impl Fixture {
    /// `f(1)` against the given overloads of `f`.
    fn call_with_literal(overloads: &[(Type, Type)]) -> Self {
        let mut env = Env::prelude(StringInterner::shared());
        let f = env.name("f");
        for (param, result) in overloads {
            env.declare_value(ValueDecl::function(
                f,
                Type::simple_function(vec![param.clone()], result.clone()),
            ));
        }
        let mut arena = ExprArena::new();
        let callee = arena.ident(f, Span::new(0, 1));
        let one = arena.int(1, Span::new(2, 3));
        let root = arena.call(callee, vec![CallArg::positional(one)], Span::new(0, 4));
        Fixture {
            env,
            arena,
            root,
            cx: CheckContext::discarded(),
        }
    }

    fn ident(text: &str) -> (Self, Name) {
        let env = Env::prelude(StringInterner::shared());
        let name = env.name(text);
        let mut arena = ExprArena::new();
        let end = u32::try_from(text.len()).unwrap_or(u32::MAX);
        let root = arena.ident(name, Span::new(0, end));
        let fixture = Fixture {
            env,
            arena,
            root,
            cx: CheckContext::discarded(),
        };
        (fixture, name)
    }

    fn graph(&self) -> ConstraintGraph {
        ConstraintGen::generate(&self.env, &self.arena, self.root, &self.cx)
    }

    fn diagnose(&self) -> Diagnostic {
        let graph = self.graph();
        let diagnoser = Diagnoser::new(&self.env, &self.arena, &graph, &self.cx);
        match Solver::new(&self.env, &self.arena, &graph, SolverConfig::default()).solve() {
            Ok(SolveOutcome::Unsatisfiable(attempts)) => diagnoser.diagnose(&attempts),
            Ok(SolveOutcome::Ambiguous(attempts)) => diagnoser.diagnose_ambiguous(&attempts),
            Ok(SolveOutcome::Solved(_)) => panic!("expression solved"),
            Err(err) => diagnoser.solve_error(&err),
        }
    }
}

// ========================================
// Categories
// ========================================

#[test]
fn categories_map_to_distinct_error_kinds() {
    let categories = [
        FailureCategory::ArgumentArityMismatch,
        FailureCategory::LabelMismatch,
        FailureCategory::TypeConversionFailure,
        FailureCategory::MissingMember,
        FailureCategory::AmbiguousOverload,
        FailureCategory::OptionalUnwrapRequired,
        FailureCategory::ContextualTypeMismatch,
        FailureCategory::NotCallable,
        FailureCategory::UnavailableSymbol,
        FailureCategory::AmbiguousInference,
    ];
    let kinds: FxHashSet<TypeErrorKind> = categories.iter().map(|c| c.error_kind()).collect();
    assert_eq!(kinds.len(), categories.len());
    assert!(!kinds.contains(&TypeErrorKind::IncompleteSolve));
    assert!(!kinds.contains(&TypeErrorKind::RecursiveTypeError));
}

#[test]
fn conversion_category_follows_the_locator() {
    assert_eq!(
        FailureCategory::ContextualTypeMismatch.error_kind().code(),
        ErrorCode::E2008
    );
    assert_eq!(
        FailureCategory::TypeConversionFailure.error_kind().code(),
        ErrorCode::E2001
    );
}

// ========================================
// Pipeline
// ========================================

#[test]
fn unresolved_identifier_is_a_missing_member() {
    let (fixture, _) = Fixture::ident("nowhere");
    let diagnostic = fixture.diagnose();

    assert_eq!(diagnostic.code, ErrorCode::E2004);
    assert_eq!(diagnostic.message, "use of unresolved identifier 'nowhere'");
    assert_eq!(diagnostic.primary_span(), Some(Span::new(0, 7)));
    assert!(diagnostic.fixits.is_empty());
}

#[test]
fn differing_failed_choices_report_the_overload_set() {
    let fixture = Fixture::call_with_literal(&[
        (Type::string(), Type::void()),
        (Type::bool(), Type::void()),
    ]);
    let diagnostic = fixture.diagnose();

    assert_eq!(diagnostic.code, ErrorCode::E2005);
    assert_eq!(
        diagnostic.message,
        "cannot invoke 'f' with an argument list of type '(Int)'"
    );
    assert_eq!(diagnostic.primary_span(), Some(Span::new(0, 1)));
    assert_eq!(
        diagnostic.notes,
        vec![
            "overloads for 'f' exist with these partially matching parameter lists: \
             (String), (Bool)"
                .to_string()
        ]
    );
}

#[test]
fn single_failed_choice_reports_the_argument() {
    let fixture = Fixture::call_with_literal(&[(Type::string(), Type::void())]);
    let diagnostic = fixture.diagnose();

    assert_eq!(diagnostic.code, ErrorCode::E2001);
    assert_eq!(
        diagnostic.message,
        "cannot convert value of type 'Int' to expected argument type 'String'"
    );
    assert_eq!(diagnostic.primary_span(), Some(Span::new(2, 3)));
}

#[test]
fn successful_choices_that_disagree_are_ambiguous() {
    let fixture = Fixture::call_with_literal(&[
        (Type::int(), Type::int()),
        (Type::int(), Type::double()),
    ]);
    let diagnostic = fixture.diagnose();

    assert_eq!(diagnostic.code, ErrorCode::E2005);
    assert_eq!(diagnostic.message, "ambiguous use of 'f'");
    assert_eq!(
        diagnostic.notes,
        vec!["found these candidates: (Int), (Int)".to_string()]
    );
}

#[test]
fn no_attempts_fall_back_to_a_generic_mismatch() {
    let (fixture, _) = Fixture::ident("nowhere");
    let graph = fixture.graph();
    let diagnostic = Diagnoser::new(&fixture.env, &fixture.arena, &graph, &fixture.cx).diagnose(&[]);

    assert_eq!(diagnostic.code, ErrorCode::E2001);
    assert_eq!(diagnostic.message, "type mismatch in expression");
    assert_eq!(diagnostic.primary_span(), Some(Span::new(0, 7)));
}

#[test]
fn exhausted_budget_reports_complexity() {
    let (fixture, _) = Fixture::ident("x");
    let graph = fixture.graph();
    let err = SolveError::StepBudgetExceeded { budget: 7 };
    let diagnostic =
        Diagnoser::new(&fixture.env, &fixture.arena, &graph, &fixture.cx).solve_error(&err);

    assert_eq!(diagnostic.code, ErrorCode::E2011);
    assert_eq!(
        diagnostic.message,
        "expression was too complex to be solved in reasonable time"
    );
    assert_eq!(diagnostic.notes, vec![err.to_string()]);
}

#[test]
fn recursive_substitution_is_reported_with_its_limit() {
    let (fixture, _) = Fixture::ident("x");
    let graph = fixture.graph();
    let err = SolveError::RecursiveType { limit: 32 };
    let diagnostic =
        Diagnoser::new(&fixture.env, &fixture.arena, &graph, &fixture.cx).solve_error(&err);

    assert_eq!(diagnostic.code, ErrorCode::E2010);
    assert_eq!(
        diagnostic.message,
        "type of expression is recursive; substitution exceeded depth 32"
    );
}
