use pretty_assertions::assert_eq;
use sift_ir::{CallArg, ExprArena, ExprKind, Span, StringInterner};

use super::*;
use crate::check::CheckContext;
use crate::env::{Env, TypeDecl, ValueDecl};
use crate::failure::FailureKind;
use crate::ty::Param;

fn generate(env: &Env, arena: &ExprArena, root: ExprId, cx: &CheckContext) -> ConstraintGraph {
    ConstraintGen::generate(env, arena, root, cx)
}

fn argument_match(graph: &ConstraintGraph, call: ExprId) -> &ArgumentMatch {
    graph
        .constraints()
        .iter()
        .find_map(|c| match &c.kind {
            ConstraintKind::ArgumentMatch(m) if m.call == call => Some(m),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no argument match for {call:?}"))
}

#[test]
fn literal_gets_a_defaultable_slot() {
    let env = Env::prelude(StringInterner::shared());
    let mut arena = ExprArena::new();
    let one = arena.int(1, Span::new(0, 1));

    let graph = generate(&env, &arena, one, &CheckContext::discarded());
    assert_eq!(graph.var_count(), 1);
    assert_eq!(graph.literals().len(), 1);
    let slot = graph.literals()[0];
    assert_eq!(slot.expr, one);
    assert_eq!(slot.kind, LiteralKind::Integer);
    assert_eq!(graph.expr_type(one), Some(&Type::Var(slot.var)));
    assert_eq!(
        graph.constraints()[0].kind,
        ConstraintKind::Defaultable {
            var: slot.var,
            kind: LiteralKind::Integer
        }
    );
}

#[test]
fn bool_literal_needs_no_variable() {
    let env = Env::prelude(StringInterner::shared());
    let mut arena = ExprArena::new();
    let t = arena.alloc(ExprKind::Bool(true), Span::new(0, 4));

    let graph = generate(&env, &arena, t, &CheckContext::discarded());
    assert_eq!(graph.var_count(), 0);
    assert!(graph.constraints().is_empty());
    assert_eq!(graph.expr_type(t), Some(&Type::bool()));
}

#[test]
fn contextual_type_converts_the_root_last() {
    let env = Env::prelude(StringInterner::shared());
    let mut arena = ExprArena::new();
    let one = arena.int(1, Span::new(0, 1));

    let graph = generate(
        &env,
        &arena,
        one,
        &CheckContext::initialization(Type::double()),
    );
    let Some(last) = graph.constraints().last() else {
        panic!("no constraints generated");
    };
    assert_eq!(last.locator.anchor, one);
    assert_eq!(last.locator.last(), Some(LocatorElem::ContextualType));
    assert!(matches!(
        &last.kind,
        ConstraintKind::Convert { to, .. } if *to == Type::double()
    ));
}

#[test]
fn binary_operator_records_depths_and_parents() {
    let env = Env::prelude(StringInterner::shared());
    let mut arena = ExprArena::new();
    let one = arena.int(1, Span::new(0, 1));
    let two = arena.int(2, Span::new(4, 5));
    let plus = env.name("+");
    let sum = arena.alloc(
        ExprKind::Binary {
            op: plus,
            op_span: Span::new(2, 3),
            lhs: one,
            rhs: two,
        },
        Span::new(0, 5),
    );

    let graph = generate(&env, &arena, sum, &CheckContext::discarded());
    assert_eq!(graph.root(), sum);
    assert_eq!(graph.depth(sum), 0);
    assert_eq!(graph.depth(two), 1);
    assert_eq!(graph.parent(one), Some(sum));
    assert_eq!(graph.parent(sum), None);

    let Some(site) = graph.call_site(sum) else {
        panic!("operator has no call site");
    };
    assert_eq!(site.kind, CallKind::Operator { prefix: false });
    assert_eq!(site.name, Some(plus));
    assert_eq!(argument_match(&graph, sum).args.len(), 2);
}

#[test]
fn curried_call_counts_layers() {
    let mut env = Env::prelude(StringInterner::shared());
    let c = env.name("c");
    let class = env.name("CurriedClass");
    env.declare_value(ValueDecl::variable(c, Type::nominal(class)));
    let method2 = env.name("method2");
    let label = env.name("c");

    // c.method2(1)(c: 2)
    let mut arena = ExprArena::new();
    let base = arena.ident(c, Span::new(0, 1));
    let member = arena.member(base, method2, Span::new(2, 9));
    let one = arena.int(1, Span::new(10, 11));
    let inner = arena.call(member, vec![CallArg::positional(one)], Span::new(0, 12));
    let two = arena.int(2, Span::new(16, 17));
    let outer = arena.call(
        inner,
        vec![CallArg::labeled(label, Span::new(13, 14), two)],
        Span::new(0, 18),
    );

    let graph = generate(&env, &arena, outer, &CheckContext::discarded());
    let (Some(first), Some(second)) = (graph.call_site(inner), graph.call_site(outer)) else {
        panic!("missing call sites");
    };
    assert_eq!((first.layer, second.layer), (0, 1));
    assert_eq!(first.callee_ref, member);
    assert_eq!(second.callee_ref, member);
    assert_eq!(second.callee, inner);
    assert_eq!(second.kind, CallKind::Method);
    assert_eq!(second.name, Some(method2));
    assert_eq!(graph.call_of_ref(member), Some(inner));

    let outer_match = argument_match(&graph, outer);
    assert_eq!(outer_match.layer, 1);
    assert_eq!(outer_match.args[0].label, Some(label));
    assert_eq!(outer_match.args[0].label_span, Some(Span::new(13, 14)));
}

#[test]
fn type_name_callee_is_an_initializer_call() {
    let mut env = Env::prelude(StringInterner::shared());
    let name = env.name("UnaryOp");
    env.declare_type(TypeDecl::structure(name));

    let mut arena = ExprArena::new();
    let callee = arena.ident(name, Span::new(0, 7));
    let call = arena.call(callee, Vec::new(), Span::new(0, 9));

    let graph = generate(&env, &arena, call, &CheckContext::discarded());
    let Some(site) = graph.call_site(call) else {
        panic!("initializer call has no call site");
    };
    assert_eq!(site.kind, CallKind::Initializer);
    assert_eq!(
        graph.expr_type(callee),
        Some(&Type::metatype(Type::nominal(name)))
    );
    assert!(graph.constraints().iter().any(|c| matches!(
        &c.kind,
        ConstraintKind::Overload(set) if set.owner == callee
    )));
}

#[test]
fn inout_argument_remembers_the_ampersand() {
    let mut env = Env::prelude(StringInterner::shared());
    let takes = env.name("takesInout");
    let x = env.name("x");
    env.declare_value(ValueDecl::function(
        takes,
        Type::function(vec![Param::new(Type::int()).inout()], Type::void()),
    ));
    env.declare_value(ValueDecl::variable(x, Type::int()));

    // takesInout(&x)
    let mut arena = ExprArena::new();
    let callee = arena.ident(takes, Span::new(0, 10));
    let operand = arena.ident(x, Span::new(12, 13));
    let amp = arena.alloc(ExprKind::InOut(operand), Span::new(11, 13));
    let call = arena.call(callee, vec![CallArg::positional(amp)], Span::new(0, 14));

    let graph = generate(&env, &arena, call, &CheckContext::discarded());
    let arg = &argument_match(&graph, call).args[0];
    assert_eq!(arg.expr, amp);
    assert_eq!(arg.inout_span, Some(Span::new(11, 12)));
    assert_eq!(graph.expr_type(amp), graph.expr_type(operand));
    assert_eq!(graph.parent(operand), Some(amp));
}

#[test]
fn unknown_names_fail_during_generation() {
    let env = Env::prelude(StringInterner::shared());
    let mut arena = ExprArena::new();
    let x = env.name("nowhere");
    let ident = arena.ident(x, Span::new(0, 7));

    let graph = generate(&env, &arena, ident, &CheckContext::discarded());
    assert_eq!(graph.expr_type(ident), Some(&Type::Error));
    assert_eq!(graph.failures().len(), 1);
    assert_eq!(
        graph.failures()[0].kind,
        FailureKind::UnresolvedIdentifier { name: x }
    );
    assert_eq!(graph.failures()[0].span, Span::new(0, 7));
}

#[test]
fn unknown_operator_fails_at_the_operator() {
    let env = Env::prelude(StringInterner::shared());
    let mut arena = ExprArena::new();
    let one = arena.int(1, Span::new(0, 1));
    let two = arena.int(2, Span::new(6, 7));
    let op = env.name("<~>");
    let expr = arena.alloc(
        ExprKind::Binary {
            op,
            op_span: Span::new(2, 5),
            lhs: one,
            rhs: two,
        },
        Span::new(0, 7),
    );

    let graph = generate(&env, &arena, expr, &CheckContext::discarded());
    assert_eq!(
        graph.failures()[0].kind,
        FailureKind::UnresolvedOperator { op }
    );
    assert_eq!(graph.failures()[0].span, Span::new(2, 5));
    assert_eq!(graph.call_site(expr), None);
}

#[test]
fn locator_finds_its_conversion_and_call() {
    let mut arena = ExprArena::new();
    let anchor = arena.int(1, Span::new(0, 1));
    let call = arena.int(2, Span::new(2, 3));
    let locator = Locator::new(anchor)
        .with(LocatorElem::ApplyFunction { layer: 0 })
        .with(LocatorElem::ApplyArgument { call, index: 1 })
        .with(LocatorElem::TupleElement(0));

    assert_eq!(
        locator.conversion_context(),
        Some(LocatorElem::ApplyArgument { call, index: 1 })
    );
    assert_eq!(locator.call(), Some(call));
    assert_eq!(locator.last(), Some(LocatorElem::TupleElement(0)));
    assert_eq!(Locator::new(anchor).conversion_context(), None);
}

#[test]
fn closure_is_a_function_of_fresh_parameters() {
    let env = Env::prelude(StringInterner::shared());
    let mut arena = ExprArena::new();
    let second = arena.alloc(ExprKind::ClosureParam(1), Span::new(2, 4));
    let closure = arena.closure(2, second, Span::new(0, 6));

    let graph = generate(&env, &arena, closure, &CheckContext::discarded());
    let [slot] = graph.closures() else {
        panic!("expected one closure, got {:?}", graph.closures());
    };
    assert_eq!(slot.expr, closure);
    assert_eq!(slot.params.len(), 2);
    assert!(slot.params.iter().all(|p| matches!(p, Type::Var(_))));
    assert_ne!(slot.params[0], slot.params[1]);
    assert_eq!(slot.result, slot.params[1]);
    assert_eq!(
        graph.expr_type(closure),
        Some(&Type::simple_function(
            slot.params.clone(),
            slot.params[1].clone()
        ))
    );
}

#[test]
fn closure_parameter_outside_a_closure_is_an_error_type() {
    let env = Env::prelude(StringInterner::shared());
    let mut arena = ExprArena::new();
    let stray = arena.alloc(ExprKind::ClosureParam(0), Span::new(0, 2));

    let graph = generate(&env, &arena, stray, &CheckContext::discarded());
    assert_eq!(graph.expr_type(stray), Some(&Type::Error));
    assert!(graph.closures().is_empty());
}
