use pretty_assertions::assert_eq;
use sift_ir::StringInterner;

use super::*;
use crate::SolveError;

fn show(ty: &Type, interner: &StringInterner) -> String {
    ty.display(interner).to_string()
}

#[test]
fn display_matches_source_spelling() {
    let interner = StringInterner::new();
    let c = interner.intern("c");
    let i = interner.intern("i");
    let a = interner.intern("A");

    let f = Type::simple_function(vec![Type::int(), Type::float()], Type::int());
    assert_eq!(show(&f, &interner), "(Int, Float) -> Int");

    let returns_void = Type::simple_function(vec![Type::int(), Type::float()], Type::void());
    assert_eq!(show(&returns_void, &interner), "(Int, Float) -> ()");

    let opt_fn = Type::optional(Type::simple_function(vec![Type::int()], Type::int()));
    assert_eq!(show(&opt_fn, &interner), "((Int) -> Int)?");

    let array = Type::Nominal {
        name: interner.intern("Array"),
        args: vec![Type::int()],
    };
    assert_eq!(show(&Type::optional(array), &interner), "[Int]?");

    let labeled = Type::Tuple(vec![
        TupleElem::labeled(c, Type::int()),
        TupleElem::labeled(i, Type::nominal(a)),
    ]);
    assert_eq!(show(&labeled, &interner), "(c: Int, i: A)");

    assert_eq!(show(&Type::Var(TypeVar::new(3)), &interner), "_");
    assert_eq!(show(&Type::metatype(Type::nominal(a)), &interner), "A.Type");
}

#[test]
fn param_list_keeps_labels() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let b = interner.intern("b");
    let params = vec![Param::labeled(a, Type::int()), Param::labeled(b, Type::int()).inout()];
    assert_eq!(
        ParamListDisplay::new(&params, &interner).to_string(),
        "(a: Int, b: inout Int)"
    );
    assert_eq!(ParamListDisplay::new(&[], &interner).to_string(), "()");
}

#[test]
fn curried_depth_counts_layers() {
    let inner = Type::simple_function(vec![Type::int()], Type::void());
    let curried = Type::simple_function(vec![Type::int()], inner);
    assert_eq!(curried.curried_depth(), 2);
    assert_eq!(Type::int().curried_depth(), 0);
}

#[test]
fn simplify_substitutes_recursively() {
    let t0 = TypeVar::new(0);
    let t1 = TypeVar::new(1);
    let mut bindings = Bindings::new();
    bindings.bind(t0, Type::optional(Type::Var(t1)));
    bindings.bind(t1, Type::int());

    let ty = Type::tuple(vec![Type::Var(t0), Type::bool()]);
    assert_eq!(
        ty.simplify(&bindings, 16),
        Ok(Type::tuple(vec![Type::optional(Type::int()), Type::bool()]))
    );
}

#[test]
fn simplify_leaves_unbound_vars() {
    let t0 = TypeVar::new(0);
    let bindings = Bindings::new();
    assert_eq!(Type::Var(t0).simplify(&bindings, 16), Ok(Type::Var(t0)));
}

#[test]
fn simplify_reports_runaway_substitution() {
    let mut bindings = Bindings::new();
    for id in 0..10 {
        bindings.bind(TypeVar::new(id), Type::Var(TypeVar::new(id + 1)));
    }
    bindings.bind(TypeVar::new(10), Type::int());

    assert_eq!(
        Type::Var(TypeVar::new(0)).simplify(&bindings, 4),
        Err(SolveError::RecursiveType { limit: 4 })
    );
    assert_eq!(
        Type::Var(TypeVar::new(0)).simplify(&bindings, 64),
        Ok(Type::int())
    );
}

#[test]
fn occurs_follows_bindings() {
    let t0 = TypeVar::new(0);
    let t1 = TypeVar::new(1);
    let mut bindings = Bindings::new();
    bindings.bind(t1, Type::optional(Type::Var(t0)));

    assert!(bindings.occurs(t0, &Type::Var(t1)));
    assert!(!bindings.occurs(t1, &Type::int()));
}

#[test]
fn shallow_resolve_stops_at_structure() {
    let t0 = TypeVar::new(0);
    let t1 = TypeVar::new(1);
    let mut bindings = Bindings::new();
    bindings.bind(t0, Type::Var(t1));
    assert_eq!(bindings.shallow_resolve(&Type::Var(t0)), Type::Var(t1));
    assert_eq!(bindings.unbound_var(&Type::Var(t0)), Some(t1));

    bindings.bind(t1, Type::optional(Type::Var(t0)));
    assert_eq!(
        bindings.shallow_resolve(&Type::Var(t0)),
        Type::optional(Type::Var(t0))
    );
}

#[test]
fn map_rewrites_params() {
    let interner = StringInterner::new();
    let t = interner.intern("T");
    let generic = Type::simple_function(vec![Type::Param(t)], Type::Param(t));
    let opened = generic.map(&mut |ty| match ty {
        Type::Param(_) => Type::int(),
        other => other,
    });
    assert_eq!(opened, Type::simple_function(vec![Type::int()], Type::int()));
}
