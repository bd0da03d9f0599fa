use pretty_assertions::assert_eq;
use sift_ir::StringInterner;

use super::*;

#[test]
fn prelude_declares_primitives_with_conformances() {
    let env = Env::prelude(StringInterner::shared());
    assert!(env.conforms_to_named(&Type::int(), "ExpressibleByIntegerLiteral"));
    assert!(env.conforms_to_named(&Type::double(), "ExpressibleByFloatLiteral"));
    assert!(!env.conforms_to_named(&Type::int(), "ExpressibleByFloatLiteral"));
    assert!(env.conforms_to_named(&Type::string(), "Equatable"));
    assert!(!env.conforms_to_named(&Type::void(), "Equatable"));
    assert!(env.conforms_to_named(&Type::Error, "Equatable"));
}

#[test]
fn operator_overloads_keep_declaration_order() {
    let env = Env::prelude(StringInterner::shared());
    let plus = env.name("+");
    let operands: Vec<String> = env
        .infix_operators(plus)
        .iter()
        .map(|d| d.ty.display(env.interner()).to_string())
        .collect();
    assert_eq!(
        operands,
        vec![
            "(Int, Int) -> Int",
            "(UInt, UInt) -> UInt",
            "(Double, Double) -> Double",
            "(Float, Float) -> Float",
            "(String, String) -> String",
        ]
    );
    assert_eq!(env.prefix_operators(env.name("-")).len(), 3);
    assert!(env.infix_operators(env.name("<>")).is_empty());
}

#[test]
fn values_accumulate_overloads() {
    let mut env = Env::new(StringInterner::shared());
    let f = env.name("f");
    env.declare_value(ValueDecl::function(
        f,
        Type::simple_function(vec![Type::string()], Type::void()),
    ));
    env.declare_value(ValueDecl::function(
        f,
        Type::simple_function(vec![Type::int()], Type::void()),
    ));
    assert_eq!(env.values(f).len(), 2);
    assert!(env.values(env.name("g")).is_empty());
}

#[test]
fn implicit_initializer_when_none_declared() {
    let env = Env::new(StringInterner::shared());
    let name = env.name("UnaryOp");
    let decl = TypeDecl::structure(name);
    let inits = decl.initializers();
    assert_eq!(inits.len(), 1);
    assert_eq!(inits[0].ty, Type::function(Vec::new(), Type::nominal(name)));
}

#[test]
fn members_are_found_by_name() {
    let mut env = Env::new(StringInterner::shared());
    let color = env.name("Color");
    let red = env.name("Red");
    let rainbow = env.name("rainbow");
    env.declare_type(
        TypeDecl::enumeration(color)
            .with_member(MemberDecl::case(red, Type::nominal(color)))
            .with_member(MemberDecl::static_method(
                rainbow,
                Type::function(Vec::new(), Type::nominal(color)),
            )),
    );
    let decl = env.type_decl(color);
    assert!(decl.is_some_and(|d| d.members_named(red).count() == 1));
    assert!(env.add_member(color, MemberDecl::case(env.name("Blue"), Type::nominal(color))));
    assert!(!env.add_member(env.name("Nope"), MemberDecl::case(red, Type::int())));
}

#[test]
fn array_helpers() {
    let env = Env::prelude(StringInterner::shared());
    let array = env.array_of(Type::int());
    assert_eq!(env.array_element(&array), Some(&Type::int()));
    assert_eq!(env.array_element(&Type::int()), None);
    assert_eq!(array.display(env.interner()).to_string(), "[Int]");
}
