//! Built-in declarations.

use sift_ir::Name;

use super::{Env, MemberDecl, TypeDecl, TypeDeclKind};
use crate::ty::{Primitive, Type};

const PROTOCOLS: &[&str] = &[
    "Equatable",
    "Comparable",
    "Hashable",
    "Numeric",
    "SignedNumeric",
    "BinaryInteger",
    "FloatingPoint",
    "Sequence",
    "ExpressibleByIntegerLiteral",
    "ExpressibleByFloatLiteral",
    "ExpressibleByStringLiteral",
    "ExpressibleByBooleanLiteral",
];

/// Operand types of the arithmetic and comparison operators, in overload
/// order.
const NUMERIC_OPERANDS: &[Primitive] = &[
    Primitive::Int,
    Primitive::UInt,
    Primitive::Double,
    Primitive::Float,
];

pub(super) fn register(env: &mut Env) {
    for protocol in PROTOCOLS {
        let name = env.name(protocol);
        env.declare_protocol(name);
    }

    for &primitive in Primitive::ALL {
        let decl = primitive_decl(env, primitive);
        env.declare_type(decl);
    }

    let array = env.array_name();
    let count = env.name("count");
    let is_empty = env.name("isEmpty");
    let sequence = env.name("Sequence");
    env.declare_type(
        TypeDecl::structure(array)
            .with_member(MemberDecl::property(count, Type::int()))
            .with_member(MemberDecl::property(is_empty, Type::bool()))
            .conforms_to(sequence),
    );

    register_operators(env);
}

fn primitive_decl(env: &Env, primitive: Primitive) -> TypeDecl {
    let name = env.name(primitive.name());
    let mut decl = TypeDecl::new(TypeDeclKind::Primitive, name);
    decl.ty = Type::Primitive(primitive);

    let conformances: &[&str] = if primitive.is_integer() {
        if primitive.name().starts_with('U') {
            &[
                "Equatable",
                "Comparable",
                "Hashable",
                "Numeric",
                "BinaryInteger",
                "ExpressibleByIntegerLiteral",
            ]
        } else {
            &[
                "Equatable",
                "Comparable",
                "Hashable",
                "Numeric",
                "SignedNumeric",
                "BinaryInteger",
                "ExpressibleByIntegerLiteral",
            ]
        }
    } else if primitive.is_floating_point() {
        &[
            "Equatable",
            "Comparable",
            "Hashable",
            "Numeric",
            "SignedNumeric",
            "FloatingPoint",
            "ExpressibleByIntegerLiteral",
            "ExpressibleByFloatLiteral",
        ]
    } else {
        match primitive {
            Primitive::Bool => &["Equatable", "Hashable", "ExpressibleByBooleanLiteral"],
            Primitive::String => &[
                "Equatable",
                "Comparable",
                "Hashable",
                "Sequence",
                "ExpressibleByStringLiteral",
            ],
            _ => &[
                "Equatable",
                "Comparable",
                "Hashable",
                "ExpressibleByStringLiteral",
            ],
        }
    };
    decl.conformances = conformances.iter().map(|p| env.name(p)).collect();

    if primitive == Primitive::String {
        decl.members.push(MemberDecl::property(env.name("count"), Type::int()));
        decl.members
            .push(MemberDecl::property(env.name("isEmpty"), Type::bool()));
    }
    decl
}

fn register_operators(env: &mut Env) {
    let binary = |operand: Type, result: Type| {
        Type::simple_function(vec![operand.clone(), operand], result)
    };

    for op in ["+", "-", "*", "/"] {
        let name = env.name(op);
        for &p in NUMERIC_OPERANDS {
            env.declare_infix_operator(name, binary(Type::Primitive(p), Type::Primitive(p)));
        }
    }
    let plus = env.name("+");
    env.declare_infix_operator(plus, binary(Type::string(), Type::string()));

    for op in ["==", "!=", "<", "<=", ">", ">="] {
        let name = env.name(op);
        for &p in NUMERIC_OPERANDS {
            env.declare_infix_operator(name, binary(Type::Primitive(p), Type::bool()));
        }
        env.declare_infix_operator(name, binary(Type::string(), Type::bool()));
        if op == "==" || op == "!=" {
            env.declare_infix_operator(name, binary(Type::bool(), Type::bool()));
        }
    }

    for op in ["&&", "||"] {
        let name = env.name(op);
        env.declare_infix_operator(name, binary(Type::bool(), Type::bool()));
    }

    let minus: Name = env.name("-");
    for p in [Primitive::Int, Primitive::Double, Primitive::Float] {
        env.declare_prefix_operator(
            minus,
            Type::simple_function(vec![Type::Primitive(p)], Type::Primitive(p)),
        );
    }
    let not = env.name("!");
    env.declare_prefix_operator(not, Type::simple_function(vec![Type::bool()], Type::bool()));
}
