//! Literal placeholder kinds and their type preferences.

use crate::env::Env;
use crate::ty::{Primitive, Type};

/// The kind of literal a placeholder variable stands for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    Nil,
}

impl LiteralKind {
    /// The type chosen when nothing else decides: `Int`, `Double`, `String`.
    ///
    /// `nil` has no default; it needs context.
    pub fn default_type(self) -> Option<Type> {
        match self {
            LiteralKind::Integer => Some(Type::int()),
            LiteralKind::Float => Some(Type::double()),
            LiteralKind::String => Some(Type::string()),
            LiteralKind::Nil => None,
        }
    }

    /// Whether a literal of this kind can have type `ty`.
    pub fn accepts(self, ty: &Type, env: &Env) -> bool {
        match (self, ty) {
            (_, Type::Error) => true,
            (LiteralKind::Nil, ty) => ty.is_optional(),
            (LiteralKind::Integer, Type::Primitive(p)) => {
                p.is_integer() || p.is_floating_point()
            }
            (LiteralKind::Float, Type::Primitive(p)) => p.is_floating_point(),
            (LiteralKind::String, Type::Primitive(p)) => {
                matches!(p, Primitive::String | Primitive::Character)
            }
            (kind, Type::Nominal { .. }) => {
                env.conforms_to_named(ty, kind.protocol_name())
            }
            _ => false,
        }
    }

    /// Ranking penalty for giving a literal of this kind the type `ty`.
    ///
    /// Zero for the default type, then increasing along the preference
    /// order, so `1 + 2` prefers the `(Int, Int)` overload.
    pub fn penalty(self, ty: &Type) -> u32 {
        match (self, ty) {
            (LiteralKind::Integer, Type::Primitive(Primitive::Int))
            | (LiteralKind::Float, Type::Primitive(Primitive::Double))
            | (LiteralKind::String, Type::Primitive(Primitive::String))
            | (LiteralKind::Nil, _)
            | (_, Type::Error) => 0,
            (LiteralKind::Integer, Type::Primitive(Primitive::Double))
            | (LiteralKind::Float, Type::Primitive(Primitive::Float))
            | (LiteralKind::String, Type::Primitive(Primitive::Character)) => 1,
            _ => 2,
        }
    }

    fn protocol_name(self) -> &'static str {
        match self {
            LiteralKind::Integer => "ExpressibleByIntegerLiteral",
            LiteralKind::Float => "ExpressibleByFloatLiteral",
            LiteralKind::String => "ExpressibleByStringLiteral",
            LiteralKind::Nil => "ExpressibleByNilLiteral",
        }
    }
}
