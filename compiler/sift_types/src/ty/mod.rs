//! Type representation.
//!
//! Types are plain trees. Inference variables are [`TypeVar`] leaves whose
//! meaning lives in a [`Bindings`] table owned by the solver branch, so a
//! type value never changes once built; substituting bindings produces a new
//! tree (see [`Type::simplify`]).
//!
//! Curried functions are nested [`Type::Function`] results. Each layer keeps
//! its own parameter labels so a label problem can name the exact layer.

mod display;
mod subst;

pub use display::{ParamListDisplay, TypeDisplay};
pub use subst::Bindings;

use std::fmt;

use sift_ir::{Name, StringInterner};

/// An inference variable.
///
/// Ids come from a per-solve counter and are never reused within one solve.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TypeVar(u32);

impl TypeVar {
    pub const fn new(id: u32) -> Self {
        TypeVar(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$T{}", self.0)
    }
}

/// Built-in scalar types.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Primitive {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Character,
}

impl Primitive {
    pub const ALL: &[Primitive] = &[
        Primitive::Int,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::UInt,
        Primitive::UInt8,
        Primitive::UInt16,
        Primitive::UInt32,
        Primitive::UInt64,
        Primitive::Float,
        Primitive::Double,
        Primitive::Bool,
        Primitive::String,
        Primitive::Character,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Int => "Int",
            Primitive::Int8 => "Int8",
            Primitive::Int16 => "Int16",
            Primitive::Int32 => "Int32",
            Primitive::Int64 => "Int64",
            Primitive::UInt => "UInt",
            Primitive::UInt8 => "UInt8",
            Primitive::UInt16 => "UInt16",
            Primitive::UInt32 => "UInt32",
            Primitive::UInt64 => "UInt64",
            Primitive::Float => "Float",
            Primitive::Double => "Double",
            Primitive::Bool => "Bool",
            Primitive::String => "String",
            Primitive::Character => "Character",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Primitive::Int
                | Primitive::Int8
                | Primitive::Int16
                | Primitive::Int32
                | Primitive::Int64
                | Primitive::UInt
                | Primitive::UInt8
                | Primitive::UInt16
                | Primitive::UInt32
                | Primitive::UInt64
        )
    }

    pub fn is_floating_point(self) -> bool {
        matches!(self, Primitive::Float | Primitive::Double)
    }
}

/// One element of a tuple type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TupleElem {
    pub label: Option<Name>,
    pub ty: Type,
}

impl TupleElem {
    pub fn new(ty: Type) -> Self {
        TupleElem { label: None, ty }
    }

    pub fn labeled(label: Name, ty: Type) -> Self {
        TupleElem {
            label: Some(label),
            ty,
        }
    }
}

/// One parameter of a function type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Param {
    /// Argument label callers must write, if any.
    pub label: Option<Name>,
    pub ty: Type,
    pub inout: bool,
}

impl Param {
    /// An unlabeled by-value parameter.
    pub fn new(ty: Type) -> Self {
        Param {
            label: None,
            ty,
            inout: false,
        }
    }

    pub fn labeled(label: Name, ty: Type) -> Self {
        Param {
            label: Some(label),
            ty,
            inout: false,
        }
    }

    #[must_use]
    pub fn inout(mut self) -> Self {
        self.inout = true;
        self
    }
}

/// A type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Type {
    Primitive(Primitive),
    /// `(a: Int, String)`; the empty tuple is `Void`.
    Tuple(Vec<TupleElem>),
    Function {
        params: Vec<Param>,
        result: Box<Type>,
    },
    Optional(Box<Type>),
    /// A declared struct, class or enum. `Array` is spelled `[T]`.
    Nominal {
        name: Name,
        args: Vec<Type>,
    },
    Var(TypeVar),
    /// A rigid generic parameter. Unifies only with itself.
    Param(Name),
    /// The type of a type reference used as a value.
    Metatype(Box<Type>),
    /// Result of an already reported failure. Unifies with anything.
    Error,
}

impl Type {
    pub fn int() -> Self {
        Type::Primitive(Primitive::Int)
    }

    pub fn double() -> Self {
        Type::Primitive(Primitive::Double)
    }

    pub fn float() -> Self {
        Type::Primitive(Primitive::Float)
    }

    pub fn bool() -> Self {
        Type::Primitive(Primitive::Bool)
    }

    pub fn string() -> Self {
        Type::Primitive(Primitive::String)
    }

    pub fn void() -> Self {
        Type::Tuple(Vec::new())
    }

    pub fn optional(wrapped: Type) -> Self {
        Type::Optional(Box::new(wrapped))
    }

    pub fn function(params: Vec<Param>, result: Type) -> Self {
        Type::Function {
            params,
            result: Box::new(result),
        }
    }

    /// A function whose parameters are all unlabeled and by-value.
    pub fn simple_function(params: Vec<Type>, result: Type) -> Self {
        Self::function(params.into_iter().map(Param::new).collect(), result)
    }

    pub fn nominal(name: Name) -> Self {
        Type::Nominal {
            name,
            args: Vec::new(),
        }
    }

    pub fn metatype(instance: Type) -> Self {
        Type::Metatype(Box::new(instance))
    }

    pub fn tuple(elems: Vec<Type>) -> Self {
        Type::Tuple(elems.into_iter().map(TupleElem::new).collect())
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Tuple(elems) if elems.is_empty())
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Type::Error)
    }

    pub fn as_var(&self) -> Option<TypeVar> {
        match self {
            Type::Var(v) => Some(*v),
            _ => None,
        }
    }

    /// The declared name of a nominal or primitive type.
    pub fn nominal_name(&self, interner: &StringInterner) -> Option<Name> {
        match self {
            Type::Nominal { name, .. } => Some(*name),
            Type::Primitive(p) => Some(interner.intern(p.name())),
            _ => None,
        }
    }

    /// Number of curried layers: `(Int) -> (b: Int) -> ()` has depth 2.
    pub fn curried_depth(&self) -> usize {
        let mut depth = 0;
        let mut cur = self;
        while let Type::Function { result, .. } = cur {
            depth += 1;
            cur = result;
        }
        depth
    }

    /// Whether `var` appears anywhere in this type, without following bindings.
    pub fn mentions(&self, var: TypeVar) -> bool {
        self.any(&mut |t| matches!(t, Type::Var(v) if *v == var))
    }

    /// Whether any inference variable remains.
    pub fn has_vars(&self) -> bool {
        self.any(&mut |t| matches!(t, Type::Var(_)))
    }

    fn any(&self, pred: &mut impl FnMut(&Type) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Type::Tuple(elems) => elems.iter().any(|e| e.ty.any(pred)),
            Type::Function { params, result } => {
                params.iter().any(|p| p.ty.any(pred)) || result.any(pred)
            }
            Type::Optional(inner) | Type::Metatype(inner) => inner.any(pred),
            Type::Nominal { args, .. } => args.iter().any(|a| a.any(pred)),
            Type::Primitive(_) | Type::Var(_) | Type::Param(_) | Type::Error => false,
        }
    }

    /// Rebuild this type bottom-up, letting `f` replace any node.
    ///
    /// `f` sees each node after its children were mapped.
    pub fn map(&self, f: &mut impl FnMut(Type) -> Type) -> Type {
        let mapped = match self {
            Type::Tuple(elems) => Type::Tuple(
                elems
                    .iter()
                    .map(|e| TupleElem {
                        label: e.label,
                        ty: e.ty.map(f),
                    })
                    .collect(),
            ),
            Type::Function { params, result } => Type::Function {
                params: params
                    .iter()
                    .map(|p| Param {
                        label: p.label,
                        ty: p.ty.map(f),
                        inout: p.inout,
                    })
                    .collect(),
                result: Box::new(result.map(f)),
            },
            Type::Optional(inner) => Type::Optional(Box::new(inner.map(f))),
            Type::Metatype(inner) => Type::Metatype(Box::new(inner.map(f))),
            Type::Nominal { name, args } => Type::Nominal {
                name: *name,
                args: args.iter().map(|a| a.map(f)).collect(),
            },
            leaf @ (Type::Primitive(_) | Type::Var(_) | Type::Param(_) | Type::Error) => {
                leaf.clone()
            }
        };
        f(mapped)
    }

    /// Display with names resolved through `interner`.
    pub fn display<'a>(&'a self, interner: &'a StringInterner) -> TypeDisplay<'a> {
        TypeDisplay::new(self, interner)
    }
}

#[cfg(test)]
mod tests;
