//! Declaration environment.
//!
//! Everything an expression can refer to: global values and functions,
//! operator overload sets, type declarations with their members and
//! conformances, and protocols. Overload sets keep declaration order, which
//! is the order the solver tries candidates in.

mod prelude;

use rustc_hash::{FxHashMap, FxHashSet};
use sift_ir::{Name, SharedInterner, StringInterner};

use crate::ty::{Primitive, Type};

/// A generic parameter with its protocol bounds: `T: Equatable`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct GenericParam {
    pub name: Name,
    pub bounds: Vec<Name>,
}

impl GenericParam {
    pub fn new(name: Name) -> Self {
        GenericParam {
            name,
            bounds: Vec::new(),
        }
    }

    #[must_use]
    pub fn bounded_by(mut self, protocol: Name) -> Self {
        self.bounds.push(protocol);
        self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueKind {
    Function,
    Variable,
    Operator,
}

/// A global function, variable or operator implementation.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ValueDecl {
    pub name: Name,
    pub kind: ValueKind,
    /// May mention `Type::Param` for each entry of `generics`.
    pub ty: Type,
    pub generics: Vec<GenericParam>,
    /// Message of an `unavailable` marking.
    pub unavailable: Option<String>,
}

impl ValueDecl {
    fn new(kind: ValueKind, name: Name, ty: Type) -> Self {
        ValueDecl {
            name,
            kind,
            ty,
            generics: Vec::new(),
            unavailable: None,
        }
    }

    pub fn function(name: Name, ty: Type) -> Self {
        Self::new(ValueKind::Function, name, ty)
    }

    pub fn variable(name: Name, ty: Type) -> Self {
        Self::new(ValueKind::Variable, name, ty)
    }

    pub fn operator(name: Name, ty: Type) -> Self {
        Self::new(ValueKind::Operator, name, ty)
    }

    #[must_use]
    pub fn with_generic(mut self, param: GenericParam) -> Self {
        self.generics.push(param);
        self
    }

    #[must_use]
    pub fn unavailable(mut self, message: impl Into<String>) -> Self {
        self.unavailable = Some(message.into());
        self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MemberKind {
    Property,
    Method,
    StaticMethod,
    /// Enum case; its type is the enum, or a function from the payload.
    Case,
    Initializer,
}

impl MemberKind {
    /// Whether the member is reached through the type rather than a value.
    pub fn is_static(self) -> bool {
        matches!(
            self,
            MemberKind::StaticMethod | MemberKind::Case | MemberKind::Initializer
        )
    }
}

/// A member of a type declaration.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemberDecl {
    /// `Name::EMPTY` for initializers.
    pub name: Name,
    pub kind: MemberKind,
    /// Methods have their function type without `self`; properties their
    /// value type; initializers return the instance type (optional if
    /// failable).
    pub ty: Type,
    pub generics: Vec<GenericParam>,
    pub unavailable: Option<String>,
}

impl MemberDecl {
    pub fn new(kind: MemberKind, name: Name, ty: Type) -> Self {
        MemberDecl {
            name,
            kind,
            ty,
            generics: Vec::new(),
            unavailable: None,
        }
    }

    pub fn property(name: Name, ty: Type) -> Self {
        Self::new(MemberKind::Property, name, ty)
    }

    pub fn method(name: Name, ty: Type) -> Self {
        Self::new(MemberKind::Method, name, ty)
    }

    pub fn static_method(name: Name, ty: Type) -> Self {
        Self::new(MemberKind::StaticMethod, name, ty)
    }

    pub fn case(name: Name, ty: Type) -> Self {
        Self::new(MemberKind::Case, name, ty)
    }

    pub fn initializer(ty: Type) -> Self {
        Self::new(MemberKind::Initializer, Name::EMPTY, ty)
    }

    #[must_use]
    pub fn with_generic(mut self, param: GenericParam) -> Self {
        self.generics.push(param);
        self
    }

    #[must_use]
    pub fn unavailable(mut self, message: impl Into<String>) -> Self {
        self.unavailable = Some(message.into());
        self
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeDeclKind {
    Struct,
    Class,
    Enum,
    Primitive,
}

/// A struct, class, enum or built-in type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TypeDecl {
    pub name: Name,
    pub kind: TypeDeclKind,
    /// The instance type, `Self` inside member signatures.
    pub ty: Type,
    pub members: Vec<MemberDecl>,
    pub conformances: Vec<Name>,
}

impl TypeDecl {
    pub fn new(kind: TypeDeclKind, name: Name) -> Self {
        TypeDecl {
            name,
            kind,
            ty: Type::nominal(name),
            members: Vec::new(),
            conformances: Vec::new(),
        }
    }

    pub fn structure(name: Name) -> Self {
        Self::new(TypeDeclKind::Struct, name)
    }

    pub fn class(name: Name) -> Self {
        Self::new(TypeDeclKind::Class, name)
    }

    pub fn enumeration(name: Name) -> Self {
        Self::new(TypeDeclKind::Enum, name)
    }

    #[must_use]
    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    #[must_use]
    pub fn conforms_to(mut self, protocol: Name) -> Self {
        self.conformances.push(protocol);
        self
    }

    /// Members called `name`, in declaration order.
    pub fn members_named(&self, name: Name) -> impl Iterator<Item = &MemberDecl> {
        self.members.iter().filter(move |m| m.name == name)
    }

    /// Declared initializers, or the implicit `() -> Self` when there are none.
    pub fn initializers(&self) -> Vec<MemberDecl> {
        let declared: Vec<_> = self
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::Initializer)
            .cloned()
            .collect();
        if declared.is_empty() {
            vec![MemberDecl::initializer(Type::function(
                Vec::new(),
                self.ty.clone(),
            ))]
        } else {
            declared
        }
    }
}

/// The declarations visible to the expressions being checked.
pub struct Env {
    interner: SharedInterner,
    values: FxHashMap<Name, Vec<ValueDecl>>,
    types: FxHashMap<Name, TypeDecl>,
    protocols: FxHashSet<Name>,
    infix_ops: FxHashMap<Name, Vec<ValueDecl>>,
    prefix_ops: FxHashMap<Name, Vec<ValueDecl>>,
    array: Name,
}

impl Env {
    /// An environment with no declarations at all.
    pub fn new(interner: SharedInterner) -> Self {
        let array = interner.intern("Array");
        Env {
            interner,
            values: FxHashMap::default(),
            types: FxHashMap::default(),
            protocols: FxHashSet::default(),
            infix_ops: FxHashMap::default(),
            prefix_ops: FxHashMap::default(),
            array,
        }
    }

    /// An environment with the built-in types, literal protocols and the
    /// arithmetic, comparison and logical operators.
    pub fn prelude(interner: SharedInterner) -> Self {
        let mut env = Self::new(interner);
        prelude::register(&mut env);
        env
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn shared_interner(&self) -> SharedInterner {
        SharedInterner::clone(&self.interner)
    }

    /// Intern `text`.
    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    // Declaration

    pub fn declare_value(&mut self, decl: ValueDecl) {
        self.values.entry(decl.name).or_default().push(decl);
    }

    pub fn declare_type(&mut self, decl: TypeDecl) {
        self.types.insert(decl.name, decl);
    }

    pub fn declare_protocol(&mut self, name: Name) {
        self.protocols.insert(name);
    }

    pub fn declare_infix_operator(&mut self, op: Name, ty: Type) {
        self.infix_ops
            .entry(op)
            .or_default()
            .push(ValueDecl::operator(op, ty));
    }

    pub fn declare_prefix_operator(&mut self, op: Name, ty: Type) {
        self.prefix_ops
            .entry(op)
            .or_default()
            .push(ValueDecl::operator(op, ty));
    }

    /// Add a member to an already declared type. Returns `false` when the
    /// type is unknown.
    pub fn add_member(&mut self, type_name: Name, member: MemberDecl) -> bool {
        match self.types.get_mut(&type_name) {
            Some(decl) => {
                decl.members.push(member);
                true
            }
            None => false,
        }
    }

    // Lookup

    /// Values called `name`, in declaration order.
    pub fn values(&self, name: Name) -> &[ValueDecl] {
        self.values.get(&name).map_or(&[], Vec::as_slice)
    }

    pub fn type_decl(&self, name: Name) -> Option<&TypeDecl> {
        self.types.get(&name)
    }

    /// The declaration behind a nominal or primitive type.
    pub fn type_decl_of(&self, ty: &Type) -> Option<&TypeDecl> {
        match ty {
            Type::Nominal { name, .. } => self.types.get(name),
            Type::Primitive(p) => self.types.get(&self.interner.intern(p.name())),
            _ => None,
        }
    }

    pub fn infix_operators(&self, op: Name) -> &[ValueDecl] {
        self.infix_ops.get(&op).map_or(&[], Vec::as_slice)
    }

    pub fn prefix_operators(&self, op: Name) -> &[ValueDecl] {
        self.prefix_ops.get(&op).map_or(&[], Vec::as_slice)
    }

    pub fn is_protocol(&self, name: Name) -> bool {
        self.protocols.contains(&name)
    }

    /// Whether `ty` declares conformance to `protocol`.
    ///
    /// Structural types conform to nothing; the error type conforms to
    /// everything.
    pub fn conforms(&self, ty: &Type, protocol: Name) -> bool {
        match ty {
            Type::Error => true,
            Type::Primitive(_) | Type::Nominal { .. } => self
                .type_decl_of(ty)
                .is_some_and(|decl| decl.conformances.contains(&protocol)),
            _ => false,
        }
    }

    /// Whether `ty` conforms to the protocol spelled `protocol`.
    pub fn conforms_to_named(&self, ty: &Type, protocol: &str) -> bool {
        self.conforms(ty, self.interner.intern(protocol))
    }

    pub fn array_name(&self) -> Name {
        self.array
    }

    /// `[elem]`.
    pub fn array_of(&self, elem: Type) -> Type {
        Type::Nominal {
            name: self.array,
            args: vec![elem],
        }
    }

    /// The element type of `[T]`.
    pub fn array_element<'t>(&self, ty: &'t Type) -> Option<&'t Type> {
        match ty {
            Type::Nominal { name, args } if *name == self.array && args.len() == 1 => {
                Some(&args[0])
            }
            _ => None,
        }
    }

    /// Primitive spelled `name`, if `name` is one.
    pub fn primitive(&self, name: Name) -> Option<Primitive> {
        Primitive::from_name(self.interner.lookup(name))
    }

    /// The type a type name denotes when used as a value.
    pub fn declared_type(&self, name: Name) -> Option<Type> {
        let decl = self.types.get(&name)?;
        Some(decl.ty.clone())
    }
}

#[cfg(test)]
mod tests;
