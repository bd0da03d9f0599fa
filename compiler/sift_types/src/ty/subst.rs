//! Variable bindings and substitution.

use rustc_hash::FxHashMap;

use super::{Type, TypeVar};
use crate::stack::ensure_sufficient_stack;
use crate::SolveError;

/// Type variable assignments for one solver branch.
///
/// Bindings only grow within a branch; backtracking throws the whole table
/// away by dropping the branch's clone.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    map: FxHashMap<TypeVar, Type>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: TypeVar) -> Option<&Type> {
        self.map.get(&var)
    }

    pub fn is_bound(&self, var: TypeVar) -> bool {
        self.map.contains_key(&var)
    }

    /// Record `var := ty`. The caller has already run the occurs check.
    pub fn bind(&mut self, var: TypeVar, ty: Type) {
        debug_assert!(!self.map.contains_key(&var), "rebinding {var:?}");
        self.map.insert(var, ty);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Follow bindings at the top level only.
    ///
    /// Returns the first type in the chain that is not a bound variable.
    pub fn shallow_resolve(&self, ty: &Type) -> Type {
        let mut cur = ty;
        // A chain can be at most as long as the table.
        for _ in 0..=self.map.len() {
            match cur {
                Type::Var(v) => match self.map.get(v) {
                    Some(bound) => cur = bound,
                    None => return cur.clone(),
                },
                _ => return cur.clone(),
            }
        }
        cur.clone()
    }

    /// The unbound variable a type resolves to, if any.
    pub fn unbound_var(&self, ty: &Type) -> Option<TypeVar> {
        self.shallow_resolve(ty).as_var()
    }

    /// Whether `var` occurs in `ty` after following bindings.
    pub fn occurs(&self, var: TypeVar, ty: &Type) -> bool {
        ensure_sufficient_stack(|| match self.shallow_resolve(ty) {
            Type::Var(v) => v == var,
            Type::Tuple(elems) => elems.iter().any(|e| self.occurs(var, &e.ty)),
            Type::Function { params, result } => {
                params.iter().any(|p| self.occurs(var, &p.ty)) || self.occurs(var, &result)
            }
            Type::Optional(inner) | Type::Metatype(inner) => self.occurs(var, &inner),
            Type::Nominal { args, .. } => args.iter().any(|a| self.occurs(var, a)),
            Type::Primitive(_) | Type::Param(_) | Type::Error => false,
        })
    }
}

impl Type {
    /// Substitute every bound variable, recursively.
    ///
    /// Fails with [`SolveError::RecursiveType`] once more than `max_depth`
    /// variables have been followed along one path.
    pub fn simplify(&self, bindings: &Bindings, max_depth: u32) -> Result<Type, SolveError> {
        simplify_at(self, bindings, 0, max_depth)
    }
}

fn simplify_at(
    ty: &Type,
    bindings: &Bindings,
    depth: u32,
    max_depth: u32,
) -> Result<Type, SolveError> {
    ensure_sufficient_stack(|| match ty {
        Type::Var(v) => match bindings.get(*v) {
            Some(bound) => {
                if depth >= max_depth {
                    return Err(SolveError::RecursiveType { limit: max_depth });
                }
                simplify_at(bound, bindings, depth + 1, max_depth)
            }
            None => Ok(ty.clone()),
        },
        Type::Tuple(elems) => Ok(Type::Tuple(
            elems
                .iter()
                .map(|e| {
                    Ok(super::TupleElem {
                        label: e.label,
                        ty: simplify_at(&e.ty, bindings, depth, max_depth)?,
                    })
                })
                .collect::<Result<_, SolveError>>()?,
        )),
        Type::Function { params, result } => Ok(Type::Function {
            params: params
                .iter()
                .map(|p| {
                    Ok(super::Param {
                        label: p.label,
                        ty: simplify_at(&p.ty, bindings, depth, max_depth)?,
                        inout: p.inout,
                    })
                })
                .collect::<Result<_, SolveError>>()?,
            result: Box::new(simplify_at(result, bindings, depth, max_depth)?),
        }),
        Type::Optional(inner) => Ok(Type::Optional(Box::new(simplify_at(
            inner, bindings, depth, max_depth,
        )?))),
        Type::Metatype(inner) => Ok(Type::Metatype(Box::new(simplify_at(
            inner, bindings, depth, max_depth,
        )?))),
        Type::Nominal { name, args } => Ok(Type::Nominal {
            name: *name,
            args: args
                .iter()
                .map(|a| simplify_at(a, bindings, depth, max_depth))
                .collect::<Result<_, SolveError>>()?,
        }),
        Type::Primitive(_) | Type::Param(_) | Type::Error => Ok(ty.clone()),
    })
}
