//! The constraint graph of one expression.

use rustc_hash::FxHashMap;
use sift_ir::{ExprId, Name};

use super::{Constraint, LiteralKind};
use crate::failure::Failure;
use crate::ty::{Type, TypeVar};

/// What kind of thing a call applies.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CallKind {
    Function,
    Method,
    Initializer,
    Operator { prefix: bool },
}

/// Metadata about one call layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CallSite {
    /// The innermost callee of the curried chain (the referenced name).
    pub callee_ref: ExprId,
    /// The direct callee of this layer.
    pub callee: ExprId,
    pub layer: u32,
    pub kind: CallKind,
    pub name: Option<Name>,
}

/// A literal placeholder variable and the expression it stands for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LiteralSlot {
    pub var: TypeVar,
    pub expr: ExprId,
    pub kind: LiteralKind,
}

/// A closure expression with the variables standing for its signature.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ClosureSlot {
    pub expr: ExprId,
    pub params: Vec<Type>,
    pub result: Type,
}

/// Constraints plus everything the diagnoser needs to know about the tree
/// they came from.
///
/// Owns the type variable counter, so variable ids restart for every
/// expression and are never handed out twice within one.
#[derive(Clone, Debug)]
pub struct ConstraintGraph {
    root: ExprId,
    constraints: Vec<Constraint>,
    expr_types: FxHashMap<ExprId, Type>,
    depths: FxHashMap<ExprId, u32>,
    parents: FxHashMap<ExprId, ExprId>,
    call_sites: FxHashMap<ExprId, CallSite>,
    literals: Vec<LiteralSlot>,
    closures: Vec<ClosureSlot>,
    failures: Vec<Failure>,
    next_var: u32,
}

impl ConstraintGraph {
    pub fn new(root: ExprId) -> Self {
        ConstraintGraph {
            root,
            constraints: Vec::new(),
            expr_types: FxHashMap::default(),
            depths: FxHashMap::default(),
            parents: FxHashMap::default(),
            call_sites: FxHashMap::default(),
            literals: Vec::new(),
            closures: Vec::new(),
            failures: Vec::new(),
            next_var: 0,
        }
    }

    pub fn root(&self) -> ExprId {
        self.root
    }

    pub fn fresh_var(&mut self) -> TypeVar {
        let var = TypeVar::new(self.next_var);
        self.next_var += 1;
        var
    }

    /// Number of variables handed out so far.
    pub fn var_count(&self) -> u32 {
        self.next_var
    }

    pub fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub(crate) fn record_type(&mut self, expr: ExprId, ty: Type) {
        self.expr_types.insert(expr, ty);
    }

    /// The type generated for `expr`, before solving.
    pub fn expr_type(&self, expr: ExprId) -> Option<&Type> {
        self.expr_types.get(&expr)
    }

    pub(crate) fn expr_types(&self) -> impl Iterator<Item = (ExprId, &Type)> {
        self.expr_types.iter().map(|(id, ty)| (*id, ty))
    }

    pub(crate) fn record_depth(&mut self, expr: ExprId, depth: u32) {
        self.depths.insert(expr, depth);
    }

    /// Nesting depth of `expr`; the root is at depth 0.
    pub fn depth(&self, expr: ExprId) -> u32 {
        self.depths.get(&expr).copied().unwrap_or(0)
    }

    pub(crate) fn record_parent(&mut self, child: ExprId, parent: ExprId) {
        self.parents.insert(child, parent);
    }

    pub fn parent(&self, expr: ExprId) -> Option<ExprId> {
        self.parents.get(&expr).copied()
    }

    pub(crate) fn record_call(&mut self, call: ExprId, site: CallSite) {
        self.call_sites.insert(call, site);
    }

    pub fn call_site(&self, call: ExprId) -> Option<&CallSite> {
        self.call_sites.get(&call)
    }

    /// The outermost layer-0 call whose referenced callee is `callee_ref`.
    pub fn call_of_ref(&self, callee_ref: ExprId) -> Option<ExprId> {
        let mut expr = callee_ref;
        while let Some(parent) = self.parent(expr) {
            if let Some(site) = self.call_sites.get(&parent) {
                if site.callee_ref == callee_ref && site.layer == 0 {
                    return Some(parent);
                }
            }
            expr = parent;
        }
        self.call_sites
            .get(&callee_ref)
            .filter(|site| site.callee_ref == callee_ref)
            .map(|_| callee_ref)
    }

    pub(crate) fn record_literal(&mut self, slot: LiteralSlot) {
        self.literals.push(slot);
    }

    pub fn literals(&self) -> &[LiteralSlot] {
        &self.literals
    }

    pub(crate) fn record_closure(&mut self, slot: ClosureSlot) {
        self.closures.push(slot);
    }

    /// Closures in the order their bodies were entered.
    pub fn closures(&self) -> &[ClosureSlot] {
        &self.closures
    }

    pub(crate) fn record_failure(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Failures found while generating, such as unknown identifiers.
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }
}
