//! Sift IR - input representation for the constraint solver.
//!
//! This crate contains the data the type checker consumes:
//! - Spans for source locations
//! - Names for interned identifiers
//! - The expression tree (flat arena of `Expr` addressed by `ExprId`)
//!
//! The tree is produced by an external parser (or built directly in tests);
//! nothing in here knows about types.
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: identifiers become `Name(u32)`
//! - **Flatten Everything**: no `Box<Expr>`, children are `ExprId` indices
//! - Float literals are stored as `u64` bits so every node is `Eq + Hash`

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
pub mod ast;
mod expr_id;
mod interner;
mod name;
mod span;

pub use arena::ExprArena;
pub use ast::{CallArg, Expr, ExprKind, TupleElement};
pub use expr_id::ExprId;
pub use interner::{InternError, SharedInterner, StringInterner};
pub use name::Name;
pub use span::{Span, SpanError};
