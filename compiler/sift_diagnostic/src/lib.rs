//! Diagnostic system for type-inference failures.
//!
//! A diagnostic is built once, by the failure diagnoser, and never mutated
//! after it is handed to the queue:
//! - Error code for searchability
//! - Message (what went wrong)
//! - Primary span (where it went wrong)
//! - Notes (context such as the overloads that were considered)
//! - Fix-its (exact source edits that would repair the code)
//!
//! # Error Guarantees
//!
//! `ErrorGuaranteed` is type-level proof that at least one error was emitted.
//! It can only be obtained from the queue, so a checker returning
//! `Result<T, ErrorGuaranteed>` cannot fail silently.

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;
pub mod span_utils;

pub use diagnostic::{Applicability, Diagnostic, FixIt, Label, Severity, Substitution};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
pub use span_utils::{LineOffsetTable, SourceFile, SourceLocation};
