//! Stack growth for the recursive walks over expressions and types.
//!
//! Constraint generation recurses once per expression level and
//! substitution recurses once per type level. Both are wrapped in
//! [`ensure_sufficient_stack`] so pathologically nested input grows the
//! stack instead of overflowing it.

/// Grow when less than this much stack remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the
/// red zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::ensure_sufficient_stack;

    fn nest(depth: u32) -> u32 {
        ensure_sufficient_stack(|| if depth == 0 { 0 } else { 1 + nest(depth - 1) })
    }

    #[test]
    fn deep_recursion_survives() {
        assert_eq!(nest(100_000), 100_000);
    }
}
