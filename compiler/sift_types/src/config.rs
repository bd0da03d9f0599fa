//! Solver limits.

/// Environment variable overriding [`SolverConfig::step_budget`].
pub const BUDGET_ENV_VAR: &str = "SIFT_SOLVER_BUDGET";

/// Limits that keep one solve bounded.
///
/// Exceeding `step_budget` or `max_backtrack_depth` ends the solve with an
/// "expression was too complex" diagnostic; exceeding `max_simplify_depth`
/// while substituting bindings reports a recursive type.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SolverConfig {
    /// Constraints processed across all branches before giving up.
    pub step_budget: u32,
    /// Nested overload choices explored before giving up.
    pub max_backtrack_depth: u32,
    /// Variable substitutions followed by one `simplify` call.
    pub max_simplify_depth: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            step_budget: 100_000,
            max_backtrack_depth: 64,
            max_simplify_depth: 256,
        }
    }
}

impl SolverConfig {
    /// Defaults, with the step budget taken from `SIFT_SOLVER_BUDGET` when
    /// it is set to a valid number.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(budget) = std::env::var(BUDGET_ENV_VAR)
            .ok()
            .and_then(|raw| parse_budget(&raw))
        {
            config.step_budget = budget;
        }
        config
    }

    #[must_use]
    pub fn with_step_budget(mut self, step_budget: u32) -> Self {
        self.step_budget = step_budget;
        self
    }

    #[must_use]
    pub fn with_max_simplify_depth(mut self, depth: u32) -> Self {
        self.max_simplify_depth = depth;
        self
    }
}

fn parse_budget(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(budget) if budget > 0 => Some(budget),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!(value = raw, %err, "ignoring invalid {BUDGET_ENV_VAR}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let config = SolverConfig::default();
        assert!(config.step_budget > 0);
        assert!(config.max_backtrack_depth > 0);
        assert!(config.max_simplify_depth > 0);
    }

    #[test]
    fn budget_parsing() {
        assert_eq!(parse_budget("500"), Some(500));
        assert_eq!(parse_budget(" 42 "), Some(42));
        assert_eq!(parse_budget("0"), None);
        assert_eq!(parse_budget("lots"), None);
    }

    #[test]
    fn builder_overrides() {
        let config = SolverConfig::default()
            .with_step_budget(7)
            .with_max_simplify_depth(3);
        assert_eq!(config.step_budget, 7);
        assert_eq!(config.max_simplify_depth, 3);
    }
}
