//! Resource ceilings for a run.
//!
//! Tap has no config files or environment variables; the one tunable
//! surface is how deep the evaluator may recurse and how many lexical
//! scopes may be live at once. Turning both into a passed-in struct
//! (rather than hardcoded literals) lets embedding code and tests exercise
//! the out-of-memory exit path deterministically.

/// `INITIAL_ENV_COUNT` from the original source: the default ceiling on
/// live environments.
pub const DEFAULT_MAX_ENV_STACK: usize = 100;

/// A generous default recursion ceiling for the tree-walking evaluator,
/// well below the platform stack limit at the default stack size.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_recursion_depth: usize,
    pub max_env_stack: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
            max_env_stack: DEFAULT_MAX_ENV_STACK,
        }
    }
}
