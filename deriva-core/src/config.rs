use serde::{Deserialize, Serialize};

/// Default per-side depth bound for the bidirectional search.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Default cap on states expanded across both frontiers.
pub const DEFAULT_MAX_STATES: usize = 50_000;

/// Search budget configuration.
///
/// The rewrite system's reachable space is not finite in general, so both
/// bounds are required for termination, not tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum rewrite depth explored from each side of the search.
    pub max_depth: usize,
    /// Maximum number of states expanded before giving up as inconclusive.
    pub max_states: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_states: DEFAULT_MAX_STATES,
        }
    }
}
