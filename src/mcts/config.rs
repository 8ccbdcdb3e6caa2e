//! Search configuration parameters.

use serde::{Deserialize, Serialize};

/// Search configuration parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// UCT exploration constant.
    /// Higher values favor exploration over exploitation.
    pub exploration_constant: f64,

    /// Wall-clock budget for one decision, in milliseconds (0 = no time
    /// cutoff). Checked once per iteration, never mid-rollout.
    pub time_budget_ms: u64,

    /// Iteration budget for one decision (0 = no iteration cutoff).
    /// Whichever of the two budgets fires first stops the search.
    pub iteration_goal: u32,

    /// Maximum actions per rollout before it is scored as a non-win.
    pub rollout_depth_cap: u32,

    /// Number of worker threads the orchestrator splits root actions over.
    pub workers: usize,

    /// Random seed. Same seed, same board, same config produces the same
    /// decision.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_constant: 0.6,
            time_budget_ms: 1000,
            iteration_goal: 20_000,
            rollout_depth_cap: 500,
            workers: 4,
            seed: 42,
        }
    }
}

impl SearchConfig {
    /// Create a new config with custom exploration constant.
    #[must_use]
    pub fn with_exploration(mut self, c: f64) -> Self {
        self.exploration_constant = c;
        self
    }

    /// Create a new config with custom time budget.
    #[must_use]
    pub fn with_time_budget_ms(mut self, ms: u64) -> Self {
        self.time_budget_ms = ms;
        self
    }

    /// Create a new config with custom iteration goal.
    #[must_use]
    pub fn with_iteration_goal(mut self, goal: u32) -> Self {
        self.iteration_goal = goal;
        self
    }

    /// Create a new config with custom rollout depth cap.
    #[must_use]
    pub fn with_rollout_depth_cap(mut self, cap: u32) -> Self {
        self.rollout_depth_cap = cap;
        self
    }

    /// Create a new config with custom worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Create a new config with custom seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
