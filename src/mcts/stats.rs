//! Per-action result statistics and the speed-score decision rule.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::battle::Action;

/// Accumulated simulation results for one root action.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionStats {
    /// The root action these results describe.
    pub action: Action,

    /// Sum of rollout outcomes (1 per win for the searching side).
    pub wins: f64,

    /// Number of simulations credited to this action.
    pub visits: u32,

    /// Sum of turns elapsed from the decision point to each rollout's end.
    pub turn_sum: u64,
}

impl ActionStats {
    /// Fresh zeroed statistics for an action.
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            wins: 0.0,
            visits: 0,
            turn_sum: 0,
        }
    }

    /// Fraction of simulations the searching side won.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / f64::from(self.visits)
        }
    }

    /// Mean turns to resolution over all simulations.
    #[must_use]
    pub fn avg_turns(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.turn_sum as f64 / f64::from(self.visits)
        }
    }

    /// `avg_turns / win_rate`: lower is better. Positive infinity when the
    /// action never won, so any action with a single observed win beats it.
    #[must_use]
    pub fn speed_score(&self) -> f64 {
        let win_rate = self.win_rate();
        if win_rate == 0.0 {
            f64::INFINITY
        } else {
            self.avg_turns() / win_rate
        }
    }

    /// Fold another report for the same action into this one.
    pub fn absorb(&mut self, other: &ActionStats) {
        debug_assert_eq!(self.action, other.action);
        self.wins += other.wins;
        self.visits += other.visits;
        self.turn_sum += other.turn_sum;
    }
}

/// Pick the action with the lowest speed score.
///
/// Prefers the fastest reliable win over the most-visited line. Actions
/// with zero visits carry no information and are skipped. When every
/// candidate has an infinite score (no rollout ever won), the most visited
/// one is returned so a legal action is still produced; `None` only when
/// no candidate has any visits at all.
#[must_use]
pub fn best_by_speed_score(stats: &[ActionStats]) -> Option<Action> {
    stats
        .iter()
        .filter(|s| s.visits > 0)
        .min_by(|a, b| {
            a.speed_score()
                .partial_cmp(&b.speed_score())
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.visits.cmp(&a.visits))
        })
        .map(|s| s.action)
}

/// Diagnostics collected during one tree search.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Iterations performed.
    pub iterations: u32,

    /// Nodes added to the tree.
    pub nodes_expanded: u32,

    /// Rollouts performed.
    pub simulations: u32,

    /// Total search time in microseconds.
    pub time_us: u64,
}

impl SearchStats {
    /// Create new empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all statistics to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Iterations per second.
    #[must_use]
    pub fn iterations_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            f64::from(self.iterations) / (self.time_us as f64 / 1_000_000.0)
        }
    }
}
