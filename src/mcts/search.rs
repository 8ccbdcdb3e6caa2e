//! Core UCT search over one battle state.
//!
//! One `TreeSearch` owns one arena tree rooted at one state and runs the
//! select / expand / rollout / backpropagate loop under a soft time or
//! iteration budget. Budget checks happen once per iteration, never inside
//! a rollout, so a single iteration may overshoot the wall-clock budget by
//! at most one rollout.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::battle::{Action, BattleState};
use crate::core::{GameRng, Side};

use super::config::SearchConfig;
use super::node::NodeId;
use super::stats::{best_by_speed_score, ActionStats, SearchStats};
use super::tree::SearchTree;

/// A single-tree UCT search.
pub struct TreeSearch {
    config: SearchConfig,
    searching_side: Side,
    root_turn: u32,
    tree: SearchTree,
    rng: GameRng,
    stats: SearchStats,
}

impl TreeSearch {
    /// Create a search rooted at `root_state`, scoring rollouts for
    /// `searching_side`.
    ///
    /// The root state need not have `searching_side` to move: the
    /// orchestrator roots each worker tree at the state *after* one of the
    /// searching side's candidate actions, where the opponent moves next.
    #[must_use]
    pub fn new(
        root_state: BattleState,
        searching_side: Side,
        config: SearchConfig,
        rng: GameRng,
    ) -> Self {
        let root_turn = root_state.turn();
        Self {
            config,
            searching_side,
            root_turn,
            tree: SearchTree::new(root_state),
            rng,
            stats: SearchStats::default(),
        }
    }

    /// Run iterations until a budget fires.
    ///
    /// With both budgets set to zero the default iteration goal applies,
    /// so the loop always terminates. Statistics describe the latest run
    /// only; the tree keeps growing across runs.
    pub fn run(&mut self) -> &SearchStats {
        self.stats.reset();
        let start = Instant::now();
        let deadline = (self.config.time_budget_ms > 0)
            .then(|| start + Duration::from_millis(self.config.time_budget_ms));
        let goal = if deadline.is_none() && self.config.iteration_goal == 0 {
            SearchConfig::default().iteration_goal
        } else {
            self.config.iteration_goal
        };

        if !self.tree.root_node().is_terminal {
            loop {
                if goal > 0 && self.stats.iterations >= goal {
                    break;
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    break;
                }
                self.iteration();
                self.stats.iterations += 1;
            }
        }

        self.stats.time_us = start.elapsed().as_micros() as u64;
        debug!(
            iterations = self.stats.iterations,
            nodes = self.tree.len(),
            terminal_nodes = self.tree.terminal_count(),
            time_us = self.stats.time_us,
            iterations_per_second = self.stats.iterations_per_second(),
            "search finished"
        );
        &self.stats
    }

    /// Single iteration: select, expand, rollout, backpropagate.
    fn iteration(&mut self) {
        // === SELECTION ===
        let mut current = self.tree.root();
        loop {
            let node = self.tree.get(current);
            if node.is_terminal || !node.is_fully_expanded() || node.children.is_empty() {
                break;
            }
            current = self.select_child(current);
        }

        // === EXPANSION ===
        if !self.tree.get(current).is_terminal && !self.tree.get(current).untried.is_empty() {
            current = self.expand(current);
            self.stats.nodes_expanded += 1;
        }

        // === ROLLOUT ===
        let (outcome, turns) = self.rollout(current);
        self.stats.simulations += 1;

        // === BACKPROPAGATION ===
        self.backpropagate(current, outcome, turns);
    }

    /// Pick the child maximizing UCT. An unvisited child is taken
    /// outright, so the exploitation term is never evaluated at zero
    /// visits; ties are broken by first-encountered order.
    fn select_child(&self, id: NodeId) -> NodeId {
        let node = self.tree.get(id);
        let parent_visits = node.visits;

        let mut best = node.children[0];
        let mut best_value = f64::NEG_INFINITY;
        for &child_id in &node.children {
            let child = self.tree.get(child_id);
            if child.visits == 0 {
                return child_id;
            }
            let value = child.uct_value(parent_visits, self.config.exploration_constant);
            if value > best_value {
                best_value = value;
                best = child_id;
            }
        }
        best
    }

    /// Remove one uniformly random untried action and expand it into a
    /// child node.
    fn expand(&mut self, id: NodeId) -> NodeId {
        let untried_len = self.tree.get(id).untried.len();
        let pick = if untried_len == 1 {
            0
        } else {
            self.rng.gen_range_usize(0..untried_len)
        };
        let action = self.tree.get_mut(id).untried.swap_remove(pick);

        let mut child_state = self.tree.get(id).state.clone_state();
        child_state.apply(&action, &mut self.rng);

        trace!(%action, node = %id, "expanding");
        self.tree.add_child(id, action, child_state)
    }

    /// Random playout from a node's state to a terminal state or the depth
    /// cap. Returns `(outcome, turns_elapsed)` measured from the root.
    fn rollout(&mut self, id: NodeId) -> (f64, u32) {
        let mut state = self.tree.get(id).state.clone_state();
        let mut rng = self.rng.fork();
        let mut status = state.terminal_status();

        let mut depth = 0u32;
        while !status.is_terminal() && depth < self.config.rollout_depth_cap {
            let actions = state.legal_actions();
            if actions.is_empty() {
                break;
            }
            let pick = rng.gen_range_usize(0..actions.len());
            status = state.apply(&actions[pick], &mut rng);
            depth += 1;
        }

        // A depth-capped or drawn playout scores zero; only an outright
        // win for the searching side counts.
        let outcome = if status.winner() == Some(self.searching_side) {
            1.0
        } else {
            0.0
        };
        (outcome, state.turn().saturating_sub(self.root_turn))
    }

    /// Credit `(outcome, turns)` to every ancestor, root included.
    fn backpropagate(&mut self, mut id: NodeId, outcome: f64, turns: u32) {
        while !id.is_none() {
            let node = self.tree.get_mut(id);
            node.visits += 1;
            node.wins += outcome;
            node.turn_sum += u64::from(turns);
            id = node.parent;
        }
    }

    /// Accumulated results for the whole tree, attributed to `action`.
    ///
    /// Used by orchestrator workers, which root one tree per candidate
    /// action: the root totals are exactly that action's statistics.
    #[must_use]
    pub fn root_stats(&self, action: Action) -> ActionStats {
        let root = self.tree.root_node();
        ActionStats {
            action,
            wins: root.wins,
            visits: root.visits,
            turn_sum: root.turn_sum,
        }
    }

    /// Per-child statistics at the root, for single-tree searches where
    /// the root children are the candidate actions themselves.
    #[must_use]
    pub fn root_child_stats(&self) -> Vec<ActionStats> {
        self.tree
            .root_node()
            .children
            .iter()
            .filter_map(|&child_id| {
                let child = self.tree.get(child_id);
                child.action.map(|action| ActionStats {
                    action,
                    wins: child.wins,
                    visits: child.visits,
                    turn_sum: child.turn_sum,
                })
            })
            .collect()
    }

    /// Best root-child action under the speed-score rule.
    #[must_use]
    pub fn best_action(&self) -> Option<Action> {
        best_by_speed_score(&self.root_child_stats())
    }

    /// Search statistics.
    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// The search tree.
    #[must_use]
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }
}
