//! Parallel search orchestration.
//!
//! One decision spawns `W` worker threads. The root action list is
//! enumerated once and split into contiguous slices; each worker imports
//! its own copy of the board from the snapshot, re-derives the same action
//! list, and runs one independent tree search per slice action. The join
//! in `choose_action` is the only synchronization point: workers share no
//! mutable state, all communication is by value.

use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::battle::{
    Action, AbilityBook, BattleState, BoardSnapshot, SnapshotError,
};
use crate::board::BoardGeometry;
use crate::core::{GameRng, Side};

use super::config::SearchConfig;
use super::search::TreeSearch;
use super::stats::{best_by_speed_score, ActionStats};

/// Everything one worker needs for its share of a decision.
///
/// Carries the board as a snapshot rather than a live state: the worker
/// re-imports it, which keeps the boundary identical whether the worker
/// runs on a thread or on the far side of a wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerRequest {
    /// The board at the decision point.
    pub snapshot: BoardSnapshot,

    /// Side making the decision (and to move in the snapshot).
    pub side_to_move: Side,

    /// Start of this worker's slice in the shared action enumeration.
    pub action_start: usize,

    /// End (exclusive) of this worker's slice.
    pub action_end: usize,

    /// Search parameters, with the per-worker budget already applied.
    pub config: SearchConfig,

    /// Seed for this worker's RNG stream.
    pub seed: u64,
}

/// One worker's merged results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerResponse {
    /// Statistics per slice action.
    pub stats: Vec<ActionStats>,

    /// Total iterations this worker ran.
    pub iterations_run: u32,
}

/// Why a worker produced no results. Decisions degrade gracefully: the
/// remaining workers' reports are still aggregated.
#[derive(Debug, Error)]
pub enum WorkerFault {
    /// The worker thread panicked.
    #[error("search worker panicked: {0}")]
    Panicked(String),

    /// The worker thread could not be spawned.
    #[error("search worker could not be spawned: {0}")]
    Spawn(#[from] std::io::Error),

    /// The worker could not reconstruct the board.
    #[error("search worker rejected its board: {0}")]
    Import(#[from] SnapshotError),
}

/// Splits a decision across worker threads and aggregates their reports.
pub struct Orchestrator {
    config: SearchConfig,
    abilities: Arc<AbilityBook>,
}

impl Orchestrator {
    /// Create an orchestrator.
    ///
    /// Workers rebuild pieces from snapshots, resolving abilities by piece
    /// name in `abilities`; a piece whose name is not registered searches
    /// without abilities.
    #[must_use]
    pub fn new(config: SearchConfig, abilities: AbilityBook) -> Self {
        Self {
            config,
            abilities: Arc::new(abilities),
        }
    }

    /// Decide an action for the side to move in `state`.
    ///
    /// `None` means pass: the battle is already decided, the side has no
    /// legal actions, or no worker produced a usable report.
    #[must_use]
    pub fn choose_action(&self, state: &BattleState) -> Option<Action> {
        if state.is_terminal() {
            return None;
        }
        let side = state.side_to_move();
        let actions = state.legal_actions();
        if actions.is_empty() {
            return None;
        }

        let worker_count = self.config.workers.max(1).min(actions.len());
        let slice_len = (actions.len() + worker_count - 1) / worker_count;
        let worker_config = per_worker_config(&self.config, worker_count);

        let snapshot = state.export_snapshot();
        let geometry = state.shared_geometry();
        let mut seeder = GameRng::new(self.config.seed);

        debug!(
            %side,
            actions = actions.len(),
            workers = worker_count,
            "splitting decision across workers"
        );

        let mut handles = Vec::with_capacity(worker_count);
        for worker_idx in 0..worker_count {
            let action_start = worker_idx * slice_len;
            let action_end = (action_start + slice_len).min(actions.len());
            let request = WorkerRequest {
                snapshot: snapshot.clone(),
                side_to_move: side,
                action_start,
                action_end,
                config: worker_config.clone(),
                seed: seeder.fork().seed(),
            };

            let geometry = Arc::clone(&geometry);
            let abilities = Arc::clone(&self.abilities);
            let builder = thread::Builder::new().name(format!("search-worker-{worker_idx}"));
            match builder.spawn(move || run_worker(request, geometry, abilities.as_ref())) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    let fault = WorkerFault::from(err);
                    warn!(%fault, worker = worker_idx, "worker lost before start");
                }
            }
        }

        let mut merged: Vec<ActionStats> = Vec::with_capacity(actions.len());
        let mut iterations_total = 0u64;
        let mut failed = 0usize;
        for handle in handles {
            match handle.join() {
                Ok(Ok(response)) => {
                    iterations_total += u64::from(response.iterations_run);
                    for report in response.stats {
                        merge_action_stats(&mut merged, report);
                    }
                }
                Ok(Err(fault)) => {
                    failed += 1;
                    warn!(%fault, "worker failed");
                }
                Err(payload) => {
                    failed += 1;
                    let fault = WorkerFault::Panicked(panic_message(payload.as_ref()));
                    warn!(%fault, "worker failed");
                }
            }
        }

        debug!(
            reports = merged.len(),
            failed,
            iterations_total,
            "aggregating worker reports"
        );
        best_by_speed_score(&merged)
    }

    /// Decide an action for a board given only in snapshot form.
    ///
    /// Builds the geometry from the snapshot's cell count; the count must
    /// be a nonzero perfect square no larger than the cell-index space.
    pub fn choose_from_snapshot(
        &self,
        snapshot: &BoardSnapshot,
        side_to_move: Side,
    ) -> Result<Option<Action>, SnapshotError> {
        let cells = snapshot.entries.len();
        let width = (cells as f64).sqrt() as usize;
        if cells == 0 || cells > u16::MAX as usize + 1 || width * width != cells {
            return Err(SnapshotError::UnusableBoard { cells });
        }

        let geometry = Arc::new(BoardGeometry::new(cells));
        let state =
            BattleState::from_snapshot(snapshot, geometry, side_to_move, self.abilities.as_ref())?;
        Ok(self.choose_action(&state))
    }
}

/// Fold a worker's report for an action into the aggregate.
///
/// Slices are disjoint, so distinct workers normally report distinct
/// actions; duplicate reports for one action accumulate into a single
/// entry instead of competing in the decision rule.
fn merge_action_stats(merged: &mut Vec<ActionStats>, report: ActionStats) {
    match merged.iter_mut().find(|stats| stats.action == report.action) {
        Some(existing) => existing.absorb(&report),
        None => merged.push(report),
    }
}

/// Divide the decision budget evenly across workers.
///
/// Each worker gets `budget / W`, matching the tuning assumptions of the
/// single-budget configuration even though workers run concurrently. A
/// nonzero budget never divides down to zero.
fn per_worker_config(config: &SearchConfig, worker_count: usize) -> SearchConfig {
    let mut worker_config = config.clone();
    if config.time_budget_ms > 0 {
        worker_config.time_budget_ms = (config.time_budget_ms / worker_count as u64).max(1);
    }
    if config.iteration_goal > 0 {
        worker_config.iteration_goal =
            (config.iteration_goal + worker_count as u32 - 1) / worker_count as u32;
    }
    worker_config
}

/// Worker body: import the board, take the action slice, run one search
/// per slice action, report root totals.
fn run_worker(
    request: WorkerRequest,
    geometry: Arc<BoardGeometry>,
    abilities: &AbilityBook,
) -> Result<WorkerResponse, WorkerFault> {
    let state = BattleState::from_snapshot(
        &request.snapshot,
        geometry,
        request.side_to_move,
        abilities,
    )?;
    let side = request.side_to_move;

    // Deterministic enumeration: this list is identical to the one the
    // orchestrator sliced, so index ranges line up.
    let actions = state.legal_actions();
    let end = request.action_end.min(actions.len());
    let start = request.action_start.min(end);
    let slice = &actions[start..end];

    let mut rng = GameRng::new(request.seed);
    let per_action = per_action_config(&request.config, slice.len());

    let mut stats = Vec::with_capacity(slice.len());
    let mut iterations_run = 0u32;
    for &action in slice {
        let mut child = state.clone_state();
        let status = child.apply(&action, &mut rng);

        if status.is_terminal() {
            // No tree to grow below a decided state; record the outcome
            // directly so an immediate win scores speed 0.
            stats.push(ActionStats {
                action,
                wins: if status.winner() == Some(side) { 1.0 } else { 0.0 },
                visits: 1,
                turn_sum: 0,
            });
            continue;
        }

        let mut search = TreeSearch::new(child, side, per_action.clone(), rng.fork());
        search.run();
        iterations_run = iterations_run.saturating_add(search.stats().iterations);
        stats.push(search.root_stats(action));
    }

    Ok(WorkerResponse {
        stats,
        iterations_run,
    })
}

/// Divide a worker's budget across its slice actions.
fn per_action_config(config: &SearchConfig, slice_len: usize) -> SearchConfig {
    let divisor = slice_len.max(1);
    let mut per_action = config.clone();
    if config.time_budget_ms > 0 {
        per_action.time_budget_ms = (config.time_budget_ms / divisor as u64).max(1);
    }
    if config.iteration_goal > 0 {
        per_action.iteration_goal =
            (config.iteration_goal + divisor as u32 - 1) / divisor as u32;
    }
    per_action
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
