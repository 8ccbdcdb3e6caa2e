//! # grid-tactics
//!
//! An MCTS decision engine for grid-based tactical combat.
//!
//! ## Design Principles
//!
//! 1. **No Global State**: the search core operates purely on the battle
//!    state passed to it. That is what makes cloning and parallel workers
//!    safe.
//!
//! 2. **Precompute Geometry Once**: adjacency and line-of-sight tables are
//!    built per board size and shared immutably behind an `Arc`; everything
//!    after construction is a lookup.
//!
//! 3. **Persistent Data Structures**: O(1) state cloning via `im-rs`, so
//!    every tree node can own its own board snapshot.
//!
//! ## Architecture
//!
//! - **Speed-score decisions**: instead of the conventional most-visited
//!   rule, the decision layer ranks root actions by `avg_turns / win_rate`
//!   and takes the lowest, preferring the fastest reliable win.
//!
//! - **Snapshot boundary**: workers receive the board as a serializable
//!   snapshot and rebuild their own state from it; nothing live crosses
//!   the thread boundary.
//!
//! ## Modules
//!
//! - `core`: cell indices, sides, deterministic forkable RNG
//! - `board`: geometry tables, flood-fill range, bounded move distance
//! - `battle`: occupants, abilities, battle state, actions, snapshots
//! - `mcts`: search tree, UCT loop, parallel orchestration

pub mod battle;
pub mod board;
pub mod core;
pub mod mcts;

// Re-export commonly used types
pub use crate::core::{CellIdx, GameRng, Side};

pub use crate::board::BoardGeometry;

pub use crate::battle::{
    nearest_enemy_move, Ability, AbilityBook, AbilityEffect, Action, BattleState, BoardSnapshot,
    CellEntry, Health, Occupant, Piece, SnapshotError, TargetRule, TerminalStatus,
};

pub use crate::mcts::{
    best_by_speed_score, ActionStats, NodeId, Orchestrator, SearchConfig, SearchNode, SearchStats,
    SearchTree, TreeSearch, WorkerFault, WorkerRequest, WorkerResponse,
};
