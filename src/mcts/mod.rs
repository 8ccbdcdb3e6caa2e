//! Monte Carlo Tree Search for grid-tactics.
//!
//! ## Overview
//!
//! The search answers one question: which legal action should the side to
//! move take? Key pieces:
//!
//! - **Arena tree**: flat `Vec` of nodes addressed by `NodeId`, parent
//!   links as plain indices
//! - **UCT selection** with an unvisited-child-first rule
//! - **Random rollouts** to a terminal state or depth cap
//! - **Speed-score decision rule**: `avg_turns / win_rate`, lowest wins,
//!   preferring the fastest reliable win over the most-visited line
//! - **Parallel orchestration**: root actions split into contiguous
//!   slices over worker threads, joined and aggregated fault-tolerantly
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use grid_tactics::battle::{AbilityBook, BattleState, Health, Occupant, Piece};
//! use grid_tactics::board::BoardGeometry;
//! use grid_tactics::core::Side;
//! use grid_tactics::mcts::{Orchestrator, SearchConfig};
//!
//! let mut board = vec![Occupant::Empty; 16];
//! board[0] = Occupant::Piece(Piece::new(Side::Player, "Knight", "", 3, Health::new(30)));
//! board[15] = Occupant::Piece(Piece::new(Side::Enemy, "Ghoul", "", 3, Health::new(20)));
//! let state = BattleState::new(Arc::new(BoardGeometry::new(16)), board, Side::Player);
//!
//! let config = SearchConfig::default()
//!     .with_time_budget_ms(0)
//!     .with_iteration_goal(200)
//!     .with_workers(2);
//! let orchestrator = Orchestrator::new(config, AbilityBook::new());
//!
//! if let Some(action) = orchestrator.choose_action(&state) {
//!     println!("chosen: {action}");
//! }
//! ```

pub mod config;
pub mod node;
pub mod parallel;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::SearchConfig;
pub use node::{NodeId, SearchNode};
pub use parallel::{Orchestrator, WorkerFault, WorkerRequest, WorkerResponse};
pub use search::TreeSearch;
pub use stats::{best_by_speed_score, ActionStats, SearchStats};
pub use tree::SearchTree;
