//! Battle state: occupancy, pieces, abilities, legal actions, simulation.
//!
//! A [`BattleState`] is one consistent, clonable snapshot of the board.
//! The search engine never touches live game objects; it clones a state
//! and mutates the clone, which is what makes parallel workers safe.

pub mod ability;
pub mod action;
pub mod heuristics;
pub mod occupant;
pub mod snapshot;
pub mod state;

pub use ability::{Ability, AbilityBook, AbilityEffect, TargetRule};
pub use action::Action;
pub use heuristics::nearest_enemy_move;
pub use occupant::{Health, Occupant, Piece};
pub use snapshot::{BoardSnapshot, CellEntry, SnapshotError};
pub use state::{BattleState, TerminalStatus};
