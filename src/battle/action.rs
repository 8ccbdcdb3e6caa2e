//! Tactical actions available to the side to move.

use serde::{Deserialize, Serialize};

use crate::core::CellIdx;

/// A legal action for the side to move in a given battle state.
///
/// An action is legal only if its destination or target lies in the range
/// set computed from the current state for the acting piece; the action
/// space enumeration in [`BattleState`](super::BattleState) upholds that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move the piece at `from` to the reachable empty cell `to`.
    Move {
        /// Cell the acting piece currently occupies.
        from: CellIdx,
        /// Destination cell.
        to: CellIdx,
    },
    /// Use an ability of the piece at `user` against the occupant of
    /// `target`.
    UseAbility {
        /// Cell the acting piece currently occupies.
        user: CellIdx,
        /// Cell of the target occupant.
        target: CellIdx,
        /// Index into the acting piece's ability list.
        ability_idx: u8,
    },
}

impl Action {
    /// The cell of the piece performing this action.
    #[must_use]
    pub fn actor_cell(&self) -> CellIdx {
        match self {
            Action::Move { from, .. } => *from,
            Action::UseAbility { user, .. } => *user,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Move { from, to } => write!(f, "move {} -> {}", from, to),
            Action::UseAbility {
                user,
                target,
                ability_idx,
            } => write!(f, "ability #{} {} -> {}", ability_idx, user, target),
        }
    }
}
