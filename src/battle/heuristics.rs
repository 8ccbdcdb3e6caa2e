//! Deterministic fallback behavior for when search has nothing to offer.

use crate::core::CellIdx;

use super::action::Action;
use super::state::BattleState;

/// Pick the move that closes the most distance to the nearest living
/// enemy of the piece at `piece_cell`.
///
/// Distances are BFS hop counts over the movement mask; an enemy's own
/// cell is a valid BFS endpoint even though it blocks movement. Returns
/// `None` when the cell holds no living piece, no enemy is reachable, or
/// no reachable destination is strictly closer than staying put.
#[must_use]
pub fn nearest_enemy_move(state: &BattleState, piece_cell: CellIdx) -> Option<Action> {
    let piece = state.occupant(piece_cell).piece()?;
    if !piece.is_alive() {
        return None;
    }

    let enemy_cells: Vec<CellIdx> = state
        .piece_cells(piece.side.opponent())
        .into_iter()
        .filter(|&cell| {
            state
                .occupant(cell)
                .piece()
                .is_some_and(|enemy| enemy.is_alive())
        })
        .collect();
    if enemy_cells.is_empty() {
        return None;
    }

    let distance_to_nearest = |from: CellIdx| -> Option<u8> {
        enemy_cells
            .iter()
            .filter_map(|&enemy| {
                state
                    .geometry()
                    .move_distance(from, enemy, u8::MAX, state.movement_mask())
            })
            .min()
    };

    let current = distance_to_nearest(piece_cell).unwrap_or(u8::MAX);

    let mut best: Option<(u8, CellIdx)> = None;
    for dest in state.movement_range(piece_cell) {
        let Some(dist) = distance_to_nearest(dest) else {
            continue;
        };
        let better = match best {
            Some((best_dist, _)) => dist < best_dist,
            None => true,
        };
        if better {
            best = Some((dist, dest));
        }
    }

    match best {
        Some((dist, dest)) if dist < current => Some(Action::Move {
            from: piece_cell,
            to: dest,
        }),
        _ => None,
    }
}
