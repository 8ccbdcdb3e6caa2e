//! Board snapshot exchange format.
//!
//! A snapshot is the only thing that crosses the boundary between the
//! caller's live game and the search workers: an ordered list of cell
//! entries, one per board cell. Piece entries carry identity and a
//! primary-stats record, not ability definitions; importers resolve
//! abilities by piece name through an [`AbilityBook`].

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::BoardGeometry;
use crate::core::Side;

use super::ability::AbilityBook;
use super::occupant::{Health, Occupant, Piece};
use super::state::BattleState;

/// Maximum health per point of the `stamina` primary stat.
pub const HEALTH_PER_STAMINA: i64 = 10;

/// Movement points used when a piece entry carries no `movement` stat.
pub const DEFAULT_MOVEMENT_POINTS: u8 = 3;

/// Why a snapshot could not be imported. Fatal for that import only; the
/// caller's own state is untouched.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The entry list does not cover the board.
    #[error("snapshot has {actual} entries, board has {expected} cells")]
    SizeMismatch {
        /// Cell count of the target geometry.
        expected: usize,
        /// Entry count of the snapshot.
        actual: usize,
    },

    /// The entry count cannot form a board at all.
    #[error("snapshot cell count {cells} does not form a square board")]
    UnusableBoard {
        /// Entry count of the snapshot.
        cells: usize,
    },

    /// An entry could not be interpreted.
    #[error("malformed snapshot entry at cell {cell}: {reason}")]
    Malformed {
        /// Index of the offending entry.
        cell: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The byte form could not be decoded.
    #[error("snapshot decode failed: {0}")]
    Decode(#[from] bincode::Error),
}

/// One cell of a board snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellEntry {
    /// Open ground.
    Empty,
    /// Impassable terrain.
    Terrain,
    /// A piece: side, identity, and its primary-stats record.
    Piece {
        /// Which side the piece fights for.
        side: Side,
        /// Character name; the key abilities are resolved under.
        name: String,
        /// Character title, carried through untouched.
        title: String,
        /// Primary stats. `max_health` (or `stamina`, times the health
        /// factor) sets maximum health, `health` the current value,
        /// `movement` the per-turn movement points; other entries ride
        /// along unmodified.
        stats: FxHashMap<String, i64>,
    },
}

/// An ordered, self-contained description of board occupancy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// One entry per cell, in cell-index order.
    pub entries: Vec<CellEntry>,
}

impl BoardSnapshot {
    /// Serialize to the compact wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Deserialize from the compact wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl BattleState {
    /// Export the current occupancy as a snapshot.
    ///
    /// The piece's carried stats record is written back with its
    /// `health`, `max_health`, and `movement` entries refreshed from the
    /// live piece, so an exported snapshot re-imports to an equivalent
    /// state even for pieces that were never built from a snapshot.
    #[must_use]
    pub fn export_snapshot(&self) -> BoardSnapshot {
        let entries = (0..self.cells())
            .map(|i| match self.occupant(crate::core::CellIdx::new(i as u16)) {
                Occupant::Empty => CellEntry::Empty,
                Occupant::Terrain => CellEntry::Terrain,
                Occupant::Piece(piece) => {
                    let mut stats = piece.stats.clone();
                    stats.insert("health".to_string(), i64::from(piece.health.current()));
                    stats.insert("max_health".to_string(), i64::from(piece.health.max()));
                    stats.insert("movement".to_string(), i64::from(piece.movement_points));
                    CellEntry::Piece {
                        side: piece.side,
                        name: piece.name.clone(),
                        title: piece.title.clone(),
                        stats,
                    }
                }
            })
            .collect();
        BoardSnapshot { entries }
    }

    /// Build a battle state from a snapshot.
    ///
    /// Maximum health derives from the `max_health` stat when present,
    /// otherwise from `stamina`; current health from the `health` stat
    /// when present, otherwise full. A piece entry with none of those
    /// stats is malformed. Abilities are resolved by piece name from
    /// `abilities`; unknown names get none.
    pub fn from_snapshot(
        snapshot: &BoardSnapshot,
        geometry: Arc<BoardGeometry>,
        side_to_move: Side,
        abilities: &AbilityBook,
    ) -> Result<BattleState, SnapshotError> {
        if snapshot.entries.len() != geometry.cells() {
            return Err(SnapshotError::SizeMismatch {
                expected: geometry.cells(),
                actual: snapshot.entries.len(),
            });
        }

        let mut occupants = Vec::with_capacity(snapshot.entries.len());
        for (cell, entry) in snapshot.entries.iter().enumerate() {
            let occupant = match entry {
                CellEntry::Empty => Occupant::Empty,
                CellEntry::Terrain => Occupant::Terrain,
                CellEntry::Piece {
                    side,
                    name,
                    title,
                    stats,
                } => {
                    let piece = build_piece(cell, *side, name, title, stats, abilities)?;
                    Occupant::Piece(piece)
                }
            };
            occupants.push(occupant);
        }

        Ok(BattleState::new(geometry, occupants, side_to_move))
    }
}

fn build_piece(
    cell: usize,
    side: Side,
    name: &str,
    title: &str,
    stats: &FxHashMap<String, i64>,
    abilities: &AbilityBook,
) -> Result<Piece, SnapshotError> {
    let malformed = |reason: String| SnapshotError::Malformed { cell, reason };

    let current_stat = stats.get("health").copied();
    let max = match (stats.get("max_health"), stats.get("stamina")) {
        (Some(&max), _) => max,
        (None, Some(&stamina)) => stamina.saturating_mul(HEALTH_PER_STAMINA),
        (None, None) => current_stat.ok_or_else(|| {
            malformed("piece entry has no max_health, stamina, or health".to_string())
        })?,
    };
    let max = i32::try_from(max)
        .map_err(|_| malformed(format!("derived maximum health {max} out of range")))?;

    let health = match current_stat {
        Some(current) => {
            let current = i32::try_from(current)
                .map_err(|_| malformed(format!("current health {current} out of range")))?;
            Health::with_current(current, max)
        }
        None => Health::new(max),
    };

    let movement_points = match stats.get("movement") {
        Some(&movement) => u8::try_from(movement)
            .map_err(|_| malformed(format!("movement {movement} out of range")))?,
        None => DEFAULT_MOVEMENT_POINTS,
    };

    let mut piece = Piece::new(side, name, title, movement_points, health);
    piece.abilities = abilities.abilities_for(name).iter().cloned().collect();
    // Canonicalize the carried record so export/import is exact even when
    // the source entry only implied these values.
    piece.stats = stats.clone();
    piece
        .stats
        .insert("health".to_string(), i64::from(piece.health.current()));
    piece
        .stats
        .insert("max_health".to_string(), i64::from(piece.health.max()));
    piece
        .stats
        .insert("movement".to_string(), i64::from(piece.movement_points));
    Ok(piece)
}
