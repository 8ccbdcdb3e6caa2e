//! Cell occupants: empty ground, terrain, and combat pieces.
//!
//! The occupant hierarchy is a closed tagged variant dispatched by pattern
//! matching. Terrain and pieces both block movement and line of sight;
//! only pieces carry stats and abilities.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::Side;

use super::ability::Ability;

/// A health resource with a current and maximum value.
///
/// Current health is clamped at zero and never goes negative; a piece at
/// zero health no longer counts towards its side's win condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    /// Create a health pool at full value.
    #[must_use]
    pub fn new(max: i32) -> Self {
        Self {
            current: max.max(0),
            max: max.max(0),
        }
    }

    /// Create a health pool with an explicit current value, clamped to
    /// `[0, max]`.
    #[must_use]
    pub fn with_current(current: i32, max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: current.clamp(0, max),
            max,
        }
    }

    /// Current health.
    #[inline]
    #[must_use]
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Maximum health.
    #[inline]
    #[must_use]
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Subtract damage, clamping at zero. Negative amounts are ignored.
    pub fn damage(&mut self, amount: i32) {
        self.current = (self.current - amount.max(0)).max(0);
    }

    /// Whether the pool has been reduced to zero.
    #[inline]
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }
}

/// A combatant occupying one board cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// The side this piece fights for.
    pub side: Side,

    /// Character name.
    pub name: String,

    /// Character title (display only, carried through snapshots).
    pub title: String,

    /// Movement points: maximum hops per move action.
    pub movement_points: u8,

    /// Health pool.
    pub health: Health,

    /// Abilities this piece can use.
    pub abilities: SmallVec<[Ability; 2]>,

    /// Primary stats record carried through snapshots.
    /// The simulation only derives health from it; other entries ride along
    /// so export/import round-trips.
    pub stats: FxHashMap<String, i64>,
}

impl Piece {
    /// Create a piece with no abilities and an empty stats record.
    #[must_use]
    pub fn new(
        side: Side,
        name: impl Into<String>,
        title: impl Into<String>,
        movement_points: u8,
        health: Health,
    ) -> Self {
        Self {
            side,
            name: name.into(),
            title: title.into(),
            movement_points,
            health,
            abilities: SmallVec::new(),
            stats: FxHashMap::default(),
        }
    }

    /// Attach abilities to this piece.
    #[must_use]
    pub fn with_abilities(mut self, abilities: impl IntoIterator<Item = Ability>) -> Self {
        self.abilities = abilities.into_iter().collect();
        self
    }

    /// Whether this piece still counts for its side.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }
}

/// What occupies a single board cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Occupant {
    /// Open ground.
    #[default]
    Empty,
    /// Impassable, sight-blocking terrain.
    Terrain,
    /// A combat piece.
    Piece(Piece),
}

impl Occupant {
    /// Whether this occupant blocks movement through its cell.
    #[inline]
    #[must_use]
    pub fn blocks_movement(&self) -> bool {
        !matches!(self, Occupant::Empty)
    }

    /// Whether this occupant blocks line of sight through its cell.
    #[inline]
    #[must_use]
    pub fn blocks_los(&self) -> bool {
        !matches!(self, Occupant::Empty)
    }

    /// Whether the cell is open ground.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }

    /// The piece in this cell, if any.
    #[must_use]
    pub fn piece(&self) -> Option<&Piece> {
        match self {
            Occupant::Piece(piece) => Some(piece),
            _ => None,
        }
    }

    /// Mutable access to the piece in this cell, if any.
    pub fn piece_mut(&mut self) -> Option<&mut Piece> {
        match self {
            Occupant::Piece(piece) => Some(piece),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps_at_zero() {
        let mut health = Health::new(10);
        health.damage(4);
        assert_eq!(health.current(), 6);
        health.damage(100);
        assert_eq!(health.current(), 0);
        assert!(health.is_depleted());
    }

    #[test]
    fn test_health_ignores_negative_damage() {
        let mut health = Health::new(10);
        health.damage(-5);
        assert_eq!(health.current(), 10);
    }

    #[test]
    fn test_health_with_current_clamps() {
        assert_eq!(Health::with_current(-3, 10).current(), 0);
        assert_eq!(Health::with_current(15, 10).current(), 10);
        assert_eq!(Health::with_current(7, 10).current(), 7);
    }

    #[test]
    fn test_occupant_blocking() {
        assert!(!Occupant::Empty.blocks_movement());
        assert!(!Occupant::Empty.blocks_los());
        assert!(Occupant::Terrain.blocks_movement());
        assert!(Occupant::Terrain.blocks_los());

        let piece = Piece::new(Side::Player, "Knight", "Sir", 3, Health::new(30));
        let occupant = Occupant::Piece(piece);
        assert!(occupant.blocks_movement());
        assert!(occupant.blocks_los());
        assert!(occupant.piece().is_some());
    }

    #[test]
    fn test_dead_piece_not_alive() {
        let mut piece = Piece::new(Side::Enemy, "Ghoul", "", 3, Health::new(5));
        assert!(piece.is_alive());
        piece.health.damage(5);
        assert!(!piece.is_alive());
    }

    #[test]
    fn test_occupant_serialization() {
        let piece = Piece::new(Side::Enemy, "Boss1", "The First Boss", 3, Health::new(40));
        let occupant = Occupant::Piece(piece);

        let json = serde_json::to_string(&occupant).unwrap();
        let decoded: Occupant = serde_json::from_str(&json).unwrap();
        assert_eq!(occupant, decoded);
    }
}
