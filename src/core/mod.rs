//! Core types shared across the engine: cell indices, sides, RNG.

pub mod rng;

pub use rng::GameRng;

use serde::{Deserialize, Serialize};

/// Index of a cell on the combat board.
///
/// Valid indices lie in `[0, N)` where `N` is the board's cell count.
/// The board geometry maps every index to exactly one `(x, y)` coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIdx(pub u16);

impl CellIdx {
    /// Create a new cell index.
    #[must_use]
    pub const fn new(idx: u16) -> Self {
        Self(idx)
    }

    /// Get the raw value as a usize for array indexing.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CellIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell {}", self.0)
    }
}

/// Which side a combatant fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The human-controlled side.
    Player,
    /// The AI-controlled side.
    Enemy,
}

impl Side {
    /// The opposing side.
    #[must_use]
    pub const fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Player => write!(f, "player"),
            Side::Enemy => write!(f, "enemy"),
        }
    }
}
