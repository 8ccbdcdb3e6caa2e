//! Abilities: ranged effects a piece can use against a target.
//!
//! An ability is a name, a range band, a target-eligibility rule, and an
//! effect. Effects are a flat struct of optional components (damage, hit
//! chance, guaranteed hit) rather than an open class hierarchy.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{GameRng, Side};

/// Which occupants an ability may target, relative to its user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRule {
    /// The user's own cell.
    pub self_target: bool,
    /// Pieces on the user's side.
    pub allies: bool,
    /// Pieces on the opposing side.
    pub enemies: bool,
}

impl TargetRule {
    /// Targets opposing pieces only.
    pub const ENEMIES: TargetRule = TargetRule {
        self_target: false,
        allies: false,
        enemies: true,
    };

    /// Targets friendly pieces, including the user.
    pub const ALLIES_AND_SELF: TargetRule = TargetRule {
        self_target: true,
        allies: true,
        enemies: false,
    };

    /// Whether a piece of `target_side` is an eligible target for a user
    /// of `user_side`. `is_self` marks the user's own cell.
    #[must_use]
    pub fn allows(&self, user_side: Side, target_side: Side, is_self: bool) -> bool {
        if is_self {
            return self.self_target;
        }
        if user_side == target_side {
            self.allies
        } else {
            self.enemies
        }
    }
}

/// The resolved effect of an ability use.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityEffect {
    /// Damage dealt to the target's health on a hit.
    pub damage: i32,

    /// Probability in `[0, 1]` that the effect lands. `None` means the
    /// effect always lands (no roll component).
    pub hit_chance: Option<f64>,

    /// Skip the hit roll entirely; overrides `hit_chance`.
    pub guaranteed_hit: bool,
}

impl AbilityEffect {
    /// Roll whether the effect lands.
    pub fn roll_hit(&self, rng: &mut GameRng) -> bool {
        if self.guaranteed_hit {
            return true;
        }
        match self.hit_chance {
            Some(chance) => rng.gen_bool(chance),
            None => true,
        }
    }
}

/// An ability a piece can use against a legal target in range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    /// Display name.
    pub name: String,

    /// Minimum hop distance to the target (0 allows self-targeting).
    pub min_range: u8,

    /// Maximum hop distance to the target.
    pub max_range: u8,

    /// Target eligibility.
    pub targeting: TargetRule,

    /// Effect applied on use.
    pub effect: AbilityEffect,
}

impl Ability {
    /// The basic weapon attack: 10 damage at 50% hit chance, range 1-5.
    #[must_use]
    pub fn weapon_hit() -> Self {
        Self {
            name: "Weapon Hit".to_string(),
            min_range: 1,
            max_range: 5,
            targeting: TargetRule::ENEMIES,
            effect: AbilityEffect {
                damage: 10,
                hit_chance: Some(0.5),
                guaranteed_hit: false,
            },
        }
    }
}

/// Registry mapping piece names to their ability lists.
///
/// Snapshots carry only piece identity, not ability definitions; importers
/// resolve abilities by name here, so every worker reconstructs the same
/// loadout from the same book.
#[derive(Clone, Debug)]
pub struct AbilityBook {
    entries: FxHashMap<String, SmallVec<[Ability; 2]>>,
}

impl AbilityBook {
    /// Create an empty book.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Register the ability list for a piece name, replacing any previous
    /// entry.
    pub fn register(
        &mut self,
        piece_name: impl Into<String>,
        abilities: impl IntoIterator<Item = Ability>,
    ) {
        self.entries
            .insert(piece_name.into(), abilities.into_iter().collect());
    }

    /// The abilities for a piece name; unknown names get none.
    #[must_use]
    pub fn abilities_for(&self, piece_name: &str) -> &[Ability] {
        self.entries
            .get(piece_name)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Number of registered piece names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the book has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AbilityBook {
    fn default() -> Self {
        Self::new()
    }
}
