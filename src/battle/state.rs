//! The battle state: one consistent snapshot of board occupancy.

use std::sync::Arc;

use im::Vector;

use crate::board::BoardGeometry;
use crate::core::{CellIdx, GameRng, Side};

use super::ability::Ability;
use super::action::Action;
use super::occupant::Occupant;

/// Per-side elimination flags returned by every [`BattleState::apply`].
///
/// Both bits can be set at once: a double elimination is representable
/// and still terminal, it just has no winner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerminalStatus {
    /// The player side's total remaining health is zero.
    pub player_eliminated: bool,
    /// The enemy side's total remaining health is zero.
    pub enemy_eliminated: bool,
}

impl TerminalStatus {
    /// Whether either side has been eliminated.
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.player_eliminated || self.enemy_eliminated
    }

    /// Whether the given side has been eliminated.
    #[must_use]
    pub fn eliminated(&self, side: Side) -> bool {
        match side {
            Side::Player => self.player_eliminated,
            Side::Enemy => self.enemy_eliminated,
        }
    }

    /// The winning side, if exactly one side was eliminated.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        match (self.player_eliminated, self.enemy_eliminated) {
            (true, false) => Some(Side::Enemy),
            (false, true) => Some(Side::Player),
            _ => None,
        }
    }
}

/// One consistent, clonable snapshot of the combat board.
///
/// Owns the full occupant array plus derived per-cell blocking masks,
/// kept in sync on every mutation. The cell array is a persistent
/// [`im::Vector`], so cloning a state for a divergent search branch is
/// cheap; the geometry tables are shared behind an [`Arc`] and never
/// mutated.
///
/// The state never reaches out to globals: legality queries and mutation
/// operate purely on the data passed in, which is what makes cloning and
/// parallel workers safe.
#[derive(Clone, Debug)]
pub struct BattleState {
    geometry: Arc<BoardGeometry>,
    cells: Vector<Occupant>,
    blocks_movement: Vec<bool>,
    blocks_los: Vec<bool>,
    side_to_move: Side,
    last_action: Option<Action>,
    turn: u32,
}

impl BattleState {
    /// Build a state from an occupant list.
    ///
    /// # Panics
    ///
    /// Panics if the occupant count does not match the geometry.
    #[must_use]
    pub fn new(geometry: Arc<BoardGeometry>, occupants: Vec<Occupant>, side_to_move: Side) -> Self {
        assert_eq!(occupants.len(), geometry.cells(), "occupant count mismatch");

        let blocks_movement = occupants.iter().map(Occupant::blocks_movement).collect();
        let blocks_los = occupants.iter().map(Occupant::blocks_los).collect();

        Self {
            geometry,
            cells: Vector::from(occupants),
            blocks_movement,
            blocks_los,
            side_to_move,
            last_action: None,
            turn: 0,
        }
    }

    /// The shared geometry tables.
    #[must_use]
    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    /// A handle to the shared geometry, for states derived elsewhere.
    #[must_use]
    pub fn shared_geometry(&self) -> Arc<BoardGeometry> {
        Arc::clone(&self.geometry)
    }

    /// Total number of cells.
    #[must_use]
    pub fn cells(&self) -> usize {
        self.geometry.cells()
    }

    /// The occupant of a cell.
    #[must_use]
    pub fn occupant(&self, cell: CellIdx) -> &Occupant {
        &self.cells[cell.index()]
    }

    /// The side whose turn it is.
    #[must_use]
    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// The action that produced this state, if any.
    #[must_use]
    pub fn last_action(&self) -> Option<Action> {
        self.last_action
    }

    /// Number of actions applied since this state was built.
    #[must_use]
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// A fully independent copy: mutating the clone never affects the
    /// original. Structural sharing keeps this cheap.
    #[must_use]
    pub fn clone_state(&self) -> BattleState {
        self.clone()
    }

    /// Cells occupied by pieces of the given side, dead or alive.
    #[must_use]
    pub fn piece_cells(&self, side: Side) -> Vec<CellIdx> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, occ)| match occ.piece() {
                Some(piece) if piece.side == side => Some(CellIdx::new(i as u16)),
                _ => None,
            })
            .collect()
    }

    /// Sum of current health over a side's pieces. Each piece's health is
    /// already floored at zero.
    #[must_use]
    pub fn total_health(&self, side: Side) -> i64 {
        self.cells
            .iter()
            .filter_map(Occupant::piece)
            .filter(|piece| piece.side == side)
            .map(|piece| i64::from(piece.health.current()))
            .sum()
    }

    /// Elimination flags for the current occupancy.
    ///
    /// A side with no remaining health (or no pieces at all) is
    /// eliminated.
    #[must_use]
    pub fn terminal_status(&self) -> TerminalStatus {
        TerminalStatus {
            player_eliminated: self.total_health(Side::Player) == 0,
            enemy_eliminated: self.total_health(Side::Enemy) == 0,
        }
    }

    /// Whether the battle is over.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal_status().is_terminal()
    }

    /// Empty cells the piece at `cell` can move to.
    #[must_use]
    pub fn movement_range(&self, cell: CellIdx) -> Vec<CellIdx> {
        let Some(piece) = self.occupant(cell).piece() else {
            return Vec::new();
        };
        self.geometry
            .range_from(cell, piece.movement_points, &self.blocks_movement, false)
    }

    /// Eligible target cells for an ability used from `user`.
    ///
    /// The range fill walks through sight-blocking cells to reach further
    /// targets, but a target is rejected when its precomputed LOS path
    /// crosses a sight-blocking cell before the target itself.
    #[must_use]
    pub fn ability_targets(&self, user: CellIdx, ability: &Ability) -> Vec<CellIdx> {
        let Some(user_piece) = self.occupant(user).piece() else {
            return Vec::new();
        };
        let user_side = user_piece.side;

        let mut targets = Vec::new();

        if ability.targeting.self_target && ability.min_range == 0 && user_piece.is_alive() {
            targets.push(user);
        }

        let in_range =
            self.geometry
                .range_from_with_distance(user, ability.max_range, &self.blocks_los, true);

        for (cell, dist) in in_range {
            if dist < ability.min_range {
                continue;
            }
            let Some(target_piece) = self.occupant(cell).piece() else {
                continue;
            };
            if !target_piece.is_alive() {
                continue;
            }
            if !ability.targeting.allows(user_side, target_piece.side, false) {
                continue;
            }
            if self.line_of_sight_clear(user, cell) {
                targets.push(cell);
            }
        }

        targets
    }

    /// Whether the sight line from `from` to `to` crosses a blocking cell.
    /// The target cell itself does not block its own line.
    #[must_use]
    pub fn line_of_sight_clear(&self, from: CellIdx, to: CellIdx) -> bool {
        let path = self.geometry.los_path(from, to);
        path.iter()
            .take(path.len().saturating_sub(1))
            .all(|cell| !self.blocks_los[cell.index()])
    }

    /// Enumerate every legal action for the side to move.
    ///
    /// For each living piece of the side to move, in cell order: one
    /// `Move` per reachable empty cell, then one `UseAbility` per eligible
    /// target of each ability.
    #[must_use]
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();

        for (i, occ) in self.cells.iter().enumerate() {
            let Some(piece) = occ.piece() else { continue };
            if piece.side != self.side_to_move || !piece.is_alive() {
                continue;
            }
            let from = CellIdx::new(i as u16);

            for to in self.movement_range(from) {
                actions.push(Action::Move { from, to });
            }

            for (ability_idx, ability) in piece.abilities.iter().enumerate() {
                for target in self.ability_targets(from, ability) {
                    actions.push(Action::UseAbility {
                        user: from,
                        target,
                        ability_idx: ability_idx as u8,
                    });
                }
            }
        }

        actions
    }

    /// Apply an action: mutate occupancy, flip the side to move, and
    /// report elimination flags.
    ///
    /// The win condition is evaluated on every apply, not at fixed
    /// checkpoints: a single ability use can end the battle immediately.
    /// Eliminated pieces stay on the board (they still block cells) but
    /// contribute nothing to their side's health and take no further
    /// actions.
    pub fn apply(&mut self, action: &Action, rng: &mut GameRng) -> TerminalStatus {
        match *action {
            Action::Move { from, to } => {
                debug_assert!(self.occupant(from).piece().is_some(), "no piece at {from}");
                debug_assert!(self.occupant(to).is_empty(), "destination {to} occupied");
                self.swap_cells(from, to);
            }
            Action::UseAbility {
                user,
                target,
                ability_idx,
            } => {
                let effect = self
                    .occupant(user)
                    .piece()
                    .and_then(|piece| piece.abilities.get(ability_idx as usize))
                    .map(|ability| ability.effect);
                debug_assert!(effect.is_some(), "no ability #{ability_idx} at {user}");

                if let Some(effect) = effect {
                    if effect.roll_hit(rng) {
                        if let Some(target_piece) = self
                            .cells
                            .get_mut(target.index())
                            .and_then(Occupant::piece_mut)
                        {
                            target_piece.health.damage(effect.damage);
                        }
                    }
                }
            }
        }

        self.last_action = Some(*action);
        self.side_to_move = self.side_to_move.opponent();
        self.turn += 1;
        self.terminal_status()
    }

    /// The movement blocking mask, for distance queries.
    #[must_use]
    pub fn movement_mask(&self) -> &[bool] {
        &self.blocks_movement
    }

    fn swap_cells(&mut self, a: CellIdx, b: CellIdx) {
        let occ_a = self.cells.set(a.index(), Occupant::Empty);
        let occ_b = self.cells.set(b.index(), occ_a);
        self.cells.set(a.index(), occ_b);
        self.blocks_movement.swap(a.index(), b.index());
        self.blocks_los.swap(a.index(), b.index());
    }
}
