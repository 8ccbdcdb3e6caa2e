//! Battle state integration tests: legality, mutation, snapshots.

use std::sync::Arc;

use grid_tactics::battle::{
    Ability, AbilityBook, AbilityEffect, Action, BattleState, BoardSnapshot, CellEntry, Health,
    Occupant, Piece, TargetRule,
};
use grid_tactics::board::BoardGeometry;
use grid_tactics::core::{CellIdx, GameRng, Side};

fn geometry(cells: usize) -> Arc<BoardGeometry> {
    Arc::new(BoardGeometry::new(cells))
}

fn knight() -> Piece {
    Piece::new(Side::Player, "Knight", "Sir", 3, Health::new(30))
}

fn boss() -> Piece {
    Piece::new(Side::Enemy, "Boss1", "The First Boss", 3, Health::new(40))
        .with_abilities([Ability::weapon_hit()])
}

fn skirmish() -> BattleState {
    let mut board = vec![Occupant::Empty; 64];
    board[0] = Occupant::Piece(knight());
    board[27] = Occupant::Terrain;
    board[28] = Occupant::Terrain;
    board[63] = Occupant::Piece(boss());
    BattleState::new(geometry(64), board, Side::Player)
}

// =============================================================================
// Movement and mutation
// =============================================================================

#[test]
fn test_move_round_trip_for_every_legal_move() {
    let original = skirmish();
    let moves: Vec<Action> = original
        .legal_actions()
        .into_iter()
        .filter(|a| matches!(a, Action::Move { .. }))
        .collect();
    assert!(!moves.is_empty());

    for action in moves {
        let Action::Move { from, to } = action else {
            unreachable!();
        };
        let mut state = original.clone_state();
        let mut rng = GameRng::new(3);

        state.apply(&Action::Move { from, to }, &mut rng);
        state.apply(&Action::Move { from: to, to: from }, &mut rng);

        for i in 0..64u16 {
            let cell = CellIdx::new(i);
            assert_eq!(
                state.occupant(cell),
                original.occupant(cell),
                "occupancy diverged at {cell} after round-tripping {action}"
            );
        }
    }
}

#[test]
fn test_clone_mutation_never_leaks() {
    let original = skirmish();
    let mut clone = original.clone_state();
    let mut rng = GameRng::new(9);

    // Drive the clone several actions deep.
    for _ in 0..6 {
        let actions = clone.legal_actions();
        if actions.is_empty() {
            break;
        }
        let action = actions[0];
        clone.apply(&action, &mut rng);
    }

    assert_eq!(original.turn(), 0);
    assert_eq!(original.side_to_move(), Side::Player);
    assert!(original.occupant(CellIdx::new(0)).piece().is_some());
    assert!(original.occupant(CellIdx::new(63)).piece().is_some());
}

#[test]
fn test_moves_never_target_blocked_cells() {
    let state = skirmish();
    for action in state.legal_actions() {
        if let Action::Move { to, .. } = action {
            assert!(
                state.occupant(to).is_empty(),
                "move into occupied cell {to}"
            );
        }
    }
}

// =============================================================================
// Abilities and elimination
// =============================================================================

#[test]
fn test_weapon_hit_requires_clear_sight_line() {
    // Boss and knight in one row with terrain between them.
    let mut board = vec![Occupant::Empty; 64];
    board[0] = Occupant::Piece(boss());
    board[2] = Occupant::Terrain;
    board[4] = Occupant::Piece(knight());
    let state = BattleState::new(geometry(64), board, Side::Enemy);

    assert!(state
        .legal_actions()
        .iter()
        .all(|a| !matches!(a, Action::UseAbility { .. })));
}

#[test]
fn test_lethal_ability_ends_battle_mid_turn() {
    let execute = Ability {
        name: "Execute".to_string(),
        min_range: 1,
        max_range: 3,
        targeting: TargetRule::ENEMIES,
        effect: AbilityEffect {
            damage: 999,
            hit_chance: None,
            guaranteed_hit: true,
        },
    };

    let mut board = vec![Occupant::Empty; 16];
    board[0] = Occupant::Piece(
        Piece::new(Side::Enemy, "Boss1", "", 3, Health::new(40)).with_abilities([execute]),
    );
    board[2] = Occupant::Piece(Piece::new(Side::Player, "Knight", "", 3, Health::new(30)));
    let mut state = BattleState::new(geometry(16), board, Side::Enemy);

    let status = state.apply(
        &Action::UseAbility {
            user: CellIdx::new(0),
            target: CellIdx::new(2),
            ability_idx: 0,
        },
        &mut GameRng::new(1),
    );

    assert!(status.is_terminal());
    assert_eq!(status.winner(), Some(Side::Enemy));
    // The dead piece stays on the board and still blocks its cell.
    assert!(state.occupant(CellIdx::new(2)).blocks_movement());
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn test_snapshot_round_trip_through_bytes() {
    let state = skirmish();
    let snapshot = state.export_snapshot();

    let bytes = snapshot.to_bytes().unwrap();
    let decoded = BoardSnapshot::from_bytes(&bytes).unwrap();
    assert_eq!(snapshot, decoded);

    let mut book = AbilityBook::new();
    book.register("Boss1", [Ability::weapon_hit()]);
    let rebuilt =
        BattleState::from_snapshot(&decoded, geometry(64), Side::Player, &book).unwrap();

    for i in 0..64u16 {
        let cell = CellIdx::new(i);
        match (state.occupant(cell), rebuilt.occupant(cell)) {
            (Occupant::Piece(a), Occupant::Piece(b)) => {
                assert_eq!(a.side, b.side);
                assert_eq!(a.name, b.name);
                assert_eq!(a.health.current(), b.health.current());
                assert_eq!(a.health.max(), b.health.max());
                assert_eq!(a.movement_points, b.movement_points);
            }
            (a, b) => assert_eq!(a, b, "cell {cell} diverged"),
        }
    }
}

#[test]
fn test_reimported_state_enumerates_identical_actions() {
    let mut book = AbilityBook::new();
    book.register("Boss1", [Ability::weapon_hit()]);

    let mut entries = vec![CellEntry::Empty; 64];
    entries[10] = CellEntry::Piece {
        side: Side::Enemy,
        name: "Boss1".to_string(),
        title: String::new(),
        stats: [("stamina".to_string(), 4)].into_iter().collect(),
    };
    entries[12] = CellEntry::Piece {
        side: Side::Player,
        name: "Knight".to_string(),
        title: String::new(),
        stats: [("stamina".to_string(), 3)].into_iter().collect(),
    };
    let snapshot = BoardSnapshot { entries };

    let first =
        BattleState::from_snapshot(&snapshot, geometry(64), Side::Enemy, &book).unwrap();
    let second = BattleState::from_snapshot(
        &first.export_snapshot(),
        geometry(64),
        Side::Enemy,
        &book,
    )
    .unwrap();

    // Workers rely on this: same snapshot, same enumeration order.
    assert_eq!(first.legal_actions(), second.legal_actions());
}

#[test]
fn test_snapshot_json_round_trip() {
    let snapshot = skirmish().export_snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let decoded: BoardSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot, decoded);
}
