//! Property tests for sessions driven by arbitrary input.
//!
//! Whatever the player does, blocking pieces never share a cell, refused
//! frames leave placement untouched, and restarting always returns to the
//! loaded state.

use proptest::prelude::*;
use pushbox_engine::prelude::*;

/// Pieces that refuse entry to their cell.
const SOLID: [PieceKind; 4] = [
    PieceKind::Wall,
    PieceKind::Crate,
    PieceKind::Player,
    PieceKind::Static,
];

fn instant() -> GameConfig {
    GameConfig {
        walk_speed_ms: 0,
        ..GameConfig::default()
    }
}

fn input_strategy() -> impl Strategy<Value = InputFrame> {
    prop_oneof![
        6 => prop::sample::select(Direction::ALL.to_vec()).prop_map(InputFrame::press),
        2 => Just(InputFrame::undo_request()),
        1 => Just(InputFrame::redo_request()),
        1 => Just(InputFrame::default()),
    ]
}

fn map_strategy() -> impl Strategy<Value = LevelMap> {
    prop::sample::select(maps::builtin())
}

fn assert_solids_apart(level: &Level) -> Result<(), TestCaseError> {
    let grid = level.grid();
    for at in grid.coordinates().collect::<Vec<_>>() {
        let solid = grid
            .occupants(at)
            .unwrap()
            .into_iter()
            .filter(|&p| SOLID.contains(&grid.kind_of(p).unwrap()))
            .count();
        prop_assert!(solid <= 1, "{solid} solid pieces share {at}");
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn arbitrary_play_keeps_the_board_consistent(
        map in map_strategy(),
        inputs in prop::collection::vec(input_strategy(), 1..60)
    ) {
        let mut session = Session::new(map, instant()).unwrap();
        let start = session.state_hash();
        let crates = session.level().crates().len();

        for input in &inputs {
            let grid_before = session.level().grid().snapshot();
            let outcome = session.step(input, 0).unwrap();

            if !outcome.moved && !outcome.undone && !outcome.redone {
                prop_assert_eq!(session.level().grid().snapshot(), grid_before);
            }
            prop_assert_eq!(session.level().crates().len(), crates);
            assert_solids_apart(session.level())?;
        }

        session.restart().unwrap();
        prop_assert_eq!(session.state_hash(), start);
    }

    #[test]
    fn undoing_every_move_restores_the_grid(
        map in map_strategy(),
        directions in prop::collection::vec(prop::sample::select(Direction::ALL.to_vec()), 1..30)
    ) {
        let mut level = Level::load(&map, instant()).unwrap();
        let start = level.grid().snapshot();

        for direction in directions {
            level.move_players(direction).unwrap();
        }
        // Trailing turns from refused steps take one extra undo.
        let moves = level.move_count();
        let mut undos = 0;
        while level.undo_move() {
            undos += 1;
        }
        prop_assert!(undos >= moves);
        prop_assert!(undos <= moves + 1);
        prop_assert_eq!(level.move_count(), 0);
        prop_assert_eq!(level.grid().snapshot(), start);
    }
}
