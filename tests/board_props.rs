use seabattle::{Board, CellState, EnemyView, ShotOutcome, BOARD_SIZE, FLEET, TOTAL_SHIP_CELLS};
use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};

fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new();
    board.auto_place(&mut rng, &FLEET).unwrap();
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn placement_never_overlaps_or_touches(seed in any::<u64>()) {
        let board = random_board(seed);
        prop_assert_eq!(board.ships().len(), FLEET.len());

        let occupied: usize = (0..BOARD_SIZE)
            .flat_map(|y| (0..BOARD_SIZE).map(move |x| (x, y)))
            .filter(|&(x, y)| board.cell(x, y) == Some(CellState::Ship))
            .count();
        prop_assert_eq!(occupied, TOTAL_SHIP_CELLS);

        for (i, a) in board.ships().iter().enumerate() {
            for b in &board.ships()[i + 1..] {
                for (x, y) in b.cells() {
                    prop_assert!(!a.occupies(x, y));
                    prop_assert!(a.surroundings(BOARD_SIZE).all(|cell| cell != (x, y)));
                }
            }
        }
    }

    #[test]
    fn views_never_diverge(
        seed in any::<u64>(),
        shots in prop::collection::vec((0..BOARD_SIZE + 2, 0..BOARD_SIZE + 2), 0..150),
    ) {
        let mut board = random_board(seed);
        let mut view = EnemyView::new();
        for (x, y) in shots {
            let before = board.cell(x, y);
            let outcome = board.resolve_shot(&mut view, x, y);

            prop_assert_eq!(outcome.switches_turn(), before == Some(CellState::Empty));
            match before {
                None => prop_assert_eq!(outcome, ShotOutcome::OutOfBounds),
                Some(CellState::Ship) => prop_assert!(
                    matches!(outcome, ShotOutcome::Hit | ShotOutcome::Sunk { .. }),
                    "ship cell resolved as {:?}",
                    outcome
                ),
                Some(CellState::Empty) => prop_assert_eq!(outcome, ShotOutcome::Miss),
                Some(_) => prop_assert_eq!(outcome, ShotOutcome::AlreadyAttacked),
            }
            prop_assert_eq!(&view, &board.projection());
            for x in 0..BOARD_SIZE {
                for y in 0..BOARD_SIZE {
                    prop_assert_ne!(view.cell(x, y), Some(CellState::Ship));
                }
            }
            prop_assert_eq!(
                board.is_defeated(),
                board.ships().iter().all(|s| s.hits() == s.size())
            );
        }
    }

    #[test]
    fn second_shot_is_idempotent(seed in any::<u64>(), x in 0..BOARD_SIZE, y in 0..BOARD_SIZE) {
        let mut board = random_board(seed);
        let mut view = EnemyView::new();
        board.resolve_shot(&mut view, x, y);
        let board_after = board.clone();
        let view_after = view.clone();

        let outcome = board.resolve_shot(&mut view, x, y);
        prop_assert_eq!(outcome, ShotOutcome::AlreadyAttacked);
        prop_assert_eq!(board, board_after);
        prop_assert_eq!(view, view_after);
    }
}
