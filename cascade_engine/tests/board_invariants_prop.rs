/**
 * Property tests for boards and whole games.
 *
 * Invariants covered:
 * - A freshly filled board holds no run anywhere.
 * - A built game always offers a legal swap.
 * - Legality does not depend on the order a swap's cells are given in.
 * - Every playable cell stays occupied, by a piece that knows where it is, across turns.
 * - Chains found on arbitrary boards are long enough and never overlap on one axis.
 */
use std::collections::BTreeSet;

use cascade_engine::{match_detection::run_lengths_at, *};
use proptest::prelude::*;
use rand_chacha::{rand_core::SeedableRng, ChaCha12Rng};

fn assert_board_consistent(board: &Board) {
    let mask = board.mask();
    for (coord, cell) in board.grid().iter() {
        match cell {
            Some(piece) => assert_eq!(piece.position, coord),
            None => assert!(!mask.is_playable(coord), "hole left at {coord:?}"),
        }
    }
    assert_eq!(board.piece_count(), mask.playable_count());
    let ids: BTreeSet<PieceId> = board.pieces().map(|piece| piece.id).collect();
    assert_eq!(ids.len(), board.piece_count());
}

/// Layout rows with roughly one in eight cells unplayable.
fn mask_rows() -> impl Strategy<Value = Vec<Vec<bool>>> {
    (3usize..10, 3usize..10).prop_flat_map(|(width, height)| {
        prop::collection::vec(
            prop::collection::vec(prop::bool::weighted(0.875), width),
            height,
        )
    })
}

proptest! {
    #[test]
    fn initial_fill_has_no_runs(
        rows in mask_rows(),
        seed in any::<u64>(),
        kind_count in 3u8..8,
    ) {
        let mask = BoardMask::from_rows(&rows).unwrap();
        let mut board = Board::new(mask);
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        board.fill(&mut PieceGenerator::uniform(), &mut rng, kind_count);

        for coord in board.grid().coords() {
            let (horizontal, vertical) = run_lengths_at(board.grid(), coord);
            prop_assert!(horizontal <= 2 && vertical <= 2, "run at {:?}", coord);
        }
        prop_assert!(board.find_chains().is_empty());
    }

    #[test]
    fn built_games_offer_a_legal_swap(seed in any::<u64>(), kind_count in 3u8..8) {
        let game = Game::builder().seed(seed).kind_count(kind_count).build().unwrap();
        prop_assert!(game.hint().is_some());
        prop_assert!(!game.board().legal_swaps().is_empty());
        assert_board_consistent(game.board());
    }

    #[test]
    fn swap_legality_is_symmetric(seed in any::<u64>()) {
        let game = Game::builder().seed(seed).build().unwrap();
        let board = game.board();
        for (a, _) in board.grid().iter() {
            let (column, row) = a;
            for b in [(column + 1, row), (column, row + 1)] {
                if let (Some(forth), Some(back)) = (Swap::new(a, b), Swap::new(b, a)) {
                    prop_assert_eq!(board.is_legal(&forth), board.is_legal(&back));
                }
            }
        }
    }

    #[test]
    fn turns_preserve_the_population(
        rows in mask_rows(),
        seed in any::<u64>(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..12),
    ) {
        let built = Game::builder()
            .seed(seed)
            .mask(BoardMask::from_rows(&rows).unwrap())
            .moves(picks.len() as u32)
            .target_score(u32::MAX)
            .max_shuffle_attempts(200)
            .build();
        // Sparse layouts may leave no swap at all.
        let Ok(mut game) = built else { return Ok(()) };

        for pick in &picks {
            if game.ended() {
                break;
            }
            let legal: Vec<Swap> = game.board().legal_swaps().iter().copied().collect();
            let swap = *pick.get(&legal);
            let score_before = game.state().score;
            let report = game.play_turn(swap).unwrap();

            prop_assert!(!report.steps.is_empty());
            prop_assert_eq!(game.state().score, score_before + report.score_delta);
            for step in &report.steps {
                for chain in &step.chains {
                    prop_assert!(chain.len() >= 3);
                }
            }
            prop_assert!(game.board().find_chains().is_empty());
            assert_board_consistent(game.board());
        }
    }

    #[test]
    fn chains_are_minimal_and_disjoint_per_axis(
        rows in mask_rows(),
        seed in any::<u64>(),
    ) {
        let mut board = Board::new(BoardMask::from_rows(&rows).unwrap());
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let playable: Vec<Coord> = board.mask().playable_coords().collect();
        for coord in playable {
            // Few kinds so that runs are plentiful.
            let kind = PieceGenerator::uniform().next_kind(&mut rng, 3);
            board.set_piece(coord, Some(kind));
        }

        let chains = board.find_chains();
        for axis in Axis::VARIANTS {
            let mut covered = BTreeSet::new();
            for chain in chains.iter().filter(|chain| chain.axis == axis) {
                prop_assert!(chain.len() >= 3);
                prop_assert!(chain.pieces.iter().all(|piece| piece.kind == chain.kind()));
                for coord in chain.coords() {
                    prop_assert!(covered.insert(coord), "{:?} in two chains", coord);
                }
            }
        }
        for (coord, _) in board.grid().iter() {
            let in_chain = chains.iter().any(|chain| chain.coords().contains(&coord));
            prop_assert_eq!(in_chain, board.has_run_at(coord));
        }
    }
}
