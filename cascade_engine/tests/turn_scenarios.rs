use cascade_engine::*;
use rand_chacha::{rand_core::SeedableRng, ChaCha12Rng};

fn board(text: &str) -> Board {
    text.parse().unwrap()
}

fn kinds(indices: &[u8]) -> Vec<PieceKind> {
    indices.iter().copied().map(PieceKind::new).collect()
}

#[test]
fn single_horizontal_chain_scores_base() {
    let mut board = board(
        "..aaa
         .....
         .....
         .....
         .....",
    );
    let mut chains = board.find_chains();
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].axis, Axis::Horizontal);
    assert_eq!(chains[0].coords(), vec![(2, 4), (3, 4), (4, 4)]);

    let mut turn = TurnContext::new();
    assert_eq!(turn.score_chains(&mut chains, 60), 60);
    assert_eq!(chains[0].score, 60);

    assert_eq!(board.remove_chains(&chains), 3);
    for coord in [(2, 4), (3, 4), (4, 4)] {
        assert!(board.piece_at(coord).is_none());
    }
}

#[test]
fn combo_multiplier_rises_per_chain() {
    let board = board(
        "bbbb
         aaa.",
    );
    let mut chains = board.find_chains();
    let lengths: Vec<usize> = chains.iter().map(Chain::len).collect();
    assert_eq!(lengths, [3, 4]);

    let mut turn = TurnContext::new();
    assert_eq!(turn.score_chains(&mut chains, 60), 300);
    let scores: Vec<u32> = chains.iter().map(|chain| chain.score).collect();
    assert_eq!(scores, [60, 240]);
    assert_eq!(turn.combo_multiplier(), 3);
    assert_eq!(turn.score_delta(), 300);
}

#[test]
fn gravity_closes_a_single_gap() {
    let mut board = board("b/./a");
    let falling = *board.piece_at((0, 2)).unwrap();

    let fallen = board.fill_holes();

    assert_eq!(fallen.len(), 1);
    assert_eq!(fallen[0].len(), 1);
    assert_eq!(fallen[0][0].id, falling.id);
    assert_eq!(fallen[0][0].position, (0, 1));
    assert_eq!(board.piece_at((0, 1)).map(|piece| piece.id), Some(falling.id));
    assert!(board.piece_at((0, 2)).is_none());
}

#[test]
fn top_up_spawns_differing_kinds() {
    for seed in 0..50 {
        let mut board = board("./././b/a");
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        let spawned = board.top_up(&mut PieceGenerator::uniform(), &mut rng, 3);

        assert_eq!(spawned.len(), 1);
        let column = &spawned[0];
        assert_eq!(column.len(), 3);
        let positions: Vec<Coord> = column.iter().map(|piece| piece.position).collect();
        assert_eq!(positions, [(0, 4), (0, 3), (0, 2)]);
        assert!(column.windows(2).all(|pair| pair[0].kind != pair[1].kind));
    }
}

/// `(1,2)<->(2,2)` lines up `aaa` in column 1. Once removed, the `b` above it
/// lands between the two bottom `b`s and a second chain follows.
const CASCADE: &str = "\
    ecf
    fbe
    cda
    dac
    bab";

fn cascade_game(target_score: u32) -> Game {
    Game::builder()
        .seed(0)
        .moves(3)
        .target_score(target_score)
        .piece_generator(PieceGenerator::cycle(kinds(&[0, 4, 0, 2])))
        .initial_board(board(CASCADE))
        .build()
        .unwrap()
}

#[test]
fn cascades_keep_the_multiplier_growing() {
    let mut game = cascade_game(180);
    let swap = Swap::new((2, 2), (1, 2)).unwrap();
    let report = game.play_turn(swap).unwrap();

    assert_eq!(report.steps.len(), 2);

    let first = &report.steps[0];
    assert_eq!(first.chains.len(), 1);
    assert_eq!(first.chains[0].axis, Axis::Vertical);
    assert_eq!(first.chains[0].coords(), vec![(1, 0), (1, 1), (1, 2)]);
    assert_eq!(first.score_delta, 60);
    let fallen: Vec<Coord> = first.fallen[0].iter().map(|piece| piece.position).collect();
    assert_eq!(fallen, [(1, 0), (1, 1)]);
    assert_eq!(first.spawned[0].len(), 3);

    let second = &report.steps[1];
    assert_eq!(second.chains[0].coords(), vec![(0, 0), (1, 0), (2, 0)]);
    assert_eq!(second.chains[0].kind(), PieceKind::new(1));
    assert_eq!(second.score_delta, 120);

    assert_eq!(report.score_delta, 180);
    assert_eq!(game.state().score, 180);
    assert_eq!(game.state().turn.combo_multiplier(), 3);
    assert_eq!(report.result, Some(Ok(())));
    assert_eq!(game.board().to_string(), "cae\neaf\nfee\ncad\ndcc");
}

#[test]
fn feedback_follows_the_stages_in_order() {
    let mut game = cascade_game(10_000);
    game.submit_swap(Swap::new((1, 2), (2, 2)).unwrap()).unwrap();

    let mut kinds_seen = Vec::new();
    while game.turn_in_progress() {
        for msg in game.step().unwrap() {
            kinds_seen.push(match msg {
                Feedback::SwapPerformed { .. } => "swap",
                Feedback::ChainsRemoved { .. } => "removed",
                Feedback::PiecesFell { .. } => "fell",
                Feedback::PiecesSpawned { .. } => "spawned",
                Feedback::TurnEnded { .. } => "turn",
                Feedback::BoardShuffled { .. } => "shuffled",
                Feedback::GameEnded { .. } => "ended",
                Feedback::Debug(_) => "debug",
            });
        }
    }

    assert_eq!(
        kinds_seen,
        ["swap", "removed", "fell", "spawned", "removed", "fell", "spawned", "turn"]
    );
    assert_eq!(game.state().moves_left, 2);
    assert_eq!(game.state().turns_played, 1);
    assert_eq!(
        game.board().piece_count(),
        game.board().mask().playable_count()
    );
}

#[test]
fn next_turn_starts_with_a_fresh_multiplier() {
    let mut game = Game::builder().seed(99).moves(10).build().unwrap();
    for _ in 0..2 {
        let Some(swap) = game.hint() else { break };
        let report = game.play_turn(swap).unwrap();
        let first_score = report.steps[0].chains[0].score;
        let len = report.steps[0].chains[0].len();
        assert_eq!(first_score, scoring::chain_score(60, len, 1));
    }
}
