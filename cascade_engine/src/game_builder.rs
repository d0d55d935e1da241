/*!
This module handles creation / initialization / building of [`Game`]s.
*/

use rand_chacha::rand_core::SeedableRng;

use super::*;

/// This builder exposes the ability to configure a new [`Game`] to varying degrees.
///
/// Generally speaking, when using `GameBuilder`, you’ll first call [`GameBuilder::new`] or
/// [`Game::builder`], then chain calls to methods to set each field, then call
/// [`GameBuilder::build`].
/// This will give you a [`Game`] as specified that you can then use as normal.
/// The `GameBuilder` is not used up and its configuration can be re-used to initialize more [`Game`]s.
#[derive(PartialEq, Eq, Clone, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameBuilder {
    /// Many of the configuration options that will be set for the game.
    pub config: Configuration,
    /// The layout and goals of the level played.
    pub level: Level,
    /// The value to seed the game's PRNG with.
    pub seed: Option<u64>,
    /// How many different piece kinds the game uses.
    pub kind_count: Option<u8>,
    /// The method (and initial state) of piece kind generation used.
    pub piece_generator: Option<PieceGenerator>,
    /// A prepared board to start on instead of a generated one.
    pub initial_board: Option<Board>,
}

impl GameBuilder {
    /// Creates a blank new template representing a yet-to-be-started [`Game`] ready for configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`Game`] with the information specified by `self`.
    ///
    /// The board is filled and guaranteed to offer at least one legal swap.
    /// Unless an initial board was given, it contains no chains either.
    ///
    /// # Errors
    /// A [`ConfigError`] if the level grants no moves, the piece kinds cannot be generated as
    /// configured, or no playable board could be generated for the layout.
    pub fn build(&self) -> Result<Game, ConfigError> {
        let config = self.config.clone();
        let mut level = self.level.clone();
        if level.moves == 0 {
            return Err(ConfigError::ZeroMoves);
        }

        let state_init = StateInitialization {
            seed: self.seed.unwrap_or_else(rand::random),
            kind_count: self.kind_count.unwrap_or(PieceKind::DEFAULT_KIND_COUNT),
            piece_generator: self.piece_generator.clone().unwrap_or_default(),
        };
        state_init.piece_generator.validate(state_init.kind_count)?;

        let mut rng = GameRng::seed_from_u64(state_init.seed);
        let mut piece_generator = state_init.piece_generator.clone();
        let board = match &self.initial_board {
            Some(prepared) => {
                level.mask = prepared.mask().clone();
                let mut board = prepared.clone();
                board.fill_holes();
                board.top_up(&mut piece_generator, &mut rng, state_init.kind_count);
                if board.recompute_legal_swaps().is_empty() {
                    board.shuffle(
                        &mut piece_generator,
                        &mut rng,
                        state_init.kind_count,
                        config.max_shuffle_attempts,
                    )?;
                }
                board
            }
            None => {
                let mut board = Board::new(level.mask.clone());
                board.shuffle(
                    &mut piece_generator,
                    &mut rng,
                    state_init.kind_count,
                    config.max_shuffle_attempts,
                )?;
                board
            }
        };

        Ok(Game {
            state: State {
                rng,
                piece_generator,
                board,
                turn: TurnContext::new(),
                score: 0,
                moves_left: level.moves,
                turns_played: 0,
                shuffles: 0,
            },
            phase: Phase::Idle,
            config,
            state_init,
            level,
        })
    }

    /// Sets the [`Configuration`] that will be used by [`Game`].
    pub fn config(&mut self, x: Configuration) -> &mut Self {
        self.config = x;
        self
    }

    /// Points of a three-piece chain at combo multiplier `1`.
    pub fn chain_base_score(&mut self, x: u32) -> &mut Self {
        self.config.chain_base_score = x;
        self
    }
    /// Whether a board left without legal swaps after a turn is reshuffled for free.
    pub fn auto_shuffle(&mut self, x: bool) -> &mut Self {
        self.config.auto_shuffle = x;
        self
    }
    /// Whether a shuffle requested by the player uses up a move.
    pub fn shuffle_costs_move(&mut self, x: bool) -> &mut Self {
        self.config.shuffle_costs_move = x;
        self
    }
    /// How many fresh boards a shuffle may generate before giving up.
    pub fn max_shuffle_attempts(&mut self, x: u32) -> &mut Self {
        self.config.max_shuffle_attempts = x;
        self
    }
    /// The amount of feedback information that is to be generated.
    pub fn feedback_verbosity(&mut self, x: FeedbackVerbosity) -> &mut Self {
        self.config.feedback_verbosity = x;
        self
    }

    /// Sets the [`Level`] that will be played.
    pub fn level(&mut self, x: Level) -> &mut Self {
        self.level = x;
        self
    }

    /// Which cells of the board can hold pieces.
    pub fn mask(&mut self, x: BoardMask) -> &mut Self {
        self.level.mask = x;
        self
    }
    /// The score at which the level is won.
    pub fn target_score(&mut self, x: u32) -> &mut Self {
        self.level.target_score = x;
        self
    }
    /// How many turns the player has to reach the target score.
    pub fn moves(&mut self, x: u32) -> &mut Self {
        self.level.moves = x;
        self
    }

    /// Sets the [`StateInitialization`] that will be used by [`Game`].
    pub fn state_init(&mut self, x: StateInitialization) -> &mut Self {
        self.seed(x.seed)
            .kind_count(x.kind_count)
            .piece_generator(x.piece_generator)
    }

    /// The value to seed the game's PRNG with.
    pub fn seed(&mut self, x: u64) -> &mut Self {
        self.seed = Some(x);
        self
    }
    /// How many different piece kinds the game uses.
    pub fn kind_count(&mut self, x: u8) -> &mut Self {
        self.kind_count = Some(x);
        self
    }
    /// The method (and initial state) of piece kind generation used.
    pub fn piece_generator(&mut self, x: PieceGenerator) -> &mut Self {
        self.piece_generator = Some(x);
        self
    }

    /// A prepared board to start on; its layout replaces the level's mask.
    ///
    /// Empty cells are filled the way they are after a cascade, and a board without any legal
    /// swap is reshuffled.
    pub fn initial_board(&mut self, x: Board) -> &mut Self {
        self.initial_board = Some(x);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_seeds_give_equal_games() {
        let mut builder = Game::builder();
        builder.seed(1234).kind_count(5);
        let game = builder.build().unwrap();
        assert_eq!(game, builder.build().unwrap());
        assert_eq!(game.state_init().kind_count, 5);
        assert_eq!(game.state().moves_left, 20);
        assert!(!game.board().legal_swaps().is_empty());
        assert!(game.board().find_chains().is_empty());
        assert_eq!(game.phase(), &Phase::Idle);
    }

    #[test]
    fn state_init_reproduces_a_game() {
        let game = Game::builder().build().unwrap();
        let replay = Game::builder()
            .state_init(game.state_init().clone())
            .build()
            .unwrap();
        assert_eq!(game.board(), replay.board());
    }

    #[test]
    fn rejects_bad_configurations() {
        assert_eq!(
            Game::builder().moves(0).build(),
            Err(ConfigError::ZeroMoves)
        );
        assert_eq!(
            Game::builder().kind_count(2).build(),
            Err(ConfigError::TooFewPieceKinds { kind_count: 2 })
        );
        let tiny = "##-/---".parse().unwrap();
        assert_eq!(
            Game::builder()
                .mask(tiny)
                .max_shuffle_attempts(25)
                .build(),
            Err(ConfigError::Unplayable { attempts: 25 })
        );
    }
}
