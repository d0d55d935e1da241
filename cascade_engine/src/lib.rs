/*!
# Cascade Engine

`cascade_engine` is an implementation of a tile-matching ("match three") puzzle engine:
players swap adjacent pieces to line up three or more of a kind, which are then removed,
scored, and replaced by pieces falling in from above, possibly cascading into further matches.

# Examples

```
use cascade_engine::*;

// Starting up a game on the default 9x9 board.
let mut game = Game::builder()
    .seed(42)
    .target_score(1000)
    .moves(20)
    /* ...Further optional configuration possible... */
    .build()
    .unwrap();

// A freshly built board always offers at least one legal swap.
let swap = game.hint().unwrap();

// Playing a whole turn: the swap, then every cascade step until the board settles.
let report = game.play_turn(swap).unwrap();
assert!(report.score_delta >= 60);

// Alternatively, a presentation layer may advance a turn one stage at a time,
// rendering the feedback returned by each step in between.
if let Some(swap) = game.hint() {
    game.submit_swap(swap).unwrap();
    while game.turn_in_progress() {
        let _feedback = game.step().unwrap();
    }
}

// Read most recent game state;
// This is how a UI can know how to render the board, etc.
let State { board, score, .. } = game.state();
```

The cargo feature `serde` derives `Serialize` and `Deserialize` for the engine's public data
types, including [`Game`] itself.
*/

#![warn(missing_docs)]

pub mod board;
pub mod board_mask;
mod game_builder;
mod game_update;
pub mod grid;
pub mod match_detection;
pub mod piece_generator;
pub mod scoring;
pub mod swap_validation;

use std::fmt;

use rand_chacha::ChaCha12Rng;

pub use board::Board;
pub use board_mask::BoardMask;
pub use game_builder::GameBuilder;
pub use grid::Grid;
pub use piece_generator::PieceGenerator;
pub use scoring::TurnContext;

/// Coordinates `(column, row)` used to index into a board, starting in the bottom left.
pub type Coord = (usize, usize);
/// The occupancy of every cell on a board.
pub type PieceGrid = Grid<Option<Piece>>;
/// The internal RNG used by a game.
pub type GameRng = ChaCha12Rng;
/// The result of a game that ended: `Ok` if the target score was reached.
pub type GameResult = Result<(), GameOver>;

/// Identifies which of the game's piece kinds a [`Piece`] is.
///
/// Kinds are numbered `0..kind_count`, where `kind_count` is fixed per game
/// (see [`StateInitialization::kind_count`]).
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceKind(u8);

/// Stable handle of a piece, unique among all pieces ever created on one [`Board`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceId(pub u64);

/// A piece lying on the board.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    /// Handle which stays the same while the piece moves around.
    pub id: PieceId,
    /// Kind of the piece.
    pub kind: PieceKind,
    /// The cell the piece occupies.
    pub position: Coord,
}

/// Direction along which a [`Chain`] or a [`Swap`] extends.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// Along a row.
    Horizontal,
    /// Along a column.
    Vertical,
}

/// An exchange of the pieces in two orthogonally adjacent cells.
///
/// The pair is unordered: `Swap::new(a, b) == Swap::new(b, a)`.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Swap {
    // Invariant: `a < b`, and both are adjacent.
    a: Coord,
    b: Coord,
}

/// A run of at least three same-kind pieces in one row or column.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chain {
    /// The line the chain lies in.
    pub axis: Axis,
    /// The pieces of the chain, left to right or bottom to top.
    pub pieces: Vec<Piece>,
    /// The points the chain was worth; `0` until it is scored.
    pub score: u32,
}

/// The layout and goals of one level of play.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Level {
    /// Which cells of the board can hold pieces.
    pub mask: BoardMask,
    /// The score at which the level is won.
    pub target_score: u32,
    /// How many turns the player has to reach the target score.
    pub moves: u32,
}

/// The amount of feedback information that is to be generated.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedbackVerbosity {
    /// No feedback generated by the engine.
    /// A [`TurnReport`] is still produced by [`Game::play_turn`].
    Silent,
    /// Base level of feedback about in-game events.
    #[default]
    Default,
    /// Highest level of feedback, which additionally names every internal stage processed.
    Debug,
}

/// Configuration options of the game, which can be modified without hurting internal invariants.
///
/// # Reproducibility
/// Modifying a [`Game`]'s configuration after it was created might not make it easily
/// reproducible anymore.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    /// Points of a three-piece chain at combo multiplier `1`.
    pub chain_base_score: u32,
    /// Whether a board left without legal swaps after a turn is reshuffled for free.
    pub auto_shuffle: bool,
    /// Whether a shuffle requested by the player uses up a move.
    pub shuffle_costs_move: bool,
    /// How many fresh boards a shuffle may generate before giving up.
    pub max_shuffle_attempts: u32,
    /// The amount of feedback information that is to be generated.
    pub feedback_verbosity: FeedbackVerbosity,
}

/// Some values that were used to help initialize the game.
///
/// Used for game reproducibility.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateInitialization {
    /// The value to seed the game's PRNG with.
    pub seed: u64,
    /// How many different piece kinds the game uses.
    pub kind_count: u8,
    /// The method (and initial state) of piece kind generation used.
    pub piece_generator: PieceGenerator,
}

/// Struct storing internal game state that changes over the course of play.
#[derive(Eq, PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    /// The internal pseudo random number generator used.
    pub rng: GameRng,
    /// The method (and internal state) of piece kind generation used.
    pub piece_generator: PieceGenerator,
    /// The playing field.
    pub board: Board,
    /// Bookkeeping of the turn currently (or most recently) played.
    pub turn: TurnContext,
    /// The current total score the player has achieved.
    pub score: u32,
    /// How many turns the player has left.
    pub moves_left: u32,
    /// How many turns have been completed.
    pub turns_played: u32,
    /// How many times the board was reshuffled, automatically or on request.
    pub shuffles: u32,
}

/// Intermediate stages of settling the board after a swap.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolveStage {
    /// Chains are about to be searched for.
    Detect,
    /// Chains were found and are about to be scored and removed.
    RemoveAndScore {
        /// The chains found, in scoring order.
        chains: Vec<Chain>,
    },
    /// Pieces are about to fall into the holes left behind.
    Gravity,
    /// Empty cells at the top are about to be refilled.
    Refill,
}

/// The state the game's turn cycle is in.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Waiting for the player to pick a swap.
    Idle,
    /// A legal swap was submitted and is about to be performed.
    SwapPending {
        /// The swap to be performed.
        swap: Swap,
    },
    /// The board is settling after a swap.
    Resolving {
        /// What happens next.
        stage: ResolveStage,
    },
    /// The state of the game being irreversibly over, and not playable anymore.
    GameEnd {
        /// The result of how the game ended.
        result: GameResult,
    },
}

/// Represents how a game can end without reaching its target score.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameOver {
    /// All moves were used up.
    OutOfMoves,
    /// No board with a legal swap could be generated.
    NoLegalSwaps,
    /// Generic game over by player forfeit.
    Forfeit,
}

/// A number of feedback events that can be returned by the game.
///
/// These can be used to render visual feedback to the player; for instance, the pieces listed
/// in [`Feedback::PiecesFell`] are exactly the ones a front end needs to animate.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Feedback {
    /// The board was (re)filled from scratch.
    BoardShuffled {
        /// Every piece now on the board, in placement order.
        pieces: Vec<Piece>,
        /// `false` if the player asked for it.
        automatic: bool,
    },
    /// Two pieces were exchanged.
    SwapPerformed {
        /// The swap.
        swap: Swap,
    },
    /// Chains were scored and their pieces removed.
    ChainsRemoved {
        /// The scored chains, in scoring order.
        chains: Vec<Chain>,
        /// Sum of the chains' scores.
        score_delta: u32,
    },
    /// Pieces fell into holes below them.
    PiecesFell {
        /// Per column with movement, the moved pieces (at their new position) lowest first.
        columns: Vec<Vec<Piece>>,
    },
    /// New pieces were spawned at the top of the board.
    PiecesSpawned {
        /// Per column with spawns, the new pieces top to bottom.
        columns: Vec<Vec<Piece>>,
    },
    /// The board settled and the turn was counted.
    TurnEnded {
        /// Points scored during the whole turn.
        score_delta: u32,
        /// Whether the settled board offers any legal swap.
        has_legal_swaps: bool,
    },
    /// Message that the game has ended.
    GameEnded {
        /// Outcome of the game.
        result: GameResult,
    },
    /// A message naming an internal stage that was processed.
    Debug(String),
}

/// What happened in one detect-remove-fall-refill iteration.
#[derive(Eq, PartialEq, Clone, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CascadeStep {
    /// The chains scored and removed.
    pub chains: Vec<Chain>,
    /// Points scored in this step.
    pub score_delta: u32,
    /// Pieces moved by gravity, per column.
    pub fallen: Vec<Vec<Piece>>,
    /// Pieces spawned, per column.
    pub spawned: Vec<Vec<Piece>>,
}

/// Summary of one complete turn, as returned by [`Game::play_turn`].
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnReport {
    /// The swap that started the turn.
    pub swap: Swap,
    /// Every cascade step, in order; never empty since the swap was legal.
    pub steps: Vec<CascadeStep>,
    /// Points scored during the turn.
    pub score_delta: u32,
    /// Whether the settled board offered a legal swap (before any automatic reshuffle).
    pub has_legal_swaps: bool,
    /// The pieces of the new board if it was reshuffled automatically after the turn.
    pub reshuffled: Option<Vec<Piece>>,
    /// How the game ended, if the turn ended it.
    pub result: Option<GameResult>,
}

/// Main game struct representing a round of play.
#[derive(Eq, PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Game {
    /// Some internal configuration options of the `Game`.
    ///
    /// # Reproducibility
    /// Modifying a `Game`'s configuration after it was created might not make it easily
    /// reproducible anymore.
    pub config: Configuration,
    state_init: StateInitialization,
    level: Level,
    state: State,
    phase: Phase,
}

/// An error raised while setting up a [`Game`] or one of its parts.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
pub enum ConfigError {
    /// The board would have no cells at all.
    EmptyMask,
    /// A row of the board layout has a different length than the first one.
    RaggedMask {
        /// The offending row (`0` is the bottom row).
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// A board text contained a symbol with no meaning.
    InvalidCell {
        /// Column of the symbol.
        column: usize,
        /// Row of the symbol (`0` is the bottom row).
        row: usize,
        /// The symbol itself.
        symbol: char,
    },
    /// Fewer than [`PieceKind::MIN_KIND_COUNT`] kinds were requested.
    TooFewPieceKinds {
        /// The requested number of kinds.
        kind_count: u8,
    },
    /// A [`PieceGenerator::Cycle`] pattern has too few distinct or out-of-range kinds.
    InvalidCyclePattern,
    /// A level must grant at least one move.
    ZeroMoves,
    /// No board with a legal swap could be generated for the layout.
    Unplayable {
        /// How many boards were tried.
        attempts: u32,
    },
}

/// A reshuffle gave up without finding a board that offers a legal swap.
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
pub struct ShuffleError {
    /// How many boards were tried.
    pub attempts: u32,
}

/// An error that can be thrown when playing a [`Game`].
#[derive(Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash, Debug)]
pub enum UpdateGameError {
    /// Error variant caused by an attempt to play a game that has ended.
    GameEnded,
    /// Error variant caused by an attempt to start something while a turn is still resolving.
    TurnInProgress,
    /// Error variant caused by a swap that would not create any chain.
    IllegalSwap(Swap),
}

impl PieceKind {
    /// Fewest kinds a game can be played with.
    pub const MIN_KIND_COUNT: u8 = 3;
    /// Number of kinds used unless configured otherwise.
    pub const DEFAULT_KIND_COUNT: u8 = 6;

    /// The kind with the given index.
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// The kind's index.
    pub const fn index(&self) -> u8 {
        self.0
    }

    /// Letter used for the kind in board texts; `a` is kind `0`.
    ///
    /// Kinds beyond `z` are shown as `?`.
    pub const fn symbol(&self) -> char {
        if self.0 < 26 {
            (b'a' + self.0) as char
        } else {
            '?'
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Axis {
    /// All `Axis` enum variants in order.
    pub const VARIANTS: [Self; 2] = [Axis::Horizontal, Axis::Vertical];
}

impl Swap {
    /// Pairs up two cells, returning `None` unless they are orthogonally adjacent.
    pub fn new(a: Coord, b: Coord) -> Option<Self> {
        let adjacent = a.0.abs_diff(b.0) + a.1.abs_diff(b.1) == 1;
        adjacent.then(|| Self {
            a: a.min(b),
            b: a.max(b),
        })
    }

    /// The two cells, lower-left one first.
    pub const fn coords(&self) -> (Coord, Coord) {
        (self.a, self.b)
    }

    /// Whether the cells are side by side or on top of each other.
    pub const fn axis(&self) -> Axis {
        if self.a.1 == self.b.1 {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

impl fmt::Display for Swap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ((c0, r0), (c1, r1)) = self.coords();
        write!(f, "({c0},{r0})<->({c1},{r1})")
    }
}

impl Chain {
    /// Number of pieces in the chain.
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Whether the chain holds no pieces; never the case for chains found on a board.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// The kind all pieces of the chain share.
    pub fn kind(&self) -> PieceKind {
        self.first().kind
    }

    /// The leftmost or lowest piece.
    ///
    /// # Panics
    /// If the chain is empty.
    pub fn first(&self) -> &Piece {
        &self.pieces[0]
    }

    /// The rightmost or highest piece.
    ///
    /// # Panics
    /// If the chain is empty.
    pub fn last(&self) -> &Piece {
        &self.pieces[self.pieces.len() - 1]
    }

    /// The cells covered by the chain, in order.
    pub fn coords(&self) -> Vec<Coord> {
        self.pieces.iter().map(|piece| piece.position).collect()
    }
}

impl Default for Level {
    fn default() -> Self {
        Self {
            mask: BoardMask::default(),
            target_score: 1000,
            moves: 20,
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            chain_base_score: scoring::DEFAULT_CHAIN_BASE_SCORE,
            auto_shuffle: true,
            shuffle_costs_move: true,
            max_shuffle_attempts: 1000,
            feedback_verbosity: FeedbackVerbosity::default(),
        }
    }
}

impl Phase {
    /// Whether a turn is underway, i.e. a swap was accepted but the board has not settled.
    pub const fn is_turn_in_progress(&self) -> bool {
        matches!(self, Phase::SwapPending { .. } | Phase::Resolving { .. })
    }
}

impl Game {
    /// Creates a blank new template representing a yet-to-be-started [`Game`] ready for configuration.
    pub fn builder() -> GameBuilder {
        GameBuilder::default()
    }

    /// Read accessor for the game's initial values.
    pub const fn state_init(&self) -> &StateInitialization {
        &self.state_init
    }

    /// Read accessor for the level being played.
    pub const fn level(&self) -> &Level {
        &self.level
    }

    /// Read accessor for the current game state.
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Read accessor for the current game phase.
    pub const fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Read accessor for the board.
    pub const fn board(&self) -> &Board {
        &self.state.board
    }

    /// Whether the game has ended, and how.
    pub const fn result(&self) -> Option<GameResult> {
        match self.phase {
            Phase::GameEnd { result } => Some(result),
            _ => None,
        }
    }

    /// Whether the game has ended.
    pub const fn ended(&self) -> bool {
        self.result().is_some()
    }

    /// Whether a submitted swap is still being resolved.
    pub const fn turn_in_progress(&self) -> bool {
        self.phase.is_turn_in_progress()
    }

    /// The first legal swap in deterministic order, if any.
    ///
    /// This is `None` while the game is not waiting for a swap.
    pub fn hint(&self) -> Option<Swap> {
        if self.phase != Phase::Idle {
            return None;
        }
        self.state.board.legal_swaps().first().copied()
    }

    /// Immediately end a game by forfeiting the current round.
    ///
    /// Any turn in progress is abandoned as is.
    pub fn forfeit(&mut self) -> Result<Feedback, UpdateGameError> {
        if self.ended() {
            return Err(UpdateGameError::GameEnded);
        }
        let result = Err(GameOver::Forfeit);
        self.phase = Phase::GameEnd { result };
        Ok(Feedback::GameEnded { result })
    }
}

impl fmt::Display for GameOver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameOver::OutOfMoves => "out of moves",
            GameOver::NoLegalSwaps => "no legal swaps left",
            GameOver::Forfeit => "forfeited",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyMask => write!(f, "board layout has no cells"),
            ConfigError::RaggedMask {
                row,
                expected,
                found,
            } => write!(
                f,
                "board layout row {row} has {found} cells, expected {expected}"
            ),
            ConfigError::InvalidCell {
                column,
                row,
                symbol,
            } => write!(f, "invalid symbol {symbol:?} at cell ({column},{row})"),
            ConfigError::TooFewPieceKinds { kind_count } => write!(
                f,
                "{kind_count} piece kinds requested, at least {} required",
                PieceKind::MIN_KIND_COUNT
            ),
            ConfigError::InvalidCyclePattern => write!(
                f,
                "cycle pattern needs {} distinct in-range piece kinds",
                PieceKind::MIN_KIND_COUNT
            ),
            ConfigError::ZeroMoves => write!(f, "level grants no moves"),
            ConfigError::Unplayable { attempts } => write!(
                f,
                "no board with a legal swap found after {attempts} attempts"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ShuffleError> for ConfigError {
    fn from(ShuffleError { attempts }: ShuffleError) -> Self {
        ConfigError::Unplayable { attempts }
    }
}

impl fmt::Display for ShuffleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no board with a legal swap found after {} attempts",
            self.attempts
        )
    }
}

impl std::error::Error for ShuffleError {}

impl fmt::Display for UpdateGameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateGameError::GameEnded => write!(f, "attempt to play game after it ended"),
            UpdateGameError::TurnInProgress => {
                write!(f, "attempt to start an action while a turn is resolving")
            }
            UpdateGameError::IllegalSwap(swap) => write!(f, "swap {swap} creates no chain"),
        }
    }
}

impl std::error::Error for UpdateGameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swaps_are_unordered_and_adjacent() {
        assert_eq!(Swap::new((3, 2), (2, 2)), Swap::new((2, 2), (3, 2)));
        assert_eq!(Swap::new((2, 2), (3, 2)).unwrap().coords(), ((2, 2), (3, 2)));
        assert_eq!(Swap::new((0, 0), (0, 1)).unwrap().axis(), Axis::Vertical);
        assert_eq!(Swap::new((0, 0), (1, 1)), None);
        assert_eq!(Swap::new((0, 0), (2, 0)), None);
        assert_eq!(Swap::new((1, 1), (1, 1)), None);
    }

    #[test]
    fn kind_symbols() {
        assert_eq!(PieceKind::new(0).symbol(), 'a');
        assert_eq!(PieceKind::new(25).symbol(), 'z');
        assert_eq!(PieceKind::new(26).symbol(), '?');
    }

    #[test]
    fn shuffle_errors_become_config_errors() {
        let error: ConfigError = ShuffleError { attempts: 5 }.into();
        assert_eq!(error, ConfigError::Unplayable { attempts: 5 });
        assert_eq!(
            error.to_string(),
            "no board with a legal swap found after 5 attempts"
        );
    }
}
