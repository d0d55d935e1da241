/*!
This module handles the [`Board`]: the playable layout together with the pieces on it.
*/

use std::{collections::BTreeSet, fmt, str::FromStr};

use rand::Rng;

use crate::{
    board_mask::text_rows, match_detection, swap_validation, BoardMask, Chain, ConfigError, Coord,
    Grid, Piece, PieceGenerator, PieceGrid, PieceId, PieceKind, ShuffleError, Swap,
};

/// The playing field: a [`BoardMask`], the pieces occupying it, and the swaps currently legal.
///
/// # Invariants
/// - Every piece sits on a playable cell, and its stored `position` is the cell it sits in.
/// - Piece ids are never reused.
/// - The legal swap set is whatever [`Board::recompute_legal_swaps`] last computed; it goes
///   stale as soon as the pieces are changed by any other method.
///
/// # Text format
/// Boards can be parsed from text ([`str::parse`]) and are displayed the same way:
/// Rows are listed *top row first*, separated by newlines or `/`.
/// `a`..=`z` are pieces of kind `0`..=`25`, `.` is an empty playable cell and `-` is an
/// unplayable cell. Parsing recomputes the legal swaps.
#[derive(Eq, PartialEq, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    mask: BoardMask,
    grid: PieceGrid,
    legal_swaps: BTreeSet<Swap>,
    next_piece_id: u64,
}

impl Board {
    /// Symbol of an empty playable cell in the text format.
    pub const EMPTY: char = '.';

    /// Creates a board without any pieces on it.
    pub fn new(mask: BoardMask) -> Self {
        let grid = Grid::new(mask.width(), mask.height(), None);
        Self {
            mask,
            grid,
            legal_swaps: BTreeSet::new(),
            next_piece_id: 0,
        }
    }

    /// Read accessor for the playable layout.
    pub const fn mask(&self) -> &BoardMask {
        &self.mask
    }

    /// Read accessor for the raw piece grid.
    pub const fn grid(&self) -> &PieceGrid {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn grid_mut(&mut self) -> &mut PieceGrid {
        &mut self.grid
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.grid.width()
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.grid.height()
    }

    /// The piece at a given cell, if any.
    ///
    /// # Panics
    /// If `coord` lies outside the board.
    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        self.grid[coord].as_ref()
    }

    /// Places a new piece of the given kind at a cell, or clears the cell when `kind` is `None`.
    ///
    /// Returns the piece that previously occupied the cell.
    ///
    /// # Panics
    /// If `coord` lies outside the board, or a piece is placed on an unplayable cell.
    pub fn set_piece(&mut self, coord: Coord, kind: Option<PieceKind>) -> Option<Piece> {
        let new_piece = kind.map(|kind| self.create_piece(coord, kind));
        self.grid.replace(coord, new_piece)
    }

    /// Iterates all pieces row by row, starting at the bottom left.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.grid.iter().filter_map(|(_, cell)| cell.as_ref())
    }

    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// The swaps found by the last [`Board::recompute_legal_swaps`].
    pub const fn legal_swaps(&self) -> &BTreeSet<Swap> {
        &self.legal_swaps
    }

    /// Whether a swap is among the last computed legal swaps.
    pub fn is_legal(&self, swap: &Swap) -> bool {
        self.legal_swaps.contains(swap)
    }

    /// Recomputes which swaps would create a run on the current board.
    pub fn recompute_legal_swaps(&mut self) -> &BTreeSet<Swap> {
        self.legal_swaps = swap_validation::legal_swaps(&mut self.grid);
        &self.legal_swaps
    }

    /// Whether the piece at `coord` is part of a horizontal or vertical run.
    pub fn has_run_at(&self, coord: Coord) -> bool {
        match_detection::has_run_at(&self.grid, coord)
    }

    /// All runs currently on the board, see [`match_detection::find_chains`].
    pub fn find_chains(&self) -> Vec<Chain> {
        match_detection::find_chains(&self.grid)
    }

    /// Exchanges two adjacent pieces, updating their positions.
    ///
    /// This does *not* check legality; consult [`Board::is_legal`] first.
    ///
    /// # Panics
    /// If either cell is outside the board or empty.
    pub fn perform_swap(&mut self, swap: Swap) {
        let (a, b) = swap.coords();
        assert!(
            self.grid[a].is_some() && self.grid[b].is_some(),
            "attempt to perform {swap:?} involving an empty cell"
        );
        self.grid.swap(a, b);
        for coord in [a, b] {
            if let Some(piece) = &mut self.grid[coord] {
                piece.position = coord;
            }
        }
    }

    /// Removes every piece belonging to any of the chains.
    ///
    /// Pieces shared by two chains are removed once. Returns the number of pieces removed.
    pub fn remove_chains(&mut self, chains: &[Chain]) -> usize {
        let mut removed = 0;
        for piece in chains.iter().flat_map(|chain| &chain.pieces) {
            if self.grid.replace(piece.position, None).is_some() {
                removed += 1;
            }
        }
        removed
    }

    /// Lets pieces fall down into empty playable cells below them.
    ///
    /// Columns are processed left to right, each from the bottom row upwards: every empty
    /// playable cell pulls down the nearest piece above it (falling past unplayable cells).
    ///
    /// Returns, for each column in which something moved, the moved pieces in the order they
    /// were moved (lowest first).
    pub fn fill_holes(&mut self) -> Vec<Vec<Piece>> {
        let mut columns = Vec::new();
        for column in 0..self.width() {
            let mut fallen = Vec::new();
            for row in 0..self.height() {
                if !self.mask.is_playable((column, row)) || self.grid[(column, row)].is_some() {
                    continue;
                }
                let above = (row + 1..self.height()).find(|&r| self.grid[(column, r)].is_some());
                if let Some(lookup) = above {
                    if let Some(mut piece) = self.grid.replace((column, lookup), None) {
                        piece.position = (column, row);
                        self.grid[(column, row)] = Some(piece);
                        fallen.push(piece);
                    }
                }
            }
            if !fallen.is_empty() {
                columns.push(fallen);
            }
        }
        columns
    }

    /// Fills the board with new pieces such that no runs exist yet.
    ///
    /// All previous pieces are discarded. Cells are filled row by row, starting at the bottom
    /// left; a drawn kind is rejected if the two cells to its left or the two cells below it
    /// already have that kind.
    ///
    /// Returns the new pieces in the order they were placed.
    /// Legal swaps are *not* recomputed.
    ///
    /// # Panics
    /// If `generator` fails [`PieceGenerator::validate`] for `kind_count`.
    pub fn fill<R: Rng + ?Sized>(
        &mut self,
        generator: &mut PieceGenerator,
        rng: &mut R,
        kind_count: u8,
    ) -> Vec<Piece> {
        assert_can_generate(generator, kind_count);
        self.grid = Grid::new(self.width(), self.height(), None);
        let coords: Vec<Coord> = self.mask.playable_coords().collect();
        let mut placed = Vec::with_capacity(coords.len());
        for coord @ (column, row) in coords {
            let grid = &self.grid;
            let kind_at = |c: Coord| grid[c].map(|piece| piece.kind);
            let kind = generator.next_kind_where(rng, kind_count, |kind| {
                let completes_row = column >= 2
                    && kind_at((column - 1, row)) == Some(kind)
                    && kind_at((column - 2, row)) == Some(kind);
                let completes_column = row >= 2
                    && kind_at((column, row - 1)) == Some(kind)
                    && kind_at((column, row - 2)) == Some(kind);
                !completes_row && !completes_column
            });
            let piece = self.create_piece(coord, kind);
            self.grid[coord] = Some(piece);
            placed.push(piece);
        }
        placed
    }

    /// Refills the board until at least one legal swap exists.
    ///
    /// Each attempt is a fresh [`Board::fill`] followed by [`Board::recompute_legal_swaps`].
    ///
    /// # Errors
    /// [`ShuffleError`] if `max_attempts` fills all came out without a legal swap, which happens
    /// for layouts too small or too fragmented to ever allow a run.
    ///
    /// # Panics
    /// Same as [`Board::fill`].
    pub fn shuffle<R: Rng + ?Sized>(
        &mut self,
        generator: &mut PieceGenerator,
        rng: &mut R,
        kind_count: u8,
        max_attempts: u32,
    ) -> Result<Vec<Piece>, ShuffleError> {
        assert_can_generate(generator, kind_count);
        for _ in 0..max_attempts {
            let placed = self.fill(generator, rng, kind_count);
            if !self.recompute_legal_swaps().is_empty() {
                return Ok(placed);
            }
        }
        Err(ShuffleError {
            attempts: max_attempts,
        })
    }

    /// Spawns new pieces in the empty cells at the top of each column.
    ///
    /// Each column is scanned from the top row downwards until the first piece is met; every
    /// playable cell on the way gets a new piece. A drawn kind is only rejected if it equals
    /// the kind spawned just before it in the same column, so settled runs may still form.
    ///
    /// Returns, for each column that received pieces, the new pieces from top to bottom.
    ///
    /// # Panics
    /// Same as [`Board::fill`].
    pub fn top_up<R: Rng + ?Sized>(
        &mut self,
        generator: &mut PieceGenerator,
        rng: &mut R,
        kind_count: u8,
    ) -> Vec<Vec<Piece>> {
        assert_can_generate(generator, kind_count);
        let mut columns = Vec::new();
        for column in 0..self.width() {
            let mut spawned: Vec<Piece> = Vec::new();
            for row in (0..self.height()).rev() {
                if self.grid[(column, row)].is_some() {
                    break;
                }
                if !self.mask.is_playable((column, row)) {
                    continue;
                }
                let previous = spawned.last().map(|piece| piece.kind);
                let kind = generator.next_kind_where(rng, kind_count, |kind| Some(kind) != previous);
                let piece = self.create_piece((column, row), kind);
                self.grid[(column, row)] = Some(piece);
                spawned.push(piece);
            }
            if !spawned.is_empty() {
                columns.push(spawned);
            }
        }
        columns
    }

    fn create_piece(&mut self, position: Coord, kind: PieceKind) -> Piece {
        assert!(
            self.mask.is_playable(position),
            "attempt to place a piece on unplayable cell {position:?}"
        );
        let id = PieceId(self.next_piece_id);
        self.next_piece_id += 1;
        Piece { id, kind, position }
    }
}

impl FromStr for Board {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = text_rows(s);
        let height = lines.len();
        let mut mask_rows = Vec::with_capacity(height);
        let mut placements = Vec::new();
        for (line_idx, line) in lines.iter().enumerate() {
            let row = height - line_idx - 1;
            let mut mask_row = Vec::new();
            for (column, symbol) in line.chars().enumerate() {
                mask_row.push(symbol != BoardMask::UNPLAYABLE);
                match symbol {
                    BoardMask::UNPLAYABLE | Self::EMPTY => {}
                    'a'..='z' => {
                        let kind = PieceKind::new(symbol as u8 - b'a');
                        placements.push(((column, row), kind));
                    }
                    symbol => {
                        return Err(ConfigError::InvalidCell {
                            column,
                            row,
                            symbol,
                        })
                    }
                }
            }
            mask_rows.push(mask_row);
        }
        let mut board = Board::new(BoardMask::from_rows(&mask_rows)?);
        for (coord, kind) in placements {
            board.set_piece(coord, Some(kind));
        }
        board.recompute_legal_swaps();
        Ok(board)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height()).rev() {
            for column in 0..self.width() {
                let symbol = match self.grid[(column, row)] {
                    Some(piece) => piece.kind.symbol(),
                    None if self.mask.is_playable((column, row)) => Self::EMPTY,
                    None => BoardMask::UNPLAYABLE,
                };
                write!(f, "{symbol}")?;
            }
            if row > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Placement constraints rule out up to two kinds per cell, so fewer kinds could draw forever.
fn assert_can_generate(generator: &PieceGenerator, kind_count: u8) {
    if let Err(e) = generator.validate(kind_count) {
        panic!("cannot generate pieces: {e}");
    }
}
