/*!
This module handles the layout of playable cells of a level, the [`BoardMask`].
*/

use std::{fmt, str::FromStr};

use crate::{ConfigError, Coord, Grid};

/// Immutable layout marking which cells of a board are playable.
///
/// A piece may only ever occupy a playable cell.
///
/// # Text format
/// Masks can be parsed from text ([`str::parse`]) and are displayed the same way:
/// Rows are listed *top row first*, separated by newlines or `/`.
/// `#` marks a playable cell, `-` an unplayable one.
/// ```
/// use cascade_engine::BoardMask;
///
/// let mask: BoardMask = "-##/###".parse().unwrap();
/// assert!(mask.is_playable((0, 0)));
/// assert!(!mask.is_playable((0, 1)));
/// assert_eq!(mask.playable_count(), 5);
/// ```
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardMask {
    cells: Grid<bool>,
}

impl BoardMask {
    /// Symbol of a playable cell in the text format.
    pub const PLAYABLE: char = '#';
    /// Symbol of an unplayable cell in the text format.
    pub const UNPLAYABLE: char = '-';

    /// A rectangular mask where every cell is playable.
    pub fn filled(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyMask);
        }
        Ok(Self {
            cells: Grid::new(width, height, true),
        })
    }

    /// Builds a mask from rows of booleans, given *top row first*.
    ///
    /// # Errors
    /// [`ConfigError::EmptyMask`] if there are no rows or the first row is empty,
    /// [`ConfigError::RaggedMask`] if rows differ in length.
    pub fn from_rows<R: AsRef<[bool]>>(rows_top_first: &[R]) -> Result<Self, ConfigError> {
        let height = rows_top_first.len();
        let width = rows_top_first.first().map_or(0, |row| row.as_ref().len());
        if width == 0 {
            return Err(ConfigError::EmptyMask);
        }
        let mut cells = Grid::new(width, height, false);
        for (line, row_values) in rows_top_first.iter().enumerate() {
            let row_values = row_values.as_ref();
            let row = height - line - 1;
            if row_values.len() != width {
                return Err(ConfigError::RaggedMask {
                    row,
                    expected: width,
                    found: row_values.len(),
                });
            }
            for (column, &playable) in row_values.iter().enumerate() {
                cells[(column, row)] = playable;
            }
        }
        Ok(Self { cells })
    }

    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.cells.width()
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.cells.height()
    }

    /// Whether the coordinate lies within the board at all.
    pub const fn contains(&self, coord: Coord) -> bool {
        self.cells.contains(coord)
    }

    /// Whether a piece may occupy the given cell.
    ///
    /// # Panics
    /// If `coord` lies outside the mask.
    pub fn is_playable(&self, coord: Coord) -> bool {
        self.cells[coord]
    }

    /// Iterates all playable cells row by row, starting at the bottom left.
    pub fn playable_coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells
            .iter()
            .filter_map(|(coord, &playable)| playable.then_some(coord))
    }

    /// Number of playable cells.
    pub fn playable_count(&self) -> usize {
        self.playable_coords().count()
    }
}

impl Default for BoardMask {
    /// The classic fully playable 9x9 board.
    fn default() -> Self {
        Self {
            cells: Grid::new(9, 9, true),
        }
    }
}

/// Splits board text into trimmed, non-blank lines, top row first.
pub(crate) fn text_rows(s: &str) -> Vec<&str> {
    s.split(['\n', '/'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

impl FromStr for BoardMask {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines = text_rows(s);
        let height = lines.len();
        let mut rows = Vec::with_capacity(height);
        for (line_idx, line) in lines.iter().enumerate() {
            let row = height - line_idx - 1;
            let values = line
                .chars()
                .enumerate()
                .map(|(column, symbol)| match symbol {
                    Self::PLAYABLE => Ok(true),
                    Self::UNPLAYABLE => Ok(false),
                    symbol => Err(ConfigError::InvalidCell {
                        column,
                        row,
                        symbol,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(values);
        }
        Self::from_rows(&rows)
    }
}

impl fmt::Display for BoardMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height()).rev() {
            for column in 0..self.width() {
                let symbol = if self.cells[(column, row)] {
                    Self::PLAYABLE
                } else {
                    Self::UNPLAYABLE
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_read_top_first() {
        let mask = BoardMask::from_rows(&[[true, false], [false, false]]).unwrap();
        assert_eq!((mask.width(), mask.height()), (2, 2));
        assert!(mask.is_playable((0, 1)));
        assert!(!mask.is_playable((0, 0)));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows: [&[bool]; 2] = [&[true, true, true], &[true, true]];
        assert_eq!(
            BoardMask::from_rows(&rows),
            Err(ConfigError::RaggedMask {
                row: 0,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn empty_masks_are_rejected() {
        let rows: [&[bool]; 0] = [];
        assert_eq!(BoardMask::from_rows(&rows), Err(ConfigError::EmptyMask));
        assert_eq!(BoardMask::filled(0, 4), Err(ConfigError::EmptyMask));
        assert_eq!("".parse::<BoardMask>(), Err(ConfigError::EmptyMask));
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        assert_eq!(
            "###/#x#".parse::<BoardMask>(),
            Err(ConfigError::InvalidCell {
                column: 1,
                row: 0,
                symbol: 'x'
            })
        );
    }

    #[test]
    fn text_format_survives_display() {
        let text = "-#-\n###\n-#-";
        let mask: BoardMask = text.parse().unwrap();
        assert_eq!(mask.to_string(), text);
        assert_eq!(mask.playable_count(), 5);
    }
}
