/*!
This module enumerates the [`Swap`]s a player may currently make.
*/

use std::collections::BTreeSet;

use crate::{match_detection::has_run_at, Coord, PieceGrid, Swap};

/// Computes every swap of two adjacent pieces that would create a run.
///
/// Each occupied cell is tried against its right and its top neighbour: the two grid entries
/// are exchanged, both cells are probed for a run, and the exchange is undone regardless of
/// the outcome. The grid is therefore unchanged once this returns.
pub fn legal_swaps(grid: &mut PieceGrid) -> BTreeSet<Swap> {
    let mut swaps = BTreeSet::new();
    let coords: Vec<Coord> = grid.coords().collect();
    for coord @ (column, row) in coords {
        if grid[coord].is_none() {
            continue;
        }
        for neighbor in [(column + 1, row), (column, row + 1)] {
            if !grid.contains(neighbor) || grid[neighbor].is_none() {
                continue;
            }
            grid.swap(coord, neighbor);
            let creates_run = has_run_at(grid, coord) || has_run_at(grid, neighbor);
            grid.swap(coord, neighbor);
            if creates_run {
                if let Some(swap) = Swap::new(coord, neighbor) {
                    swaps.insert(swap);
                }
            }
        }
    }
    swaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Board;

    #[test]
    fn finds_horizontal_and_vertical_moves() {
        let mut board: Board = "\
            ccd
            ddc
            aba
            bab"
        .parse()
        .unwrap();
        let before = board.clone();
        let swaps = legal_swaps(board.grid_mut());
        assert_eq!(&board, &before);

        // `bbb` in row 0 and `aaa` in row 1.
        assert!(swaps.contains(&Swap::new((1, 0), (1, 1)).unwrap()));
        // `ddd` in row 2 and `ccc` in row 3.
        assert!(swaps.contains(&Swap::new((2, 2), (2, 3)).unwrap()));
        assert!(!swaps.contains(&Swap::new((0, 0), (1, 0)).unwrap()));
    }

    #[test]
    fn empty_cells_are_never_swapped() {
        let mut board: Board = "a.aa".parse().unwrap();
        let swaps = legal_swaps(board.grid_mut());
        assert!(swaps.is_empty());
    }
}
