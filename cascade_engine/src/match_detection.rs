/*!
This module finds runs of same-kind pieces on a [`PieceGrid`].

Two kinds of queries exist:
- [`has_run_at`] probes whether a single cell is part of a run; this is what swap validation
  uses while speculatively exchanging pieces.
- [`find_chains`] scans the entire grid and reports every run as a [`Chain`].
*/

use crate::{Axis, Chain, Coord, PieceGrid, PieceKind};

/// Minimum number of same-kind pieces in a line that make up a run.
pub const MIN_RUN_LENGTH: usize = 3;

fn kind_at(grid: &PieceGrid, coord: Coord) -> Option<PieceKind> {
    grid[coord].map(|piece| piece.kind)
}

/// Counts how far the kind at `coord` extends in a line, returning the
/// `(horizontal, vertical)` run lengths through that cell (each including the cell itself).
///
/// An empty cell yields `(0, 0)`.
pub fn run_lengths_at(grid: &PieceGrid, coord: Coord) -> (usize, usize) {
    let Some(kind) = kind_at(grid, coord) else {
        return (0, 0);
    };
    let (column, row) = coord;
    let same = |c: Coord| kind_at(grid, c) == Some(kind);

    let left = (0..column).rev().take_while(|&c| same((c, row))).count();
    let right = (column + 1..grid.width())
        .take_while(|&c| same((c, row)))
        .count();
    let down = (0..row).rev().take_while(|&r| same((column, r))).count();
    let up = (row + 1..grid.height())
        .take_while(|&r| same((column, r)))
        .count();

    (1 + left + right, 1 + down + up)
}

/// Whether the piece at `coord` is part of a horizontal or vertical run.
pub fn has_run_at(grid: &PieceGrid, coord: Coord) -> bool {
    let (horizontal, vertical) = run_lengths_at(grid, coord);
    horizontal >= MIN_RUN_LENGTH || vertical >= MIN_RUN_LENGTH
}

/// Scans the grid for all runs.
///
/// Horizontal chains come first, ordered by row (bottom to top) and then column; vertical chains
/// follow, ordered by column and then row. Runs on the same axis never overlap, while a piece
/// may be part of one horizontal and one vertical chain at once.
///
/// The returned chains are not yet scored.
pub fn find_chains(grid: &PieceGrid) -> Vec<Chain> {
    let mut chains = Vec::new();
    for row in 0..grid.height() {
        let line: Vec<Coord> = (0..grid.width()).map(|column| (column, row)).collect();
        scan_line(grid, &line, Axis::Horizontal, &mut chains);
    }
    for column in 0..grid.width() {
        let line: Vec<Coord> = (0..grid.height()).map(|row| (column, row)).collect();
        scan_line(grid, &line, Axis::Vertical, &mut chains);
    }
    chains
}

/// Greedily collects the runs along one line of coordinates.
fn scan_line(grid: &PieceGrid, line: &[Coord], axis: Axis, chains: &mut Vec<Chain>) {
    let mut i = 0;
    while i + MIN_RUN_LENGTH <= line.len() {
        let Some(kind) = kind_at(grid, line[i]) else {
            i += 1;
            continue;
        };
        let run_len = line[i..]
            .iter()
            .take_while(|&&coord| kind_at(grid, coord) == Some(kind))
            .count();
        if run_len < MIN_RUN_LENGTH {
            i += 1;
            continue;
        }
        let pieces = line[i..i + run_len]
            .iter()
            .filter_map(|&coord| grid[coord])
            .collect();
        chains.push(Chain {
            axis,
            pieces,
            score: 0,
        });
        i += run_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Board;

    fn board(text: &str) -> Board {
        text.parse().unwrap()
    }

    #[test]
    fn probe_counts_both_axes() {
        let board = board(
            "a..
             a..
             abb",
        );
        assert_eq!(run_lengths_at(board.grid(), (0, 0)), (1, 3));
        assert_eq!(run_lengths_at(board.grid(), (1, 0)), (2, 1));
        assert_eq!(run_lengths_at(board.grid(), (2, 2)), (0, 0));
        assert!(has_run_at(board.grid(), (0, 1)));
        assert!(!has_run_at(board.grid(), (2, 0)));
    }

    #[test]
    fn greedy_scan_emits_whole_runs() {
        let board = board("aaaabbbcc");
        let chains = find_chains(board.grid());
        assert_eq!(chains.len(), 2);
        assert_eq!(chains[0].len(), 4);
        assert_eq!(chains[0].first().position, (0, 0));
        assert_eq!(chains[1].len(), 3);
        assert_eq!(chains[1].last().position, (6, 0));
    }

    #[test]
    fn gaps_split_runs() {
        let board = board("aa.aa-aaa");
        let chains = find_chains(board.grid());
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].coords(), vec![(6, 0), (7, 0), (8, 0)]);
    }

    #[test]
    fn crossing_runs_share_a_piece() {
        let board = board(
            "b.c
             b.c
             bbb",
        );
        let chains = find_chains(board.grid());
        let axes: Vec<_> = chains.iter().map(|chain| chain.axis).collect();
        assert_eq!(axes, [Axis::Horizontal, Axis::Vertical]);
        assert_eq!(chains[1].coords(), vec![(0, 0), (0, 1), (0, 2)]);
        assert_eq!(chains[0].first(), chains[1].first());
    }
}
