/*!
This module provides the rectangular storage shared by the [`BoardMask`](crate::BoardMask) and
the piece grid of a [`Board`](crate::Board).
*/

use std::ops;

use crate::Coord;

/// A fixed-size, two-dimensional grid addressed by `(column, row)` [`Coord`]inates.
///
/// Row `0` is the bottom row. Cells are stored row-major.
///
/// # Panics
/// Every coordinate-based access panics when the coordinate lies outside the grid;
/// callers are expected to check against [`Grid::width`] and [`Grid::height`] first.
#[derive(Eq, PartialEq, Clone, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a `width` by `height` grid with every cell set to `fill`.
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Number of columns.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether the coordinate lies within the grid.
    pub const fn contains(&self, (column, row): Coord) -> bool {
        column < self.width && row < self.height
    }

    /// Replaces the content of a cell, returning the old content.
    pub fn replace(&mut self, coord: Coord, value: T) -> T {
        std::mem::replace(&mut self[coord], value)
    }

    /// Exchanges the contents of two cells.
    pub fn swap(&mut self, a: Coord, b: Coord) {
        let (i, j) = (self.index_of(a), self.index_of(b));
        self.cells.swap(i, j);
    }

    /// Iterates all coordinates row by row, starting at the bottom left.
    pub fn coords(&self) -> impl Iterator<Item = Coord> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |column| (column, row)))
    }

    /// Iterates all cells together with their coordinates, in the order of [`Grid::coords`].
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &T)> {
        self.coords().zip(self.cells.iter())
    }

    fn index_of(&self, coord: Coord) -> usize {
        assert!(
            self.contains(coord),
            "coordinate {coord:?} out of bounds for {}x{} grid",
            self.width,
            self.height
        );
        let (column, row) = coord;
        row * self.width + column
    }
}

impl<T> ops::Index<Coord> for Grid<T> {
    type Output = T;

    fn index(&self, coord: Coord) -> &Self::Output {
        &self.cells[self.index_of(coord)]
    }
}

impl<T> ops::IndexMut<Coord> for Grid<T> {
    fn index_mut(&mut self, coord: Coord) -> &mut Self::Output {
        let idx = self.index_of(coord);
        &mut self.cells[idx]
    }
}
