//! Grid geometry for the hex tiles
//!
//! Tiles live on a rectangular grid using a "doubled width" hex embedding:
//! hex neighbors sit two columns apart on the same row, or one row and one
//! column apart diagonally. Cells that touch only orthogonally are never both
//! tiled.

use serde::{Deserialize, Serialize};

/// Standard board height (rows)
pub const STANDARD_HEIGHT: usize = 12;

/// Standard board width (columns)
pub const STANDARD_WIDTH: usize = 15;

/// Largest height or width a board may have (fingerprints store them as bytes)
pub const MAX_DIMENSION: usize = u8::MAX as usize;

/// Number of slide directions (and hex neighbors)
pub const NUM_DIRECTIONS: usize = 6;

/// Direction vectors as (d_row, d_col)
/// Index: 0=Left, 1=Right, 2=DownLeft, 3=DownRight, 4=UpLeft, 5=UpRight
pub const DIRECTIONS: [(i32, i32); NUM_DIRECTIONS] = [
    (0, -2),  // Left
    (0, 2),   // Right
    (1, -1),  // DownLeft
    (1, 1),   // DownRight
    (-1, -1), // UpLeft
    (-1, 1),  // UpRight
];

/// Grid-orthogonal offsets (up, down, left, right)
pub const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Grid cell coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major index on a board of the given width
    pub fn index(&self, width: usize) -> usize {
        self.row * width + self.col
    }

    /// Inverse of [`Cell::index`]
    pub fn from_index(index: usize, width: usize) -> Self {
        Self::new(index / width, index % width)
    }

    /// Is this cell inside a `height` x `width` grid?
    pub fn in_bounds(&self, height: usize, width: usize) -> bool {
        self.row < height && self.col < width
    }

    /// Cell shifted by (d_row, d_col), or None if it leaves the grid
    pub fn offset(&self, d_row: i32, d_col: i32, height: usize, width: usize) -> Option<Cell> {
        let row = self.row as i32 + d_row;
        let col = self.col as i32 + d_col;
        if row < 0 || col < 0 || row >= height as i32 || col >= width as i32 {
            return None;
        }
        Some(Cell::new(row as usize, col as usize))
    }

    /// Neighbor in direction (0-5), or None at the edge of the grid
    pub fn neighbor(&self, direction: u8, height: usize, width: usize) -> Option<Cell> {
        let (d_row, d_col) = DIRECTIONS[direction as usize % NUM_DIRECTIONS];
        self.offset(d_row, d_col, height, width)
    }

    /// All in-bounds hex neighbors
    pub fn hex_neighbors(&self, height: usize, width: usize) -> impl Iterator<Item = Cell> + '_ {
        DIRECTIONS
            .iter()
            .filter_map(move |&(dr, dc)| self.offset(dr, dc, height, width))
    }

    /// All in-bounds orthogonal grid neighbors
    pub fn orthogonal_neighbors(&self, height: usize, width: usize) -> impl Iterator<Item = Cell> + '_ {
        ORTHOGONAL
            .iter()
            .filter_map(move |&(dr, dc)| self.offset(dr, dc, height, width))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let cell = Cell::new(5, 11);
        assert_eq!(cell.index(STANDARD_WIDTH), 86);
        assert_eq!(Cell::from_index(86, STANDARD_WIDTH), cell);
    }

    #[test]
    fn test_offset_bounds() {
        let corner = Cell::new(0, 0);
        assert_eq!(corner.offset(-1, 0, 12, 15), None);
        assert_eq!(corner.offset(0, -2, 12, 15), None);
        assert_eq!(corner.offset(1, 1, 12, 15), Some(Cell::new(1, 1)));

        let far = Cell::new(11, 14);
        assert_eq!(far.offset(0, 2, 12, 15), None);
        assert_eq!(far.offset(1, -1, 12, 15), None);
    }

    #[test]
    fn test_neighbor_counts() {
        let center = Cell::new(5, 7);
        assert_eq!(center.hex_neighbors(12, 15).count(), 6);
        assert_eq!(center.orthogonal_neighbors(12, 15).count(), 4);

        // Top row, column 1: no upward diagonals and no cell two columns left
        let edge = Cell::new(0, 1);
        assert_eq!(edge.hex_neighbors(12, 15).count(), 3);
    }

    #[test]
    fn test_directions_are_hex_steps() {
        // Every direction preserves (row + col) parity
        for &(dr, dc) in &DIRECTIONS {
            assert_eq!((dr + dc).rem_euclid(2), 0);
        }
    }
}
