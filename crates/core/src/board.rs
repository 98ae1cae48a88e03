//! Board module - manages the game grid
//!
//! The board is a 10x20 grid where each cell is empty or holds the color of a locked piece.
//! Rows are stored as fixed-size arrays, so the 20x10 shape is guaranteed by the type.
//! Coordinates: (x, y) where x ranges 0..9 (left to right), y ranges 0..19 (top to bottom).

use arrayvec::ArrayVec;

use crate::pieces::Shape;
use crate::types::{Cell, PieceColor, BOARD_HEIGHT, BOARD_WIDTH};

const WIDTH: usize = BOARD_WIDTH as usize;
const HEIGHT: usize = BOARD_HEIGHT as usize;

/// One board row
pub type Row = [Cell; WIDTH];

/// Indices of rows removed by a single clear, sorted bottom to top
pub type ClearedRows = ArrayVec<usize, HEIGHT>;

/// The game board - 10 columns x 20 rows
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [Row; HEIGHT],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            rows: [[None; WIDTH]; HEIGHT],
        }
    }

    /// Build a board from explicit rows (top row first)
    pub fn from_rows(rows: [Row; HEIGHT]) -> Self {
        Self { rows }
    }

    #[inline(always)]
    fn index(x: i8, y: i8) -> Option<(usize, usize)> {
        if x < 0 || x >= BOARD_WIDTH as i8 || y < 0 || y >= BOARD_HEIGHT as i8 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    /// Get width of the board
    pub fn width(&self) -> u8 {
        BOARD_WIDTH
    }

    /// Get height of the board
    pub fn height(&self) -> u8 {
        BOARD_HEIGHT
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        Self::index(x, y).map(|(x, y)| self.rows[y][x])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match Self::index(x, y) {
            Some((x, y)) => {
                self.rows[y][x] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Check if position is out of bounds
    pub fn is_out_of_bounds(&self, x: i8, y: i8) -> bool {
        Self::index(x, y).is_none()
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .map_or(false, |row| row.iter().all(|cell| cell.is_some()))
    }

    /// Fill every cell of row `y` with `color` (puzzle setups and tests)
    pub fn fill_row(&mut self, y: usize, color: PieceColor) {
        if let Some(row) = self.rows.get_mut(y) {
            *row = [Some(color); WIDTH];
        }
    }

    /// Clear all full rows in a single pass and return their indices (sorted bottom to top).
    ///
    /// Remaining rows keep their relative order and the top is refilled with empty rows,
    /// so the board always keeps exactly 20 rows.
    pub fn clear_full_rows(&mut self) -> ClearedRows {
        let mut cleared_rows = ClearedRows::new();
        let mut write_y = HEIGHT;

        for read_y in (0..HEIGHT).rev() {
            if self.is_row_full(read_y) {
                cleared_rows.push(read_y);
            } else {
                write_y -= 1;
                if write_y != read_y {
                    self.rows[write_y] = self.rows[read_y];
                }
            }
        }

        for row in &mut self.rows[..write_y] {
            *row = [None; WIDTH];
        }

        cleared_rows
    }

    /// Stamp the occupied cells of `shape` at (x, y) with `color`.
    ///
    /// Cells that fall outside the board are skipped; callers check legality first.
    pub fn stamp(&mut self, shape: &Shape, x: i8, y: i8, color: PieceColor) {
        for (dx, dy) in shape.minos() {
            self.set(x + dx, y + dy, Some(color));
        }
    }

    /// Number of occupied cells on the board
    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|cell| cell.is_some()).count())
            .sum()
    }

    /// Get a reference to the rows (top row first)
    pub fn rows(&self) -> &[Row; HEIGHT] {
        &self.rows
    }

    /// Write the board as color codes (0 = empty) into an existing grid.
    pub fn write_u8_grid(&self, out: &mut [[u8; WIDTH]; HEIGHT]) {
        for (dst, src) in out.iter_mut().zip(self.rows.iter()) {
            for (d, cell) in dst.iter_mut().zip(src.iter()) {
                *d = cell.map_or(0, |c| c.code());
            }
        }
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.rows = [[None; WIDTH]; HEIGHT];
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
