//! Line clearing.

use crate::board::{Board, ClearedRows};
use crate::scoring::calculate_line_score;

/// Outcome of clearing full rows on a board
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineClear {
    /// Removed row indices (pre-clear coordinates), bottom to top
    pub rows: ClearedRows,
    /// Points earned by the clear
    pub score: u32,
}

impl LineClear {
    pub fn lines(&self) -> usize {
        self.rows.len()
    }
}

/// Remove every full row in one pass and return the new board with the number of rows removed.
///
/// The input board is left untouched.
///
/// # Examples
///
/// ```
/// use neon_tetris_core::{clear_lines, Board};
/// use neon_tetris_core::types::PieceColor;
///
/// let mut board = Board::new();
/// board.fill_row(19, PieceColor::Red);
/// board.set(0, 18, Some(PieceColor::Blue));
///
/// let (next, cleared) = clear_lines(&board);
/// assert_eq!(cleared, 1);
/// assert_eq!(next.get(0, 19), Some(Some(PieceColor::Blue)));
/// ```
pub fn clear_lines(board: &Board) -> (Board, usize) {
    let mut next = board.clone();
    let cleared = clear_lines_in_place(&mut next);
    (next, cleared.lines())
}

/// In-place variant used by the engine on the board it owns.
pub fn clear_lines_in_place(board: &mut Board) -> LineClear {
    let rows = board.clear_full_rows();
    let score = calculate_line_score(rows.len());
    LineClear { rows, score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceColor;

    #[test]
    fn test_no_full_rows_is_identity() {
        let mut board = Board::new();
        board.set(3, 19, Some(PieceColor::Green));
        let (next, cleared) = clear_lines(&board);
        assert_eq!(cleared, 0);
        assert_eq!(next, board);
    }

    #[test]
    fn test_non_adjacent_rows_cleared_together() {
        let mut board = Board::new();
        board.fill_row(19, PieceColor::Red);
        board.fill_row(17, PieceColor::Red);
        board.set(0, 18, Some(PieceColor::Cyan));
        board.set(0, 16, Some(PieceColor::Yellow));

        let cleared = clear_lines_in_place(&mut board);

        assert_eq!(cleared.lines(), 2);
        assert_eq!(cleared.score, 200);
        assert_eq!(cleared.rows.as_slice(), &[19, 17]);
        assert_eq!(board.get(0, 19), Some(Some(PieceColor::Cyan)));
        assert_eq!(board.get(0, 18), Some(Some(PieceColor::Yellow)));
        assert!((0..20).all(|y| !board.is_row_full(y)));
    }
}
