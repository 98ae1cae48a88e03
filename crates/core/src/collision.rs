//! Collision checking - the single source of truth for move legality.

use crate::board::Board;
use crate::pieces::Shape;
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

/// Does `shape` placed with its top-left corner at (`x`, `y`) overlap the walls, the floor,
/// or a locked cell?
///
/// Rows above the board (`y < 0`) are never checked for occupancy, but columns are always
/// bounds-checked.
///
/// # Examples
///
/// ```
/// use neon_tetris_core::{collides, get_shape, Board};
/// use neon_tetris_core::types::PieceKind;
///
/// let board = Board::new();
/// let o = get_shape(PieceKind::O);
/// assert!(!collides(4, 0, &o, &board));
/// assert!(collides(9, 0, &o, &board)); // right wall
/// assert!(collides(4, 19, &o, &board)); // floor
/// ```
pub fn collides(x: i8, y: i8, shape: &Shape, board: &Board) -> bool {
    shape.minos().any(|(dx, dy)| {
        let bx = x as i16 + dx as i16;
        let by = y as i16 + dy as i16;

        if bx < 0 || bx >= BOARD_WIDTH as i16 || by >= BOARD_HEIGHT as i16 {
            return true;
        }
        by >= 0 && board.is_occupied(bx as i8, by as i8)
    })
}
