//! Pieces module - tetromino shapes and matrix rotation
//!
//! Each piece is a small rectangular 0/1 matrix. Rotation is computed on the matrix itself
//! (transpose, then reverse every row), which turns a `w x h` shape into an `h x w` shape.
//! There are no rotation states and no wall kicks.

use crate::types::{PieceColor, PieceKind, BOARD_WIDTH};

/// Largest width or height of any shape
pub const MAX_SHAPE_SIZE: usize = 4;

/// Offset of a single mino relative to the shape's top-left corner, as (column, row)
pub type MinoOffset = (i8, i8);

/// Rectangular occupancy matrix of a piece in one orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    width: u8,
    height: u8,
    /// Indexed `[row][column]`; cells outside `width x height` are always false
    cells: [[bool; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    /// Build a shape from a padded 4x4 bit matrix, keeping only the top-left `width x height`.
    pub const fn from_bits(
        width: u8,
        height: u8,
        bits: [[u8; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
    ) -> Self {
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        let mut r = 0;
        while r < MAX_SHAPE_SIZE {
            let mut c = 0;
            while c < MAX_SHAPE_SIZE {
                cells[r][c] = r < height as usize && c < width as usize && bits[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a shape from rows of 0/1 values.
    ///
    /// Returns `None` if the matrix is empty, ragged, or larger than 4x4.
    ///
    /// # Examples
    ///
    /// ```
    /// use neon_tetris_core::Shape;
    ///
    /// let t = Shape::from_matrix(&[&[0, 1, 0], &[1, 1, 1]]).unwrap();
    /// assert_eq!((t.width(), t.height()), (3, 2));
    /// assert!(Shape::from_matrix(&[&[1, 1], &[1]]).is_none());
    /// ```
    pub fn from_matrix(rows: &[&[u8]]) -> Option<Self> {
        let height = rows.len();
        let width = rows.first()?.len();
        if height > MAX_SHAPE_SIZE || width == 0 || width > MAX_SHAPE_SIZE {
            return None;
        }
        if rows.iter().any(|row| row.len() != width) {
            return None;
        }

        let mut bits = [[0u8; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in rows.iter().enumerate() {
            bits[r][..width].copy_from_slice(row);
        }
        Some(Self::from_bits(width as u8, height as u8, bits))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Whether the cell at (`row`, `col`) is occupied. Out-of-range cells are empty.
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.height as usize && col < self.width as usize && self.cells[row][col]
    }

    /// Occupied cells as (column, row) offsets, row-major.
    pub fn minos(&self) -> impl Iterator<Item = MinoOffset> + '_ {
        (0..self.height).flat_map(move |r| {
            (0..self.width)
                .filter(move |&c| self.cells[r as usize][c as usize])
                .map(move |c| (c as i8, r as i8))
        })
    }

    /// Rotate 90° clockwise: transpose, then reverse each resulting row.
    ///
    /// # Examples
    ///
    /// ```
    /// use neon_tetris_core::Shape;
    ///
    /// let i = Shape::from_matrix(&[&[1, 1, 1, 1]]).unwrap();
    /// let vertical = i.rotated();
    /// assert_eq!((vertical.width(), vertical.height()), (1, 4));
    /// ```
    pub fn rotated(&self) -> Self {
        let old_h = self.height as usize;
        let mut cells = [[false; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        // New row r is old column r read bottom-up.
        for (r, row) in cells.iter_mut().enumerate().take(self.width as usize) {
            for (c, cell) in row.iter_mut().enumerate().take(old_h) {
                *cell = self.cells[old_h - 1 - c][r];
            }
        }
        Self {
            width: self.height,
            height: self.width,
            cells,
        }
    }
}

/// Immutable catalog entry: spawn shape plus color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceDef {
    pub kind: PieceKind,
    pub shape: Shape,
    pub color: PieceColor,
}

/// The seven tetrominoes in their spawn orientation
pub const CATALOG: [PieceDef; 7] = [
    PieceDef {
        kind: PieceKind::I,
        shape: Shape::from_bits(4, 1, [[1, 1, 1, 1], [0; 4], [0; 4], [0; 4]]),
        color: PieceColor::Cyan,
    },
    PieceDef {
        kind: PieceKind::O,
        shape: Shape::from_bits(2, 2, [[1, 1, 0, 0], [1, 1, 0, 0], [0; 4], [0; 4]]),
        color: PieceColor::Yellow,
    },
    PieceDef {
        kind: PieceKind::T,
        shape: Shape::from_bits(3, 2, [[0, 1, 0, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
        color: PieceColor::Purple,
    },
    PieceDef {
        kind: PieceKind::S,
        shape: Shape::from_bits(3, 2, [[0, 1, 1, 0], [1, 1, 0, 0], [0; 4], [0; 4]]),
        color: PieceColor::Green,
    },
    PieceDef {
        kind: PieceKind::Z,
        shape: Shape::from_bits(3, 2, [[1, 1, 0, 0], [0, 1, 1, 0], [0; 4], [0; 4]]),
        color: PieceColor::Red,
    },
    PieceDef {
        kind: PieceKind::J,
        shape: Shape::from_bits(3, 2, [[1, 0, 0, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
        color: PieceColor::Blue,
    },
    PieceDef {
        kind: PieceKind::L,
        shape: Shape::from_bits(3, 2, [[0, 0, 1, 0], [1, 1, 1, 0], [0; 4], [0; 4]]),
        color: PieceColor::Orange,
    },
];

/// Catalog entry for a piece kind
pub fn definition(kind: PieceKind) -> &'static PieceDef {
    let index = match kind {
        PieceKind::I => 0,
        PieceKind::O => 1,
        PieceKind::T => 2,
        PieceKind::S => 3,
        PieceKind::Z => 4,
        PieceKind::J => 5,
        PieceKind::L => 6,
    };
    &CATALOG[index]
}

/// Spawn-orientation shape for a piece kind
pub fn get_shape(kind: PieceKind) -> Shape {
    definition(kind).shape
}

/// Column at which a shape spawns: `floor(5 - width / 2)`, i.e. horizontally centered.
pub fn spawn_x(shape: &Shape) -> i8 {
    ((BOARD_WIDTH as i8) - shape.width() as i8).div_euclid(2)
}

/// Row at which every piece spawns
pub const SPAWN_Y: i8 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_pieces_have_four_minos() {
        for def in CATALOG.iter() {
            assert_eq!(def.shape.minos().count(), 4, "{:?}", def.kind);
            assert_eq!(def.color, def.kind.color());
        }
    }

    #[test]
    fn test_definition_matches_catalog_order() {
        for (def, kind) in CATALOG.iter().zip(PieceKind::ALL) {
            assert_eq!(definition(kind).kind, kind);
            assert_eq!(def.kind, kind);
        }
    }

    #[test]
    fn test_rotate_t_clockwise() {
        let t = get_shape(PieceKind::T);
        let r = t.rotated();
        // 010/111 -> 10/11/10
        assert_eq!(r, Shape::from_matrix(&[&[1, 0], &[1, 1], &[1, 0]]).unwrap());
    }

    #[test]
    fn test_from_bits_ignores_padding() {
        let a = Shape::from_bits(2, 1, [[1, 1, 1, 1], [1; 4], [0; 4], [0; 4]]);
        let b = Shape::from_matrix(&[&[1, 1]]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_spawn_x_centers_shape() {
        assert_eq!(spawn_x(&get_shape(PieceKind::I)), 3);
        assert_eq!(spawn_x(&get_shape(PieceKind::O)), 4);
        assert_eq!(spawn_x(&get_shape(PieceKind::T)), 3);
        assert_eq!(spawn_x(&get_shape(PieceKind::I).rotated()), 4);
    }
}
