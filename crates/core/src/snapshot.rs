use crate::board::Row;
use crate::game_state::Tetromino;
use crate::pieces::Shape;
use crate::types::{PieceColor, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub color: PieceColor,
    pub shape: Shape,
    pub x: i8,
    pub y: i8,
}

impl From<Tetromino> for ActiveSnapshot {
    fn from(value: Tetromino) -> Self {
        Self {
            kind: value.kind,
            color: value.color(),
            shape: value.shape,
            x: value.x,
            y: value.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimersSnapshot {
    pub elapsed_ms: u32,
    pub gravity_ms: u32,
}

/// Read-only view of a session for renderers and observers.
///
/// `board` already contains the active piece overlaid in its color while the game is
/// playing; `active` is kept separately for consumers that want the piece itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: [Row; BOARD_HEIGHT as usize],
    pub active: Option<ActiveSnapshot>,
    pub playing: bool,
    pub paused: bool,
    pub game_over: bool,
    pub piece_id: u32,
    pub score: u32,
    pub elapsed_ticks: u32,
    pub gravity_interval_ms: u32,
    pub timers: TimersSnapshot,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.board = [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        self.active = None;
        self.playing = false;
        self.paused = false;
        self.game_over = false;
        self.piece_id = 0;
        self.score = 0;
        self.elapsed_ticks = 0;
        self.gravity_interval_ms = 0;
        self.timers = TimersSnapshot {
            elapsed_ms: 0,
            gravity_ms: 0,
        };
    }

    /// Whether discrete moves would currently be accepted.
    pub fn playable(&self) -> bool {
        self.playing && !self.paused && !self.game_over
    }

    /// Overlaid board as color codes (0 = empty).
    pub fn board_codes(&self) -> [[u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize] {
        let mut out = [[0u8; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize];
        for (dst, src) in out.iter_mut().zip(self.board.iter()) {
            for (d, cell) in dst.iter_mut().zip(src.iter()) {
                *d = cell.map_or(0, |c| c.code());
            }
        }
        out
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        let mut s = Self {
            board: [[None; BOARD_WIDTH as usize]; BOARD_HEIGHT as usize],
            active: None,
            playing: false,
            paused: false,
            game_over: false,
            piece_id: 0,
            score: 0,
            elapsed_ticks: 0,
            gravity_interval_ms: 0,
            timers: TimersSnapshot {
                elapsed_ms: 0,
                gravity_ms: 0,
            },
        };
        s.clear();
        s
    }
}
