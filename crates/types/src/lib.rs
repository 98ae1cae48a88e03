//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, remote adapter).
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Frame interval used by the terminal driver |
//! | `ELAPSED_TICK_MS` | 1000 | One elapsed-time tick |
//! | `BASE_DROP_MS` | 800 | Gravity interval at the start of a game |
//! | `DROP_STEP_MS` | 100 | Interval reduction per difficulty step |
//! | `TICKS_PER_STEP` | 30 | Elapsed ticks per difficulty step |
//! | `DROP_FLOOR_MS` | 200 | Fastest gravity interval |
//!
//! # Examples
//!
//! ```
//! use neon_tetris_types::{GameAction, PieceColor, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(PieceKind::from_str("t"), Some(PieceKind::T));
//! assert_eq!(PieceKind::T.color(), PieceColor::Purple);
//!
//! assert_eq!(GameAction::from_str("hardDrop"), Some(GameAction::HardDrop));
//! assert_eq!(GameAction::from_str("hold"), None);
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Frame interval of the terminal driver in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Real time covered by one elapsed-time tick
pub const ELAPSED_TICK_MS: u32 = 1000;

/// Gravity interval before any difficulty step
pub const BASE_DROP_MS: u32 = 800;

/// Gravity interval reduction per difficulty step
pub const DROP_STEP_MS: u32 = 100;

/// Elapsed ticks between difficulty steps
pub const TICKS_PER_STEP: u32 = 30;

/// Fastest gravity interval
pub const DROP_FLOOR_MS: u32 = 200;

/// Points per cleared row
pub const LINE_CLEAR_POINTS: u32 = 100;

/// Points per row travelled by a hard drop
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

/// The seven tetromino piece kinds
///
/// - **I**: cyan, 1x4 bar
/// - **O**: yellow, 2x2 square
/// - **T**: purple
/// - **S**: green
/// - **Z**: red (mirror of S)
/// - **J**: blue
/// - **L**: orange (mirror of J)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds, in catalog order.
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use neon_tetris_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Color this kind paints into the grid.
    pub fn color(&self) -> PieceColor {
        match self {
            PieceKind::I => PieceColor::Cyan,
            PieceKind::O => PieceColor::Yellow,
            PieceKind::T => PieceColor::Purple,
            PieceKind::S => PieceColor::Green,
            PieceKind::Z => PieceColor::Red,
            PieceKind::J => PieceColor::Blue,
            PieceKind::L => PieceColor::Orange,
        }
    }
}

/// Color identifier stored in occupied grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceColor {
    Cyan,
    Yellow,
    Purple,
    Green,
    Red,
    Blue,
    Orange,
}

impl PieceColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceColor::Cyan => "cyan",
            PieceColor::Yellow => "yellow",
            PieceColor::Purple => "purple",
            PieceColor::Green => "green",
            PieceColor::Red => "red",
            PieceColor::Blue => "blue",
            PieceColor::Orange => "orange",
        }
    }

    /// Compact non-zero code used by `u8` board grids (0 means empty).
    pub fn code(&self) -> u8 {
        match self {
            PieceColor::Cyan => 1,
            PieceColor::Yellow => 2,
            PieceColor::Purple => 3,
            PieceColor::Green => 4,
            PieceColor::Red => 5,
            PieceColor::Blue => 6,
            PieceColor::Orange => 7,
        }
    }

    /// Inverse of [`PieceColor::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(PieceColor::Cyan),
            2 => Some(PieceColor::Yellow),
            3 => Some(PieceColor::Purple),
            4 => Some(PieceColor::Green),
            5 => Some(PieceColor::Red),
            6 => Some(PieceColor::Blue),
            7 => Some(PieceColor::Orange),
            _ => None,
        }
    }
}

/// A cell on the game board
///
/// - `None`: empty cell
/// - `Some(PieceColor)`: cell occupied by a locked piece of that color
pub type Cell = Option<PieceColor>;

/// Player commands accepted by the engine
///
/// These actions are used by both human input and remote control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameAction {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down, locking it if it cannot descend
    SoftDrop,
    /// Rotate piece 90° clockwise (no wall kicks)
    Rotate,
    /// Instantly drop piece to lowest valid position and lock it
    HardDrop,
    /// Pause or resume the running game
    TogglePause,
}

impl GameAction {
    /// Parse action from its wire name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use neon_tetris_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("moveLeft"), Some(GameAction::MoveLeft));
    /// assert_eq!(GameAction::from_str("rotate"), Some(GameAction::Rotate));
    /// assert_eq!(GameAction::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameAction::MoveLeft),
            "moveright" => Some(GameAction::MoveRight),
            "softdrop" => Some(GameAction::SoftDrop),
            "rotate" => Some(GameAction::Rotate),
            "harddrop" => Some(GameAction::HardDrop),
            "togglepause" | "pause" => Some(GameAction::TogglePause),
            _ => None,
        }
    }

    /// Convert to camelCase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::SoftDrop => "softDrop",
            GameAction::Rotate => "rotate",
            GameAction::HardDrop => "hardDrop",
            GameAction::TogglePause => "togglePause",
        }
    }
}

/// Everything that can advance a session, fed one at a time into `GameState::apply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// Reset the session and spawn the first piece
    Start,
    /// A player command
    Input(GameAction),
    /// One elapsed-time unit passed
    ElapsedTick,
    /// The gravity interval expired
    GravityTick,
}

impl From<GameAction> for GameEvent {
    fn from(action: GameAction) -> Self {
        GameEvent::Input(action)
    }
}

/// Core-side event emitted after a piece locks.
///
/// Consumed by observers (the adapter maps it to the protocol `last_event`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockEvent {
    pub lines_cleared: u32,
    pub line_clear_score: u32,
    pub drop_score: u32,
    pub hard_drop: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_curve_defaults() {
        assert_eq!(ELAPSED_TICK_MS, 1000);
        assert_eq!(BASE_DROP_MS, 800);
        assert_eq!(DROP_STEP_MS, 100);
        assert_eq!(TICKS_PER_STEP, 30);
        assert_eq!(DROP_FLOOR_MS, 200);
        assert_eq!(LINE_CLEAR_POINTS, 100);
        assert_eq!(HARD_DROP_POINTS_PER_ROW, 2);
    }

    #[test]
    fn every_kind_round_trips_its_name() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn action_names_are_case_insensitive() {
        assert_eq!(GameAction::from_str("MOVELEFT"), Some(GameAction::MoveLeft));
        assert_eq!(GameAction::from_str("togglepause"), Some(GameAction::TogglePause));
        assert_eq!(GameAction::from_str("pause"), Some(GameAction::TogglePause));
        assert_eq!(GameAction::from_str(""), None);
    }
}
