//! Core game logic - pure, deterministic, and testable
//!
//! This crate contains all the game rules, state management, and simulation logic.
//! It has **no dependencies** on UI, networking, or I/O:
//!
//! - **Deterministic**: Same seed (or scripted piece source) produces identical games
//! - **Portable**: Runs in the terminal frontend, the adapter, and headless tests alike
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 grid of locked cells
//! - [`pieces`]: The seven-piece catalog and clockwise matrix rotation
//! - [`collision`]: Legality check shared by every move
//! - [`lines`]: Full-row removal
//! - [`scoring`]: Line-clear and hard-drop points
//! - [`clock`]: Elapsed-time and gravity tickers
//! - [`rng`]: Injectable piece source (seeded LCG or scripted)
//! - [`game_state`]: Session flags, active piece, and the event handler
//! - [`snapshot`]: Read-only view for renderers and observers
//!
//! # Game Rules
//!
//! - Pieces are drawn uniformly at random, no bag, no preview, no hold
//! - Rotation is clockwise only with no wall kicks
//! - A piece locks the moment it cannot move down (no lock delay)
//! - Every cleared row is worth 100 points; a hard drop pays 2 points per row
//! - Gravity starts at 800ms and speeds up by 100ms every 30 seconds, down to 200ms
//!
//! # Example
//!
//! ```
//! use neon_tetris_core::GameState;
//! use neon_tetris_core::types::{GameAction, GameEvent};
//!
//! let mut game = GameState::new(12345);
//! game.apply(GameEvent::Start);
//!
//! game.apply(GameEvent::Input(GameAction::MoveRight));
//! game.apply(GameEvent::Input(GameAction::Rotate));
//! game.apply(GameEvent::Input(GameAction::HardDrop));
//!
//! assert!(game.score() > 0); // Hard drop awards points
//! ```
//!
//! # Timing
//!
//! Call [`GameState::tick`](game_state::GameState::tick) every frame with the elapsed time;
//! it fires elapsed-time and gravity ticks as their deadlines pass.

pub mod board;
pub mod clock;
pub mod collision;
pub mod game_state;
pub mod lines;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;

pub use neon_tetris_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Row};
pub use clock::{gravity_interval_ms, GameClock};
pub use collision::collides;
pub use game_state::{GameState, Tetromino};
pub use lines::{clear_lines, clear_lines_in_place, LineClear};
pub use pieces::{get_shape, PieceDef, Shape, CATALOG};
pub use rng::{PieceSource, ScriptedPieces, SimpleRng};
pub use scoring::{calculate_drop_score, calculate_line_score, ScoreResult};
pub use snapshot::{ActiveSnapshot, GameSnapshot, TimersSnapshot};
