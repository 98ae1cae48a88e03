//! Terminal "game renderer" module.
//!
//! This is a small, game-oriented rendering layer for terminal gameplay.
//! It renders into a plain framebuffer that is flushed to the terminal, instead of
//! going through a widget toolkit.
//!
//! Goals:
//! - Keep `core` deterministic and testable
//! - Keep the view pure: snapshot in, framebuffer out
//! - Allow precise control over aspect ratio (2 chars wide per cell)

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use neon_tetris_core as core;
pub use neon_tetris_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{neon_rgb, AdapterStatusView, AnchorY, GameView, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
