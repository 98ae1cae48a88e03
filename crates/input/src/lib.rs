//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`crate::types::GameAction`] commands and the
//! [`crate::types::GameEvent::Start`] event. It knows nothing about rendering or timing;
//! every press is one discrete command.

pub mod map;

pub use neon_tetris_types as types;

pub use map::{handle_key_event, is_start_key, map_key_event, should_quit};
