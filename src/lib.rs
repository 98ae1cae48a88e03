//! Neon Tetris (workspace facade crate).
//!
//! Re-exports the workspace crates under one `neon_tetris::{core,adapter,term,input,types}`
//! path so the binary, integration tests and benches share a single import surface.

pub use neon_tetris_adapter as adapter;
pub use neon_tetris_core as core;
pub use neon_tetris_input as input;
pub use neon_tetris_term as term;
pub use neon_tetris_types as types;
