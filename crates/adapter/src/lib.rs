//! Adapter module - remote control via TCP socket with a JSON protocol
//!
//! This module lets external agents and alternative UIs drive the game through a
//! TCP socket connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7777)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Every handshaken client receives an observation after
//!    each state change
//! 5. **Commanding**: Controller sends commands; each is acked once applied
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and protocol version
//! - **command**: List of actions (`moveLeft`, `moveRight`, `softDrop`, `rotate`,
//!   `hardDrop`, `togglePause`, `start`)
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with the assigned role and board size
//! - **observation**: Full game state (board with active piece, score, time, speed)
//! - **ack**: Command acknowledgment
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `NEON_TETRIS_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `NEON_TETRIS_AI_PORT`: Port number (default: 7777)
//! - `NEON_TETRIS_AI_MAX_PENDING`: Command queue depth (default: 10)
//! - `NEON_TETRIS_AI_LOG_PATH`: Append every wire line to this file
//! - `NEON_TETRIS_AI_DISABLED`: Set to "1" or "true" to disable the adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"my-ai","version":"1.0.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","client_id":1,"role":"controller","controller_id":1,"board":{"width":10,"height":20}}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567891,"playing":false,...}
//! Client -> Server: {"type":"command","seq":2,"actions":["start","moveLeft","hardDrop"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok"}
//! ```
//!
//! # Testing
//!
//! ```bash
//! nc 127.0.0.1 7777
//! {"type":"hello","seq":1,"client":{"name":"test","version":"1.0.0"},"protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use neon_tetris_core as core;
pub use neon_tetris_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{
    apply_command, Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage,
};
pub use server::{build_observation, run_server, ServerConfig};
