//! Adapter runtime integration.
//!
//! Bridges the synchronous game loop with the async TCP server. The server never touches
//! the engine: parsed commands arrive here over a bounded channel, the game loop applies
//! them to the `GameState` it owns, and replies go back over an unbounded channel.

use std::net::SocketAddr;

use anyhow::{anyhow, Result};
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::core::{GameState, PieceSource};
use crate::protocol::{
    create_ack, AckMessage, CommandAction, LastEvent, ObservationMessage,
    MAX_ACTIONS_PER_COMMAND,
};
use crate::server::{build_observation, run_server, ServerConfig};
use crate::types::GameEvent;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A client just completed its handshake and wants the current state.
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Actions(ArrayVec<CommandAction, MAX_ACTIONS_PER_COMMAND>),
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientObservation { client_id: usize, obs: ObservationMessage },
    BroadcastObservation { obs: ObservationMessage },
    ToClientAck { client_id: usize, ack: AckMessage },
}

/// Apply a client command to the game, in order. Returns whether any action changed state.
pub fn apply_command<R: PieceSource>(game: &mut GameState<R>, command: &ClientCommand) -> bool {
    match command {
        ClientCommand::Actions(actions) => {
            let mut changed = false;
            for action in actions {
                let event = match *action {
                    CommandAction::Start => GameEvent::Start,
                    CommandAction::Game(a) => GameEvent::Input(a),
                };
                changed |= game.apply(event);
            }
            changed
        }
    }
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    addr: SocketAddr,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    obs_seq: u64,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `NEON_TETRIS_AI_DISABLED` is set.
    pub fn start_from_env() -> Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Start the server on its own runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel::<SocketAddr>();

        let rt = Runtime::new()?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await {
                eprintln!("[Adapter] Server error: {}", e);
            }
        });

        let addr = rt
            .block_on(ready_rx)
            .map_err(|_| anyhow!("adapter server stopped before listening"))?;

        Ok(Self {
            _rt: rt,
            addr,
            cmd_rx,
            out_tx,
            obs_seq: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Drain pending commands into the game. Returns whether state changed.
    ///
    /// Each command is acked after it is applied; a snapshot request gets an observation
    /// addressed to the requesting client only.
    pub fn pump<R: PieceSource>(&mut self, game: &mut GameState<R>) -> bool {
        let mut changed = false;
        while let Some(cmd) = self.try_recv() {
            match cmd.payload {
                InboundPayload::Command(command) => {
                    changed |= apply_command(game, &command);
                    self.send(OutboundMessage::ToClientAck {
                        client_id: cmd.client_id,
                        ack: create_ack(cmd.seq),
                    });
                }
                InboundPayload::SnapshotRequest => {
                    let obs = build_observation(game, self.next_seq(), None);
                    self.send(OutboundMessage::ToClientObservation {
                        client_id: cmd.client_id,
                        obs,
                    });
                }
            }
        }
        changed
    }

    /// Broadcast the current state, consuming the pending lock event.
    pub fn broadcast_observation<R: PieceSource>(&mut self, game: &mut GameState<R>) {
        let last_event = game.take_last_event().map(LastEvent::from);
        let obs = build_observation(game, self.next_seq(), last_event);
        self.send(OutboundMessage::BroadcastObservation { obs });
    }

    fn next_seq(&mut self) -> u64 {
        self.obs_seq += 1;
        self.obs_seq
    }
}
