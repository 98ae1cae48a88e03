//! TCP server for the remote adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::core::{GameState, PieceSource};
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::types::{BOARD_HEIGHT, BOARD_WIDTH};

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions/platforms.
#[derive(Debug, Clone)]
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables; unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let host = env::var("NEON_TETRIS_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("NEON_TETRIS_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let max_pending_commands = env::var("NEON_TETRIS_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        let log_path = env::var("NEON_TETRIS_AI_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            protocol_version: defaults.protocol_version,
            max_pending_commands,
            log_path,
        }
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("NEON_TETRIS_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Shared server state
struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    /// Client id of the controller. Lock before `clients` when both are needed.
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Record `seq` if it is strictly greater than the client's last one.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };

        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn broadcast(&self, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.handshaken) {
            let _ = c.tx.send(msg.clone());
        }
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    handshaken: bool,
    last_seq: Option<u64>,
    /// Channel to this client's writer task
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

impl ClientOutbound {
    fn encode_into(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        buf.clear();
        match self {
            ClientOutbound::Welcome(m) => serde_json::to_writer(&mut *buf, m)?,
            ClientOutbound::Ack(m) => serde_json::to_writer(&mut *buf, m)?,
            ClientOutbound::Error(m) => serde_json::to_writer(&mut *buf, m)?,
            ClientOutbound::Observation(m) => serde_json::to_writer(&mut *buf, m)?,
        }
        buf.push(b'\n');
        Ok(())
    }
}

fn send_error(
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    seq: u64,
    code: ErrorCode,
    message: &str,
) {
    let _ = tx.send(ClientOutbound::Error(create_error(seq, code, message)));
}

/// Append every wire line to `path` from a dedicated task.
///
/// Returns `None` (logging off) if the file cannot be opened.
async fn spawn_wire_log(path: String) -> Option<mpsc::UnboundedSender<Vec<u8>>> {
    use tokio::fs::OpenOptions;

    let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[Adapter] Cannot open wire log {}: {}", path, e);
            return None;
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
    tokio::spawn(async move {
        while let Some(mut line) = rx.recv().await {
            if line.last() != Some(&b'\n') {
                line.push(b'\n');
            }
            if file.write_all(&line).await.is_err() {
                break;
            }
        }
        let _ = file.flush().await;
    });

    println!("[Adapter] Logging wire traffic to {}", path);
    Some(tx)
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up (port 0 picks a free
/// port). Runs until the listener fails.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = match config.log_path.clone() {
        Some(path) => spawn_wire_log(path).await,
        None => None,
    };

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind adapter on {}", addr))?;
    let bound = listener.local_addr()?;
    println!("[Adapter] TCP server listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state
                            .send_to(client_id, ClientOutbound::Observation(obs))
                            .await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        state.broadcast(ClientOutbound::Observation(obs)).await;
                    }
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ClientOutbound::Ack(ack)).await;
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        println!("[Adapter] Client {} connected from {}", client_id, addr);

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();

        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, client_id, state, command_tx, wire_log_tx).await
            {
                eprintln!("[Adapter] Client {} error: {}", client_id, e);
            }
            println!("[Adapter] Client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    let wire_log_tx_out = wire_log_tx.clone();
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            if msg.encode_into(&mut buf).is_err() {
                continue;
            }
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
            if let Some(log) = wire_log_tx_out.as_ref() {
                let _ = log.send(buf.clone());
            }
        }
    });

    let result = read_loop(&mut reader, client_id, &state, &command_tx, &tx, wire_log_tx).await;

    // Clean up: remove client and promote a new controller if needed.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;

        let was_controller = *controller == Some(client_id);
        clients.retain(|c| c.id != client_id);

        if was_controller {
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            match next_id {
                Some(new_id) => println!("[Adapter] Client {} promoted to controller", new_id),
                None => println!("[Adapter] Controller {} released", client_id),
            }
        }
    }

    drop(tx);
    let _ = write_task.await;

    result
}

async fn read_loop(
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: &mpsc::Sender<InboundCommand>,
    tx: &mpsc::UnboundedSender<ClientOutbound>,
    wire_log_tx: Option<mpsc::UnboundedSender<Vec<u8>>>,
) -> anyhow::Result<()> {
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(log) = wire_log_tx.as_ref() {
            let _ = log.send(trimmed.as_bytes().to_vec());
        }

        let parsed = parse_message(trimmed);
        let seq = match &parsed {
            Ok(ParsedMessage::Hello(m)) => m.seq,
            Ok(ParsedMessage::Command(m)) => m.seq,
            Ok(ParsedMessage::Control(m)) => m.seq,
            Ok(ParsedMessage::Unknown(m)) => m.seq,
            Err(_) => extract_seq_best_effort(trimmed).unwrap_or(0),
        };
        let handshaken = state.is_handshaken(client_id).await;

        match parsed {
            Ok(ParsedMessage::Hello(hello)) => {
                if handshaken && !state.check_and_update_seq(client_id, seq).await {
                    send_error(
                        tx,
                        seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                if !is_compatible_version(&hello.protocol_version) {
                    send_error(
                        tx,
                        seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    return Ok(());
                }

                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(seq);
                    }

                    // First client to hello becomes controller
                    if controller.is_none() {
                        *controller = Some(client_id);
                        println!("[Adapter] Client {} is now controller", client_id);
                    }

                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|id| id as u64))
                };

                println!(
                    "[Adapter] Client {} hello from {} {}",
                    client_id, hello.client.name, hello.client.version
                );

                let welcome = create_welcome(
                    seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                // Waits for queue space: every new client must get its first observation.
                let request = InboundCommand {
                    client_id,
                    seq,
                    payload: InboundPayload::SnapshotRequest,
                };
                if command_tx.send(request).await.is_err() {
                    anyhow::bail!("game loop is gone");
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !handshaken {
                    send_error(tx, seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, seq).await {
                    send_error(
                        tx,
                        seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }
                if !state.is_controller(client_id).await {
                    send_error(
                        tx,
                        seq,
                        ErrorCode::NotController,
                        "Only controller may send commands",
                    );
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        send_error(tx, seq, code, &message);
                        continue;
                    }
                };

                // Ack is sent by the game loop after the command is applied.
                match command_tx.try_send(InboundCommand {
                    client_id,
                    seq,
                    payload: InboundPayload::Command(mapped),
                }) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        send_error(tx, seq, ErrorCode::Backpressure, "Command queue is full");
                    }
                    Err(TrySendError::Closed(_)) => {
                        anyhow::bail!("game loop is gone");
                    }
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !handshaken {
                    send_error(tx, seq, ErrorCode::HandshakeRequired, "Send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, seq).await {
                    send_error(
                        tx,
                        seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }

                let mut controller = state.controller.write().await;
                match ctrl.action {
                    ControlAction::Claim => {
                        if controller.is_none() || *controller == Some(client_id) {
                            *controller = Some(client_id);
                            println!("[Adapter] Client {} claimed control", client_id);
                            let _ = tx.send(ClientOutbound::Ack(create_ack(seq)));
                        } else {
                            send_error(
                                tx,
                                seq,
                                ErrorCode::ControllerActive,
                                "Controller already assigned",
                            );
                        }
                    }
                    ControlAction::Release => {
                        if *controller == Some(client_id) {
                            *controller = None;
                            println!("[Adapter] Client {} released control", client_id);
                            let _ = tx.send(ClientOutbound::Ack(create_ack(seq)));
                        } else {
                            send_error(
                                tx,
                                seq,
                                ErrorCode::NotController,
                                "Only controller may release",
                            );
                        }
                    }
                }
            }

            Ok(ParsedMessage::Unknown(_)) => {
                if handshaken && !state.check_and_update_seq(client_id, seq).await {
                    send_error(
                        tx,
                        seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    continue;
                }
                send_error(tx, seq, ErrorCode::InvalidCommand, "Unknown message type");
            }

            Err(e) => {
                send_error(tx, seq, ErrorCode::InvalidCommand, &format!("Invalid message: {}", e));
            }
        }
    }
}

/// Map a protocol command into a game-loop command.
fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    if cmd.actions.0.is_empty() {
        return Err((ErrorCode::InvalidCommand, "Missing actions".to_string()));
    }
    Ok(ClientCommand::Actions(cmd.actions.0.clone()))
}

/// Build observation message from game state
pub fn build_observation<R: PieceSource>(
    game: &GameState<R>,
    seq: u64,
    last_event: Option<LastEvent>,
) -> ObservationMessage {
    let snap = game.snapshot();

    let mut hasher = Fnv1aHasher::new();
    snap.board.hash(&mut hasher);
    snap.active.hash(&mut hasher);
    snap.playing.hash(&mut hasher);
    snap.paused.hash(&mut hasher);
    snap.game_over.hash(&mut hasher);
    snap.piece_id.hash(&mut hasher);
    snap.score.hash(&mut hasher);
    snap.elapsed_ticks.hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playing: snap.playing,
        paused: snap.paused,
        game_over: snap.game_over,
        score: snap.score,
        elapsed_ticks: snap.elapsed_ticks,
        drop_interval_ms: snap.gravity_interval_ms,
        piece_id: snap.piece_id,
        board: BoardSnapshot {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            cells: snap.board_codes(),
        },
        active: snap.active.map(ActivePieceSnapshot::from),
        last_event,
        state_hash,
    }
}
