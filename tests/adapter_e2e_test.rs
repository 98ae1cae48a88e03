use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use neon_tetris::adapter::{
    apply_command, build_observation, create_ack, run_server, InboundCommand, InboundPayload,
    LastEvent, ObservationMessage, OutboundMessage, ServerConfig, PROTOCOL_VERSION,
};
use neon_tetris::core::{GameState, ScriptedPieces};
use neon_tetris::types::PieceKind;

#[derive(Debug, Deserialize)]
struct Welcome {
    #[serde(rename = "type")]
    msg_type: String,
    seq: u64,
    protocol_version: String,
    client_id: u64,
    role: String,
    controller_id: Option<u64>,
    board: Dims,
}

#[derive(Debug, Deserialize)]
struct Dims {
    width: u8,
    height: u8,
}

struct Client {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect failed");
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer.write_all(line.as_bytes()).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
    }

    async fn hello(&mut self, seq: u64) -> Welcome {
        self.send(&format!(
            r#"{{"type":"hello","seq":{},"client":{{"name":"e2e","version":"0.1.0"}},"protocol_version":"{}"}}"#,
            seq, PROTOCOL_VERSION
        ))
        .await;
        let line = self.next_line().await.expect("expected welcome line");
        serde_json::from_str(&line).unwrap()
    }

    async fn next_line(&mut self) -> Option<String> {
        tokio::time::timeout(Duration::from_secs(2), self.lines.next_line())
            .await
            .expect("timed out waiting for server")
            .unwrap()
    }

    /// Next message of type `ty`, skipping anything else (observations interleave freely).
    async fn next_of_type(&mut self, ty: &str) -> serde_json::Value {
        loop {
            let line = self.next_line().await.expect("connection closed");
            let v: serde_json::Value = serde_json::from_str(&line).unwrap();
            if v["type"] == ty {
                return v;
            }
        }
    }
}

async fn spawn_server(
    max_pending: usize,
) -> (
    SocketAddr,
    mpsc::Receiver<InboundCommand>,
    mpsc::UnboundedSender<OutboundMessage>,
) {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_pending_commands: max_pending,
        ..ServerConfig::default()
    };

    let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    tokio::spawn(async move {
        let _ = run_server(config, cmd_tx, out_rx, Some(ready_tx)).await;
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .expect("server did not signal ready")
        .expect("ready channel dropped");

    (addr, cmd_rx, out_tx)
}

/// Minimal game loop: apply, ack, then broadcast.
fn spawn_game_loop(
    mut cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
) {
    tokio::spawn(async move {
        let mut game = GameState::with_source(ScriptedPieces::repeat(PieceKind::O));
        let mut seq = 0u64;

        while let Some(cmd) = cmd_rx.recv().await {
            seq += 1;
            match cmd.payload {
                InboundPayload::Command(command) => {
                    apply_command(&mut game, &command);
                    let _ = out_tx.send(OutboundMessage::ToClientAck {
                        client_id: cmd.client_id,
                        ack: create_ack(cmd.seq),
                    });
                    let last_event = game.take_last_event().map(LastEvent::from);
                    let obs = build_observation(&game, seq, last_event);
                    let _ = out_tx.send(OutboundMessage::BroadcastObservation { obs });
                }
                InboundPayload::SnapshotRequest => {
                    let obs = build_observation(&game, seq, None);
                    let _ = out_tx.send(OutboundMessage::ToClientObservation {
                        client_id: cmd.client_id,
                        obs,
                    });
                }
            }
        }
    });
}

#[tokio::test]
async fn adapter_hello_command_ack_and_observation() {
    let (addr, cmd_rx, out_tx) = spawn_server(8).await;
    spawn_game_loop(cmd_rx, out_tx);

    let mut client = Client::connect(addr).await;
    let welcome = client.hello(1).await;
    assert_eq!(welcome.msg_type, "welcome");
    assert_eq!(welcome.seq, 1);
    assert_eq!(welcome.protocol_version, PROTOCOL_VERSION);
    assert_eq!(welcome.role, "controller");
    assert_eq!(welcome.controller_id, Some(welcome.client_id));
    assert_eq!((welcome.board.width, welcome.board.height), (10, 20));

    // Initial state for the new client.
    let line = client.next_line().await.unwrap();
    let obs: ObservationMessage = serde_json::from_str(&line).unwrap();
    assert!(!obs.playing);
    assert!(obs.active.is_none());

    client
        .send(r#"{"type":"command","seq":2,"actions":["start","moveLeft"]}"#)
        .await;
    let ack = client.next_of_type("ack").await;
    assert_eq!(ack["seq"], 2);
    assert_eq!(ack["status"], "ok");

    let obs = client.next_of_type("observation").await;
    assert_eq!(obs["playing"], true);
    assert_eq!(obs["piece_id"], 1);
    assert_eq!(obs["active"]["kind"], "o");
    assert_eq!(obs["active"]["x"], 3);
    assert_eq!(obs["drop_interval_ms"], 800);
    assert!(obs["state_hash"].is_string());
    // Overlaid board carries the active piece as the yellow color code.
    assert_eq!(obs["board"]["cells"][0][3], 2);

    client
        .send(r#"{"type":"command","seq":3,"ts":5,"actions":["hardDrop"]}"#)
        .await;
    let ack = client.next_of_type("ack").await;
    assert_eq!(ack["seq"], 3);
    let obs = client.next_of_type("observation").await;
    assert_eq!(obs["score"], 36);
    assert_eq!(obs["last_event"]["hard_drop"], true);
    assert_eq!(obs["last_event"]["drop_score"], 36);
}

#[tokio::test]
async fn adapter_rejects_commands_before_handshake() {
    let (addr, cmd_rx, out_tx) = spawn_server(8).await;
    spawn_game_loop(cmd_rx, out_tx);

    let mut client = Client::connect(addr).await;
    client
        .send(r#"{"type":"command","seq":7,"actions":["moveLeft"]}"#)
        .await;
    let err = client.next_of_type("error").await;
    assert_eq!(err["code"], "handshake_required");
    assert_eq!(err["seq"], 7);
}

#[tokio::test]
async fn adapter_reports_invalid_messages() {
    let (addr, cmd_rx, out_tx) = spawn_server(8).await;
    spawn_game_loop(cmd_rx, out_tx);

    let mut client = Client::connect(addr).await;
    client.hello(1).await;

    client
        .send(r#"{"type":"command","seq":2,"actions":["teleport"]}"#)
        .await;
    let err = client.next_of_type("error").await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 2);

    client.send(r#"{"type":"dance","seq":3}"#).await;
    let err = client.next_of_type("error").await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 3);

    client.send(r#"{"type":"command","seq":4,"actions":[]}"#).await;
    let err = client.next_of_type("error").await;
    assert_eq!(err["code"], "invalid_command");

    // seq must keep increasing.
    client
        .send(r#"{"type":"command","seq":4,"actions":["moveLeft"]}"#)
        .await;
    let err = client.next_of_type("error").await;
    assert_eq!(err["code"], "invalid_command");
    assert_eq!(err["seq"], 4);

    client.send("not json at all").await;
    let err = client.next_of_type("error").await;
    assert_eq!(err["code"], "invalid_command");
}

#[tokio::test]
async fn adapter_closes_on_protocol_mismatch() {
    let (addr, cmd_rx, out_tx) = spawn_server(8).await;
    spawn_game_loop(cmd_rx, out_tx);

    let mut client = Client::connect(addr).await;
    client
        .send(r#"{"type":"hello","seq":1,"client":{"name":"old","version":"0"},"protocol_version":"2.0.0"}"#)
        .await;
    let err = client.next_of_type("error").await;
    assert_eq!(err["code"], "protocol_mismatch");
    assert_eq!(client.next_line().await, None);
}

#[tokio::test]
async fn adapter_observer_promotion_and_control() {
    let (addr, cmd_rx, out_tx) = spawn_server(8).await;
    spawn_game_loop(cmd_rx, out_tx);

    let mut first = Client::connect(addr).await;
    let w1 = first.hello(1).await;
    assert_eq!(w1.role, "controller");

    let mut second = Client::connect(addr).await;
    let w2 = second.hello(1).await;
    assert_eq!(w2.role, "observer");
    assert_eq!(w2.controller_id, Some(w1.client_id));

    second
        .send(r#"{"type":"command","seq":2,"actions":["start"]}"#)
        .await;
    let err = second.next_of_type("error").await;
    assert_eq!(err["code"], "not_controller");

    second.send(r#"{"type":"control","seq":3,"action":"claim"}"#).await;
    let err = second.next_of_type("error").await;
    assert_eq!(err["code"], "controller_active");

    // Observers still see broadcasts.
    first
        .send(r#"{"type":"command","seq":2,"actions":["start"]}"#)
        .await;
    first.next_of_type("ack").await;
    let obs = second.next_of_type("observation").await;
    assert_eq!(obs["playing"], true);

    // Controller leaves; the remaining client is promoted.
    drop(first);
    let mut seq = 4;
    let promoted = loop {
        second
            .send(&format!(
                r#"{{"type":"command","seq":{},"actions":["moveRight"]}}"#,
                seq
            ))
            .await;
        let line = second.next_line().await.expect("connection closed");
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        if v["type"] == "ack" {
            break true;
        }
        if seq > 40 {
            break false;
        }
        seq += 1;
        tokio::time::sleep(Duration::from_millis(25)).await;
    };
    assert!(promoted);

    second.send(r#"{"type":"control","seq":100,"action":"release"}"#).await;
    let ack = second.next_of_type("ack").await;
    assert_eq!(ack["seq"], 100);

    second.send(r#"{"type":"control","seq":101,"action":"claim"}"#).await;
    let ack = second.next_of_type("ack").await;
    assert_eq!(ack["seq"], 101);
}

#[tokio::test]
async fn adapter_backpressure_when_queue_full() {
    // Nobody drains the queue: the snapshot request after hello takes the only slot.
    let (addr, _cmd_rx, _out_tx) = spawn_server(1).await;

    let mut client = Client::connect(addr).await;
    client.hello(1).await;

    client
        .send(r#"{"type":"command","seq":2,"actions":["start"]}"#)
        .await;
    let err = client.next_of_type("error").await;
    assert_eq!(err["code"], "backpressure");
    assert_eq!(err["seq"], 2);
}

#[tokio::test]
async fn adapter_every_hello_gets_an_observation_when_queue_is_full() {
    let (addr, cmd_rx, out_tx) = spawn_server(1).await;

    // The first snapshot request takes the only slot; the second has to wait for it.
    let mut a = Client::connect(addr).await;
    a.hello(1).await;
    let mut b = Client::connect(addr).await;
    let welcome = b.hello(1).await;
    assert_eq!(welcome.role, "observer");

    spawn_game_loop(cmd_rx, out_tx);

    let obs = a.next_of_type("observation").await;
    assert_eq!(obs["playing"], false);
    let obs = b.next_of_type("observation").await;
    assert_eq!(obs["playing"], false);
}
