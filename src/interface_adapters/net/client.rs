use crate::interface_adapters::protocol::{ClientMessage, JoinedDto, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::rng::next_conn_id;
use crate::use_cases::{RoomCommand, RoomEvent, RoomHandle, RoomRegistry};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    CommandsClosed,
    EventsClosed,
    HandshakeRequired,
    HandshakeTimeout,
    ClosedBeforeHandshake,
    // Refusal was already reported to the client as an Error message.
    JoinRefused,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const MAX_NAME_LEN: usize = 24;
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Serializes each room event once and broadcasts the shared bytes; the
/// latest snapshot is additionally kept in a watch channel for lag recovery
/// and late joiners.
pub async fn room_event_serializer(
    mut event_rx: broadcast::Receiver<RoomEvent>,
    event_bytes_tx: broadcast::Sender<Utf8Bytes>,
    snapshot_latest_tx: watch::Sender<Utf8Bytes>,
) {
    loop {
        match event_rx.recv().await {
            Ok(event) => {
                let is_snapshot = matches!(event, RoomEvent::Snapshot(_));
                let msg = ServerMessage::from(event);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize room event");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                if is_snapshot {
                    let _ = snapshot_latest_tx.send(bytes.clone());
                }
                let _ = event_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(missed = n, "room serializer lagged; skipping to latest event");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("room events channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_room_serializer(room: &RoomHandle) {
    // One serializer per room, living as long as the room task does.
    tokio::spawn(room_event_serializer(
        room.event_tx.subscribe(),
        room.event_bytes_tx.clone(),
        room.snapshot_latest_tx.clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let registry = state.room_registry.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

async fn handle_socket(mut socket: WebSocket, registry: Arc<RoomRegistry>) {
    // Connection id doubles as the player id for the whole session.
    let conn_id = next_conn_id();
    let span = info_span!("conn", conn_id);
    let _enter = span.enter();

    let mut ctx = match bootstrap_connection(&mut socket, conn_id, registry).await {
        Ok(ctx) => ctx,
        Err(NetError::ClosedBeforeHandshake) => {
            info!("client disconnected before handshake");
            return;
        }
        Err(NetError::JoinRefused) => {
            info!("join refused");
            return;
        }
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "bootstrap failed".into(),
                })))
                .await;
            let _ = socket.close().await;
            return;
        }
    };

    info!(
        room = %ctx.room.code,
        player_id = ctx.player_id,
        name = %ctx.display_name,
        "client connected"
    );

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

async fn send_close_with_reason(
    socket: &mut WebSocket,
    code: u16,
    reason: &'static str,
) -> Result<(), NetError> {
    socket
        .send(Message::Close(Some(CloseFrame {
            code,
            reason: reason.into(),
        })))
        .await
        .map_err(NetError::Ws)?;
    socket.close().await.map_err(NetError::Ws)
}

struct ConnCtx {
    pub player_id: u64,
    pub display_name: String,
    // Room this connection is seated in.
    pub room: RoomHandle,
    pub command_tx: mpsc::Sender<RoomCommand>,
    pub event_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    pub snapshot_latest_rx: watch::Receiver<Utf8Bytes>,
    // Count lag recovery snapshots sent to this client.
    pub lag_recovery_count: u64,

    pub msgs_in: u64,
    pub msgs_out: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,

    pub invalid_json: u32,

    pub last_command_full_log: Instant,
    pub last_event_lag_log: Instant,
    pub last_invalid_msg_log: Instant,

    pub close_frame: Option<CloseFrame>,
}

/// The first meaningful message on a socket: open a room or join one.
#[derive(Debug)]
enum HandshakeIntent {
    Create { name: String },
    Join { code: String, name: String },
}

#[derive(Debug)]
struct Handshake {
    intent: HandshakeIntent,
    bytes_in: u64,
    msgs_in: u64,
}

fn sanitize_name(raw: &str) -> String {
    let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    if name.is_empty() {
        "Player".to_string()
    } else {
        name
    }
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    conn_id: u64,
    registry: Arc<RoomRegistry>,
) -> Result<ConnCtx, NetError> {
    // The very first message decides which room this connection belongs to.
    let handshake = match timeout(HANDSHAKE_TIMEOUT, read_handshake(socket)).await {
        Ok(result) => result?,
        Err(_) => {
            let _ = send_close_with_reason(socket, close_code::POLICY, "handshake timeout").await;
            return Err(NetError::HandshakeTimeout);
        }
    };

    let (room, ack, display_name) = match handshake.intent {
        HandshakeIntent::Create { name } => {
            let (room, ack) = registry.create_room(conn_id, &name).await;
            // The serializer must exist before anyone subscribes for bytes.
            spawn_room_serializer(&room);
            (room, ack, name)
        }
        HandshakeIntent::Join { code, name } => {
            let room = match registry.get_room(&code).await {
                Ok(room) => room,
                Err(e) => return refuse_join(socket, e.to_string()).await,
            };
            let ack = match room.join(conn_id, name.clone()).await {
                Ok(ack) => ack,
                Err(e) => return refuse_join(socket, e.to_string()).await,
            };
            (room, ack, name)
        }
    };

    // Subscribe before the Joined send so no broadcast slips past during the
    // await below.
    let event_bytes_rx = room.event_bytes_tx.subscribe();
    let snapshot_latest_rx = room.snapshot_latest_tx.subscribe();

    let player_id = ack.player_id;
    let msg = ServerMessage::Joined(JoinedDto::from(ack));
    if let Err(e) = send_message(socket, &msg).await {
        // Free the seat if the handshake reply never made it out.
        let _ = room.command_tx.send(RoomCommand::Leave { player_id: conn_id }).await;
        return Err(e);
    }

    // Bootstrap state: an ended room is no longer ticking, so the stored
    // final snapshot is the only way a late joiner sees the arena at all.
    let latest = snapshot_latest_rx.borrow().clone();
    if !latest.is_empty() {
        if let Err(e) = socket.send(Message::Text(latest)).await {
            let _ = room
                .command_tx
                .send(RoomCommand::Leave { player_id: conn_id })
                .await;
            return Err(NetError::Ws(e));
        }
    }

    let now = Instant::now() - LOG_THROTTLE;
    Ok(ConnCtx {
        player_id,
        display_name,
        command_tx: room.command_tx.clone(),
        room,
        event_bytes_rx,
        snapshot_latest_rx,
        lag_recovery_count: 0,

        msgs_in: handshake.msgs_in,
        msgs_out: 0,
        bytes_in: handshake.bytes_in,
        bytes_out: 0,

        invalid_json: 0,

        last_command_full_log: now,
        last_event_lag_log: now,
        last_invalid_msg_log: now,

        close_frame: None,
    })
}

async fn refuse_join(socket: &mut WebSocket, message: String) -> Result<ConnCtx, NetError> {
    let msg = ServerMessage::Error { message };
    let _ = send_message(socket, &msg).await;
    let _ = send_close_with_reason(socket, close_code::POLICY, "join refused").await;
    Err(NetError::JoinRefused)
}

async fn read_handshake(socket: &mut WebSocket) -> Result<Handshake, NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeHandshake);
        };

        let message = incoming.map_err(NetError::Ws)?;
        match message {
            Message::Text(text) => {
                let bytes_in = text.len() as u64;
                let intent = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Create(payload)) => HandshakeIntent::Create {
                        name: sanitize_name(&payload.name),
                    },
                    Ok(ClientMessage::Join(payload)) => HandshakeIntent::Join {
                        code: payload.code,
                        name: sanitize_name(&payload.name),
                    },
                    Ok(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "create or join required",
                        )
                        .await;
                        return Err(NetError::HandshakeRequired);
                    }
                    Err(_) => {
                        let _ = send_close_with_reason(
                            socket,
                            close_code::POLICY,
                            "invalid handshake payload",
                        )
                        .await;
                        return Err(NetError::HandshakeRequired);
                    }
                };

                return Ok(Handshake {
                    intent,
                    bytes_in,
                    msgs_in: 1,
                });
            }
            Message::Binary(_) => {
                let _ = send_close_with_reason(
                    socket,
                    close_code::UNSUPPORTED,
                    "binary messages not supported",
                )
                .await;
                return Err(NetError::HandshakeRequired);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeHandshake),
        }
    }
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

// Shared non-blocking send path for every in-loop room command.
fn send_room_command(
    player_id: u64,
    command_tx: &mpsc::Sender<RoomCommand>,
    command: RoomCommand,
    last_command_full_log: &mut Instant,
) -> Result<LoopControl, NetError> {
    match command_tx.try_send(command) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_cmd)) => {
            if should_log(last_command_full_log) {
                warn!(player_id, "command channel full; dropping command");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_cmd)) => Err(NetError::CommandsClosed),
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;

    // Split borrows so `tokio::select!` can hold them concurrently.
    let ConnCtx {
        room,
        command_tx,
        event_bytes_rx,
        snapshot_latest_rx,
        lag_recovery_count,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        last_command_full_log,
        last_event_lag_log,
        last_invalid_msg_log,
        close_frame,
        ..
    } = ctx;

    let mut fatal: Option<NetError> = None;

    loop {
        // disconnect becomes true on error
        let disconnect: bool = tokio::select! {
            // Incoming Message from Client
            incoming = socket.recv() => {
                match handle_incoming_ws(
                    incoming,
                    player_id,
                    command_tx,
                    msgs_in,
                    bytes_in,
                    invalid_json,
                    last_command_full_log,
                    last_invalid_msg_log,
                    close_frame,
                ) {
                    Ok(LoopControl::Continue) => false,
                    Ok(LoopControl::Disconnect) => true,
                    Err(e) => {
                        fatal = Some(e);
                        true
                    }
                }
            }

            // Outgoing Room Event
            event_msg = event_bytes_rx.recv() => {
                match event_msg {
                    Ok(bytes) => match forward_event_bytes(bytes, socket, msgs_out, bytes_out).await {
                        LoopControl::Continue => false,
                        LoopControl::Disconnect => true,
                    },
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        if should_log(last_event_lag_log) {
                            warn!(missed = n, "room events lagged; sending snapshot");
                        }

                        // Resync strategy: send the latest full snapshot.
                        let latest = snapshot_latest_rx.borrow().clone();
                        if latest.is_empty() {
                            if should_log(last_event_lag_log) {
                                warn!("snapshot unavailable during lag recovery");
                            }
                            false
                        } else {
                            let bytes_len = latest.len();
                            *lag_recovery_count += 1;
                            let outcome =
                                forward_event_bytes(latest, socket, msgs_out, bytes_out).await;

                            if should_log(last_event_lag_log) {
                                debug!(
                                    player_id,
                                    bytes = bytes_len,
                                    count = *lag_recovery_count,
                                    "sent lag recovery snapshot"
                                );
                            }

                            match outcome {
                                LoopControl::Continue => false,
                                LoopControl::Disconnect => true,
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        // The room task exited; nothing more will arrive.
                        fatal = Some(NetError::EventsClosed);
                        true
                    }
                }
            }
        };

        if disconnect {
            if let Some(frame) = close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await.map_err(NetError::Ws) {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = disconnect_cleanup(
        player_id,
        room,
        command_tx,
        *msgs_in,
        *msgs_out,
        *bytes_in,
        *bytes_out,
        *invalid_json,
        *lag_recovery_count,
    )
    .await
    {
        warn!(error = ?e, "error during disconnect cleanup");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    if let Some(err) = fatal { Err(err) } else { Ok(()) }
}

#[allow(clippy::too_many_arguments)]
fn handle_incoming_ws(
    incoming: Option<Result<Message, Error>>,
    player_id: u64,
    command_tx: &mpsc::Sender<RoomCommand>,
    msgs_in: &mut u64,
    bytes_in: &mut u64,
    invalid_json: &mut u32,
    last_command_full_log: &mut Instant,
    last_invalid_msg_log: &mut Instant,
    close_frame: &mut Option<CloseFrame>,
) -> Result<LoopControl, NetError> {
    match incoming {
        Some(Ok(msg)) => match msg {
            Message::Text(text) => {
                *msgs_in += 1;
                *bytes_in += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Create(_)) | Ok(ClientMessage::Join(_)) => {
                        // The seat is fixed after bootstrap; repeated
                        // handshakes are ignored to keep the session stable.
                        if should_log(last_invalid_msg_log) {
                            warn!(player_id, "duplicate handshake ignored");
                        }
                        Ok(LoopControl::Continue)
                    }
                    Ok(ClientMessage::Input(input)) => send_room_command(
                        player_id,
                        command_tx,
                        RoomCommand::Input {
                            player_id,
                            input: input.into(),
                        },
                        last_command_full_log,
                    ),
                    Ok(ClientMessage::TogglePause) => send_room_command(
                        player_id,
                        command_tx,
                        RoomCommand::TogglePause { player_id },
                        last_command_full_log,
                    ),
                    Ok(ClientMessage::NewGame) => send_room_command(
                        player_id,
                        command_tx,
                        RoomCommand::NewGame { player_id },
                        last_command_full_log,
                    ),
                    Err(parse_err) => {
                        *invalid_json += 1;
                        if should_log(last_invalid_msg_log) {
                            warn!(
                                player_id,
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }

                        if *invalid_json > MAX_INVALID_JSON {
                            *close_frame = Some(CloseFrame {
                                code: close_code::POLICY,
                                reason: "too many invalid messages".into(),
                            });
                            return Ok(LoopControl::Disconnect);
                        }

                        Ok(LoopControl::Continue)
                    }
                }
            }
            Message::Binary(_) => {
                *close_frame = Some(CloseFrame {
                    code: close_code::UNSUPPORTED,
                    reason: "binary messages not supported".into(),
                });
                Ok(LoopControl::Disconnect)
            }
            Message::Ping(_) | Message::Pong(_) => Ok(LoopControl::Continue),
            Message::Close(_) => Ok(LoopControl::Disconnect),
        },
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_event_bytes(
    event_msg: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
    bytes_out: &mut u64,
) -> LoopControl {
    let bytes_len = event_msg.len();
    match socket
        .send(Message::Text(event_msg))
        .await
        .map_err(NetError::Ws)
    {
        Ok(()) => {
            *msgs_out += 1;
            *bytes_out += bytes_len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            // Log unexpected send failures; disconnect will follow immediately.
            warn!(error = ?err, "failed to send room event");
            LoopControl::Disconnect
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn disconnect_cleanup(
    player_id: u64,
    room: &RoomHandle,
    command_tx: &mpsc::Sender<RoomCommand>,
    msgs_in: u64,
    msgs_out: u64,
    bytes_in: u64,
    bytes_out: u64,
    invalid_json: u32,
    lag_recovery_count: u64,
) -> Result<(), NetError> {
    // Vacating the seat may close the room when this was the last player.
    command_tx
        .send(RoomCommand::Leave { player_id })
        .await
        .map_err(|_| NetError::CommandsClosed)?;

    debug!(
        player_id,
        room = %room.code,
        msgs_in,
        msgs_out,
        bytes_in,
        bytes_out,
        invalid_json,
        lag_recovery_count,
        "connection stats"
    );
    info!(player_id, "client disconnected");
    Ok(())
}
