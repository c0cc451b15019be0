// Wire protocol DTOs and conversions for public game messages.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{GameOverSummary, InputIntent, WorldSnapshot};
use crate::use_cases::{JoinAck, RoomEvent};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    // Seat assignment after a Create or Join handshake is accepted.
    Joined(JoinedDto),
    // Handshake or command rejection with a human-readable reason.
    Error { message: String },
    // Full world state for one tick.
    Snapshot(Arc<WorldSnapshot>),
    PlayerJoined {
        player_id: u64,
        name: String,
        color: String,
        player_count: usize,
    },
    PlayerLeft {
        player_id: u64,
        player_count: usize,
    },
    PauseChanged {
        paused: bool,
        paused_by: u64,
    },
    NewGameStarted,
    GameOver(GameOverSummary),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    // Handshake: open a fresh room and take the host seat.
    Create(CreatePayload),
    // Handshake: take a seat in an existing room by code.
    Join(JoinPayload),
    // Input messages sent after a successful handshake.
    Input(InputDto),
    TogglePause,
    NewGame,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePayload {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinPayload {
    pub code: String,
    #[serde(default)]
    pub name: String,
}

/// Per-tick input payload sent by the client after joining.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct InputDto {
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub down: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub shoot: bool,
    #[serde(default)]
    pub melee: bool,
    #[serde(default)]
    pub bomb: bool,
}

impl From<InputDto> for InputIntent {
    fn from(input: InputDto) -> Self {
        Self {
            up: input.up,
            down: input.down,
            left: input.left,
            right: input.right,
            shoot: input.shoot,
            melee: input.melee,
            bomb: input.bomb,
        }
    }
}

/// Seat assignment sent in response to a Create or Join handshake.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedDto {
    pub code: String,
    pub player_id: u64,
    pub color_index: usize,
    pub color: String,
    pub player_count: usize,
    pub game_ended: bool,
    pub game_over: Option<GameOverSummary>,
}

impl From<JoinAck> for JoinedDto {
    fn from(ack: JoinAck) -> Self {
        Self {
            code: ack.code.to_string(),
            player_id: ack.player_id,
            color_index: ack.color_index,
            color: ack.color,
            player_count: ack.player_count,
            game_ended: ack.game_ended,
            game_over: ack.game_over,
        }
    }
}

impl From<RoomEvent> for ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::Snapshot(snapshot) => ServerMessage::Snapshot(snapshot),
            RoomEvent::PlayerJoined {
                player_id,
                name,
                color,
                player_count,
            } => ServerMessage::PlayerJoined {
                player_id,
                name,
                color,
                player_count,
            },
            RoomEvent::PlayerLeft {
                player_id,
                player_count,
            } => ServerMessage::PlayerLeft {
                player_id,
                player_count,
            },
            RoomEvent::PauseChanged { paused, paused_by } => {
                ServerMessage::PauseChanged { paused, paused_by }
            }
            RoomEvent::NewGameStarted => ServerMessage::NewGameStarted,
            RoomEvent::GameOver(summary) => ServerMessage::GameOver(summary),
        }
    }
}
