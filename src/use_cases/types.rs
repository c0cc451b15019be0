// Use-case level inputs/outputs for a room's game loop.

use std::fmt;
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::domain::{GameOverSummary, InputIntent, WorldSnapshot};

/// Commands flowing from connections into a room task.
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        player_id: u64,
        name: String,
        reply: oneshot::Sender<Result<JoinAck, JoinError>>,
    },
    Leave {
        player_id: u64,
    },
    Input {
        player_id: u64,
        input: InputIntent,
    },
    TogglePause {
        player_id: u64,
    },
    NewGame {
        player_id: u64,
    },
}

/// Events a room task broadcasts to every connection in the room.
///
/// Snapshots are wrapped in `Arc` so the per-subscriber broadcast clone stays
/// cheap; the serializer turns each event into shared bytes exactly once.
#[derive(Debug, Clone)]
pub enum RoomEvent {
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

/// Everything a freshly joined connection needs to know about itself.
#[derive(Debug, Clone)]
pub struct JoinAck {
    pub code: Arc<str>,
    pub player_id: u64,
    pub color_index: usize,
    pub color: String,
    pub player_count: usize,
    /// True when the room's match already ended; the player sits in the room
    /// until someone requests a new game.
    pub game_ended: bool,
    pub game_over: Option<GameOverSummary>,
}

/// Reasons a join request is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    InvalidCode,
    NotFound,
    Full,
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::InvalidCode => write!(f, "Invalid room code. Use 4 letters."),
            JoinError::NotFound => write!(f, "Room not found. Check the code and try again."),
            JoinError::Full => write!(f, "Room is full (max 4 players)."),
        }
    }
}

impl std::error::Error for JoinError {}
