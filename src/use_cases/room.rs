// Room orchestration: code generation, registry, and per-room channels.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Utf8Bytes;
use rand::Rng;
use tokio::sync::{RwLock, broadcast, mpsc, oneshot, watch};
use tracing::info;

use crate::domain::GameSimulation;
use crate::use_cases::game::{RoomRoster, room_task};
use crate::use_cases::types::{JoinAck, JoinError, RoomCommand, RoomEvent};

/// Shared configuration for spawning room tasks.
#[derive(Debug, Clone)]
pub struct RoomSettings {
    /// Capacity for inbound room commands.
    pub command_channel_capacity: usize,
    /// Capacity for broadcast room events.
    pub event_broadcast_capacity: usize,
    /// Fixed tick interval for the game loop.
    pub tick_interval: Duration,
}

/// Per-room channels shared by every connection in the room.
#[derive(Clone)]
pub struct RoomHandle {
    /// Four-letter code clients use to target this room.
    pub code: Arc<str>,
    /// Sender for commands into the room task.
    pub command_tx: mpsc::Sender<RoomCommand>,
    /// Broadcast sender for raw room events.
    pub event_tx: broadcast::Sender<RoomEvent>,
    /// Broadcast sender for serialized room events.
    pub event_bytes_tx: broadcast::Sender<Utf8Bytes>,
    /// Watch sender holding the latest serialized snapshot.
    pub snapshot_latest_tx: watch::Sender<Utf8Bytes>,
}

impl RoomHandle {
    /// Forwards a join request to the room task and waits for its verdict.
    pub async fn join(&self, player_id: u64, name: String) -> Result<JoinAck, JoinError> {
        let (reply, ack_rx) = oneshot::channel();
        self.command_tx
            .send(RoomCommand::Join {
                player_id,
                name,
                reply,
            })
            .await
            .map_err(|_| JoinError::NotFound)?;
        // A dropped reply means the room task exited between lookup and join.
        ack_rx.await.map_err(|_| JoinError::NotFound)?
    }
}

/// Thread-safe registry for active rooms.
pub struct RoomRegistry {
    /// Global settings applied to newly created rooms.
    settings: RoomSettings,
    /// Map of room code to active handle.
    rooms: RwLock<HashMap<String, RoomHandle>>,
}

/// Lowercase, strip everything outside a-z, and require exactly four letters.
pub fn normalize_code(raw: &str) -> Result<String, JoinError> {
    let code: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if code.len() == 4 {
        Ok(code)
    } else {
        Err(JoinError::InvalidCode)
    }
}

fn generate_code<R: Rng>(rng: &mut R, taken: &HashMap<String, RoomHandle>) -> String {
    for _ in 0..1000 {
        let code: String = (0..4)
            .map(|_| rng.random_range(b'a'..=b'z') as char)
            .collect();
        if !taken.contains_key(&code) {
            return code;
        }
    }
    // 456,976 possible codes; exhausting 1000 random draws means the server
    // is effectively full, so reuse the last draw rather than spin forever.
    (0..4)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}

impl RoomRegistry {
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            settings,
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a room with the host already seated, spawns its game loop,
    /// and returns the handle plus the host's join ack.
    pub async fn create_room(
        self: &Arc<Self>,
        host_id: u64,
        host_name: &str,
    ) -> (RoomHandle, JoinAck) {
        let mut rooms = self.rooms.write().await;
        let code = generate_code(&mut rand::rng(), &rooms);

        // Channel wiring for the room game loop.
        let (command_tx, command_rx) =
            mpsc::channel::<RoomCommand>(self.settings.command_channel_capacity);
        let (event_tx, _event_rx) =
            broadcast::channel::<RoomEvent>(self.settings.event_broadcast_capacity);
        let (snapshot_latest_tx, _snapshot_latest_rx) =
            watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
        let (event_bytes_tx, _event_bytes_rx) =
            broadcast::channel::<Utf8Bytes>(self.settings.event_broadcast_capacity);

        let handle = RoomHandle {
            code: Arc::from(code.clone()),
            command_tx,
            event_tx: event_tx.clone(),
            event_bytes_tx,
            snapshot_latest_tx,
        };
        rooms.insert(code.clone(), handle.clone());

        // The host joins synchronously so the very first snapshot already
        // contains their avatar.
        let mut simulation = GameSimulation::new();
        let (color_index, color) = simulation.add_player(host_id, host_name);
        let roster = RoomRoster::seeded(host_id, host_name);

        let ack = JoinAck {
            code: handle.code.clone(),
            player_id: host_id,
            color_index,
            color,
            player_count: 1,
            game_ended: false,
            game_over: None,
        };

        info!(code = %handle.code, host_id, "room created");

        // Spawn the authoritative game loop for this room.
        tokio::spawn(room_task(
            simulation,
            roster,
            command_rx,
            event_tx,
            handle.code.clone(),
            Arc::clone(self),
            self.settings.tick_interval,
        ));

        (handle, ack)
    }

    /// Looks up a room by (raw) code.
    pub async fn get_room(&self, raw_code: &str) -> Result<RoomHandle, JoinError> {
        let code = normalize_code(raw_code)?;
        let rooms = self.rooms.read().await;
        rooms.get(&code).cloned().ok_or(JoinError::NotFound)
    }

    /// Removes a room; called by the room task when its roster empties.
    pub async fn remove_room(&self, code: &str) {
        let mut rooms = self.rooms.write().await;
        if rooms.remove(code).is_some() {
            info!(code, "room removed");
        }
    }

    #[cfg(test)]
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_code;
    use crate::use_cases::types::JoinError;

    #[test]
    fn normalize_code_accepts_mixed_case_and_padding() {
        assert_eq!(normalize_code("  AbCd "), Ok("abcd".to_string()));
        assert_eq!(normalize_code("a-b c:d"), Ok("abcd".to_string()));
    }

    #[test]
    fn normalize_code_rejects_wrong_length() {
        assert_eq!(normalize_code("abc"), Err(JoinError::InvalidCode));
        assert_eq!(normalize_code("abcde"), Err(JoinError::InvalidCode));
        assert_eq!(normalize_code("12 34"), Err(JoinError::InvalidCode));
    }
}
