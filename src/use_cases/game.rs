// The authoritative per-room game loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::domain::GameSimulation;
use crate::domain::tuning::{MAX_PLAYERS, PLAYER_COLORS};
use crate::use_cases::room::RoomRegistry;
use crate::use_cases::types::{JoinAck, JoinError, RoomCommand, RoomEvent};

/// Who is seated in the room, in join order.
///
/// The roster outlives individual matches: a new game re-adds everyone in
/// the same order, so colors stay stable across rematches.
#[derive(Debug)]
pub struct RoomRoster {
    entries: Vec<RosterEntry>,
}

#[derive(Debug)]
struct RosterEntry {
    player_id: u64,
    name: String,
}

impl RoomRoster {
    pub fn seeded(host_id: u64, host_name: &str) -> Self {
        Self {
            entries: vec![RosterEntry {
                player_id: host_id,
                name: host_name.to_string(),
            }],
        }
    }

    fn push(&mut self, player_id: u64, name: String) {
        self.entries.push(RosterEntry { player_id, name });
    }

    fn remove(&mut self, player_id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.player_id != player_id);
        self.entries.len() != before
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runs one room to completion: fixed-rate ticks, command draining, and
/// event broadcasting. Exits (and removes the room) when the last player
/// leaves.
pub async fn room_task(
    mut simulation: GameSimulation,
    mut roster: RoomRoster,
    mut command_rx: mpsc::Receiver<RoomCommand>,
    event_tx: broadcast::Sender<RoomEvent>,
    code: Arc<str>,
    registry: Arc<RoomRegistry>,
    tick_interval: Duration,
) {
    let mut interval = tokio::time::interval(tick_interval);
    // A stalled loop should not fire a burst of catch-up ticks.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_tick = Instant::now();
    let mut game_over_sent = false;

    'room: loop {
        interval.tick().await;

        while let Ok(command) = command_rx.try_recv() {
            match command {
                RoomCommand::Join {
                    player_id,
                    name,
                    reply,
                } => {
                    let display_name = name.clone();
                    let verdict =
                        seat_player(&mut simulation, &mut roster, &code, player_id, name);
                    if let Ok(ack) = &verdict {
                        info!(code = %code, player_id, players = ack.player_count, "player joined");
                        if !ack.game_ended {
                            let _ = event_tx.send(RoomEvent::PlayerJoined {
                                player_id,
                                name: display_name,
                                color: ack.color.clone(),
                                player_count: ack.player_count,
                            });
                        }
                    }
                    let _ = reply.send(verdict);
                }
                RoomCommand::Leave { player_id } => {
                    if roster.remove(player_id) {
                        simulation.remove_player(player_id);
                        info!(code = %code, player_id, players = roster.len(), "player left");
                        let _ = event_tx.send(RoomEvent::PlayerLeft {
                            player_id,
                            player_count: roster.len(),
                        });
                        if roster.is_empty() {
                            break 'room;
                        }
                    }
                }
                RoomCommand::Input { player_id, input } => {
                    simulation.set_player_input(player_id, input);
                }
                RoomCommand::TogglePause { player_id } => {
                    let paused = simulation.toggle_pause();
                    debug!(code = %code, player_id, paused, "pause toggled");
                    let _ = event_tx.send(RoomEvent::PauseChanged {
                        paused,
                        paused_by: player_id,
                    });
                }
                RoomCommand::NewGame { player_id } => {
                    if simulation.is_running() {
                        continue;
                    }
                    let mut fresh = GameSimulation::new();
                    for entry in &roster.entries {
                        fresh.add_player(entry.player_id, &entry.name);
                    }
                    simulation = fresh;
                    game_over_sent = false;
                    info!(code = %code, player_id, players = roster.len(), "new game started");
                    let _ = event_tx.send(RoomEvent::NewGameStarted);
                }
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f64();
        last_tick = now;

        // An ended match keeps serving commands (rematch, leave) but stops
        // simulating and broadcasting.
        if game_over_sent {
            continue;
        }

        simulation.tick(dt);
        let _ = event_tx.send(RoomEvent::Snapshot(Arc::new(simulation.serialize())));

        if let Some(summary) = simulation.game_over() {
            let _ = event_tx.send(RoomEvent::GameOver(summary.clone()));
            game_over_sent = true;
        }
    }

    registry.remove_room(&code).await;
}

/// Seats a player either into the live match or, after game over, into the
/// roster only, where they wait for a rematch.
fn seat_player(
    simulation: &mut GameSimulation,
    roster: &mut RoomRoster,
    code: &Arc<str>,
    player_id: u64,
    name: String,
) -> Result<JoinAck, JoinError> {
    if roster.len() >= MAX_PLAYERS {
        return Err(JoinError::Full);
    }

    if !simulation.is_running() {
        // The match already ended; no avatar is spawned until a new game.
        let color_index = roster.len() % PLAYER_COLORS.len();
        let color = PLAYER_COLORS[color_index].to_string();
        roster.push(player_id, name);
        return Ok(JoinAck {
            code: code.clone(),
            player_id,
            color_index,
            color,
            player_count: roster.len(),
            game_ended: true,
            game_over: simulation.game_over().cloned(),
        });
    }

    let (color_index, color) = simulation.add_player(player_id, &name);
    roster.push(player_id, name);
    Ok(JoinAck {
        code: code.clone(),
        player_id,
        color_index,
        color,
        player_count: roster.len(),
        game_ended: false,
        game_over: None,
    })
}
