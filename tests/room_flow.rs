mod support;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

async fn connect(base_url: &str) -> Socket {
    let (socket, _) = connect_async(format!("{base_url}/ws"))
        .await
        .expect("ws connect");
    socket
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::Text(value.to_string()))
        .await
        .expect("ws send");
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let incoming = tokio::time::timeout(RECV_TIMEOUT, socket.next())
            .await
            .expect("timed out waiting for server message")
            .expect("socket closed")
            .expect("ws recv");
        if let Message::Text(text) = incoming {
            return serde_json::from_str(&text).expect("server sent valid json");
        }
    }
}

/// Reads messages until one with the wanted `type` arrives, skipping the
/// snapshot stream in between.
async fn wait_for_type(socket: &mut Socket, wanted: &str) -> Value {
    for _ in 0..300 {
        let msg = next_json(socket).await;
        if msg["type"] == wanted {
            return msg;
        }
    }
    panic!("never received a {wanted} message");
}

async fn create_room(socket: &mut Socket, name: &str) -> Value {
    send_json(socket, json!({ "type": "Create", "data": { "name": name } })).await;
    let joined = next_json(socket).await;
    assert_eq!(joined["type"], "Joined");
    joined
}

#[tokio::test]
async fn create_room_assigns_seat_and_streams_snapshots() {
    let base_url = support::ensure_server();
    let mut socket = connect(base_url).await;

    let joined = create_room(&mut socket, "Ada").await;
    let data = &joined["data"];
    let code = data["code"].as_str().expect("room code");
    assert_eq!(code.len(), 4);
    assert!(code.chars().all(|c| c.is_ascii_lowercase()));
    assert_eq!(data["colorIndex"], 0);
    assert_eq!(data["playerCount"], 1);
    assert_eq!(data["gameEnded"], false);

    let snapshot = wait_for_type(&mut socket, "Snapshot").await;
    let world = &snapshot["data"];
    assert_eq!(world["gameRunning"], true);
    let players = world["players"].as_array().expect("players array");
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["name"], "Ada");
    assert_eq!(world["obstacles"].as_array().expect("obstacles").len(), 50);
}

#[tokio::test]
async fn join_rejects_malformed_code() {
    let base_url = support::ensure_server();
    let mut socket = connect(base_url).await;

    send_json(
        &mut socket,
        json!({ "type": "Join", "data": { "code": "ab1", "name": "Eve" } }),
    )
    .await;
    let msg = next_json(&mut socket).await;
    assert_eq!(msg["type"], "Error");
    assert_eq!(msg["data"]["message"], "Invalid room code. Use 4 letters.");
}

#[tokio::test]
async fn join_rejects_unknown_code() {
    let base_url = support::ensure_server();
    let mut socket = connect(base_url).await;

    send_json(
        &mut socket,
        json!({ "type": "Join", "data": { "code": "QQQQ", "name": "Eve" } }),
    )
    .await;
    let msg = next_json(&mut socket).await;
    assert_eq!(msg["type"], "Error");
    assert_eq!(
        msg["data"]["message"],
        "Room not found. Check the code and try again."
    );
}

#[tokio::test]
async fn second_player_joins_by_untrimmed_code() {
    let base_url = support::ensure_server();
    let mut host = connect(base_url).await;
    let joined = create_room(&mut host, "Ada").await;
    let code = joined["data"]["code"].as_str().expect("room code");

    // Codes are case-insensitive and tolerate stray padding.
    let sloppy = format!("  {} ", code.to_uppercase());
    let mut guest = connect(base_url).await;
    send_json(
        &mut guest,
        json!({ "type": "Join", "data": { "code": sloppy, "name": "Grace" } }),
    )
    .await;
    let guest_joined = next_json(&mut guest).await;
    assert_eq!(guest_joined["type"], "Joined");
    assert_eq!(guest_joined["data"]["playerCount"], 2);
    assert_eq!(guest_joined["data"]["colorIndex"], 1);

    let notice = wait_for_type(&mut host, "PlayerJoined").await;
    assert_eq!(notice["data"]["name"], "Grace");
    assert_eq!(notice["data"]["playerCount"], 2);

    let snapshot = wait_for_type(&mut guest, "Snapshot").await;
    assert_eq!(
        snapshot["data"]["players"].as_array().expect("players").len(),
        2
    );
}

#[tokio::test]
async fn fifth_player_is_refused() {
    let base_url = support::ensure_server();
    let mut host = connect(base_url).await;
    let joined = create_room(&mut host, "p1").await;
    let code = joined["data"]["code"].as_str().expect("room code").to_string();

    let mut seated = Vec::new();
    for i in 2..=4 {
        let mut guest = connect(base_url).await;
        send_json(
            &mut guest,
            json!({ "type": "Join", "data": { "code": code.as_str(), "name": format!("p{i}") } }),
        )
        .await;
        let msg = next_json(&mut guest).await;
        assert_eq!(msg["type"], "Joined");
        seated.push(guest);
    }

    let mut fifth = connect(base_url).await;
    send_json(
        &mut fifth,
        json!({ "type": "Join", "data": { "code": code.as_str(), "name": "p5" } }),
    )
    .await;
    let msg = next_json(&mut fifth).await;
    assert_eq!(msg["type"], "Error");
    assert_eq!(msg["data"]["message"], "Room is full (max 4 players).");
}

#[tokio::test]
async fn toggle_pause_is_broadcast_and_freezes_ticks() {
    let base_url = support::ensure_server();
    let mut socket = connect(base_url).await;
    create_room(&mut socket, "Ada").await;

    send_json(&mut socket, json!({ "type": "TogglePause" })).await;
    let changed = wait_for_type(&mut socket, "PauseChanged").await;
    assert_eq!(changed["data"]["paused"], true);

    // Snapshots keep flowing while paused; the scene just stops advancing.
    let snapshot = wait_for_type(&mut socket, "Snapshot").await;
    assert_eq!(snapshot["data"]["gamePaused"], true);

    send_json(&mut socket, json!({ "type": "TogglePause" })).await;
    let changed = wait_for_type(&mut socket, "PauseChanged").await;
    assert_eq!(changed["data"]["paused"], false);
}

#[tokio::test]
async fn input_moves_the_player() {
    let base_url = support::ensure_server();
    let mut socket = connect(base_url).await;
    create_room(&mut socket, "Ada").await;

    let before = wait_for_type(&mut socket, "Snapshot").await;
    let start_x = before["data"]["players"][0]["x"].as_f64().expect("x");

    send_json(
        &mut socket,
        json!({ "type": "Input", "data": { "right": true } }),
    )
    .await;

    // Give the room a few ticks to accelerate.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let after = wait_for_last_snapshot(&mut socket).await;
    let end_x = after["data"]["players"][0]["x"].as_f64().expect("x");
    assert!(
        end_x > start_x,
        "expected rightward movement, got {start_x} -> {end_x}"
    );
}

/// Drains buffered messages and returns the freshest snapshot seen.
async fn wait_for_last_snapshot(socket: &mut Socket) -> Value {
    let mut latest = wait_for_type(socket, "Snapshot").await;
    loop {
        match tokio::time::timeout(Duration::from_millis(50), socket.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                let msg: Value = serde_json::from_str(&text).expect("valid json");
                if msg["type"] == "Snapshot" {
                    latest = msg;
                }
            }
            Ok(Some(Ok(_))) => {}
            _ => return latest,
        }
    }
}
