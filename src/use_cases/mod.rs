// Use cases layer: application workflows for the arena server.

pub mod game;
pub mod room;
pub mod types;

pub use room::{RoomHandle, RoomRegistry, RoomSettings};
pub use types::{JoinAck, JoinError, RoomCommand, RoomEvent};
