// Network adapter for external client sockets.

pub mod client;

pub use client::{spawn_room_serializer, ws_handler};
