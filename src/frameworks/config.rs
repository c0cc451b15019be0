use std::{env, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("ARENA_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000)
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 1024;
pub const EVENT_BROADCAST_CAPACITY: usize = 128;

/// 30 simulation ticks per second; snapshots are broadcast at the same rate.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / 30);
