// Framework bootstrap for the arena server runtime.

use crate::frameworks::config;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{RoomRegistry, RoomSettings};

use axum::{Router, routing::get};
use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;

    // The registry owns room lifecycles; rooms are created lazily by
    // connections, so startup wiring is just the shared state.
    let room_registry = Arc::new(RoomRegistry::new(RoomSettings {
        command_channel_capacity: config::COMMAND_CHANNEL_CAPACITY,
        event_broadcast_capacity: config::EVENT_BROADCAST_CAPACITY,
        tick_interval: config::TICK_INTERVAL,
    }));
    let state = Arc::new(AppState { room_registry });

    let app = Router::new().route("/ws", get(ws_handler)).with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    axum::serve(listener, app).await.inspect_err(|e| {
        tracing::error!(error = %e, "server error");
    })
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}
