// Frameworks layer: runtime bootstrap and server wiring.

pub mod config;
pub mod server;
