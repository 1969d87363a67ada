// kvdash-server - Transport wiring for the KV console
//
// Frames newline-delimited JSON messages over TCP and routes each request
// to the console operation core

pub mod config;
pub mod framing;
pub mod metrics;
pub mod server;

pub use config::ServerConfig;
pub use metrics::{Metrics, MetricsSnapshot};
pub use server::{handle_connection, AppState};
