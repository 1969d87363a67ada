//! # KV Console Server
//!
//! Serve the browser console over newline-delimited JSON on TCP, routing
//! operations to the configured key-value store endpoints.
//!
//! ## Design Principles
//!
//! 1. **Single Responsibility**: framing, dispatch, and store access live in
//!    their own crates and modules.
//! 2. **Async First**: Tokio handles concurrent clients and store I/O.
//! 3. **Fail-Open Defaults**: per-message errors never take down a
//!    connection, and connection errors never take down the server.
//! 4. **Immutable Config**: endpoints and limits are read once at startup.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use socket2::{SockRef, TcpKeepalive};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use kvdash_server::config::ServerConfig;
use kvdash_server::metrics::Metrics;
use kvdash_server::server::{handle_connection, AppState};
use kvdash_store::Registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match std::env::var("KVDASH_CONFIG") {
        Ok(path) => ServerConfig::load(&path)?,
        Err(_) => ServerConfig::default(),
    };

    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(
        listen = %config.listen,
        endpoints = config.endpoints.len(),
        "console server up"
    );

    let state = Arc::new(AppState {
        registry: Registry::new(config.endpoints),
        limits: config.limits,
        metrics: Metrics::new(),
    });

    loop {
        let (stream, peer) = listener.accept().await?;
        if let Err(err) = keepalive(&stream) {
            warn!(%peer, %err, "keepalive setup failed");
        }
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let _ = handle_connection(stream, state).await;
        });
    }
}

/// Enables TCP keepalive so half-dead browser connections get reaped.
fn keepalive(stream: &TcpStream) -> std::io::Result<()> {
    let sock = SockRef::from(stream);
    sock.set_tcp_keepalive(&TcpKeepalive::new().with_time(Duration::from_secs(60)))
}
