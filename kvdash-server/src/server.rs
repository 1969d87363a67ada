//! # Connection Handling
//!
//! Purpose: Run one console client connection: frame inbound JSON messages,
//! dispatch each request on its own task, and drain the outbound channel.
//!
//! ## Design Principles
//!
//! 1. **One Task Per Request**: requests are independent and share only the
//!    outbound channel and the immutable application state.
//! 2. **Bounded Outbound**: responses block on a full channel; trace events
//!    drop instead.
//! 3. **Localized Failures**: a malformed message errors that message only;
//!    the connection lives on.

use std::sync::Arc;

use bytes::BytesMut;
use kvdash_common::{Message, Request, OP_STATS};
use kvdash_console::{dispatch, error_message, ConsoleResult, Limits, Tracer};
use kvdash_store::Registry;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::framing::next_line;
use crate::metrics::Metrics;

/// Outbound channel depth per connection; traces drop beyond it.
const OUTBOUND_DEPTH: usize = 256;

/// Shared immutable state for all connections.
pub struct AppState {
    /// Configured store endpoints.
    pub registry: Registry,
    /// Traversal limits passed into the operation core.
    pub limits: Limits,
    /// Request counters behind the `Stats` operation.
    pub metrics: Metrics,
}

/// Serves one client connection to completion.
pub async fn handle_connection(stream: TcpStream, state: Arc<AppState>) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    info!(%peer, "client connected");
    let (mut reader, mut writer) = stream.into_split();

    let (tx, mut rx) = mpsc::channel::<Message>(OUTBOUND_DEPTH);
    let writer_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let Ok(mut line) = serde_json::to_vec(&message) else {
                continue;
            };
            line.push(b'\n');
            if writer.write_all(&line).await.is_err() {
                break;
            }
        }
    });

    let mut buf = BytesMut::with_capacity(4096);
    loop {
        while let Some(line) = next_line(&mut buf) {
            if line.is_empty() {
                continue;
            }
            match serde_json::from_slice::<Request>(&line) {
                Ok(request) => spawn_request(request, &state, &tx),
                Err(err) => {
                    let err = kvdash_console::ConsoleError::Validation(format!(
                        "malformed request: {err}"
                    ));
                    if tx.send(error_message(&err)).await.is_err() {
                        break;
                    }
                }
            }
        }
        let n = reader.read_buf(&mut buf).await?;
        if n == 0 {
            break;
        }
    }

    drop(tx);
    let _ = writer_task.await;
    info!(%peer, "client disconnected");
    Ok(())
}

/// Runs one request on its own task; requests from the same client execute
/// concurrently and independently.
fn spawn_request(request: Request, state: &Arc<AppState>, tx: &mpsc::Sender<Message>) {
    let state = Arc::clone(state);
    let tx = tx.clone();
    tokio::spawn(async move {
        state.metrics.record_request_start();
        let result = run_request(&request, &state, &tx).await;
        state.metrics.record_request_end();
        match result {
            Ok(data) => {
                let _ = tx.send(Message::new(&request.operation, data)).await;
            }
            Err(err) => {
                state.metrics.record_error();
                debug!(operation = %request.operation, %err, "operation failed");
                let _ = tx.send(error_message(&err)).await;
            }
        }
    });
}

async fn run_request(
    request: &Request,
    state: &AppState,
    tx: &mpsc::Sender<Message>,
) -> ConsoleResult<Value> {
    if request.operation == OP_STATS {
        return Ok(json!(state.metrics.snapshot()));
    }
    kvdash_console::request::validate_selector(&state.registry, request.server, request.db)?;
    // The connection drops, and so releases, on every path out of here.
    let mut conn = state.registry.acquire(request.server, request.db).await?;
    let tracer = Tracer::new(tx.clone());
    dispatch(request, &mut conn, &tracer, &state.limits).await
}
