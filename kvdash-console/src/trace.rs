//! # Command Tracer
//!
//! Purpose: Mirror every store command and its raw result to the client as
//! fire-and-forget messages, for audit and debugging in the UI.
//!
//! ## Design Principles
//!
//! 1. **Never Block The Operation**: traces use `try_send`; a full or closed
//!    channel drops the event and logs it, nothing more.
//! 2. **Issue Then Receive**: both events ride the operation's own outbound
//!    channel, so FIFO delivery preserves their order.
//! 3. **Raw Payloads**: the command text and the reply are rendered before
//!    any interpretation happens.

use kvdash_common::{Message, OP_TRACE_CMD, OP_TRACE_ERROR, OP_TRACE_REPLY};
use kvdash_store::{Reply, StoreConn, StoreResult};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

/// Fire-and-forget trace emitter for one client channel.
#[derive(Clone)]
pub struct Tracer {
    tx: mpsc::Sender<Message>,
}

impl Tracer {
    /// Wraps the connection's outbound channel.
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Tracer { tx }
    }

    /// Reports a command about to be issued.
    pub fn command(&self, text: &str) {
        self.emit(OP_TRACE_CMD, text);
    }

    /// Reports the raw reply to the last issued command.
    pub fn reply(&self, reply: &Reply) {
        self.emit(OP_TRACE_REPLY, &reply.to_string());
    }

    /// Reports a failed command.
    pub fn error(&self, text: &str) {
        self.emit(OP_TRACE_ERROR, text);
    }

    fn emit(&self, operation: &str, text: &str) {
        let message = Message::new(operation, Value::String(text.to_string()));
        if self.tx.try_send(message).is_err() {
            debug!(operation, "trace event dropped");
        }
    }
}

/// Issues one store command with its trace events paired around it.
///
/// The command text is traced before dispatch and the raw reply (or the
/// failure) after receipt, unconditionally, in that order.
pub async fn traced_command<C: StoreConn>(
    conn: &mut C,
    tracer: &Tracer,
    args: &[&str],
) -> StoreResult<Reply> {
    tracer.command(&args.join(" "));
    match conn.command(args).await {
        Ok(reply) => {
            tracer.reply(&reply);
            Ok(reply)
        }
        Err(err) => {
            tracer.error(&err.to_string());
            Err(err)
        }
    }
}
