//! # Console Operations
//!
//! Purpose: The message-level operations the UI invokes, composed from the
//! resolver, scanner, and materializer.
//!
//! ## Design Principles
//!
//! 1. **Validate First**: payload shape and keys are checked before the
//!    acquired connection is used.
//! 2. **Echoed Operations**: each response repeats the request's operation
//!    name; failures become a coded `error` message.
//! 3. **Terminal Errors**: any failure ends the operation; nothing retries.

use kvdash_common::{
    GetKeyPayload, KeyTypePayload, Message, RenamePayload, Request, ScanKeysPayload,
    SetTtlPayload, OP_ERROR, OP_GET_KEY, OP_KEY_TYPE, OP_RENAME, OP_SCAN_KEYS, OP_SET_TTL,
};
use kvdash_store::StoreConn;
use serde_json::{json, Value};

use crate::config::Limits;
use crate::error::{ConsoleError, ConsoleResult};
use crate::materialize::materialize;
use crate::request;
use crate::resolve::resolve_kind;
use crate::scan::{scan_page, ScanKind};
use crate::trace::{traced_command, Tracer};

/// Runs one request against an acquired connection, returning the response
/// payload for the echoed operation name.
pub async fn dispatch<C: StoreConn>(
    req: &Request,
    conn: &mut C,
    tracer: &Tracer,
    limits: &Limits,
) -> ConsoleResult<Value> {
    match req.operation.as_str() {
        OP_SCAN_KEYS => scan_keys(req, conn, tracer, limits).await,
        OP_GET_KEY => get_key(req, conn, tracer, limits).await,
        OP_SET_TTL => set_ttl(req, conn, tracer).await,
        OP_KEY_TYPE => key_type(req, conn, tracer).await,
        OP_RENAME => rename(req, conn, tracer).await,
        other => Err(ConsoleError::Validation(format!(
            "unknown operation \"{other}\""
        ))),
    }
}

/// Client-visible message for a failed operation.
pub fn error_message(err: &ConsoleError) -> Message {
    Message::new(
        OP_ERROR,
        json!({ "code": err.code(), "message": err.to_string() }),
    )
}

/// Pages through the key namespace; the returned cursor continues the
/// traversal until it comes back as zero.
async fn scan_keys<C: StoreConn>(
    req: &Request,
    conn: &mut C,
    tracer: &Tracer,
    limits: &Limits,
) -> ConsoleResult<Value> {
    let payload: ScanKeysPayload =
        request::payload(req, r#"{"pattern": string, "cursor"?: integer}"#)?;
    let page = scan_page(
        conn,
        tracer,
        limits,
        ScanKind::Keys,
        "",
        &payload.pattern,
        payload.cursor,
    )
    .await?;
    Ok(json!({ "keys": page.entries, "cursor": page.cursor }))
}

async fn get_key<C: StoreConn>(
    req: &Request,
    conn: &mut C,
    tracer: &Tracer,
    limits: &Limits,
) -> ConsoleResult<Value> {
    let payload: GetKeyPayload =
        request::payload(req, r#"{"key": string, "field"?: string}"#)?;
    request::require_key(&payload.key)?;
    let field = payload.field.as_deref().unwrap_or("");
    let value = materialize(conn, tracer, limits, &payload.key, field).await?;
    Ok(json!(value))
}

async fn set_ttl<C: StoreConn>(
    req: &Request,
    conn: &mut C,
    tracer: &Tracer,
) -> ConsoleResult<Value> {
    let payload: SetTtlPayload =
        request::payload(req, r#"{"key": string, "ttl": integer}"#)?;
    request::require_key(&payload.key)?;
    let ttl_text = payload.ttl.to_string();
    let reply = traced_command(conn, tracer, &["EXPIRE", &payload.key, &ttl_text]).await?;
    Ok(json!(reply.into_int()?))
}

/// Reports the key's storage type; a missing key reports `none` here rather
/// than failing, so the UI can probe cheaply.
async fn key_type<C: StoreConn>(
    req: &Request,
    conn: &mut C,
    tracer: &Tracer,
) -> ConsoleResult<Value> {
    let payload: KeyTypePayload = request::payload(req, r#"{"key": string}"#)?;
    request::require_key(&payload.key)?;
    let kind = resolve_kind(conn, tracer, &payload.key).await?;
    Ok(json!(kind.as_str()))
}

async fn rename<C: StoreConn>(
    req: &Request,
    conn: &mut C,
    tracer: &Tracer,
) -> ConsoleResult<Value> {
    let payload: RenamePayload =
        request::payload(req, r#"{"key": string, "new_key": string}"#)?;
    request::require_key(&payload.key)?;
    request::require_key(&payload.new_key)?;
    let reply = traced_command(conn, tracer, &["RENAME", &payload.key, &payload.new_key]).await?;
    reply.into_text()?;
    Ok(json!(payload.new_key))
}
