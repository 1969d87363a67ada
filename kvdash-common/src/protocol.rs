//! # Console Wire Protocol
//!
//! Purpose: Define the JSON message envelopes exchanged with the browser UI.
//!
//! ## Design Principles
//!
//! 1. **Operation Echo**: Responses carry the operation name of the request
//!    so the UI can correlate them without request ids.
//! 2. **Side-Channel Traces**: Command traces are ordinary messages on the
//!    same channel, so per-operation ordering is the channel's FIFO order.
//! 3. **Late Validation**: Envelope payloads stay `serde_json::Value` until
//!    an operation-specific struct checks their shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation name: page through the key namespace.
pub const OP_SCAN_KEYS: &str = "ScanKeys";
/// Operation name: fetch the full value of one key.
pub const OP_GET_KEY: &str = "GetKey";
/// Operation name: set a key's expiry in seconds.
pub const OP_SET_TTL: &str = "SetTTL";
/// Operation name: report a key's storage type.
pub const OP_KEY_TYPE: &str = "KeyType";
/// Operation name: rename a key.
pub const OP_RENAME: &str = "Rename";
/// Operation name: report server request counters.
pub const OP_STATS: &str = "Stats";

/// Trace message: a command about to be issued, verbatim.
pub const OP_TRACE_CMD: &str = "cmd";
/// Trace message: the raw reply to the last issued command.
pub const OP_TRACE_REPLY: &str = "reply";
/// Trace message: a command that failed.
pub const OP_TRACE_ERROR: &str = "cmdError";
/// Response operation used when a request fails.
pub const OP_ERROR: &str = "error";

/// Inbound request envelope from the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Operation name, e.g. `GetKey`.
    pub operation: String,
    /// Index of the configured store endpoint to address.
    #[serde(default)]
    pub server: usize,
    /// Database index on that endpoint.
    #[serde(default)]
    pub db: u32,
    /// Operation-specific payload, validated downstream.
    #[serde(default)]
    pub data: Value,
}

impl Request {
    /// Builds a request for the default endpoint and database.
    pub fn new(operation: impl Into<String>, data: Value) -> Self {
        Request {
            operation: operation.into(),
            server: 0,
            db: 0,
            data,
        }
    }
}

/// Outbound message envelope to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Operation name echoing the request, or a trace/error operation.
    pub operation: String,
    /// Operation-specific result payload.
    pub data: Value,
}

impl Message {
    /// Builds a message for the given operation.
    pub fn new(operation: impl Into<String>, data: Value) -> Self {
        Message {
            operation: operation.into(),
            data,
        }
    }
}

/// `ScanKeys` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanKeysPayload {
    /// Key pattern; plain text filters as a prefix.
    pub pattern: String,
    /// Cursor from a previous page, or 0 to start a traversal.
    #[serde(default)]
    pub cursor: u64,
}

/// `GetKey` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetKeyPayload {
    /// Key to materialize.
    pub key: String,
    /// Optional member filter for collection-typed keys.
    #[serde(default)]
    pub field: Option<String>,
}

/// `SetTTL` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTtlPayload {
    /// Key to expire.
    pub key: String,
    /// Time to live in seconds.
    pub ttl: i64,
}

/// `KeyType` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTypePayload {
    /// Key to inspect.
    pub key: String,
}

/// `Rename` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamePayload {
    /// Current key name.
    pub key: String,
    /// New key name.
    pub new_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_request_envelope() {
        let raw = r#"{"operation":"GetKey","server":1,"db":2,"data":{"key":"user:1"}}"#;
        let request: Request = serde_json::from_str(raw).unwrap();
        assert_eq!(request.operation, OP_GET_KEY);
        assert_eq!(request.server, 1);
        assert_eq!(request.db, 2);
        assert_eq!(request.data["key"], "user:1");
    }

    #[test]
    fn selector_fields_default_to_zero() {
        let raw = r#"{"operation":"Stats"}"#;
        let request: Request = serde_json::from_str(raw).unwrap();
        assert_eq!(request.server, 0);
        assert_eq!(request.db, 0);
        assert!(request.data.is_null());
    }

    #[test]
    fn scan_keys_cursor_defaults_to_start() {
        let payload: ScanKeysPayload =
            serde_json::from_value(json!({"pattern": "user"})).unwrap();
        assert_eq!(payload.cursor, 0);
    }

    #[test]
    fn message_round_trips() {
        let message = Message::new(OP_KEY_TYPE, json!("hash"));
        let text = serde_json::to_string(&message).unwrap();
        let back: Message = serde_json::from_str(&text).unwrap();
        assert_eq!(back.operation, OP_KEY_TYPE);
        assert_eq!(back.data, json!("hash"));
    }
}
