//! # Store Error Types
//!
//! ## Design Principles
//!
//! 1. **Three Terminal Kinds**: connectivity, command rejection, and reply
//!    shape each get their own variant; all of them end the operation.
//! 2. **Verbatim Messages**: store-side rejections carry the store's own
//!    words so the UI shows exactly what happened.
//! 3. **No Retries**: nothing in this crate is marked retryable.

use thiserror::Error;

/// Result type used across store access code.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a store connection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport failure while connecting or talking to the store.
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The store rejected the command; the message is the store's reply.
    #[error("store error: {0}")]
    Command(String),

    /// The reply could not be decoded or had an unexpected shape.
    #[error("store protocol error: {0}")]
    Protocol(String),

    /// No store endpoint is configured at the requested index.
    #[error("no store endpoint at index {0}")]
    Endpoint(usize),
}

#[cfg(test)]
mod tests {
    use super::StoreError;

    #[test]
    fn renders_command_rejection_verbatim() {
        let err = StoreError::Command("ERR no such key".to_string());
        assert_eq!(err.to_string(), "store error: ERR no such key");
    }

    #[test]
    fn wraps_io_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = StoreError::from(io);
        assert!(matches!(err, StoreError::Io(_)));
    }
}
