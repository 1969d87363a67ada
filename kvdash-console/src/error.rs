//! # Console Error Types
//!
//! Every error here is terminal for its operation; nothing retries. The
//! `code` strings let the UI distinguish "no such key" from a real failure.

use kvdash_store::StoreError;
use thiserror::Error;

/// Result alias for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Terminal failure of one console operation.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The request failed validation; no store access was attempted.
    #[error("{0}")]
    Validation(String),

    /// The key does not exist.
    #[error("key does not exist: {0}")]
    NotFound(String),

    /// The store failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ConsoleError {
    /// Stable code string for the client-visible error payload.
    pub fn code(&self) -> &'static str {
        match self {
            ConsoleError::Validation(_) => "validation",
            ConsoleError::NotFound(_) => "notFound",
            ConsoleError::Store(StoreError::Protocol(_)) => "protocol",
            ConsoleError::Store(StoreError::Endpoint(_)) => "validation",
            ConsoleError::Store(_) => "store",
        }
    }
}
