// kvdash-common - Shared types for the KV console
//
// This crate defines the message envelopes exchanged with the browser UI
// and the value model for materialized keys

pub mod protocol;
pub mod types;

// Re-export for convenience
pub use protocol::*;
pub use types::*;
