//! # Key Value Model
//!
//! Purpose: Describe a key's storage representation and its fully assembled
//! value as the UI consumes it.
//!
//! ## Design Principles
//!
//! 1. **Closed Kind Set**: The representation kinds are a fixed enum, so every
//!    per-kind branch is checked exhaustively.
//! 2. **Store Vocabulary**: Kinds serialize as the store's own type names
//!    (`string`, `list`, `set`, `zset`, `hash`, `none`).
//! 3. **Kind-Tagged Payloads**: The assembled value carries its payload in the
//!    shape matching the kind, nothing more generic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage representation of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Plain string value.
    String,
    /// Ordered list of strings.
    List,
    /// Unordered set of unique members.
    Set,
    /// Sorted set of members with scores.
    #[serde(rename = "zset")]
    SortedSet,
    /// Field/value mapping.
    Hash,
    /// The key does not exist.
    #[serde(rename = "none")]
    Missing,
}

impl KeyKind {
    /// Maps the store's reported type name to a kind.
    ///
    /// `none` and unrecognized names both map to [`KeyKind::Missing`];
    /// callers treat that as not-found, never as a failure.
    pub fn from_type_str(name: &str) -> Self {
        match name {
            "string" => KeyKind::String,
            "list" => KeyKind::List,
            "set" => KeyKind::Set,
            "zset" => KeyKind::SortedSet,
            "hash" => KeyKind::Hash,
            _ => KeyKind::Missing,
        }
    }

    /// The store's name for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyKind::String => "string",
            KeyKind::List => "list",
            KeyKind::Set => "set",
            KeyKind::SortedSet => "zset",
            KeyKind::Hash => "hash",
            KeyKind::Missing => "none",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully assembled value for one key, ready for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    /// The key this value belongs to.
    pub key: String,
    /// Storage representation of the value.
    #[serde(rename = "type")]
    pub kind: KeyKind,
    /// Remaining time to live in seconds; -1 means no expiry.
    pub ttl: i64,
    /// The value payload, shaped by `kind`.
    pub value: ValuePayload,
}

/// Payload of a materialized value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValuePayload {
    /// A scalar string value.
    Text(String),
    /// A bounded prefix of a list value.
    Rows(Vec<String>),
    /// The deduplicated members of a set value.
    Members(BTreeSet<String>),
    /// Field/value pairs of a hash, or member/score pairs of a sorted set.
    Map(BTreeMap<String, String>),
}
