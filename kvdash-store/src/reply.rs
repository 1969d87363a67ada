//! # Store Replies
//!
//! Purpose: Model the reply shapes a store can return and own the typed
//! conversions the console relies on.
//!
//! ## Design Principles
//!
//! 1. **Closed Shape Set**: RESP2 has five reply shapes; the enum covers
//!    exactly those plus the null reply.
//! 2. **Conversions Own Shape Checks**: wrong arity or wrong shape becomes a
//!    protocol error in one place instead of at every call site.
//! 3. **Trace-Friendly Rendering**: `Display` renders a reply the way the
//!    console UI shows it.

use std::fmt;

use crate::error::{StoreError, StoreResult};

/// One decoded store reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Null bulk or null array reply.
    Nil,
    /// Status line, e.g. `+OK`.
    Simple(String),
    /// Error line, e.g. `-ERR unknown command`.
    Error(String),
    /// Signed 64-bit integer reply.
    Int(i64),
    /// Bulk string payload, lossily decoded as UTF-8.
    Bulk(String),
    /// Array reply; elements may nest.
    Array(Vec<Reply>),
}

impl Reply {
    /// Extracts a textual reply (status or bulk string).
    pub fn into_text(self) -> StoreResult<String> {
        match self {
            Reply::Simple(text) | Reply::Bulk(text) => Ok(text),
            other => Err(StoreError::Protocol(format!(
                "expected a text reply, got {other}"
            ))),
        }
    }

    /// Extracts an integer reply; numeric bulk strings are accepted.
    pub fn into_int(self) -> StoreResult<i64> {
        match self {
            Reply::Int(value) => Ok(value),
            Reply::Bulk(text) => text.trim().parse().map_err(|_| {
                StoreError::Protocol(format!("expected an integer reply, got \"{text}\""))
            }),
            other => Err(StoreError::Protocol(format!(
                "expected an integer reply, got {other}"
            ))),
        }
    }

    /// Extracts a flat list of strings; a null reply is an empty list.
    pub fn into_rows(self) -> StoreResult<Vec<String>> {
        match self {
            Reply::Array(items) => items.into_iter().map(Reply::into_text).collect(),
            Reply::Nil => Ok(Vec::new()),
            other => Err(StoreError::Protocol(format!(
                "expected an array reply, got {other}"
            ))),
        }
    }

    /// Splits a scan reply into its next-cursor and entry page.
    ///
    /// Scan replies are two-element arrays: the cursor (a numeric bulk
    /// string) and the matched entries. Any other shape is a protocol
    /// violation and no entries are returned.
    pub fn into_scan_page(self) -> StoreResult<(u64, Vec<String>)> {
        let items = match self {
            Reply::Array(items) => items,
            other => {
                return Err(StoreError::Protocol(format!(
                    "expected a scan reply, got {other}"
                )))
            }
        };
        let [cursor, entries] = <[Reply; 2]>::try_from(items).map_err(|items| {
            StoreError::Protocol(format!(
                "scan reply has {} elements, expected 2",
                items.len()
            ))
        })?;
        let next = match cursor {
            Reply::Int(value) if value >= 0 => value as u64,
            other => {
                let text = other.into_text()?;
                text.trim().parse::<u64>().map_err(|_| {
                    StoreError::Protocol(format!("non-numeric scan cursor \"{text}\""))
                })?
            }
        };
        Ok((next, entries.into_rows()?))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Nil => write!(f, "(nil)"),
            Reply::Simple(text) => write!(f, "{text}"),
            Reply::Error(text) => write!(f, "(error) {text}"),
            Reply::Int(value) => write!(f, "(integer) {value}"),
            Reply::Bulk(text) => write!(f, "\"{text}\""),
            Reply::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}
