//! # Cursor Scanner
//!
//! Purpose: The generic incremental traversal primitive, over either the
//! whole key namespace or the members of one collection-typed key.
//!
//! ## Design Principles
//!
//! 1. **Closed Kind Set**: one scan command per variant, matched
//!    exhaustively; cursors from one kind mean nothing to another.
//! 2. **Opaque Cursors**: the store's cursor is passed back verbatim; zero
//!    starts a traversal and a returned zero ends it. Completion only means
//!    no further calls are needed.
//! 3. **Prefix By Default**: a pattern without a wildcard filters as a
//!    prefix rather than requiring exact text.
//! 4. **Fail Fast**: a malformed page aborts with a protocol error and
//!    returns no entries; paired kinds must return whole pairs.

use std::borrow::Cow;

use kvdash_store::{StoreConn, StoreError};

use crate::config::Limits;
use crate::error::{ConsoleError, ConsoleResult};
use crate::trace::{traced_command, Tracer};

/// What a traversal walks over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// The whole key namespace. Scalar values have no internal structure to
    /// walk, so this is the only traversal that applies to them.
    Keys,
    /// Members of a set key.
    Set,
    /// Field/value pairs of a hash key.
    Hash,
    /// Member/score pairs of a sorted-set key.
    SortedSet,
}

impl ScanKind {
    /// The scan command issued for this kind.
    pub const fn command(self) -> &'static str {
        match self {
            ScanKind::Keys => "SCAN",
            ScanKind::Set => "SSCAN",
            ScanKind::Hash => "HSCAN",
            ScanKind::SortedSet => "ZSCAN",
        }
    }

    /// Whether pages flatten (member, value) pairs.
    pub const fn paired(self) -> bool {
        matches!(self, ScanKind::Hash | ScanKind::SortedSet)
    }
}

/// One page of traversal results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; zero means the traversal is complete.
    pub cursor: u64,
    /// Raw entries, unprocessed; paired kinds alternate member and value.
    pub entries: Vec<String>,
}

/// Appends a trailing `*` to a pattern without one, so partial text filters
/// as a prefix. Already-wildcarded patterns pass through untouched.
pub fn normalize_pattern(pattern: &str) -> Cow<'_, str> {
    if pattern.contains('*') {
        Cow::Borrowed(pattern)
    } else {
        Cow::Owned(format!("{pattern}*"))
    }
}

/// Fetches one page of a traversal.
///
/// `key` is ignored for [`ScanKind::Keys`] and must be non-empty for every
/// other kind; violating that fails before any store access.
pub async fn scan_page<C: StoreConn>(
    conn: &mut C,
    tracer: &Tracer,
    limits: &Limits,
    kind: ScanKind,
    key: &str,
    pattern: &str,
    cursor: u64,
) -> ConsoleResult<ScanPage> {
    if kind != ScanKind::Keys && key.is_empty() {
        return Err(ConsoleError::Validation(format!(
            "{} requires a non-empty key",
            kind.command()
        )));
    }

    let pattern = normalize_pattern(pattern);
    let cursor_text = cursor.to_string();
    let count_text = limits.scan_count.to_string();
    let mut args = vec![kind.command()];
    if kind != ScanKind::Keys {
        args.push(key);
    }
    args.extend([cursor_text.as_str(), "MATCH", &pattern, "COUNT", &count_text]);

    let reply = traced_command(conn, tracer, &args).await?;
    let (next, entries) = reply.into_scan_page()?;
    if kind.paired() && entries.len() % 2 != 0 {
        return Err(ConsoleError::Store(StoreError::Protocol(format!(
            "{} page has {} entries, expected whole pairs",
            kind.command(),
            entries.len()
        ))));
    }
    Ok(ScanPage {
        cursor: next,
        entries,
    })
}

/// Drives a traversal from cursor zero to completion, accumulating entries.
///
/// Termination follows from the store's cursor contract: each call returns
/// the next cursor, and zero marks the end of the traversal.
pub async fn full_scan<C: StoreConn>(
    conn: &mut C,
    tracer: &Tracer,
    limits: &Limits,
    kind: ScanKind,
    key: &str,
    pattern: &str,
) -> ConsoleResult<Vec<String>> {
    let mut entries = Vec::new();
    let mut cursor = 0;
    loop {
        let page = scan_page(conn, tracer, limits, kind, key, pattern, cursor).await?;
        entries.extend(page.entries);
        if page.cursor == 0 {
            return Ok(entries);
        }
        cursor = page.cursor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_gains_one_wildcard() {
        assert_eq!(normalize_pattern("user"), "user*");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_pattern("user").into_owned();
        assert_eq!(normalize_pattern(&once), once.as_str());
        assert_eq!(normalize_pattern("*:session:*"), "*:session:*");
    }

    #[test]
    fn empty_pattern_scans_everything() {
        assert_eq!(normalize_pattern(""), "*");
    }

    #[test]
    fn kinds_map_to_commands() {
        assert_eq!(ScanKind::Keys.command(), "SCAN");
        assert_eq!(ScanKind::Set.command(), "SSCAN");
        assert_eq!(ScanKind::Hash.command(), "HSCAN");
        assert_eq!(ScanKind::SortedSet.command(), "ZSCAN");
        assert!(ScanKind::Hash.paired());
        assert!(ScanKind::SortedSet.paired());
        assert!(!ScanKind::Set.paired());
        assert!(!ScanKind::Keys.paired());
    }
}
