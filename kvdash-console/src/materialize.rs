//! # Value Materialization
//!
//! Purpose: Assemble the full, client-ready value of one key without pulling
//! unbounded data into memory.
//!
//! ## Design Principles
//!
//! 1. **Resolve Once**: the representation kind is determined exactly once,
//!    before any kind-specific read is issued.
//! 2. **Bounded Reads**: list reads are range-limited and collections go
//!    through the cursor scanner, so huge values cost one page at a time.
//! 3. **All Or Nothing**: any failing step aborts the operation; no partial
//!    value escapes.

use std::collections::{BTreeMap, BTreeSet};

use kvdash_common::{KeyKind, KeyValue, ValuePayload};
use kvdash_store::StoreConn;

use crate::config::Limits;
use crate::error::{ConsoleError, ConsoleResult};
use crate::resolve::resolve_kind;
use crate::scan::{full_scan, ScanKind};
use crate::trace::{traced_command, Tracer};

/// Fetches the complete value of `key`, with collection members optionally
/// filtered by `field_pattern`.
///
/// A missing key fails with not-found before any further store command; the
/// type check (and its trace) is the only store access on that path.
pub async fn materialize<C: StoreConn>(
    conn: &mut C,
    tracer: &Tracer,
    limits: &Limits,
    key: &str,
    field_pattern: &str,
) -> ConsoleResult<KeyValue> {
    let kind = resolve_kind(conn, tracer, key).await?;
    if kind == KeyKind::Missing {
        return Err(ConsoleError::NotFound(key.to_string()));
    }

    let ttl = traced_command(conn, tracer, &["TTL", key]).await?.into_int()?;

    let value = match kind {
        KeyKind::String => {
            let reply = traced_command(conn, tracer, &["GET", key]).await?;
            ValuePayload::Text(reply.into_text()?)
        }
        KeyKind::List => {
            let stop = limits.row_limit.saturating_sub(1).to_string();
            let reply = traced_command(conn, tracer, &["LRANGE", key, "0", &stop]).await?;
            // Rows past the limit are silently left behind, not an error.
            ValuePayload::Rows(reply.into_rows()?)
        }
        KeyKind::Set => {
            let members =
                full_scan(conn, tracer, limits, ScanKind::Set, key, field_pattern).await?;
            ValuePayload::Members(members.into_iter().collect::<BTreeSet<_>>())
        }
        KeyKind::Hash | KeyKind::SortedSet => {
            let scan_kind = if kind == KeyKind::Hash {
                ScanKind::Hash
            } else {
                ScanKind::SortedSet
            };
            let entries =
                full_scan(conn, tracer, limits, scan_kind, key, field_pattern).await?;
            // Pages of paired kinds are checked for whole pairs by the
            // scanner, so the fold below never sees a dangling member.
            let mut map = BTreeMap::new();
            let mut it = entries.into_iter();
            while let (Some(member), Some(value)) = (it.next(), it.next()) {
                map.insert(member, value);
            }
            ValuePayload::Map(map)
        }
        KeyKind::Missing => return Err(ConsoleError::NotFound(key.to_string())),
    };

    Ok(KeyValue {
        key: key.to_string(),
        kind,
        ttl,
        value,
    })
}
