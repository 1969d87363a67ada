//! # Key Type Resolution
//!
//! One introspection command decides which per-kind read path a key takes.

use kvdash_common::KeyKind;
use kvdash_store::StoreConn;

use crate::error::ConsoleResult;
use crate::trace::{traced_command, Tracer};

/// Determines the storage representation of `key`.
///
/// Issues a single `TYPE` command, traced unconditionally. `none` and
/// unrecognized type names resolve to [`KeyKind::Missing`]; callers must
/// treat that as not-found, which is distinct from a store failure.
pub async fn resolve_kind<C: StoreConn>(
    conn: &mut C,
    tracer: &Tracer,
    key: &str,
) -> ConsoleResult<KeyKind> {
    let reply = traced_command(conn, tracer, &["TYPE", key]).await?;
    let name = reply.into_text()?;
    Ok(KeyKind::from_type_str(&name))
}
