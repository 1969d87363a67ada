//! # In-Memory Store
//!
//! Purpose: An in-process backend speaking the same command surface as a
//! real store, for tests and `memory` demo endpoints.
//!
//! ## Design Principles
//!
//! 1. **Command-Level Fidelity**: the console talks to this store through
//!    the same `command` primitive it uses against TCP backends, so both
//!    exercise identical code paths.
//! 2. **Deterministic Cursors**: scans paginate a sorted snapshot by offset,
//!    so a traversal that follows returned cursors terminates and yields
//!    each member once while the data is stable.
//! 3. **Coarse Locking**: one RwLock around the keyspace; console workloads
//!    are human-scale.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ahash::{AHashMap, AHashSet};
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::conn::StoreConn;
use crate::error::{StoreError, StoreResult};
use crate::reply::Reply;

const WRONG_TYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

/// Stored value for one key.
#[derive(Debug, Clone)]
enum Entry {
    Text(String),
    List(Vec<String>),
    Set(AHashSet<String>),
    Hash(AHashMap<String, String>),
    SortedSet(AHashMap<String, String>),
}

impl Entry {
    fn type_name(&self) -> &'static str {
        match self {
            Entry::Text(_) => "string",
            Entry::List(_) => "list",
            Entry::Set(_) => "set",
            Entry::Hash(_) => "hash",
            Entry::SortedSet(_) => "zset",
        }
    }
}

#[derive(Debug, Clone)]
struct Keyed {
    entry: Entry,
    expires_at: Option<Instant>,
}

impl Keyed {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// Shared in-process store; clones address the same keyspace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Keyed>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a string key.
    pub fn insert_text(&self, key: impl Into<String>, value: impl Into<String>) {
        self.insert(key, Entry::Text(value.into()));
    }

    /// Seeds a list key.
    pub fn insert_list<I, S>(&self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(key, Entry::List(values.into_iter().map(Into::into).collect()));
    }

    /// Seeds a set key.
    pub fn insert_set<I, S>(&self, key: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(key, Entry::Set(members.into_iter().map(Into::into).collect()));
    }

    /// Seeds a hash key.
    pub fn insert_hash<I, S>(&self, key: impl Into<String>, pairs: I)
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.insert(
            key,
            Entry::Hash(pairs.into_iter().map(|(f, v)| (f.into(), v.into())).collect()),
        );
    }

    /// Seeds a sorted-set key; scores are kept as the store renders them.
    pub fn insert_sorted<I, S>(&self, key: impl Into<String>, pairs: I)
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.insert(
            key,
            Entry::SortedSet(pairs.into_iter().map(|(m, s)| (m.into(), s.into())).collect()),
        );
    }

    fn insert(&self, key: impl Into<String>, entry: Entry) {
        self.inner.write().insert(
            key.into(),
            Keyed {
                entry,
                expires_at: None,
            },
        );
    }

    fn execute(&self, args: &[&str]) -> StoreResult<Reply> {
        let (&name, rest) = args
            .split_first()
            .ok_or_else(|| StoreError::Protocol("empty command".to_string()))?;
        let command = name.to_ascii_uppercase();
        let mut map = self.inner.write();
        map.retain(|_, keyed| !keyed.expired());
        match (command.as_str(), rest) {
            ("TYPE", [key]) => Ok(Reply::Simple(
                map.get(*key)
                    .map_or("none", |keyed| keyed.entry.type_name())
                    .to_string(),
            )),
            ("TTL", [key]) => Ok(Reply::Int(match map.get(*key) {
                None => -2,
                Some(Keyed { expires_at: None, .. }) => -1,
                Some(Keyed { expires_at: Some(at), .. }) => remaining_secs(*at),
            })),
            ("EXPIRE", [key, seconds]) => {
                let seconds: i64 = seconds
                    .parse()
                    .map_err(|_| not_an_integer())?;
                if !map.contains_key(*key) {
                    return Ok(Reply::Int(0));
                }
                if seconds <= 0 {
                    map.remove(*key);
                } else if let Some(keyed) = map.get_mut(*key) {
                    keyed.expires_at = Some(Instant::now() + Duration::from_secs(seconds as u64));
                }
                Ok(Reply::Int(1))
            }
            ("GET", [key]) => match map.get(*key) {
                None => Ok(Reply::Nil),
                Some(Keyed { entry: Entry::Text(value), .. }) => Ok(Reply::Bulk(value.clone())),
                Some(_) => Err(StoreError::Command(WRONG_TYPE.to_string())),
            },
            ("LRANGE", [key, start, stop]) => {
                let start: i64 = start.parse().map_err(|_| not_an_integer())?;
                let stop: i64 = stop.parse().map_err(|_| not_an_integer())?;
                let values = match map.get(*key) {
                    None => Vec::new(),
                    Some(Keyed { entry: Entry::List(values), .. }) => {
                        match resolve_range(values.len(), start, stop) {
                            Some((lo, hi)) => values[lo..=hi].to_vec(),
                            None => Vec::new(),
                        }
                    }
                    Some(_) => return Err(StoreError::Command(WRONG_TYPE.to_string())),
                };
                Ok(Reply::Array(values.into_iter().map(Reply::Bulk).collect()))
            }
            ("RENAME", [key, new_key]) => match map.remove(*key) {
                None => Err(StoreError::Command("ERR no such key".to_string())),
                Some(keyed) => {
                    map.insert(new_key.to_string(), keyed);
                    Ok(Reply::Simple("OK".to_string()))
                }
            },
            ("SCAN", [cursor, opts @ ..]) => {
                let cursor = parse_cursor(cursor)?;
                let (pattern, count) = scan_options(opts)?;
                let keys: Vec<String> = map.keys().cloned().collect();
                let (next, page) = page_members(keys, cursor, pattern.as_deref(), count);
                Ok(scan_reply(next, page))
            }
            ("SSCAN", [key, cursor, opts @ ..]) => {
                let cursor = parse_cursor(cursor)?;
                let (pattern, count) = scan_options(opts)?;
                let members: Vec<String> = match map.get(*key) {
                    None => Vec::new(),
                    Some(Keyed { entry: Entry::Set(members), .. }) => {
                        members.iter().cloned().collect()
                    }
                    Some(_) => return Err(StoreError::Command(WRONG_TYPE.to_string())),
                };
                let (next, page) = page_members(members, cursor, pattern.as_deref(), count);
                Ok(scan_reply(next, page))
            }
            ("HSCAN", [key, cursor, opts @ ..]) => {
                let pairs = match map.get(*key) {
                    None => AHashMap::new(),
                    Some(Keyed { entry: Entry::Hash(pairs), .. }) => pairs.clone(),
                    Some(_) => return Err(StoreError::Command(WRONG_TYPE.to_string())),
                };
                scan_pairs(&pairs, cursor, opts)
            }
            ("ZSCAN", [key, cursor, opts @ ..]) => {
                let pairs = match map.get(*key) {
                    None => AHashMap::new(),
                    Some(Keyed { entry: Entry::SortedSet(pairs), .. }) => pairs.clone(),
                    Some(_) => return Err(StoreError::Command(WRONG_TYPE.to_string())),
                };
                scan_pairs(&pairs, cursor, opts)
            }
            // Single keyspace; the selector is accepted and ignored.
            ("SELECT", [_db]) => Ok(Reply::Simple("OK".to_string())),
            _ => Err(StoreError::Command(format!(
                "ERR unknown command '{name}', or wrong number of arguments"
            ))),
        }
    }
}

impl StoreConn for MemoryStore {
    async fn command(&mut self, args: &[&str]) -> StoreResult<Reply> {
        self.execute(args)
    }
}

/// Matches a store-style glob pattern supporting `*` and `?`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p = pattern.as_bytes();
    let t = text.as_bytes();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && (p[pi] == b'?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == b'*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            // Let the last star absorb one more character and retry.
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&b| b == b'*')
}

fn remaining_secs(at: Instant) -> i64 {
    let remaining = at.saturating_duration_since(Instant::now());
    let mut secs = remaining.as_secs() as i64;
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    secs
}

fn not_an_integer() -> StoreError {
    StoreError::Command("ERR value is not an integer or out of range".to_string())
}

fn parse_cursor(text: &str) -> StoreResult<u64> {
    text.parse()
        .map_err(|_| StoreError::Command("ERR invalid cursor".to_string()))
}

fn scan_options(opts: &[&str]) -> StoreResult<(Option<String>, usize)> {
    let mut pattern = None;
    let mut count = 10;
    let mut it = opts.iter();
    while let Some(&opt) = it.next() {
        let &value = it
            .next()
            .ok_or_else(|| StoreError::Command("ERR syntax error".to_string()))?;
        match opt.to_ascii_uppercase().as_str() {
            "MATCH" => pattern = Some(value.to_string()),
            "COUNT" => count = value.parse().map_err(|_| not_an_integer())?,
            _ => return Err(StoreError::Command("ERR syntax error".to_string())),
        }
    }
    Ok((pattern, count))
}

/// Filters, sorts, and pages members; the cursor is the sorted offset of the
/// next unseen member, or 0 once the traversal is complete.
fn page_members(
    mut members: Vec<String>,
    cursor: u64,
    pattern: Option<&str>,
    count: usize,
) -> (u64, Vec<String>) {
    if let Some(pattern) = pattern {
        members.retain(|member| glob_match(pattern, member));
    }
    members.sort();
    let start = (cursor as usize).min(members.len());
    let end = (start + count.max(1)).min(members.len());
    let next = if end < members.len() { end as u64 } else { 0 };
    (next, members[start..end].to_vec())
}

fn scan_pairs(
    pairs: &AHashMap<String, String>,
    cursor: &str,
    opts: &[&str],
) -> StoreResult<Reply> {
    let cursor = parse_cursor(cursor)?;
    let (pattern, count) = scan_options(opts)?;
    let members: Vec<String> = pairs.keys().cloned().collect();
    let (next, page) = page_members(members, cursor, pattern.as_deref(), count);
    let mut flattened = Vec::with_capacity(page.len() * 2);
    for member in page {
        let value = pairs.get(&member).cloned().unwrap_or_default();
        flattened.push(member);
        flattened.push(value);
    }
    Ok(scan_reply(next, flattened))
}

fn scan_reply(next: u64, entries: Vec<String>) -> Reply {
    Reply::Array(vec![
        Reply::Bulk(next.to_string()),
        Reply::Array(entries.into_iter().map(Reply::Bulk).collect()),
    ])
}

fn resolve_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let n = len as i64;
    let start = if start < 0 { n + start } else { start }.max(0);
    let stop = if stop < 0 { n + stop } else { stop }.min(n - 1);
    if start > stop {
        return None;
    }
    Some((start as usize, stop as usize))
}
