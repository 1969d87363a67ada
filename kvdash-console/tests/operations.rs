//! # Console Operation Tests
//!
//! Purpose: Exercise the resolver, scanner, materializer, and dispatch
//! against a scripted connection double and the in-memory store.
//!
//! ## Design Principles
//!
//! 1. **Scripted Store**: the double replays canned replies and records
//!    every issued command, so command-order assertions are exact.
//! 2. **Real Paths Where Possible**: paging and accumulation scenarios run
//!    against the in-memory store, not canned pages.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use kvdash_common::{KeyKind, Message, Request, ValuePayload, OP_GET_KEY, OP_KEY_TYPE, OP_RENAME,
    OP_SCAN_KEYS, OP_SET_TTL};
use kvdash_console::{
    dispatch, error_message, full_scan, materialize, scan_page, ConsoleError, Limits, ScanKind,
    Tracer,
};
use kvdash_store::{MemoryStore, Reply, StoreConn, StoreError, StoreResult};
use serde_json::json;
use tokio::sync::mpsc;

/// Connection double that replays scripted replies and records commands.
struct ScriptConn {
    replies: VecDeque<StoreResult<Reply>>,
    issued: Vec<String>,
}

impl ScriptConn {
    fn new(replies: impl IntoIterator<Item = StoreResult<Reply>>) -> Self {
        ScriptConn {
            replies: replies.into_iter().collect(),
            issued: Vec::new(),
        }
    }
}

impl StoreConn for ScriptConn {
    async fn command(&mut self, args: &[&str]) -> StoreResult<Reply> {
        self.issued.push(args.join(" "));
        self.replies
            .pop_front()
            .unwrap_or_else(|| Err(StoreError::Protocol("script exhausted".to_string())))
    }
}

fn tracer() -> (Tracer, mpsc::Receiver<Message>) {
    let (tx, rx) = mpsc::channel(64);
    (Tracer::new(tx), rx)
}

fn trace_ops(rx: &mut mpsc::Receiver<Message>) -> Vec<String> {
    let mut ops = Vec::new();
    while let Ok(message) = rx.try_recv() {
        ops.push(message.operation);
    }
    ops
}

fn bulk(text: &str) -> Reply {
    Reply::Bulk(text.to_string())
}

fn scan_reply(cursor: &str, entries: &[&str]) -> Reply {
    Reply::Array(vec![
        bulk(cursor),
        Reply::Array(entries.iter().map(|e| bulk(e)).collect()),
    ])
}

#[tokio::test]
async fn absent_key_stops_after_the_type_check() {
    let (tracer, mut rx) = tracer();
    let mut conn = ScriptConn::new([Ok(Reply::Simple("none".into()))]);

    let err = materialize(&mut conn, &tracer, &Limits::default(), "ghost", "")
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::NotFound(_)));
    assert_eq!(err.code(), "notFound");
    assert_eq!(conn.issued, vec!["TYPE ghost"]);
    assert_eq!(trace_ops(&mut rx), vec!["cmd", "reply"]);
}

#[tokio::test]
async fn materializes_the_hash_scenario() {
    let (tracer, mut rx) = tracer();
    let mut conn = ScriptConn::new([
        Ok(Reply::Simple("hash".into())),
        Ok(Reply::Int(-1)),
        Ok(scan_reply("0", &["name", "a", "age", "30"])),
    ]);
    let limits = Limits {
        scan_count: 10,
        row_limit: 1000,
    };

    let value = materialize(&mut conn, &tracer, &limits, "user:1", "")
        .await
        .unwrap();

    assert_eq!(value.key, "user:1");
    assert_eq!(value.kind, KeyKind::Hash);
    assert_eq!(value.ttl, -1);
    assert_eq!(
        value.value,
        ValuePayload::Map(BTreeMap::from([
            ("name".to_string(), "a".to_string()),
            ("age".to_string(), "30".to_string()),
        ]))
    );
    assert_eq!(
        conn.issued,
        vec!["TYPE user:1", "TTL user:1", "HSCAN user:1 0 MATCH * COUNT 10"]
    );
    // Each command's issue trace precedes its reply trace.
    assert_eq!(
        trace_ops(&mut rx),
        vec!["cmd", "reply", "cmd", "reply", "cmd", "reply"]
    );
}

#[tokio::test]
async fn odd_paired_page_is_a_protocol_error() {
    let (tracer, _keep) = tracer();
    let mut conn = ScriptConn::new([
        Ok(Reply::Simple("hash".into())),
        Ok(Reply::Int(-1)),
        Ok(scan_reply("0", &["name", "a", "age"])),
    ]);

    let err = materialize(&mut conn, &tracer, &Limits::default(), "user:1", "")
        .await
        .unwrap_err();

    assert_eq!(err.code(), "protocol");
}

#[tokio::test]
async fn set_members_deduplicate_across_pages() {
    let (tracer, _keep) = tracer();
    let mut conn = ScriptConn::new([
        Ok(Reply::Simple("set".into())),
        Ok(Reply::Int(-1)),
        Ok(scan_reply("7", &["a", "b"])),
        Ok(scan_reply("0", &["b", "c"])),
    ]);

    let value = materialize(&mut conn, &tracer, &Limits::default(), "tags", "")
        .await
        .unwrap();

    assert_eq!(
        value.value,
        ValuePayload::Members(BTreeSet::from([
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]))
    );
}

#[tokio::test]
async fn sorted_sets_fold_members_with_their_scores() {
    let store = MemoryStore::new();
    store.insert_sorted("board", [("alice", "12"), ("bob", "7")]);
    let (tracer, _keep) = tracer();

    let mut conn = store.clone();
    let value = materialize(&mut conn, &tracer, &Limits::default(), "board", "")
        .await
        .unwrap();

    assert_eq!(value.kind, KeyKind::SortedSet);
    assert_eq!(
        value.value,
        ValuePayload::Map(BTreeMap::from([
            ("alice".to_string(), "12".to_string()),
            ("bob".to_string(), "7".to_string()),
        ]))
    );
}

#[tokio::test]
async fn list_reads_are_bounded_by_the_row_limit() {
    let store = MemoryStore::new();
    store.insert_list("big", (0..10).map(|i| format!("row-{i:02}")));
    let (tracer, _keep) = tracer();
    let limits = Limits {
        scan_count: 500,
        row_limit: 3,
    };

    let mut conn = store.clone();
    let value = materialize(&mut conn, &tracer, &limits, "big", "")
        .await
        .unwrap();

    assert_eq!(
        value.value,
        ValuePayload::Rows(vec![
            "row-00".to_string(),
            "row-01".to_string(),
            "row-02".to_string(),
        ])
    );
}

#[tokio::test]
async fn full_scan_terminates_and_sees_each_member_once() {
    let store = MemoryStore::new();
    store.insert_set("tags", ["a", "b", "c", "d", "e"]);
    let (tracer, _keep) = tracer();
    let limits = Limits {
        scan_count: 2,
        row_limit: 1000,
    };

    let mut conn = store.clone();
    let members = full_scan(&mut conn, &tracer, &limits, ScanKind::Set, "tags", "")
        .await
        .unwrap();

    assert_eq!(members, vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn member_scans_require_a_key() {
    let (tracer, _keep) = tracer();
    let mut conn = ScriptConn::new([]);

    let err = scan_page(
        &mut conn,
        &tracer,
        &Limits::default(),
        ScanKind::Set,
        "",
        "*",
        0,
    )
    .await
    .unwrap_err();

    assert_eq!(err.code(), "validation");
    assert!(conn.issued.is_empty());
}

#[tokio::test]
async fn field_filters_reach_the_member_scan() {
    let (tracer, _keep) = tracer();
    let mut conn = ScriptConn::new([
        Ok(Reply::Simple("set".into())),
        Ok(Reply::Int(-1)),
        Ok(scan_reply("0", &["name:a"])),
    ]);
    let limits = Limits {
        scan_count: 10,
        row_limit: 1000,
    };

    materialize(&mut conn, &tracer, &limits, "tags", "name")
        .await
        .unwrap();

    assert_eq!(conn.issued[2], "SSCAN tags 0 MATCH name* COUNT 10");
}

#[tokio::test]
async fn scan_keys_pages_through_the_namespace() {
    let store = MemoryStore::new();
    for key in ["user:1", "user:2", "user:3"] {
        store.insert_text(key, "v");
    }
    let (tracer, _keep) = tracer();
    let limits = Limits {
        scan_count: 2,
        row_limit: 1000,
    };

    let mut conn = store.clone();
    let req = Request::new(OP_SCAN_KEYS, json!({"pattern": "user"}));
    let first = dispatch(&req, &mut conn, &tracer, &limits).await.unwrap();
    let cursor = first["cursor"].as_u64().unwrap();
    assert_ne!(cursor, 0);
    assert_eq!(first["keys"], json!(["user:1", "user:2"]));

    let req = Request::new(OP_SCAN_KEYS, json!({"pattern": "user", "cursor": cursor}));
    let second = dispatch(&req, &mut conn, &tracer, &limits).await.unwrap();
    assert_eq!(second["cursor"], json!(0));
    assert_eq!(second["keys"], json!(["user:3"]));
}

#[tokio::test]
async fn set_ttl_reports_the_store_result() {
    let (tracer, _keep) = tracer();
    let mut conn = ScriptConn::new([Ok(Reply::Int(1))]);

    let req = Request::new(OP_SET_TTL, json!({"key": "user:1", "ttl": 300}));
    let result = dispatch(&req, &mut conn, &tracer, &Limits::default())
        .await
        .unwrap();

    assert_eq!(result, json!(1));
    assert_eq!(conn.issued, vec!["EXPIRE user:1 300"]);
}

#[tokio::test]
async fn key_type_reports_none_for_missing_keys() {
    let (tracer, _keep) = tracer();
    let mut conn = ScriptConn::new([Ok(Reply::Simple("none".into()))]);

    let req = Request::new(OP_KEY_TYPE, json!({"key": "ghost"}));
    let result = dispatch(&req, &mut conn, &tracer, &Limits::default())
        .await
        .unwrap();

    assert_eq!(result, json!("none"));
}

#[tokio::test]
async fn rename_surfaces_store_rejections() {
    let (tracer, mut rx) = tracer();
    let mut conn = ScriptConn::new([Err(StoreError::Command("ERR no such key".into()))]);

    let req = Request::new(OP_RENAME, json!({"key": "old", "new_key": "new"}));
    let err = dispatch(&req, &mut conn, &tracer, &Limits::default())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "store");
    assert_eq!(trace_ops(&mut rx), vec!["cmd", "cmdError"]);

    let message = error_message(&err);
    assert_eq!(message.operation, "error");
    assert_eq!(message.data["code"], json!("store"));
    assert!(message.data["message"]
        .as_str()
        .unwrap()
        .contains("ERR no such key"));
}

#[tokio::test]
async fn get_key_rejects_empty_keys_before_store_access() {
    let (tracer, _keep) = tracer();
    let mut conn = ScriptConn::new([]);

    let req = Request::new(OP_GET_KEY, json!({"key": ""}));
    let err = dispatch(&req, &mut conn, &tracer, &Limits::default())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "validation");
    assert!(conn.issued.is_empty());
}

#[tokio::test]
async fn unknown_operations_fail_validation() {
    let (tracer, _keep) = tracer();
    let mut conn = ScriptConn::new([]);

    let req = Request::new("DropEverything", json!({}));
    let err = dispatch(&req, &mut conn, &tracer, &Limits::default())
        .await
        .unwrap_err();

    assert_eq!(err.code(), "validation");
}
