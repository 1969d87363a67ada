//! # Endpoint Registry
//!
//! Purpose: Map the request's (server, db) selector to a configured store
//! and hand out one fresh connection per operation.
//!
//! ## Design Principles
//!
//! 1. **Acquire Per Operation**: every operation gets its own connection;
//!    release is the connection's `Drop`, so no exit path can leak one.
//! 2. **Pluggable Backends**: an endpoint is either a TCP store or a shared
//!    in-process store for demos and tests.
//! 3. **Immutable After Startup**: the endpoint list is fixed once built.

use serde::Deserialize;

use crate::conn::{RespConn, StoreHandle};
use crate::error::{StoreError, StoreResult};
use crate::memory::MemoryStore;

/// Backend flavor of one configured endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// RESP2 store reached over TCP.
    Redis,
    /// Shared in-process store.
    Memory,
}

/// One configured store endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    /// Display name shown by the UI.
    pub name: String,
    /// Backend flavor.
    #[serde(default = "default_kind")]
    pub kind: EndpointKind,
    /// TCP address for `redis` endpoints, e.g. `127.0.0.1:6379`.
    #[serde(default)]
    pub addr: String,
    /// Optional AUTH password.
    #[serde(default)]
    pub password: Option<String>,
    /// Number of selectable databases.
    #[serde(default = "default_databases")]
    pub databases: u32,
}

impl EndpointConfig {
    /// A TCP endpoint with the default database span.
    pub fn redis(name: impl Into<String>, addr: impl Into<String>) -> Self {
        EndpointConfig {
            name: name.into(),
            kind: EndpointKind::Redis,
            addr: addr.into(),
            password: None,
            databases: default_databases(),
        }
    }

    /// An in-process endpoint for demos and tests.
    pub fn memory(name: impl Into<String>) -> Self {
        EndpointConfig {
            name: name.into(),
            kind: EndpointKind::Memory,
            addr: String::new(),
            password: None,
            databases: 1,
        }
    }
}

fn default_kind() -> EndpointKind {
    EndpointKind::Redis
}

fn default_databases() -> u32 {
    16
}

/// Maps request selectors to endpoints and hands out connections.
pub struct Registry {
    endpoints: Vec<EndpointConfig>,
    memory: Vec<Option<MemoryStore>>,
}

impl Registry {
    /// Builds a registry; each `memory` endpoint gets one shared store.
    pub fn new(endpoints: Vec<EndpointConfig>) -> Self {
        let memory = endpoints
            .iter()
            .map(|endpoint| (endpoint.kind == EndpointKind::Memory).then(MemoryStore::new))
            .collect();
        Registry { endpoints, memory }
    }

    /// The endpoint at a selector, if one is configured.
    pub fn endpoint(&self, server: usize) -> Option<&EndpointConfig> {
        self.endpoints.get(server)
    }

    /// The shared store behind a `memory` endpoint, for seeding.
    pub fn memory_store(&self, server: usize) -> Option<&MemoryStore> {
        self.memory.get(server)?.as_ref()
    }

    /// Opens a fresh connection for one operation.
    pub async fn acquire(&self, server: usize, db: u32) -> StoreResult<StoreHandle> {
        let endpoint = self
            .endpoints
            .get(server)
            .ok_or(StoreError::Endpoint(server))?;
        match endpoint.kind {
            EndpointKind::Redis => {
                let conn =
                    RespConn::connect(&endpoint.addr, endpoint.password.as_deref(), db).await?;
                Ok(StoreHandle::Resp(conn))
            }
            EndpointKind::Memory => {
                let store = self.memory[server]
                    .clone()
                    .ok_or(StoreError::Endpoint(server))?;
                Ok(StoreHandle::Memory(store))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conn::StoreConn;
    use crate::reply::Reply;

    #[test]
    fn parses_endpoint_config() {
        let raw = r#"{"name": "staging", "addr": "10.0.0.5:6379", "password": "s3cret"}"#;
        let endpoint: EndpointConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(endpoint.kind, EndpointKind::Redis);
        assert_eq!(endpoint.databases, 16);
        assert_eq!(endpoint.password.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn memory_endpoints_share_one_store() {
        let registry = Registry::new(vec![EndpointConfig::memory("demo")]);
        registry.memory_store(0).unwrap().insert_text("k", "v");

        let mut conn = registry.acquire(0, 0).await.unwrap();
        let reply = conn.command(&["GET", "k"]).await.unwrap();
        assert_eq!(reply, Reply::Bulk("v".into()));
    }

    #[tokio::test]
    async fn unknown_selector_is_an_error() {
        let registry = Registry::new(vec![EndpointConfig::memory("demo")]);
        let err = registry.acquire(3, 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Endpoint(3)));
    }
}
