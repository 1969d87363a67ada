//! # Server Configuration
//!
//! Process configuration, read once at startup and immutable thereafter.

use anyhow::Context;
use kvdash_console::Limits;
use kvdash_store::EndpointConfig;
use serde::Deserialize;

/// Top-level configuration for the console server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address for console clients.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Configured store endpoints, addressed by index in each request.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,
    /// Traversal limits consumed by the operation core.
    #[serde(default)]
    pub limits: Limits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen: default_listen(),
            endpoints: default_endpoints(),
            limits: Limits::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a JSON file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        let config: ServerConfig =
            serde_json::from_str(&text).with_context(|| format!("parsing config file {path}"))?;
        anyhow::ensure!(
            !config.endpoints.is_empty(),
            "config file {path} lists no store endpoints"
        );
        Ok(config)
    }
}

fn default_listen() -> String {
    "127.0.0.1:8090".to_string()
}

fn default_endpoints() -> Vec<EndpointConfig> {
    vec![EndpointConfig::redis("local", "127.0.0.1:6379")]
}
