//! Service configuration.
//!
//! Everything here is read once at startup; changing a value requires a
//! restart.

mod loader;

use serde::Deserialize;
use std::time::Duration;
use strum::{Display, EnumString};

pub use loader::{LegacyEnv, load_config};

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub mcp: McpConfig,
}

/// Search backend connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on in-flight requests to the backend
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Idle keep-alive connections retained in the pool
    #[serde(default = "default_max_idle_connections")]
    pub max_idle_connections: usize,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_timeout_secs(),
            max_connections: default_max_connections(),
            max_idle_connections: default_max_idle_connections(),
        }
    }
}

/// HTTP listener configuration (SSE transport only)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// MCP transport selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Long-lived event stream plus a POST endpoint per session
    #[default]
    Sse,
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
}

/// MCP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct McpConfig {
    #[serde(default)]
    pub transport: Transport,

    /// Path the SSE endpoints are nested under
    #[serde(default = "default_mcp_path")]
    pub path: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            path: default_mcp_path(),
        }
    }
}

// ==================== Default Value Functions ====================

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_connections() -> usize {
    10
}

fn default_max_idle_connections() -> usize {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_mcp_path() -> String {
    "/".to_string()
}
