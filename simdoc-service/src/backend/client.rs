//! Search backend API client implementation.

use std::sync::RwLock;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::responses::{
    HealthResponse, ResolveRequest, ResolveResponse, SearchRequest, SearchResponse,
};
use crate::config::BackendConfig;
use crate::error::{BackendError, ServiceError, ServiceResult};

/// Search backend API client.
///
/// One instance is created at startup and shared by every tool call. At
/// most `max_connections` requests are in flight at once; callers beyond
/// that wait for a permit. [`BackendClient::close`] drops the pooled
/// connections once in-flight requests finish. No request is ever retried.
pub struct BackendClient {
    http: RwLock<Option<Client>>,
    base_url: String,
    permits: Semaphore,
}

impl BackendClient {
    /// Create a new backend client
    pub fn new(config: &BackendConfig) -> ServiceResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(config.max_idle_connections)
            .user_agent(concat!("simdoc-service/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ServiceError::Backend(BackendError::Transport {
                    url: base_url.clone(),
                    source: e,
                })
            })?;

        Ok(Self {
            http: RwLock::new(Some(client)),
            base_url,
            permits: Semaphore::new(config.max_connections.max(1)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check backend health status
    pub async fn check_health(&self) -> Result<HealthResponse, BackendError> {
        let url = self.url("/api/v1/health");
        self.send_json(&url, |client| client.get(&url)).await
    }

    /// Resolve a simulator name to candidate identifiers
    pub async fn resolve(&self, name: &str) -> Result<ResolveResponse, BackendError> {
        let url = self.url("/api/v1/resolve");
        let body = ResolveRequest { name };

        self.send_json(&url, |client| client.post(&url).json(&body))
            .await
            .inspect_err(|e| {
                warn!(name = %name, error = %e, "Resolve request failed");
            })
    }

    /// Search code snippets for a simulator
    pub async fn search_snippets(
        &self,
        simulator_id: &str,
        topic: Option<&str>,
        max_tokens: u64,
        max_results: u32,
    ) -> Result<SearchResponse, BackendError> {
        let url = self.url("/api/v1/search");
        let body = SearchRequest {
            simulator_id,
            topic,
            max_tokens,
            max_results,
        };

        self.send_json(&url, |client| client.post(&url).json(&body))
            .await
            .inspect_err(|e| {
                warn!(simulator_id = %simulator_id, error = %e, "Search request failed");
            })
    }

    /// Stop accepting requests and release the connection pool. Safe to
    /// call repeatedly, and before any request has been made.
    pub fn close(&self) {
        if !self.is_closed() {
            debug!(base_url = %self.base_url, "Closing backend client");
            self.permits.close();
        }
        if let Ok(mut http) = self.http.write() {
            http.take();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        url: &str,
        build: impl FnOnce(&Client) -> RequestBuilder,
    ) -> Result<T, BackendError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| BackendError::Closed)?;

        // Clone out of the lock; the handle shares the pool
        let client = self
            .http
            .read()
            .ok()
            .and_then(|http| http.clone())
            .ok_or(BackendError::Closed)?;
        let request = build(&client);

        debug!(url = %url, "Sending backend request");

        let response = request
            .send()
            .await
            .map_err(|e| BackendError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(BackendError::Upstream {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response.json().await.map_err(|e| {
            if e.is_decode() {
                BackendError::InvalidResponse {
                    url: url.to_string(),
                    source: e,
                }
            } else {
                BackendError::Transport {
                    url: url.to_string(),
                    source: e,
                }
            }
        })
    }
}
