use std::sync::Arc;

use tracing::debug;

use crate::backend::BackendClient;
use crate::error::{ServiceError, ServiceResult};
use crate::models::ResolutionResult;

/// Turns a free-text simulator name into ranked candidate identifiers.
///
/// Candidates are returned in the backend's order. Nothing is cached,
/// re-ranked or retried.
pub struct SimulatorResolver {
    backend: Arc<BackendClient>,
}

impl SimulatorResolver {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    pub async fn resolve_simulator(&self, name: &str) -> ServiceResult<ResolutionResult> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::invalid_request("simulator name must not be empty"));
        }

        let response = self.backend.resolve(name).await?;
        let result = response.into_resolution(name)?;

        debug!(name = %name, matches = result.matches.len(), "Resolved simulator name");

        Ok(result)
    }
}
