use std::sync::Arc;

use tracing::debug;

use crate::backend::BackendClient;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{SnippetBatch, SnippetQuery};

/// Fetches a bounded, ranked set of code snippets for a simulator.
///
/// The number of snippets requested is derived from the token budget at
/// roughly 500 tokens per snippet, between 1 and 10. The backend's ranking
/// and its `total_tokens` figure are passed through untouched.
pub struct SnippetRetriever {
    backend: Arc<BackendClient>,
}

impl SnippetRetriever {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    pub async fn get_docs(
        &self,
        simulator_id: &str,
        topic: Option<&str>,
        token_budget: u64,
    ) -> ServiceResult<SnippetBatch> {
        let simulator_id = simulator_id.trim();
        if simulator_id.is_empty() {
            return Err(ServiceError::invalid_request("simulator_id must not be empty"));
        }
        if token_budget == 0 {
            return Err(ServiceError::invalid_request("tokens must be a positive integer"));
        }

        let query = SnippetQuery::new(simulator_id, topic, token_budget);

        debug!(
            simulator_id = %query.simulator_id,
            topic = ?query.topic,
            token_budget = query.token_budget,
            result_cap = query.result_cap,
            "Searching snippets"
        );

        let response = self
            .backend
            .search_snippets(
                &query.simulator_id,
                query.topic.as_deref(),
                query.token_budget,
                query.result_cap,
            )
            .await?;

        let batch = response.into_batch(query);

        debug!(snippets = batch.snippets.len(), "Snippet search completed");

        Ok(batch)
    }
}
