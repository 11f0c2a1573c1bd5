//! Wire types for the search backend API.
//!
//! Every field the backend may omit is optional here. Conversion into the
//! entities in [`crate::models`] happens in this module and nowhere else.

use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::models::{ResolutionResult, SimulatorCandidate, Snippet, SnippetBatch, SnippetQuery};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub simulators_available: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HealthResponse {
    /// Simulator names for logging, tolerating non-string entries
    pub fn simulator_names(&self) -> Vec<String> {
        self.simulators_available
            .iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ResolveRequest<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResolveResponse {
    #[serde(default)]
    pub matches: Option<Vec<SimulatorMatch>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorMatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub trust_score: Option<f64>,
    #[serde(default)]
    pub versions: Option<Vec<String>>,
    #[serde(default)]
    pub default_version: Option<String>,
}

impl ResolveResponse {
    /// Convert to a resolution result, keeping the backend's order.
    ///
    /// A match without an `id` cannot be used for retrieval, so it fails the
    /// whole response rather than being dropped silently.
    pub fn into_resolution(self, query: &str) -> Result<ResolutionResult, BackendError> {
        let matches = self
            .matches
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, m)| SimulatorCandidate::try_from(m).map_err(|e| annotate(e, i)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolutionResult {
            query: query.to_string(),
            matches,
        })
    }
}

fn annotate(err: BackendError, index: usize) -> BackendError {
    match err {
        BackendError::Malformed { message } => BackendError::Malformed {
            message: format!("match {}: {}", index, message),
        },
        other => other,
    }
}

impl TryFrom<SimulatorMatch> for SimulatorCandidate {
    type Error = BackendError;

    fn try_from(m: SimulatorMatch) -> Result<Self, Self::Error> {
        let id = m
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| BackendError::Malformed {
                message: "missing simulator id".to_string(),
            })?;

        Ok(SimulatorCandidate {
            name: m.name.unwrap_or_else(|| id.clone()),
            id,
            description: m.description,
            trust_score: m.trust_score,
            versions: m.versions.unwrap_or_default(),
            default_version: m.default_version,
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchRequest<'a> {
    pub simulator_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<&'a str>,
    pub max_tokens: u64,
    pub max_results: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub snippets: Option<Vec<SnippetRecord>>,
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnippetRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl From<SnippetRecord> for Snippet {
    fn from(r: SnippetRecord) -> Self {
        Snippet {
            title: r.title,
            source_url: r.source_url,
            description: r.description,
            summary: r.summary,
            relevance_score: r.relevance_score,
            language: r.language,
            code: r.code,
        }
    }
}

impl SearchResponse {
    /// Convert to a batch without re-ranking, re-filtering or truncating
    pub fn into_batch(self, query: SnippetQuery) -> SnippetBatch {
        SnippetBatch {
            query,
            query_echo: self.query,
            snippets: self
                .snippets
                .unwrap_or_default()
                .into_iter()
                .map(Snippet::from)
                .collect(),
            total_tokens: self.total_tokens,
        }
    }
}
