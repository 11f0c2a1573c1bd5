//! Request-scoped entities produced by resolution and retrieval.
//!
//! These mirror what the search backend returned. Optional fields stay
//! optional here; defaults are applied by the accessors used for display.

/// Approximate token cost of one snippet, used to turn a budget into a count
pub const TOKENS_PER_SNIPPET: u64 = 500;

/// Upper bound on snippets requested regardless of budget
pub const MAX_RESULTS: u32 = 10;

/// Token budget used when the caller does not supply one
pub const DEFAULT_TOKEN_BUDGET: u64 = 5000;

const DEFAULT_LANGUAGE: &str = "python";

/// Snippet count ceiling for a token budget: `clamp(budget / 500, 1, 10)`
pub fn result_cap(token_budget: u64) -> u32 {
    let cap = (token_budget / TOKENS_PER_SNIPPET).clamp(1, u64::from(MAX_RESULTS));
    u32::try_from(cap).unwrap_or(MAX_RESULTS)
}

/// One candidate returned by name resolution
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorCandidate {
    /// Namespace/name identifier, e.g. `cantera/cantera`
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Quality signal in [0, 10]
    pub trust_score: Option<f64>,
    pub versions: Vec<String>,
    pub default_version: Option<String>,
}

/// Outcome of resolving a free-text simulator name.
///
/// `matches` keeps the backend's order; an empty list is a valid result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    pub query: String,
    pub matches: Vec<SimulatorCandidate>,
}

impl ResolutionResult {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Effective parameters of a snippet search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetQuery {
    pub simulator_id: String,
    /// `None` when the caller gave no topic or a blank one
    pub topic: Option<String>,
    pub token_budget: u64,
    pub result_cap: u32,
}

impl SnippetQuery {
    pub fn new(simulator_id: impl Into<String>, topic: Option<&str>, token_budget: u64) -> Self {
        let topic = topic
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            simulator_id: simulator_id.into(),
            topic,
            token_budget,
            result_cap: result_cap(token_budget),
        }
    }
}

/// One attributed code example
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snippet {
    pub title: Option<String>,
    pub source_url: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub relevance_score: Option<f64>,
    pub language: Option<String>,
    pub code: Option<String>,
}

impl Snippet {
    pub fn relevance_score(&self) -> f64 {
        self.relevance_score.unwrap_or(0.0)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }
}

/// Snippets returned for one query, best-first as ranked by the backend
#[derive(Debug, Clone, PartialEq)]
pub struct SnippetBatch {
    pub query: SnippetQuery,
    /// Backend's description of the query it actually ran
    pub query_echo: Option<String>,
    pub snippets: Vec<Snippet>,
    /// Token estimate as declared by the backend. Not checked against the
    /// snippet bodies.
    pub total_tokens: Option<u64>,
}

impl SnippetBatch {
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}
