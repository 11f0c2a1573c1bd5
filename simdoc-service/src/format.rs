//! Text rendering of resolution and retrieval results for agents.
//!
//! Output is deterministic for a given input so it can be diffed and
//! asserted on byte for byte.

use crate::models::{ResolutionResult, SimulatorCandidate, Snippet, SnippetBatch};

const NOT_AVAILABLE: &str = "N/A";

/// Render the candidates found for a simulator name
pub fn format_resolution(result: &ResolutionResult) -> String {
    if result.is_empty() {
        return format!("No simulators found matching '{}'", result.query);
    }

    let mut output = vec![format!(
        "Found {} simulator(s) matching '{}':",
        result.matches.len(),
        result.query
    )];

    for candidate in &result.matches {
        output.push(String::new());
        output.push(candidate.format_block());
    }

    output.join("\n")
}

impl SimulatorCandidate {
    /// Render this candidate as a multi-line block
    pub fn format_block(&self) -> String {
        let trust = self
            .trust_score
            .map(format_score)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let versions = if self.versions.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            self.versions.join(", ")
        };

        [
            format!("**{}** (ID: `{}`)", self.name, self.id),
            format!(
                "  Description: {}",
                self.description.as_deref().unwrap_or(NOT_AVAILABLE)
            ),
            format!("  Trust Score: {}/10", trust),
            format!("  Versions: {}", versions),
            format!(
                "  Default Version: {}",
                self.default_version.as_deref().unwrap_or(NOT_AVAILABLE)
            ),
        ]
        .join("\n")
    }
}

/// Integral scores print without a fractional part (`9`, not `9.0`)
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.is_finite() {
        format!("{:.0}", score)
    } else {
        score.to_string()
    }
}

/// Render a snippet batch with provenance and the declared token total
pub fn format_snippets(batch: &SnippetBatch) -> String {
    let simulator_id = &batch.query.simulator_id;
    let topic = batch.query.topic.as_deref();

    if batch.is_empty() {
        let mut line = format!("No documentation found for '{}'", simulator_id);
        if let Some(topic) = topic {
            line.push_str(&format!(" with topic '{}'", topic));
        }
        return line;
    }

    let query_echo = batch
        .query_echo
        .as_deref()
        .or(topic)
        .unwrap_or("general documentation");

    let mut output = vec![
        format!(
            "Found {} code example(s) for **{}**",
            batch.snippets.len(),
            simulator_id
        ),
        format!("Query: {}", query_echo),
    ];

    for (i, snippet) in batch.snippets.iter().enumerate() {
        output.push(String::new());
        output.push(snippet.format_for_context(i + 1));
    }

    output.push(String::new());
    output.push(format!(
        "**Total tokens:** ~{}",
        batch.total_tokens.unwrap_or(0)
    ));

    output.join("\n")
}

impl Snippet {
    /// Format as a numbered example section
    pub fn format_for_context(&self, ordinal: usize) -> String {
        let mut parts = vec![
            format!(
                "## Example {}: {}",
                ordinal,
                self.title.as_deref().unwrap_or("Untitled")
            ),
            format!(
                "**Source:** {}",
                self.source_url.as_deref().unwrap_or(NOT_AVAILABLE)
            ),
            format!(
                "**Description:** {}",
                self.description.as_deref().unwrap_or(NOT_AVAILABLE)
            ),
        ];

        if let Some(summary) = self.summary.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("**Summary:** {}", summary));
        }

        parts.push(format!("**Relevance:** {:.2}", self.relevance_score()));
        parts.push(String::new());
        parts.push(format!("```{}", self.language()));
        parts.push(self.code().to_string());
        parts.push("```".to_string());

        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SnippetQuery;

    fn cantera() -> SimulatorCandidate {
        SimulatorCandidate {
            id: "cantera/cantera".to_string(),
            name: "Cantera".to_string(),
            description: None,
            trust_score: Some(9.0),
            versions: vec!["3.0".to_string(), "2.6".to_string()],
            default_version: Some("3.0".to_string()),
        }
    }

    fn batch(topic: Option<&str>, snippets: Vec<Snippet>) -> SnippetBatch {
        SnippetBatch {
            query: SnippetQuery::new("cantera/cantera", topic, 5000),
            query_echo: None,
            snippets,
            total_tokens: None,
        }
    }

    #[test]
    fn test_resolution_end_to_end_text() {
        let result = ResolutionResult {
            query: "cantera".to_string(),
            matches: vec![cantera()],
        };
        let text = format_resolution(&result);

        assert!(text.contains("Found 1 simulator(s) matching 'cantera'"));
        assert!(text.contains("**Cantera** (ID: `cantera/cantera`)"));
        assert!(text.contains("Description: N/A"));
        assert!(text.contains("Trust Score: 9/10"));
        assert!(text.contains("Versions: 3.0, 2.6"));
        assert!(text.contains("Default Version: 3.0"));
    }

    #[test]
    fn test_resolution_no_matches() {
        let result = ResolutionResult {
            query: "warp drive".to_string(),
            matches: vec![],
        };
        assert_eq!(
            format_resolution(&result),
            "No simulators found matching 'warp drive'"
        );
    }

    #[test]
    fn test_resolution_blocks_keep_order() {
        let mut second = cantera();
        second.id = "pybamm/PyBaMM".to_string();
        second.name = "PyBaMM".to_string();
        second.trust_score = Some(8.5);
        second.versions.clear();
        second.default_version = None;

        let result = ResolutionResult {
            query: "sim".to_string(),
            matches: vec![cantera(), second],
        };
        let text = format_resolution(&result);

        assert_eq!(text.matches("(ID: `").count(), 2);
        let first_pos = text.find("**Cantera**").unwrap();
        let second_pos = text.find("**PyBaMM**").unwrap();
        assert!(first_pos < second_pos);
        assert!(text.contains("Trust Score: 8.5/10"));
        assert!(text.contains("Versions: N/A"));
        assert!(text.contains("Default Version: N/A"));
    }

    #[test]
    fn test_missing_trust_score() {
        let mut candidate = cantera();
        candidate.trust_score = None;
        assert!(candidate.format_block().contains("Trust Score: N/A/10"));
    }

    #[test]
    fn test_empty_snippets_mentions_id_and_topic() {
        let text = format_snippets(&batch(Some("flame"), vec![]));
        assert_eq!(
            text,
            "No documentation found for 'cantera/cantera' with topic 'flame'"
        );

        let text = format_snippets(&batch(None, vec![]));
        assert_eq!(text, "No documentation found for 'cantera/cantera'");
    }

    #[test]
    fn test_snippet_defaults_rendered() {
        let text = format_snippets(&batch(None, vec![Snippet::default()]));

        assert!(text.contains("Found 1 code example(s) for **cantera/cantera**"));
        assert!(text.contains("Query: general documentation"));
        assert!(text.contains("## Example 1: Untitled"));
        assert!(text.contains("**Source:** N/A"));
        assert!(text.contains("**Description:** N/A"));
        assert!(text.contains("**Relevance:** 0.00"));
        assert!(text.contains("```python\n\n```"));
        assert!(!text.contains("Summary:"));
        assert!(text.ends_with("**Total tokens:** ~0"));
    }

    #[test]
    fn test_full_snippet_layout() {
        let snippet = Snippet {
            title: Some("Freely propagating flame".to_string()),
            source_url: Some("https://cantera.org/flame".to_string()),
            description: Some("Methane/air flame speed".to_string()),
            summary: Some("Solves a 1D flame".to_string()),
            relevance_score: Some(0.876),
            language: Some("py".to_string()),
            code: Some("import cantera as ct".to_string()),
        };
        let mut b = batch(Some("flame"), vec![snippet]);
        b.total_tokens = Some(321);

        let expected = "\
Found 1 code example(s) for **cantera/cantera**
Query: flame

## Example 1: Freely propagating flame
**Source:** https://cantera.org/flame
**Description:** Methane/air flame speed
**Summary:** Solves a 1D flame
**Relevance:** 0.88

```py
import cantera as ct
```

**Total tokens:** ~321";
        assert_eq!(format_snippets(&b), expected);
    }

    #[test]
    fn test_query_echo_preferred_over_topic() {
        let mut b = batch(Some("flame"), vec![Snippet::default()]);
        b.query_echo = Some("flame speed calculation".to_string());
        assert!(format_snippets(&b).contains("Query: flame speed calculation"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let result = ResolutionResult {
            query: "cantera".to_string(),
            matches: vec![cantera(), cantera()],
        };
        assert_eq!(format_resolution(&result), format_resolution(&result));

        let b = batch(Some("flame"), vec![Snippet::default(), Snippet::default()]);
        assert_eq!(format_snippets(&b), format_snippets(&b));
    }
}
