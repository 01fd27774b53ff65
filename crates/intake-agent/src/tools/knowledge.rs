//! Knowledge-base lookup capability.

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use intake_core::config::KnowledgeConfig;

#[derive(Debug, Deserialize)]
struct RetrievalResult {
    #[serde(default)]
    content: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RetrievalResponse {
    #[serde(default)]
    results: Vec<RetrievalResult>,
}

/// Searches the university knowledge base for ranked snippets.
pub struct KnowledgeTool {
    client: reqwest::Client,
    config: KnowledgeConfig,
}

impl KnowledgeTool {
    pub fn new(config: KnowledgeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, config }
    }

    /// Run a query and render the results for the engine. Errors come back
    /// as `Error:`-prefixed strings rather than being raised; the engine
    /// treats tool output as opaque text either way.
    pub async fn retrieve(
        &self,
        query: &str,
        max_results: Option<usize>,
        min_score: Option<f64>,
    ) -> String {
        if query.trim().is_empty() {
            return "Error: a search query is required.".to_string();
        }
        if self.config.knowledge_base_id.is_empty() {
            return "Error: knowledge base is not configured.".to_string();
        }
        let max_results = max_results.unwrap_or(self.config.default_results);
        let min_score = min_score.unwrap_or(self.config.min_score);
        debug!(query, max_results, "knowledge base lookup");

        let url = format!("{}/retrieve", self.config.base_url.trim_end_matches('/'));
        let body = json!({
            "knowledge_base_id": self.config.knowledge_base_id,
            "query": query,
            "number_of_results": max_results,
        });
        let resp = match self.client.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => return format!("Error retrieving information: {}", e),
        };
        if !resp.status().is_success() {
            return format!("Error retrieving information: service returned {}", resp.status());
        }
        let parsed: RetrievalResponse = match resp.json().await {
            Ok(parsed) => parsed,
            Err(e) => return format!("Error retrieving information: {}", e),
        };
        let filtered: Vec<RetrievalResult> = parsed
            .results
            .into_iter()
            .filter(|r| r.score >= min_score)
            .collect();
        format_results(&filtered)
    }
}

fn format_results(results: &[RetrievalResult]) -> String {
    if results.is_empty() {
        return "No results found above score threshold.".to_string();
    }
    let mut out = format!("Retrieved {} results:\n", results.len());
    for (idx, result) in results.iter().enumerate() {
        out.push_str(&format!(
            "\nResult {}:\nScore: {:.4}\nSource: {}\nURL: {}\nContent: {}\n",
            idx + 1,
            result.score,
            result.source.as_deref().unwrap_or("Unknown"),
            result.url.as_deref().unwrap_or("N/A"),
            result.content,
        ));
    }
    out
}
