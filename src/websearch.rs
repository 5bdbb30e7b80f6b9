//! Web search collaborator for clinical questions the corpus cannot answer.
//!
//! The client talks to a Tavily-compatible search API and deliberately never
//! surfaces an error: any failure (no key, network, bad status, malformed
//! body) collapses into [`WebSearchOutcome::Unavailable`], which the tool
//! layer turns into an observation the model can reason about.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default search endpoint.
const SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";
/// Maximum results returned per query.
const MAX_RESULTS: usize = 3;
/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// One web search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchResult {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Content snippet.
    pub snippet: String,
}

/// Outcome of a search. Search is degradable, not fallible.
#[derive(Debug, Clone)]
pub enum WebSearchOutcome {
    /// The query produced results (possibly zero).
    Results(Vec<WebSearchResult>),
    /// Search could not run; the string explains why in model-readable form.
    Unavailable(String),
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: String,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawResult>,
}

#[derive(Deserialize)]
struct RawResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Client for the web search API.
#[derive(Debug, Clone)]
pub struct WebSearchClient {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl WebSearchClient {
    /// Creates a client. With `api_key` set to `None` every search reports
    /// itself unavailable.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_endpoint(api_key, SEARCH_ENDPOINT)
    }

    /// Creates a client against a specific endpoint.
    #[must_use]
    pub fn with_endpoint(api_key: Option<String>, endpoint: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key,
            endpoint: endpoint.into(),
        }
    }

    /// Whether a search key is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Runs a medically scoped search for the raw query.
    ///
    /// The query is wrapped with domain guidance so general-purpose search
    /// engines surface clinical sources. Results are capped at
    /// [`MAX_RESULTS`].
    pub async fn search(&self, query: &str) -> WebSearchOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            return WebSearchOutcome::Unavailable(
                "web search is not configured on this deployment".to_string(),
            );
        };

        let enhanced = format!("medical nephrology {query} guidelines");
        let body = SearchRequest {
            api_key,
            query: enhanced,
            max_results: MAX_RESULTS,
            search_depth: "basic",
        };

        let response = match self.http.post(&self.endpoint).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "web search request failed");
                return WebSearchOutcome::Unavailable(format!(
                    "web search request failed: {e}"
                ));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "web search returned error status");
            return WebSearchOutcome::Unavailable(format!(
                "web search returned status {status}"
            ));
        }

        match response.json::<SearchResponse>().await {
            Ok(parsed) => {
                let results: Vec<WebSearchResult> = parsed
                    .results
                    .into_iter()
                    .take(MAX_RESULTS)
                    .map(|r| WebSearchResult {
                        title: r.title,
                        url: r.url,
                        snippet: r.content,
                    })
                    .collect();
                info!(query_len = query.len(), results = results.len(), "web search completed");
                WebSearchOutcome::Results(results)
            }
            Err(e) => {
                warn!(error = %e, "web search response could not be parsed");
                WebSearchOutcome::Unavailable(format!("web search response was malformed: {e}"))
            }
        }
    }
}

/// Formats an outcome as observation text for the model.
#[must_use]
pub fn format_outcome(outcome: &WebSearchOutcome) -> String {
    match outcome {
        WebSearchOutcome::Results(results) if results.is_empty() => {
            "Web search returned no results for this query.".to_string()
        }
        WebSearchOutcome::Results(results) => {
            let mut out = String::from("Web Search Results:\n");
            for (i, r) in results.iter().enumerate() {
                out.push_str(&format!(
                    "\n{}. {}\n   URL: {}\n   {}\n",
                    i + 1,
                    r.title,
                    r.url,
                    r.snippet
                ));
            }
            out
        }
        WebSearchOutcome::Unavailable(reason) => {
            format!("Web search unavailable: {reason}")
        }
    }
}
