//! External (web) similarity pipeline.
//!
//! [`try_rank_external`] builds a query from the target snippet, asks a
//! [`WebSearch`] collaborator for raw results and synthesizes candidates
//! from them. [`rank_external`] wraps it and never fails: any error is
//! logged and an empty list is returned.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::models::{ScoredCandidate, Snippet};
use crate::query::{build_search_query, DEFAULT_MAX_KEYWORDS};
use crate::synth::synthesize;

/// Sites searched when no allow-list is configured.
pub const DEFAULT_SITE_ALLOW_LIST: &[&str] = &[
    "github.com",
    "stackoverflow.com",
    "developer.mozilla.org",
    "codepen.io",
];

/// Default number of results requested.
pub const DEFAULT_RESULT_COUNT: usize = 5;

/// Parameters passed to the search collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub result_count: usize,
    pub site_allow_list: Vec<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            result_count: DEFAULT_RESULT_COUNT,
            site_allow_list: DEFAULT_SITE_ALLOW_LIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Web search backend.
///
/// Returns the raw result items. Each item is expected to be an object with
/// `title`, `link` and optionally `snippet`; malformed items are tolerated
/// and skipped downstream.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Value>>;
}

/// Options for the whole external pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSearchOptions {
    pub search: SearchOptions,
    pub max_keywords: usize,
}

impl Default for ExternalSearchOptions {
    fn default() -> Self {
        Self {
            search: SearchOptions::default(),
            max_keywords: DEFAULT_MAX_KEYWORDS,
        }
    }
}

/// Query, search and synthesize. Errors from the collaborator propagate.
pub async fn try_rank_external(
    target: &Snippet,
    search: &dyn WebSearch,
    options: &ExternalSearchOptions,
) -> Result<Vec<ScoredCandidate>> {
    let query = build_search_query(target, options.max_keywords);
    tracing::debug!(snippet = %target.id, query = %query, "searching the web");

    let results = search.search(&query.render(), &options.search).await?;
    tracing::debug!(count = results.len(), "search returned results");

    Ok(synthesize(target, &results))
}

/// Like [`try_rank_external`], but failures yield an empty list.
pub async fn rank_external(
    target: &Snippet,
    search: &dyn WebSearch,
    options: &ExternalSearchOptions,
) -> Vec<ScoredCandidate> {
    match try_rank_external(target, search, options).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!(snippet = %target.id, error = %e, "external search failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use serde_json::json;
    use std::sync::Mutex;

    struct FailingSearch;

    #[async_trait]
    impl WebSearch for FailingSearch {
        async fn search(&self, _query: &str, _options: &SearchOptions) -> Result<Vec<Value>> {
            bail!("network unreachable")
        }
    }

    #[derive(Default)]
    struct RecordingSearch {
        queries: Mutex<Vec<(String, SearchOptions)>>,
        results: Vec<Value>,
    }

    #[async_trait]
    impl WebSearch for RecordingSearch {
        async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Value>> {
            self.queries
                .lock()
                .unwrap()
                .push((query.to_string(), options.clone()));
            Ok(self.results.clone())
        }
    }

    fn target() -> Snippet {
        Snippet {
            id: "t".to_string(),
            title: "Counter".to_string(),
            code: "const [count, setCount] = useState(0);".to_string(),
            language: "javascript".to_string(),
            description: String::new(),
            tags: vec!["react".to_string()],
            ai_tags: Vec::new(),
            explanation: String::new(),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_failing_search_yields_empty() {
        let out = rank_external(&target(), &FailingSearch, &ExternalSearchOptions::default()).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_try_rank_propagates_failure() {
        let result =
            try_rank_external(&target(), &FailingSearch, &ExternalSearchOptions::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_results_become_web_candidates_in_order() {
        let search = RecordingSearch {
            results: vec![
                json!({"title": "Counter hook", "link": "https://github.com/a/b", "snippet": "react hook"}),
                json!({"title": "useState guide", "link": "https://codepen.io/x"}),
            ],
            ..Default::default()
        };
        let options = ExternalSearchOptions {
            max_keywords: 1,
            ..Default::default()
        };

        let out = rank_external(&target(), &search, &options).await;
        let ids: Vec<&str> = out.iter().map(|c| c.snippet.id.as_str()).collect();
        assert_eq!(ids, vec!["web_0", "web_1"]);
        assert!(out.iter().all(|c| c.from_web && c.source.is_some()));
        assert!(out[0].snippet.code.starts_with("// React component from GitHub"));
        assert!(out[1].snippet.code.starts_with("// React component from CodePen"));

        let queries = search.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].0, "javascript code example React hooks react count");
        assert_eq!(queries[0].1, SearchOptions::default());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_full_page_ranks_in_place_on_single_thread() {
        let mut results: Vec<Value> = (0..10)
            .map(|i| json!({"title": format!("Counter hook {}", i), "link": "https://github.com/a/b"}))
            .collect();
        results[3] = json!({"title": "no link"});
        let search = RecordingSearch {
            results,
            ..Default::default()
        };

        let out = try_rank_external(&target(), &search, &ExternalSearchOptions::default())
            .await
            .unwrap();
        let ids: Vec<&str> = out.iter().map(|c| c.snippet.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["web_0", "web_1", "web_2", "web_4", "web_5", "web_6", "web_7", "web_8", "web_9"]
        );
        assert!(out[0].similarity_score >= out[8].similarity_score);
    }

    #[tokio::test]
    async fn test_empty_results() {
        let search = RecordingSearch::default();
        let out = rank_external(&target(), &search, &ExternalSearchOptions::default()).await;
        assert!(out.is_empty());
    }
}
