//! Web search backends.
//!
//! Implementations of [`WebSearch`] selected by `[search].provider`:
//!
//! - **[`DisabledSearch`]**: always fails, so similar-snippet requests fall
//!   back to local results.
//! - **[`GoogleSearch`]**: Google Custom Search JSON API with retry and
//!   backoff.
//! - **[`FixtureSearch`]**: serves results from a JSON file, for demos and
//!   tests.
//!
//! # Retry Strategy
//!
//! The Google backend retries transient errors with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (other) → fail immediately
//! - Network errors (including timeouts) → retry

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use snipai_core::external::{SearchOptions, WebSearch};

use crate::config::SearchConfig;

/// Build the search backend named by `config.provider`.
///
/// Credentials for the Google backend are read from the environment here,
/// so a misconfigured server fails at startup rather than per request.
pub fn create_search(config: &SearchConfig) -> Result<Arc<dyn WebSearch>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledSearch)),
        "google" => Ok(Arc::new(GoogleSearch::from_config(config)?)),
        "fixture" => {
            let path = config
                .fixture_path
                .clone()
                .ok_or_else(|| anyhow!("search.fixture_path required"))?;
            Ok(Arc::new(FixtureSearch::new(path)))
        }
        other => bail!("Unknown search provider: {}", other),
    }
}

// ============ Disabled ============

/// A search backend that always returns an error.
pub struct DisabledSearch;

#[async_trait]
impl WebSearch for DisabledSearch {
    async fn search(&self, _query: &str, _options: &SearchOptions) -> Result<Vec<Value>> {
        bail!("Web search is disabled")
    }
}

// ============ Google Custom Search ============

/// Google Custom Search JSON API client.
pub struct GoogleSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
    max_retries: u32,
}

impl GoogleSearch {
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| anyhow!("{} not set", config.api_key_env))?;
        let engine_id = std::env::var(&config.engine_id_env)
            .map_err(|_| anyhow!("{} not set", config.engine_id_env))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            engine_id,
            max_retries: config.max_retries,
        })
    }

    fn params(&self, query: &str, options: &SearchOptions) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.api_key.clone()),
            ("cx", self.engine_id.clone()),
            ("q", query.to_string()),
            ("num", options.result_count.to_string()),
            ("siteSearch", options.site_allow_list.join(",")),
            ("siteSearchFilter", "i".to_string()),
        ]
    }
}

#[async_trait]
impl WebSearch for GoogleSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Value>> {
        let params = self.params(query, options);
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, ?delay, "retrying web search");
                tokio::time::sleep(delay).await;
            }

            let resp = self.client.get(&self.endpoint).query(&params).send().await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: Value = response.json().await?;
                        return Ok(parse_items(json));
                    }

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(anyhow!("Search API error {}: {}", status, body_text));
                        continue;
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    bail!("Search API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow!("Web search failed after retries")))
    }
}

/// Extract result items from a search response.
///
/// Accepts either a bare array or an object with an `items` array. Anything
/// else, including a missing `items` key, yields no results.
pub fn parse_items(json: Value) -> Vec<Value> {
    match json {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

// ============ Fixture ============

/// Serves results from a JSON file, re-read on every search.
pub struct FixtureSearch {
    path: PathBuf,
}

impl FixtureSearch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl WebSearch for FixtureSearch {
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Value>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read search fixture: {}", self.path.display()))?;
        let json: Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid search fixture: {}", self.path.display()))?;

        let mut items = parse_items(json);
        items.truncate(options.result_count);
        tracing::debug!(query, count = items.len(), "served fixture results");
        Ok(items)
    }
}
