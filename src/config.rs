//! TOML configuration.
//!
//! Every section except `[server]` may be omitted; missing fields take the
//! defaults below. See `config/snipai.toml` for a complete example.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use snipai_core::external::{
    ExternalSearchOptions, SearchOptions, DEFAULT_RESULT_COUNT, DEFAULT_SITE_ALLOW_LIST,
};
use snipai_core::query::DEFAULT_MAX_KEYWORDS;

/// Largest result count the Custom Search API accepts per request.
const MAX_RESULT_COUNT: usize = 10;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub annotate: AnnotateConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Insert the two sample snippets when a list finds the store empty.
    #[serde(default = "default_true")]
    pub seed_when_empty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_when_empty: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AnnotateConfig {
    /// Fixed RNG seed for tag inference. Absent means entropy-seeded.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_engine_id_env")]
    pub engine_id_env: String,
    #[serde(default = "default_result_count")]
    pub result_count: usize,
    #[serde(default = "default_site_allow_list")]
    pub site_allow_list: Vec<String>,
    #[serde(default = "default_max_keywords")]
    pub max_keywords: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default)]
    pub fixture_path: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            engine_id_env: default_engine_id_env(),
            result_count: default_result_count(),
            site_allow_list: default_site_allow_list(),
            max_keywords: default_max_keywords(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            fixture_path: None,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_endpoint() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}
fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}
fn default_engine_id_env() -> String {
    "SEARCH_ENGINE_ID".to_string()
}
fn default_result_count() -> usize {
    DEFAULT_RESULT_COUNT
}
fn default_site_allow_list() -> Vec<String> {
    DEFAULT_SITE_ALLOW_LIST
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_max_keywords() -> usize {
    DEFAULT_MAX_KEYWORDS
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    2
}

impl SearchConfig {
    /// Options handed to the external ranking pipeline.
    pub fn external_options(&self) -> ExternalSearchOptions {
        ExternalSearchOptions {
            search: SearchOptions {
                result_count: self.result_count,
                site_allow_list: self.site_allow_list.clone(),
            },
            max_keywords: self.max_keywords,
        }
    }
}

impl Config {
    /// Defaults for commands that run without a config file.
    pub fn minimal() -> Self {
        Self {
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
            },
            store: StoreConfig::default(),
            annotate: AnnotateConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
///
/// An existing file is still parsed and validated.
pub fn load_config_or_minimal(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::minimal());
    }
    load_config(path)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.server.bind.trim().is_empty() {
        bail!("server.bind must not be empty");
    }

    let search = &config.search;
    if !(1..=MAX_RESULT_COUNT).contains(&search.result_count) {
        bail!("search.result_count must be in [1, {}]", MAX_RESULT_COUNT);
    }
    if search.timeout_secs == 0 {
        bail!("search.timeout_secs must be > 0");
    }

    match search.provider.as_str() {
        "disabled" | "google" => {}
        "fixture" => {
            if search.fixture_path.is_none() {
                bail!("search.fixture_path must be specified when provider is 'fixture'");
            }
        }
        other => bail!(
            "Unknown search provider: '{}'. Must be disabled, google, or fixture.",
            other
        ),
    }

    Ok(())
}
