//! Snippet operations shared by the HTTP server and tests.
//!
//! [`SnippetService`] owns the injected store and search backends plus the
//! RNG used for tag inference. Handlers call it and map [`SnippetError`]s
//! to HTTP responses.

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use snipai_core::annotate::{infer_explanation, infer_tags};
use snipai_core::error::Result;
use snipai_core::external::{try_rank_external, ExternalSearchOptions, WebSearch};
use snipai_core::rank::{merge, rank_local};
use snipai_core::store::memory::InMemoryStore;
use snipai_core::store::SnippetStore;
use snipai_core::{NewSnippet, ScoredCandidate, Snippet, SnippetError, SnippetPatch};

use crate::config::Config;
use crate::seed::sample_snippets;
use crate::web_search::create_search;

#[derive(Debug, Clone, Default)]
pub struct ServiceOptions {
    pub seed_when_empty: bool,
    pub external: ExternalSearchOptions,
}

pub struct SnippetService {
    store: Arc<dyn SnippetStore>,
    search: Arc<dyn WebSearch>,
    rng: Mutex<StdRng>,
    options: ServiceOptions,
    seed_lock: tokio::sync::Mutex<()>,
}

impl SnippetService {
    pub fn new(
        store: Arc<dyn SnippetStore>,
        search: Arc<dyn WebSearch>,
        rng: StdRng,
        options: ServiceOptions,
    ) -> Self {
        Self {
            store,
            search,
            rng: Mutex::new(rng),
            options,
            seed_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// In-memory store plus the configured search backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let search = create_search(&config.search)?;
        let rng = match config.annotate.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let options = ServiceOptions {
            seed_when_empty: config.store.seed_when_empty,
            external: config.search.external_options(),
        };
        Ok(Self::new(
            Arc::new(InMemoryStore::new()),
            search,
            rng,
            options,
        ))
    }

    /// All snippets, newest first. Seeds the samples into an empty store.
    pub async fn list(&self) -> Result<Vec<Snippet>> {
        let snippets = self.store.list().await?;
        if !snippets.is_empty() || !self.options.seed_when_empty {
            return Ok(snippets);
        }

        let _guard = self.seed_lock.lock().await;
        let snippets = self.store.list().await?;
        if !snippets.is_empty() {
            return Ok(snippets);
        }

        tracing::info!("store is empty, inserting sample snippets");
        for sample in sample_snippets(Utc::now()).into_iter().rev() {
            self.store.insert(sample).await?;
        }
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: &str) -> Result<Snippet> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| SnippetError::NotFound(id.to_string()))
    }

    /// Ranked similar snippets for `id`, optionally merged with web results.
    ///
    /// A failed web search is logged and the local ranking is returned.
    pub async fn similar(&self, id: &str, search_online: bool) -> Result<Vec<ScoredCandidate>> {
        let target = self.get(id).await?;
        let candidates = self.store.list().await?;
        let local = rank_local(&target, &candidates);
        tracing::debug!(snippet = id, local = local.len(), search_online, "ranked local snippets");

        if !search_online {
            return Ok(local);
        }

        match try_rank_external(&target, self.search.as_ref(), &self.options.external).await {
            Ok(external) => Ok(merge(&local, &external)),
            Err(e) => {
                tracing::warn!(snippet = id, error = %e, "web search failed, returning local results");
                Ok(local)
            }
        }
    }

    /// Validate, annotate and store a new snippet.
    pub async fn create(&self, input: NewSnippet) -> Result<Snippet> {
        input.validate()?;

        let code = input.code.as_deref().unwrap_or_default();
        let language = input.language.as_deref().unwrap_or_default();
        let ai_tags = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| anyhow!("tag RNG lock poisoned"))?;
            infer_tags(code, language, &mut *rng)
        };
        let explanation = infer_explanation(code, language);

        let id = uuid::Uuid::new_v4().to_string();
        let snippet = input.into_snippet(id, ai_tags, explanation, Utc::now());
        let stored = self.store.insert(snippet).await?;
        tracing::debug!(snippet = %stored.id, language = %stored.language, "created snippet");
        Ok(stored)
    }

    pub async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Snippet> {
        self.store
            .update(id, patch)
            .await?
            .ok_or_else(|| SnippetError::NotFound(id.to_string()))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(SnippetError::NotFound(id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use snipai_core::annotate::tag_vocabulary;
    use snipai_core::external::SearchOptions;

    use crate::web_search::DisabledSearch;

    struct StaticSearch(Vec<Value>);

    #[async_trait]
    impl WebSearch for StaticSearch {
        async fn search(&self, _query: &str, _options: &SearchOptions) -> anyhow::Result<Vec<Value>> {
            Ok(self.0.clone())
        }
    }

    fn service(search: Arc<dyn WebSearch>, seed_when_empty: bool) -> SnippetService {
        SnippetService::new(
            Arc::new(InMemoryStore::new()),
            search,
            StdRng::seed_from_u64(42),
            ServiceOptions {
                seed_when_empty,
                ..Default::default()
            },
        )
    }

    fn new_snippet(title: &str, code: &str, language: &str) -> NewSnippet {
        NewSnippet {
            title: Some(title.to_string()),
            code: Some(code.to_string()),
            language: Some(language.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_list_seeds_empty_store_once() {
        let svc = service(Arc::new(DisabledSearch), true);
        let first = svc.list().await.unwrap();
        let ids: Vec<&str> = first.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(svc.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_without_seeding() {
        let svc = service(Arc::new(DisabledSearch), false);
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_annotates_and_prepends() {
        let svc = service(Arc::new(DisabledSearch), false);
        let a = svc
            .create(new_snippet("first", "print('a')", "python"))
            .await
            .unwrap();
        let b = svc
            .create(new_snippet("second", "print('b')", "python"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert!(b.created_at.is_some());
        assert!((2..=3).contains(&b.ai_tags.len()));
        let vocabulary = tag_vocabulary("python");
        assert!(b.ai_tags.iter().all(|t| vocabulary.contains(&t.as_str())));
        assert!(!b.explanation.is_empty());

        let listed = svc.list().await.unwrap();
        assert_eq!(listed[0].id, b.id);
        assert_eq!(listed[1].id, a.id);
    }

    #[tokio::test]
    async fn test_create_rejects_missing_fields() {
        let svc = service(Arc::new(DisabledSearch), false);
        let input = NewSnippet {
            title: Some("t".to_string()),
            ..Default::default()
        };
        let err = svc.create(input).await.unwrap_err();
        assert!(matches!(err, SnippetError::Validation(_)));
        assert!(svc.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_delete_not_found() {
        let svc = service(Arc::new(DisabledSearch), false);
        let patch = SnippetPatch::default();
        assert!(matches!(
            svc.update("nope", &patch).await,
            Err(SnippetError::NotFound(_))
        ));
        assert!(matches!(svc.delete("nope").await, Err(SnippetError::NotFound(_))));
        assert!(matches!(svc.get("nope").await, Err(SnippetError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_similar_local_only_and_fallback() {
        let svc = service(Arc::new(DisabledSearch), true);
        svc.list().await.unwrap();
        svc.create(new_snippet(
            "Evens",
            "evens = [n for n in range(20) if n % 2 == 0]",
            "python",
        ))
        .await
        .unwrap();

        let local = svc.similar("2", false).await.unwrap();
        assert!(!local.is_empty());
        assert!(local.iter().all(|c| c.snippet.id != "2" && !c.from_web));

        // Disabled search fails, so the online request falls back to local.
        let online = svc.similar("2", true).await.unwrap();
        assert_eq!(online, local);
    }

    #[tokio::test]
    async fn test_similar_merges_web_results() {
        let results = vec![
            json!({"title": "List tricks", "link": "https://stackoverflow.com/q/1", "snippet": "list"}),
            json!({"title": "More lists", "link": "https://github.com/a/b"}),
        ];
        let svc = service(Arc::new(StaticSearch(results)), true);
        svc.list().await.unwrap();

        let merged = svc.similar("2", true).await.unwrap();
        assert!(merged.len() <= 6);
        assert_eq!(merged.iter().filter(|c| c.from_web).count(), 2);
        for pair in merged.windows(2) {
            assert!(pair[0].similarity_score >= pair[1].similarity_score);
        }
    }

    #[tokio::test]
    async fn test_similar_missing_target() {
        let svc = service(Arc::new(DisabledSearch), true);
        assert!(matches!(
            svc.similar("missing", false).await,
            Err(SnippetError::NotFound(_))
        ));
    }
}
