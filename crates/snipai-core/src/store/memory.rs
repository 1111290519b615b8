//! In-memory [`SnippetStore`] implementation.
//!
//! Keeps snippets in a `Vec` behind `std::sync::RwLock`, newest first,
//! which is the order `list` reports them in.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Snippet, SnippetPatch};

use super::SnippetStore;

/// In-memory snippet store.
pub struct InMemoryStore {
    snippets: RwLock<Vec<Snippet>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            snippets: RwLock::new(Vec::new()),
        }
    }

    /// Build a store pre-populated with `snippets` (kept in the given order).
    pub fn with_snippets(snippets: Vec<Snippet>) -> Self {
        Self {
            snippets: RwLock::new(snippets),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Snippet>>> {
        self.snippets
            .read()
            .map_err(|_| anyhow!("snippet store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Snippet>>> {
        self.snippets
            .write()
            .map_err(|_| anyhow!("snippet store lock poisoned"))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnippetStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Snippet>> {
        Ok(self.read()?.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Snippet>> {
        Ok(self.read()?.iter().find(|s| s.id == id).cloned())
    }

    async fn insert(&self, snippet: Snippet) -> Result<Snippet> {
        let mut snippets = self.write()?;
        if snippets.iter().any(|s| s.id == snippet.id) {
            return Err(anyhow!("duplicate snippet id: {}", snippet.id));
        }
        snippets.insert(0, snippet.clone());
        Ok(snippet)
    }

    async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Option<Snippet>> {
        let mut snippets = self.write()?;
        Ok(snippets.iter_mut().find(|s| s.id == id).map(|s| {
            s.apply_patch(patch);
            s.clone()
        }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut snippets = self.write()?;
        let before = snippets.len();
        snippets.retain(|s| s.id != id);
        Ok(snippets.len() < before)
    }
}
