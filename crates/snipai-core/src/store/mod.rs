//! Storage abstraction for SnipAI.
//!
//! The [`SnippetStore`] trait defines the storage operations the service
//! layer needs, so the engine never reaches for ambient global state and the
//! backing technology stays pluggable.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Snippet, SnippetPatch};

/// Abstract storage backend for snippets.
///
/// Not-found is reported in-band (`Ok(None)` / `Ok(false)`); `Err` means the
/// backend itself failed.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list`](SnippetStore::list) | All snippets, newest first |
/// | [`get`](SnippetStore::get) | One snippet by id |
/// | [`insert`](SnippetStore::insert) | Add a snippet at the front |
/// | [`update`](SnippetStore::update) | Apply a partial field overwrite |
/// | [`delete`](SnippetStore::delete) | Remove by id |
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Snapshot of every stored snippet.
    async fn list(&self) -> Result<Vec<Snippet>>;

    /// Retrieve a snippet by id.
    async fn get(&self, id: &str) -> Result<Option<Snippet>>;

    /// Store a new snippet and return the stored copy.
    async fn insert(&self, snippet: Snippet) -> Result<Snippet>;

    /// Apply `patch` to the snippet with `id`, returning the updated copy.
    async fn update(&self, id: &str, patch: &SnippetPatch) -> Result<Option<Snippet>>;

    /// Remove the snippet with `id`. Returns `false` if it did not exist.
    async fn delete(&self, id: &str) -> Result<bool>;
}
