//! Core data models used throughout SnipAI.
//!
//! These types flow between the store, the annotation pass, the ranking
//! stages, and the HTTP layer. Wire names are camelCase; the snippet id is
//! serialized as `_id` (and accepted as either `_id` or `id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SnippetError};

/// A stored unit of source code plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub code: String,
    /// Lowercase language tag (e.g. `"python"`).
    pub language: String,
    #[serde(default)]
    pub description: String,
    /// User-provided tags. Ordered, duplicates allowed.
    #[serde(default)]
    pub tags: Vec<String>,
    /// System-inferred tags, assigned at creation.
    #[serde(default)]
    pub ai_tags: Vec<String>,
    #[serde(default)]
    pub explanation: String,
    /// Set for every stored snippet; absent on synthesized web results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Snippet {
    /// Overwrite every field present in `patch`. No validation is applied.
    pub fn apply_patch(&mut self, patch: &SnippetPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref code) = patch.code {
            self.code = code.clone();
        }
        if let Some(ref language) = patch.language {
            self.language = language.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(ref tags) = patch.tags {
            self.tags = tags.clone();
        }
        if let Some(ref ai_tags) = patch.ai_tags {
            self.ai_tags = ai_tags.clone();
        }
        if let Some(ref explanation) = patch.explanation {
            self.explanation = explanation.clone();
        }
    }
}

/// Creation payload for `POST /api/snippets`.
///
/// `title`, `code`, and `language` are required; they are optional here so
/// that a missing field becomes a [`SnippetError::Validation`] rather than a
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSnippet {
    pub title: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NewSnippet {
    /// Reject payloads missing any of `title`, `code`, `language`.
    pub fn validate(&self) -> Result<()> {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.trim().is_empty());
        if present(&self.title) && present(&self.code) && present(&self.language) {
            Ok(())
        } else {
            Err(SnippetError::Validation(
                "Please provide title, code, and language".to_string(),
            ))
        }
    }

    /// Build the stored snippet. Call [`validate`](Self::validate) first.
    pub fn into_snippet(
        self,
        id: String,
        ai_tags: Vec<String>,
        explanation: String,
        created_at: DateTime<Utc>,
    ) -> Snippet {
        Snippet {
            id,
            title: self.title.unwrap_or_default(),
            code: self.code.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            ai_tags,
            explanation,
            created_at: Some(created_at),
        }
    }
}

/// Partial update for `PATCH /api/snippets/{id}`.
///
/// Present fields overwrite; absent fields are left untouched. The id is
/// not patchable and unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetPatch {
    pub title: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ai_tags: Option<Vec<String>>,
    pub explanation: Option<String>,
}

/// Origin of a synthesized web result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetSource {
    pub url: String,
    /// Display name derived from the URL host.
    pub name: String,
}

/// A snippet annotated with a transient similarity score.
///
/// Never persisted; recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub snippet: Snippet,
    /// Conventionally in `0..=100`.
    pub similarity_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SnippetSource>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub from_web: bool,
}

impl ScoredCandidate {
    /// Wrap a stored snippet with its local score.
    pub fn local(snippet: Snippet, similarity_score: u32) -> Self {
        Self {
            snippet,
            similarity_score,
            source: None,
            from_web: false,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
