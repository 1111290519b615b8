//! Error kinds surfaced by snippet operations.

use thiserror::Error;

/// Errors returned by snippet operations.
///
/// Collaborator failures (store or web search) arrive as [`anyhow::Error`]
/// and are wrapped in [`SnippetError::Collaborator`]. Web-search failures
/// never reach callers of the ranking API; they are recovered locally.
#[derive(Debug, Error)]
pub enum SnippetError {
    /// The referenced snippet id does not exist.
    #[error("snippet not found: {0}")]
    NotFound(String),

    /// A creation payload is missing required fields.
    #[error("{0}")]
    Validation(String),

    /// The store or another collaborator failed.
    #[error(transparent)]
    Collaborator(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SnippetError>;
