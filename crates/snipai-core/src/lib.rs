//! # SnipAI Core
//!
//! Shared, runtime-agnostic logic for SnipAI: snippet models, heuristic
//! annotation, local similarity ranking, web-result synthesis, and the
//! storage / web-search abstractions.
//!
//! This crate contains no HTTP server, HTTP client, or configuration file
//! handling. The application crate supplies concrete [`store::SnippetStore`]
//! and [`external::WebSearch`] implementations.
//!
//! ## Pipeline
//!
//! ```text
//!                 ┌──────────────┐
//!  target ───────▶│ rank_local   │──────────────┐
//!    │            └──────────────┘              ▼
//!    │   ┌───────┐   ┌───────────┐   ┌───────┐ ┌───────┐
//!    └──▶│ query │──▶│ WebSearch │──▶│ synth │▶│ merge │──▶ ranked (≤ 6)
//!        └───────┘   └───────────┘   └───────┘ └───────┘
//! ```

pub mod annotate;
pub mod error;
pub mod external;
pub mod models;
pub mod query;
pub mod rank;
pub mod store;
pub mod synth;

pub use error::SnippetError;
pub use models::{NewSnippet, ScoredCandidate, Snippet, SnippetPatch, SnippetSource};
