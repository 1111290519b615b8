//! # SnipAI
//!
//! A code snippet manager. Snippets are annotated with heuristic tags and a
//! plain-language explanation when created, and can be ranked against each
//! other locally or against synthesized web results.
//!
//! The ranking and annotation logic lives in [`snipai_core`]; this crate
//! wires it to configuration, a web search backend, and an HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────────┐   ┌──────────────┐
//! │   HTTP   │──▶│ SnippetService │──▶│ SnippetStore │
//! │  (axum)  │   └───────┬────────┘   └──────────────┘
//! └──────────┘           │
//!                        ▼
//!                 ┌─────────────┐
//!                 │  WebSearch  │  disabled | google | fixture
//!                 └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! snipai serve                                   # start the HTTP API
//! snipai explain snippet.py --language python    # print the explanation
//! snipai query snippet.js --language javascript  # show the web query
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | Tracing subscriber setup |
//! | [`seed`] | Sample snippets for an empty store |
//! | [`service`] | Snippet operations over injected backends |
//! | [`web_search`] | Web search backends |
//! | [`server`] | HTTP API server |

pub mod config;
pub mod logging;
pub mod seed;
pub mod server;
pub mod service;
pub mod web_search;
