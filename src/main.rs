//! # SnipAI CLI (`snipai`)
//!
//! ## Usage
//!
//! ```bash
//! snipai --config ./config/snipai.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `snipai serve` | Start the HTTP API server |
//! | `snipai explain <file>` | Print the heuristic explanation for a snippet |
//! | `snipai tags <file>` | Print inferred tags for a snippet |
//! | `snipai query <file>` | Print the web-search query for a snippet |
//!
//! `explain`, `tags`, and `query` run without a config file. When one is
//! present, `tags` falls back to `[annotate].seed` and `query` to
//! `[search].max_keywords`. Pass `-` as the file to read the snippet from
//! stdin.

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Read;
use std::path::{Path, PathBuf};

use snipai::{config, logging, server};
use snipai_core::annotate::{infer_explanation, infer_tags};
use snipai_core::query::build_search_query;
use snipai_core::Snippet;

/// SnipAI: a code snippet manager with heuristic annotation and similarity
/// search.
#[derive(Parser)]
#[command(
    name = "snipai",
    about = "SnipAI: store, annotate, and find similar code snippets",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Only `serve` requires it; other commands use defaults when it is
    /// missing.
    #[arg(long, global = true, default_value = "./config/snipai.toml")]
    config: PathBuf,

    /// Enable debug logging.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Log level or filter directive (overrides `--verbose`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server.
    ///
    /// Binds to `[server].bind` and serves `/api/snippets`.
    Serve,

    /// Print the heuristic explanation for a snippet file.
    Explain {
        /// Snippet file, or `-` for stdin.
        file: PathBuf,

        /// Snippet language (e.g. `javascript`, `python`).
        #[arg(long, short)]
        language: String,
    },

    /// Print inferred tags for a snippet file.
    Tags {
        /// Snippet file, or `-` for stdin.
        file: PathBuf,

        #[arg(long, short)]
        language: String,

        /// RNG seed for reproducible output (default: `[annotate].seed`).
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print the web-search query that would be issued for a snippet file.
    Query {
        /// Snippet file, or `-` for stdin.
        file: PathBuf,

        #[arg(long, short)]
        language: String,

        /// User tag to include (repeatable; the first two are used).
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Number of code keywords to append (default: `[search].max_keywords`).
        #[arg(long)]
        max_keywords: Option<usize>,
    },
}

fn read_code(file: &Path) -> anyhow::Result<String> {
    if file == Path::new("-") {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("Failed to read snippet from stdin")?;
        Ok(code)
    } else {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read snippet file: {}", file.display()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose, cli.log_level.as_deref())?;

    match cli.command {
        Commands::Serve => {
            let cfg = config::load_config(&cli.config)?;
            server::run_server(&cfg).await?;
        }
        Commands::Explain { file, language } => {
            let code = read_code(&file)?;
            println!("{}", infer_explanation(&code, &language));
        }
        Commands::Tags {
            file,
            language,
            seed,
        } => {
            let cfg = config::load_config_or_minimal(&cli.config)?;
            let code = read_code(&file)?;
            let mut rng = match seed.or(cfg.annotate.seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            for tag in infer_tags(&code, &language, &mut rng) {
                println!("{}", tag);
            }
        }
        Commands::Query {
            file,
            language,
            tags,
            max_keywords,
        } => {
            let cfg = config::load_config_or_minimal(&cli.config)?;
            let max_keywords = max_keywords.unwrap_or(cfg.search.max_keywords);
            let code = read_code(&file)?;
            let target = Snippet {
                id: String::new(),
                title: String::new(),
                code,
                language,
                description: String::new(),
                tags,
                ai_tags: Vec::new(),
                explanation: String::new(),
                created_at: None,
            };
            println!("{}", build_search_query(&target, max_keywords));
        }
    }

    Ok(())
}
