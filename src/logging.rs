//! Structured logging setup.
//!
//! Logs go to stderr so command output on stdout stays clean. The filter is
//! taken from `RUST_LOG` or `SNIPAI_LOG` when set, otherwise from the CLI
//! flags.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// `log_level` wins over `verbose`. A bare level such as `trace` is scoped
/// to this crate and the core crate; a full directive (`snipai=debug,tower_http=info`)
/// is used as-is.
pub fn init_tracing(verbose: bool, log_level: Option<&str>) -> anyhow::Result<()> {
    let level = match (verbose, log_level) {
        (_, Some(level)) => level,
        (true, None) => "debug",
        (false, None) => "info",
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("SNIPAI_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(directive_for(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}

fn directive_for(level: &str) -> String {
    if level.contains('=') {
        level.to_string()
    } else {
        format!("snipai={level},snipai_core={level}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_is_scoped() {
        assert_eq!(directive_for("warn"), "snipai=warn,snipai_core=warn");
    }

    #[test]
    fn test_full_directive_passes_through() {
        assert_eq!(directive_for("snipai=trace"), "snipai=trace");
    }
}
