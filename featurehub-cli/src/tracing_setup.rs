//! Tracing setup for the featurehub CLI
//!
//! Usage:
//!   featurehub --debug ...                  # Debug logging to stderr
//!   RUST_LOG=featurehub_core=debug featurehub  # Fine-grained log control
//!
//! Logs go to stderr so `--format json` output on stdout stays clean.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (sets RUST_LOG=debug if not already set)
    pub debug: bool,
    /// Only warnings and errors unless RUST_LOG says otherwise
    pub quiet: bool,
}

impl TracingConfig {
    fn default_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}

pub fn init_tracing(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.debug) // Show targets in debug mode
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_wins_over_quiet() {
        let config = TracingConfig {
            debug: true,
            quiet: true,
        };
        assert_eq!(config.default_level(), "debug");
        assert_eq!(TracingConfig::default().default_level(), "info");
        assert_eq!(
            TracingConfig {
                debug: false,
                quiet: true
            }
            .default_level(),
            "warn"
        );
    }
}
