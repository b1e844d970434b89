//! Tracing setup for the `mix` binary.
//!
//! Logs go to stderr so command output on stdout stays pipeable.
//! `RUST_LOG`, when set, replaces the `[logging].level` directive.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter from `RUST_LOG` or the configured level.
pub fn env_filter(level: &str) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    filter.add_directive(
        "hyper=warn"
            .parse()
            .unwrap_or_else(|_| tracing::Level::WARN.into()),
    )
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_accepts_configured_level() {
        let filter = env_filter("debug");
        assert!(filter.to_string().contains("hyper=warn"));
    }
}
