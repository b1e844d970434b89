//! Configuration parsing and validation.
//!
//! Cocktail Graph is configured with a TOML file (default
//! `config/mix.toml`). The file has four sections:
//!
//! ```toml
//! [source]
//! kind = "ntriples"              # ntriples | json | sparql
//! path = "./data/iba.nt"         # ntriples, json
//! # endpoint = "https://dbpedia.org/sparql"   # sparql
//! timeout_secs = 30
//!
//! [planner]
//! default_budget = 5
//! similar_limit = 5
//!
//! [server]
//! bind = "127.0.0.1:7341"
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Only `[source]` is required. [`load_config`] checks that the chosen
//! source kind has the fields it needs and that numeric limits are sane.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which graph store backs the catalog.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// N-Triples dump loaded into memory.
    Ntriples,
    /// JSON array of raw recipe records.
    Json,
    /// Remote SPARQL endpoint.
    Sparql,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Ntriples => "ntriples",
            SourceKind::Json => "json",
            SourceKind::Sparql => "sparql",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Named graph to query (sparql only).
    #[serde(default)]
    pub graph: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlannerConfig {
    #[serde(default = "default_budget")]
    pub default_budget: i64,
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_budget: default_budget(),
            similar_limit: default_similar_limit(),
        }
    }
}

fn default_budget() -> i64 {
    5
}
fn default_similar_limit() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.source.kind {
        SourceKind::Ntriples | SourceKind::Json => {
            if config.source.path.is_none() {
                bail!(
                    "source.path must be specified when source.kind is '{}'",
                    config.source.kind.as_str()
                );
            }
        }
        SourceKind::Sparql => match config.source.endpoint.as_deref() {
            None | Some("") => bail!("source.endpoint must be specified when source.kind is 'sparql'"),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                bail!("source.endpoint must be an http(s) URL, got '{}'", url)
            }
            Some(_) => {}
        },
    }

    if config.source.timeout_secs == 0 {
        bail!("source.timeout_secs must be > 0");
    }

    if config.planner.default_budget < 0 {
        bail!("planner.default_budget must be >= 0");
    }

    if config.planner.similar_limit == 0 {
        bail!("planner.similar_limit must be >= 1");
    }

    if config.server.bind.parse::<std::net::SocketAddr>().is_err() {
        bail!("server.bind must be a socket address, got '{}'", config.server.bind);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let cfg = parse(
            r#"
[source]
kind = "ntriples"
path = "data/iba.nt"
"#,
        )
        .unwrap();
        assert_eq!(cfg.source.kind, SourceKind::Ntriples);
        assert_eq!(cfg.source.timeout_secs, 30);
        assert_eq!(cfg.planner.default_budget, 5);
        assert_eq!(cfg.server.bind, "127.0.0.1:7341");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_file_source_requires_path() {
        let err = parse("[source]\nkind = \"json\"\n").unwrap_err();
        assert!(err.to_string().contains("source.path"));
    }

    #[test]
    fn test_sparql_requires_http_endpoint() {
        assert!(parse("[source]\nkind = \"sparql\"\n").is_err());
        assert!(parse("[source]\nkind = \"sparql\"\nendpoint = \"ftp://x\"\n").is_err());
        let cfg = parse("[source]\nkind = \"sparql\"\nendpoint = \"https://dbpedia.org/sparql\"\n").unwrap();
        assert_eq!(cfg.source.kind, SourceKind::Sparql);
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert!(parse("[source]\nkind = \"neo4j\"\npath = \"x\"\n").is_err());
    }

    #[test]
    fn test_limits_validated() {
        let base = "[source]\nkind = \"json\"\npath = \"x.json\"\n";
        assert!(parse(&format!("{base}[planner]\ndefault_budget = -1\n")).is_err());
        assert!(parse(&format!("{base}[planner]\nsimilar_limit = 0\n")).is_err());
        assert!(parse(&format!("{base}[server]\nbind = \"nowhere\"\n")).is_err());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/mix.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
