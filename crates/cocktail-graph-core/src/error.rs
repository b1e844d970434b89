//! Error types surfaced by the catalog builder.

use thiserror::Error;

/// Failure to produce a catalog.
///
/// Per-record problems (missing label, unparseable ingredient line) are
/// absorbed by fallbacks and never appear here.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The graph store query failed (network, parse, corruption).
    #[error("graph store '{store}' unavailable: {source}")]
    DataSource {
        store: String,
        #[source]
        source: anyhow::Error,
    },

    /// The query succeeded but not a single record had a usable URI.
    #[error("graph store '{store}' returned {records} records, none usable")]
    EmptyResult { store: String, records: usize },
}

impl CatalogError {
    /// Machine-readable code for API error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::DataSource { .. } => "data_unavailable",
            CatalogError::EmptyResult { .. } => "data_unavailable",
        }
    }
}
