//! Graph store abstraction for Cocktail Graph.
//!
//! The [`GraphStore`] trait is the only contract the catalog builder has
//! with the knowledge graph: one bulk query returning every record that
//! exposes a recipe-ingredients property. Query language, transport, and
//! storage are the implementation's business (N-Triples file, SPARQL
//! endpoint, JSON dump, in-memory fixture).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::RawRecipeRecord;

/// Abstract knowledge-graph backend.
///
/// # Contract
///
/// - Results are a flat list of [`RawRecipeRecord`]s, one per matching
///   row. The same recipe URI may appear more than once; the catalog
///   builder keeps the first occurrence.
/// - Ordering is not guaranteed, but repeated calls against unchanged data
///   must return the same records in the same order.
/// - Timeouts and retries belong to the implementation. Any error returned
///   here fails the current catalog build.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Short label used in logs and `mix sources` output.
    fn name(&self) -> &str;

    /// Return every recipe record in the graph.
    async fn query_recipes(&self) -> Result<Vec<RawRecipeRecord>>;
}

#[async_trait]
impl<T: GraphStore + ?Sized> GraphStore for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn query_recipes(&self) -> Result<Vec<RawRecipeRecord>> {
        (**self).query_recipes().await
    }
}

#[async_trait]
impl<T: GraphStore + ?Sized> GraphStore for std::sync::Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn query_recipes(&self) -> Result<Vec<RawRecipeRecord>> {
        (**self).query_recipes().await
    }
}
