//! In-memory [`GraphStore`] implementation for tests and file loaders.
//!
//! Holds records behind `std::sync::RwLock`. A failure switch lets tests
//! exercise the catalog builder's behavior when the graph store is down.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::RawRecipeRecord;

use super::GraphStore;

/// In-memory graph store.
pub struct InMemoryGraphStore {
    name: String,
    records: RwLock<Vec<RawRecipeRecord>>,
    failing: AtomicBool,
    queries: AtomicUsize,
}

impl InMemoryGraphStore {
    pub fn new(records: Vec<RawRecipeRecord>) -> Self {
        Self::with_name("memory", records)
    }

    pub fn with_name(name: impl Into<String>, records: Vec<RawRecipeRecord>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(records),
            failing: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        }
    }

    /// Replace the stored records.
    pub fn replace(&self, records: Vec<RawRecipeRecord>) {
        let mut guard = self.records.write().unwrap_or_else(|e| e.into_inner());
        *guard = records;
    }

    /// Make subsequent queries fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `query_recipes` calls so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query_recipes(&self) -> Result<Vec<RawRecipeRecord>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            bail!("graph store '{}' is unavailable", self.name);
        }
        let guard = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failure_switch_and_counter() {
        let store = InMemoryGraphStore::new(vec![RawRecipeRecord::new("urn:a")]);
        assert_eq!(store.query_recipes().await.unwrap().len(), 1);

        store.set_failing(true);
        assert!(store.query_recipes().await.is_err());
        store.set_failing(false);

        store.replace(Vec::new());
        assert!(store.query_recipes().await.unwrap().is_empty());
        assert!(store.is_empty());
        assert_eq!(store.query_count(), 3);
    }
}
