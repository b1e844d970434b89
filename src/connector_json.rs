//! JSON graph store: a file holding an array of raw recipe records.
//!
//! Field names follow the record's camelCase serialization:
//!
//! ```json
//! [
//!   {
//!     "recipeUri": "http://dbpedia.org/resource/Mojito",
//!     "labels": { "en": "Mojito" },
//!     "rawIngredientText": "* 45 ml White Rum\n* 20 ml Lime juice"
//!   }
//! ]
//! ```
//!
//! Useful for fixtures and hand-curated recipe sets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cocktail_graph_core::models::RawRecipeRecord;
use cocktail_graph_core::store::GraphStore;

pub struct JsonGraphStore {
    path: PathBuf,
}

impl JsonGraphStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl GraphStore for JsonGraphStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn query_recipes(&self) -> Result<Vec<RawRecipeRecord>> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read JSON source: {}", self.path.display()))?;
        let records: Vec<RawRecipeRecord> = serde_json::from_str(&text)
            .with_context(|| format!("Invalid recipe records in {}", self.path.display()))?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(
            &path,
            r#"[{"recipeUri": "urn:a", "labels": {"en": "A"}, "rawIngredientText": "* Gin"},
                {"recipeUri": "urn:b"}]"#,
        )
        .unwrap();
        let records = JsonGraphStore::new(&path).query_recipes().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].display_name(), "A");
        assert!(records[1].raw_ingredient_text.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = JsonGraphStore::new(&path).query_recipes().await.unwrap_err();
        assert!(err.to_string().contains("Invalid recipe records"));
    }
}
