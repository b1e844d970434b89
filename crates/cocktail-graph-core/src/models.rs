//! Core data models used throughout Cocktail Graph.
//!
//! These types describe the records handed over by a graph store, the
//! canonical recipes and ingredients derived from them, and the results
//! produced by the coverage optimizer.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::normalize::normalize;

/// Raw recipe record as returned by a [`GraphStore`](crate::store::GraphStore).
///
/// Transient: produced per query and consumed by the catalog builder.
/// Every field except `recipe_uri` may be missing in the source data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipeRecord {
    pub recipe_uri: String,
    /// Language tag → label (e.g. `"en"` → `"Mojito"`).
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Language tag → description.
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub raw_ingredient_text: Option<String>,
    #[serde(default)]
    pub preparation: Option<String>,
    #[serde(default)]
    pub served: Option<String>,
    #[serde(default)]
    pub garnish: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub source_link: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl RawRecipeRecord {
    /// Create a record with only a URI set.
    pub fn new(recipe_uri: impl Into<String>) -> Self {
        Self {
            recipe_uri: recipe_uri.into(),
            ..Default::default()
        }
    }

    /// Display name: the English label if present, otherwise the last URI
    /// path segment with underscores replaced by spaces.
    pub fn display_name(&self) -> String {
        if let Some(label) = self.labels.get("en") {
            let label = label.trim();
            if !label.is_empty() {
                return label.to_string();
            }
        }
        self.recipe_uri
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.recipe_uri)
            .replace('_', " ")
    }
}

/// A canonical recipe, produced once per catalog build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    /// URL-safe slug derived from `name`.
    pub id: String,
    pub uri: String,
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub descriptions: BTreeMap<String, String>,
    pub raw_ingredient_text: Option<String>,
    /// Canonical (Title Case) ingredient names in first-seen order.
    pub parsed_ingredients: Vec<String>,
    pub preparation: Option<String>,
    pub served: Option<String>,
    pub garnish: Option<String>,
    pub source_link: Option<String>,
    pub categories: Option<Vec<String>>,
    pub images: Vec<String>,
    /// Lowercase dedup keys, parallel to `parsed_ingredients`.
    #[serde(skip)]
    pub ingredient_keys: Vec<String>,
}

impl Recipe {
    /// Whether this recipe uses the ingredient with the given dedup key.
    pub fn uses(&self, key: &str) -> bool {
        self.ingredient_keys.iter().any(|k| k == key)
    }

    /// English description, if the graph has one.
    pub fn description(&self) -> Option<&str> {
        self.descriptions.get("en").map(String::as_str)
    }
}

/// A canonical ingredient aggregated over every recipe that uses it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub id: String,
    pub canonical_name: String,
    pub usage_count: usize,
    pub recipe_ids: BTreeSet<String>,
    /// Lowercase normalized form; never shown to users.
    #[serde(skip)]
    pub key: String,
}

/// Result of a coverage optimization run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSolution {
    /// Ingredients in the order they were selected.
    pub selected_ingredients: Vec<String>,
    pub covered_recipe_ids: BTreeSet<String>,
}

impl CoverageSolution {
    pub fn is_empty(&self) -> bool {
        self.selected_ingredients.is_empty()
    }
}

/// Recipes and ingredients from a single build, published together.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub recipes: Vec<Recipe>,
    /// Sorted by descending usage count, then canonical name.
    pub ingredients: Vec<Ingredient>,
    pub built_at: DateTime<Utc>,
}

impl Catalog {
    /// Look up a recipe by slug id, URI, or case-insensitive name.
    pub fn recipe(&self, id_or_name: &str) -> Option<&Recipe> {
        let needle = id_or_name.trim();
        self.recipes
            .iter()
            .find(|r| r.id == needle || r.uri == needle)
            .or_else(|| {
                let lower = needle.to_lowercase();
                self.recipes.iter().find(|r| r.name.to_lowercase() == lower)
            })
    }

    /// Look up an ingredient by any raw spelling that normalizes to it.
    pub fn ingredient(&self, name: &str) -> Option<&Ingredient> {
        let key = normalize(name);
        self.ingredients
            .iter()
            .find(|i| i.key == key || i.id == name)
    }

    /// SHA-256 over the serialized recipe and ingredient lists.
    ///
    /// Independent of `built_at`: two builds over identical graph store
    /// output share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&self.recipes).unwrap_or_default());
        hasher.update(serde_json::to_vec(&self.ingredients).unwrap_or_default());
        format!("{:x}", hasher.finalize())
    }
}
