//! Read-only queries over a built [`Catalog`].
//!
//! Everything here is a linear scan; catalogs hold tens to hundreds of
//! recipes. Ingredient matching always goes through [`normalize`] so these
//! queries agree with feasibility and the optimizer on what counts as the
//! same ingredient.
//!
//! # Similarity
//!
//! [`similar_recipes`] ranks by Jaccard similarity of ingredient key sets:
//!
//! ```text
//! sim(a, b) = |keys(a) ∩ keys(b)| / |keys(a) ∪ keys(b)|
//! ```
//!
//! Sorted by score (desc), then catalog order. Recipes sharing nothing
//! with the query recipe are left out.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{Catalog, Ingredient, Recipe};
use crate::normalize::normalize;

/// Recipes whose name contains `text`, case-insensitively, in catalog
/// order. An empty query returns every recipe.
pub fn search_recipes<'a>(catalog: &'a Catalog, text: &str) -> Vec<&'a Recipe> {
    let needle = text.trim().to_lowercase();
    catalog
        .recipes
        .iter()
        .filter(|r| r.name.to_lowercase().contains(&needle))
        .collect()
}

/// Ingredients whose canonical name contains `text` case-insensitively,
/// or whose normalized form contains the normalized query, so
/// `"fresh lime"` finds `Lime Juice`. Usage order; an empty query returns
/// every ingredient.
pub fn search_ingredients<'a>(catalog: &'a Catalog, text: &str) -> Vec<&'a Ingredient> {
    let needle = text.trim().to_lowercase();
    let key = normalize(text);
    catalog
        .ingredients
        .iter()
        .filter(|i| {
            i.canonical_name.to_lowercase().contains(&needle)
                || (!key.is_empty() && i.key.contains(&key))
        })
        .collect()
}

/// Recipes that use every named ingredient.
pub fn recipes_with_ingredients<'a, S: AsRef<str>>(
    catalog: &'a Catalog,
    names: &[S],
) -> Vec<&'a Recipe> {
    let keys: Vec<String> = names
        .iter()
        .map(|n| normalize(n.as_ref()))
        .filter(|k| !k.is_empty())
        .collect();
    catalog
        .recipes
        .iter()
        .filter(|r| keys.iter().all(|k| r.uses(k)))
        .collect()
}

/// A recipe scored against another.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarRecipe<'a> {
    pub recipe: &'a Recipe,
    pub score: f64,
    pub shared_ingredients: Vec<String>,
}

/// Up to `limit` recipes most similar to `id_or_name` by shared
/// ingredients. `None` when the recipe is unknown.
pub fn similar_recipes<'a>(
    catalog: &'a Catalog,
    id_or_name: &str,
    limit: usize,
) -> Option<Vec<SimilarRecipe<'a>>> {
    let query = catalog.recipe(id_or_name)?;
    let query_keys: BTreeSet<&str> = query.ingredient_keys.iter().map(String::as_str).collect();

    let mut scored: Vec<(usize, SimilarRecipe<'a>)> = catalog
        .recipes
        .iter()
        .enumerate()
        .filter(|(_, r)| r.uri != query.uri)
        .filter_map(|(pos, recipe)| {
            let keys: BTreeSet<&str> = recipe.ingredient_keys.iter().map(String::as_str).collect();
            let shared: Vec<String> = recipe
                .ingredient_keys
                .iter()
                .zip(&recipe.parsed_ingredients)
                .filter(|(k, _)| query_keys.contains(k.as_str()))
                .map(|(_, name)| name.clone())
                .collect();
            if shared.is_empty() {
                return None;
            }
            let union = query_keys.union(&keys).count();
            let score = shared.len() as f64 / union as f64;
            Some((
                pos,
                SimilarRecipe {
                    recipe,
                    score,
                    shared_ingredients: shared,
                },
            ))
        })
        .collect();

    scored.sort_by(|(pa, a), (pb, b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(pa.cmp(pb))
    });
    scored.truncate(limit);
    Some(scored.into_iter().map(|(_, s)| s).collect())
}

/// Summary figures for a catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_recipes: usize,
    pub total_unique_ingredients: usize,
    /// Rounded to two decimals.
    pub avg_ingredients_per_recipe: f64,
    pub most_used_ingredient: Option<String>,
}

pub fn catalog_stats(catalog: &Catalog) -> CatalogStats {
    let total: usize = catalog.recipes.iter().map(|r| r.parsed_ingredients.len()).sum();
    let avg = if catalog.recipes.is_empty() {
        0.0
    } else {
        total as f64 / catalog.recipes.len() as f64
    };
    CatalogStats {
        total_recipes: catalog.recipes.len(),
        total_unique_ingredients: catalog.ingredients.len(),
        avg_ingredients_per_recipe: (avg * 100.0).round() / 100.0,
        most_used_ingredient: catalog.ingredients.first().map(|i| i.canonical_name.clone()),
    }
}
