//! `mix recipes` and `mix ingredients`: catalog listings and search.

use anyhow::Result;
use cocktail_graph_core::models::Recipe;
use cocktail_graph_core::search::{recipes_with_ingredients, search_ingredients, search_recipes};

use crate::config::Config;
use crate::sources::load_catalog;

/// List recipes whose name contains `query` and that use every
/// ingredient in `with`.
pub async fn run_recipes(config: &Config, query: Option<&str>, with: &[String]) -> Result<()> {
    let catalog = load_catalog(config).await?;

    let by_name = search_recipes(&catalog, query.unwrap_or(""));
    let hits: Vec<&Recipe> = if with.is_empty() {
        by_name
    } else {
        let by_ingredient = recipes_with_ingredients(&catalog, with);
        by_name
            .into_iter()
            .filter(|r| by_ingredient.iter().any(|o| o.uri == r.uri))
            .collect()
    };

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, recipe) in hits.iter().enumerate() {
        println!("{}. {}", i + 1, recipe.name);
        println!("    id: {}", recipe.id);
        println!("    ingredients: {}", recipe.parsed_ingredients.join(", "));
        println!();
    }
    Ok(())
}

/// List ingredients matching `query` by usage, most used first.
pub async fn run_ingredients(config: &Config, query: Option<&str>, limit: Option<usize>) -> Result<()> {
    let catalog = load_catalog(config).await?;

    let hits = search_ingredients(&catalog, query.unwrap_or(""));
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    println!("  {:<32} {:>7}", "INGREDIENT", "RECIPES");
    println!("  {}", "-".repeat(40));
    for ingredient in hits.into_iter().take(limit.unwrap_or(usize::MAX)) {
        println!(
            "  {:<32} {:>7}",
            ingredient.canonical_name, ingredient.usage_count
        );
    }
    Ok(())
}
