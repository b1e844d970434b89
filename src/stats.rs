//! Catalog statistics overview.
//!
//! Provides a quick summary of what the graph yielded: recipe and
//! ingredient counts, average recipe size, and the most used ingredients.
//! Used by `mix stats` to confirm a source parses the way you expect.

use anyhow::Result;
use cocktail_graph_core::search::catalog_stats;

use crate::config::Config;
use crate::sources::load_catalog;

/// Number of ingredients listed under "Top ingredients".
const TOP_INGREDIENTS: usize = 10;

/// Run the stats command: build the catalog and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let stats = catalog_stats(&catalog);
    let fingerprint = catalog.fingerprint();

    println!("Cocktail Graph: Catalog Stats");
    println!("=============================");
    println!();
    println!("  Source:       {}", config.source.kind.as_str());
    println!("  Built:        {}", catalog.built_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  Fingerprint:  {}", &fingerprint[..12]);
    println!();
    println!("  Recipes:      {}", stats.total_recipes);
    println!("  Ingredients:  {}", stats.total_unique_ingredients);
    println!("  Avg/recipe:   {:.2}", stats.avg_ingredients_per_recipe);
    println!(
        "  Most used:    {}",
        stats.most_used_ingredient.as_deref().unwrap_or("n/a")
    );

    if !catalog.ingredients.is_empty() {
        println!();
        println!("  Top ingredients:");
        println!("  {:<32} {:>7}", "INGREDIENT", "RECIPES");
        println!("  {}", "-".repeat(40));
        for ingredient in catalog.ingredients.iter().take(TOP_INGREDIENTS) {
            println!(
                "  {:<32} {:>7}",
                ingredient.canonical_name, ingredient.usage_count
            );
        }
    }

    println!();
    Ok(())
}
