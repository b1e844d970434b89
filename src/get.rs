//! Recipe detail by id, URI, or name.
//!
//! Used by the `mix get` CLI command; `GET /recipes/{id}` serves the same
//! [`Recipe`] value as JSON.

use anyhow::{bail, Result};
use cocktail_graph_core::models::Recipe;
use cocktail_graph_core::search::similar_recipes;

use crate::config::Config;
use crate::sources::load_catalog;

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let Some(recipe) = catalog.recipe(id) else {
        bail!("Recipe not found: {}", id);
    };

    print_recipe(recipe);

    let similar = similar_recipes(&catalog, &recipe.id, config.planner.similar_limit)
        .unwrap_or_default();
    if !similar.is_empty() {
        println!("--- Similar ---");
        for s in similar {
            println!(
                "{:.2}  {} (shares {})",
                s.score,
                s.recipe.name,
                s.shared_ingredients.join(", ")
            );
        }
        println!();
    }
    Ok(())
}

fn print_recipe(recipe: &Recipe) {
    println!("--- Recipe ---");
    println!("id:          {}", recipe.id);
    println!("name:        {}", recipe.name);
    println!("uri:         {}", recipe.uri);
    if let Some(served) = &recipe.served {
        println!("served:      {}", served);
    }
    if let Some(garnish) = &recipe.garnish {
        println!("garnish:     {}", garnish);
    }
    if let Some(link) = &recipe.source_link {
        println!("source_link: {}", link);
    }
    if let Some(categories) = &recipe.categories {
        println!("categories:  {}", categories.join(", "));
    }
    println!();

    println!("--- Ingredients ({}) ---", recipe.parsed_ingredients.len());
    for name in &recipe.parsed_ingredients {
        println!("- {}", name);
    }
    println!();

    if let Some(prep) = &recipe.preparation {
        println!("--- Preparation ---");
        println!("{}", prep);
        println!();
    }
}
