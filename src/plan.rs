//! CLI front-ends for the planner, the feasibility check, and graph
//! analysis: `mix plan`, `mix feasible`, and `mix graph analyze|vibe|bridges`.
//!
//! Each command prints a human-readable report, or the same value as
//! pretty JSON with `--json`.

use std::sync::Arc;

use anyhow::{bail, Result};
use cocktail_graph_core::feasibility::{almost_feasible, feasible, Inventory};
use cocktail_graph_core::graph::{
    bridge_recipes, same_vibe, BipartiteGraph, Centrality, GraphAnalysis, GraphAnalytics, NodeType,
};
use cocktail_graph_core::models::Catalog;
use cocktail_graph_core::planner::{Plan, PlanMode, Planner};
use serde::Serialize;

use crate::analytics::{component_report, PetgraphAnalytics};
use crate::config::Config;
use crate::sources::load_catalog;

/// Which plan `mix plan` should compute.
#[derive(Debug, Clone)]
pub enum PlanRequest {
    Party { budget: Option<i64> },
    Playlist { recipes: Vec<String> },
    Impact { budget: Option<i64> },
    Shopping { recipes: Vec<String> },
}

pub async fn run_plan(config: &Config, request: PlanRequest, json: bool) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let planner = Planner::new(&catalog);
    let default_budget = config.planner.default_budget;

    let plan = match request {
        PlanRequest::Party { budget } => planner.party(budget.unwrap_or(default_budget)),
        PlanRequest::Impact { budget } => planner.impact(budget.unwrap_or(default_budget)),
        PlanRequest::Playlist { recipes } => planner.playlist(&recipes),
        PlanRequest::Shopping { recipes } => {
            let Some(list) = planner.shopping_list(&recipes) else {
                bail!("None of the requested recipes are in the catalog");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
                return Ok(());
            }
            println!("--- Shopping list ({} recipes) ---", list.recipes.len());
            for name in &list.ingredients {
                println!("- {}", name);
            }
            if !list.unknown_targets.is_empty() {
                println!();
                println!("Unknown recipes: {}", list.unknown_targets.join(", "));
            }
            return Ok(());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn print_plan(plan: &Plan) {
    let title = match plan.mode {
        PlanMode::Party => "Party plan",
        PlanMode::Playlist => "Playlist plan",
        PlanMode::Impact => "Impact plan",
    };
    match plan.budget {
        Some(budget) => println!("--- {} (budget {}) ---", title, budget),
        None => println!("--- {} ---", title),
    }

    println!("Buy ({}):", plan.selected_ingredients.len());
    for (i, name) in plan.selected_ingredients.iter().enumerate() {
        println!("  {}. {}", i + 1, name);
    }
    println!();

    println!("Covers ({}):", plan.covered_recipes.len());
    for recipe in &plan.covered_recipes {
        println!("  - {} ({})", recipe.name, recipe.id);
    }

    if !plan.unknown_targets.is_empty() {
        println!();
        println!("Unknown recipes: {}", plan.unknown_targets.join(", "));
    }
    if !plan.uncoverable.is_empty() {
        println!();
        println!("Not coverable:");
        for recipe in &plan.uncoverable {
            println!("  - {} ({})", recipe.name, recipe.id);
        }
    }
    if let Some(complete) = plan.complete {
        println!();
        println!("complete: {}", complete);
    }
}

#[derive(Serialize)]
struct FeasibleReport {
    inventory: Vec<String>,
    feasible: Vec<RecipeLine>,
    almost_feasible: Vec<NearMissLine>,
}

#[derive(Serialize)]
struct RecipeLine {
    id: String,
    name: String,
}

#[derive(Serialize)]
struct NearMissLine {
    id: String,
    name: String,
    missing: Vec<String>,
}

/// `mix feasible --have ...`: what can be made now, and what is close.
pub async fn run_feasible(config: &Config, have: &[String], json: bool) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let inventory = Inventory::new(have);

    let report = FeasibleReport {
        inventory: inventory.names(),
        feasible: feasible(&catalog, &inventory)
            .into_iter()
            .map(|r| RecipeLine {
                id: r.id.clone(),
                name: r.name.clone(),
            })
            .collect(),
        almost_feasible: almost_feasible(&catalog, &inventory)
            .into_iter()
            .map(|m| NearMissLine {
                id: m.recipe.id.clone(),
                name: m.recipe.name.clone(),
                missing: m.missing,
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("--- Can make ({}) ---", report.feasible.len());
    for r in &report.feasible {
        println!("- {}", r.name);
    }
    println!();
    println!("--- Almost ({}) ---", report.almost_feasible.len());
    for m in &report.almost_feasible {
        println!("- {} (missing {})", m.name, m.missing.join(", "));
    }
    Ok(())
}

async fn analyzed_catalog(
    config: &Config,
) -> Result<(Arc<Catalog>, BipartiteGraph, GraphAnalysis)> {
    let catalog = load_catalog(config).await?;
    let graph = BipartiteGraph::from_catalog(&catalog);
    let analysis = PetgraphAnalytics.analyze(&graph)?;
    Ok((catalog, graph, analysis))
}

/// `mix graph analyze`: components, communities, and the most central
/// nodes by the chosen measure.
pub async fn run_graph_analyze(
    config: &Config,
    top: usize,
    by: Centrality,
    json: bool,
) -> Result<()> {
    let (_, graph, analysis) = analyzed_catalog(config).await?;
    let report = component_report(&graph)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let communities = analysis.communities.values().max().map_or(0, |m| m + 1);
    let measure = format!("{:?}", by).to_uppercase();

    println!("Graph Analysis");
    println!("==============");
    println!();
    println!("  Nodes:        {}", graph.nodes.len());
    println!("  Edges:        {}", graph.edges.len());
    println!("  Components:   {}", report.num_components);
    println!("  Largest:      {}", report.largest_component_size);
    println!("  Smallest:     {}", report.smallest_component_size);
    println!("  Communities:  {}", communities);

    for (label, node_type) in [
        ("Central ingredients", NodeType::Ingredient),
        ("Central recipes", NodeType::Recipe),
    ] {
        let ranked = analysis.top_central(&graph, node_type, by, top);
        if ranked.is_empty() {
            continue;
        }
        println!();
        println!("  {}:", label);
        println!("  {:<32} {:>11} {:>9}", "NAME", measure, "COMMUNITY");
        println!("  {}", "-".repeat(54));
        for (node, score) in ranked {
            let community = analysis.communities.get(&node.id).copied().unwrap_or(0);
            println!("  {:<32} {:>11.4} {:>9}", node.name, score, community);
        }
    }
    println!();
    Ok(())
}

/// `mix graph vibe`: recipes sharing a community with `id`.
pub async fn run_graph_vibe(config: &Config, id: &str, limit: usize) -> Result<()> {
    let (catalog, _, analysis) = analyzed_catalog(config).await?;
    let Some(recipes) = same_vibe(&catalog, &analysis, id, limit) else {
        bail!("Recipe not found: {}", id);
    };
    if recipes.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for recipe in recipes {
        println!("- {} ({})", recipe.name, recipe.id);
    }
    Ok(())
}

#[derive(Serialize)]
struct BridgeOutput {
    id: String,
    name: String,
    communities: Vec<usize>,
}

/// `mix graph bridges`: recipes whose ingredients span communities.
pub async fn run_graph_bridges(config: &Config, limit: usize, json: bool) -> Result<()> {
    let (catalog, _, analysis) = analyzed_catalog(config).await?;
    let bridges: Vec<BridgeOutput> = bridge_recipes(&catalog, &analysis, limit)
        .into_iter()
        .map(|b| BridgeOutput {
            id: b.recipe.id.clone(),
            name: b.recipe.name.clone(),
            communities: b.communities,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&bridges)?);
        return Ok(());
    }
    if bridges.is_empty() {
        println!("No results.");
        return Ok(());
    }
    println!("  {:<32} {:>11}", "RECIPE", "COMMUNITIES");
    println!("  {}", "-".repeat(44));
    for b in &bridges {
        println!("  {:<32} {:>11}", b.name, b.communities.len());
    }
    Ok(())
}
