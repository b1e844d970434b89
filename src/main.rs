//! # Cocktail Graph CLI (`mix`)
//!
//! The `mix` binary builds the recipe catalog from the configured graph
//! store and answers questions about it: what is in it, what to buy, what
//! can be made, and how the ingredients connect.
//!
//! ## Usage
//!
//! ```bash
//! mix --config ./config/mix.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `mix sources` | Show the configured graph store and its status |
//! | `mix stats` | Catalog summary and top ingredients |
//! | `mix recipes [query]` | Search recipes by name and ingredient |
//! | `mix get <id>` | Recipe detail with similar recipes |
//! | `mix ingredients [query]` | Search ingredients, most used first |
//! | `mix plan party\|impact` | Budgeted ingredient selection |
//! | `mix plan playlist\|shopping` | Ingredients for named recipes |
//! | `mix feasible --have ...` | Recipes makeable from an inventory |
//! | `mix graph export\|analyze` | Recipe/ingredient graph export and analysis |
//! | `mix graph vibe <id>` | Recipes in the same community |
//! | `mix graph bridges` | Recipes spanning ingredient communities |
//! | `mix export` | Dump the catalog as JSON |
//! | `mix serve` | Start the HTTP API |
//!
//! ## Examples
//!
//! ```bash
//! # Which five bottles cover the most cocktails?
//! mix plan party --budget 5
//!
//! # What do I need for a Negroni night?
//! mix plan playlist Negroni Boulevardier "Old Fashioned"
//!
//! # Export the graph for Gephi
//! mix graph export --format gexf --output graph.gexf
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cocktail_graph::{config, export, get, logging, plan, search, server, sources, stats};
use cocktail_graph_core::graph::Centrality;

/// Cocktail Graph CLI: recipe catalog building and ingredient planning
/// over a cocktail knowledge graph.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/mix.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "mix",
    about = "Cocktail Graph: recipe catalog and ingredient planning over a cocktail knowledge graph",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/mix.toml`.
    #[arg(long, global = true, default_value = "./config/mix.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Show the configured graph store and whether it is reachable.
    Sources,

    /// Build the catalog and print a summary.
    Stats,

    /// Search recipes by name, optionally requiring ingredients.
    Recipes {
        /// Case-insensitive substring of the recipe name.
        query: Option<String>,

        /// Only recipes that use this ingredient (repeatable).
        #[arg(long = "with")]
        with: Vec<String>,
    },

    /// Show a recipe by id, URI, or name.
    Get {
        /// Recipe id (slug), URI, or name.
        id: String,
    },

    /// List ingredients by usage, most used first.
    Ingredients {
        /// Case-insensitive substring of the ingredient name.
        query: Option<String>,

        /// Maximum number of ingredients to list.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Pick ingredients to buy.
    Plan {
        #[command(subcommand)]
        mode: PlanMode,

        /// Print the plan as JSON.
        #[arg(long, global = true)]
        json: bool,
    },

    /// List recipes makeable from the given ingredients, and those one or
    /// two ingredients short.
    Feasible {
        /// An ingredient on hand (repeatable).
        #[arg(long = "have", required = true)]
        have: Vec<String>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export or analyze the recipe/ingredient graph.
    Graph {
        #[command(subcommand)]
        action: GraphAction,
    },

    /// Dump the catalog as JSON.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP API on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum PlanMode {
    /// Greedy coverage: the ingredients that touch the most recipes.
    Party {
        /// Number of ingredients to pick. Defaults to `[planner].default_budget`.
        #[arg(long, allow_negative_numbers = true)]
        budget: Option<i64>,
    },

    /// Ingredients that cover the named recipes.
    Playlist {
        /// Recipe ids, URIs, or names.
        #[arg(required = true)]
        recipes: Vec<String>,
    },

    /// Ingredients that complete the most recipes within the budget.
    Impact {
        /// Number of ingredients to pick. Defaults to `[planner].default_budget`.
        #[arg(long, allow_negative_numbers = true)]
        budget: Option<i64>,
    },

    /// Every ingredient the named recipes need.
    Shopping {
        /// Recipe ids, URIs, or names.
        #[arg(required = true)]
        recipes: Vec<String>,
    },
}

#[derive(Subcommand)]
enum GraphAction {
    /// Write the bipartite graph as JSON or GEXF.
    Export {
        /// `json` or `gexf`.
        #[arg(long, default_value = "json")]
        format: String,

        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Connected components, communities, and the most central nodes.
    Analyze {
        /// Number of central nodes to list per type.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Rank by `degree`, `betweenness`, or `closeness`.
        #[arg(long, default_value = "degree")]
        by: Centrality,

        /// Print the component report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Recipes in the same community as a recipe.
    Vibe {
        /// Recipe id (slug), URI, or name.
        id: String,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Recipes whose ingredients span several communities.
    Bridges {
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    logging::init_logging(&cfg.logging.level)?;

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&cfg)?;
        }
        Commands::Stats => {
            stats::run_stats(&cfg).await?;
        }
        Commands::Recipes { query, with } => {
            search::run_recipes(&cfg, query.as_deref(), &with).await?;
        }
        Commands::Get { id } => {
            get::run_get(&cfg, &id).await?;
        }
        Commands::Ingredients { query, limit } => {
            search::run_ingredients(&cfg, query.as_deref(), limit).await?;
        }
        Commands::Plan { mode, json } => {
            let request = match mode {
                PlanMode::Party { budget } => plan::PlanRequest::Party { budget },
                PlanMode::Playlist { recipes } => plan::PlanRequest::Playlist { recipes },
                PlanMode::Impact { budget } => plan::PlanRequest::Impact { budget },
                PlanMode::Shopping { recipes } => plan::PlanRequest::Shopping { recipes },
            };
            plan::run_plan(&cfg, request, json).await?;
        }
        Commands::Feasible { have, json } => {
            plan::run_feasible(&cfg, &have, json).await?;
        }
        Commands::Graph { action } => match action {
            GraphAction::Export { format, output } => {
                export::run_graph_export(&cfg, &format, output.as_deref()).await?;
            }
            GraphAction::Analyze { top, by, json } => {
                plan::run_graph_analyze(&cfg, top, by, json).await?;
            }
            GraphAction::Vibe { id, limit } => {
                plan::run_graph_vibe(&cfg, &id, limit).await?;
            }
            GraphAction::Bridges { limit, json } => {
                plan::run_graph_bridges(&cfg, limit, json).await?;
            }
        },
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
