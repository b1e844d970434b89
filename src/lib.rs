//! # Cocktail Graph
//!
//! Turns a cocktail knowledge graph (DBpedia's IBA cocktail recipes) into a
//! deduplicated recipe/ingredient catalog and plans which ingredients to buy.
//!
//! The pure pieces (normalization, parsing, catalog building, coverage
//! optimization) live in [`cocktail_graph_core`]. This crate adds the
//! graph store connectors, configuration, export, analytics, the `mix`
//! CLI, and the HTTP API.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌───────────────┐   ┌─────────────┐
//! │  Graph stores    │──▶│ CatalogBuilder │──▶│  Catalog    │
//! │ NT / JSON/SPARQL │   │ parse + dedup  │   │ (Arc, cached)│
//! └──────────────────┘   └───────────────┘   └──────┬──────┘
//!                                                    │
//!                        ┌───────────────────────────┤
//!                        ▼                           ▼
//!                   ┌──────────┐               ┌──────────┐
//!                   │   CLI    │               │   HTTP   │
//!                   │  (mix)   │               │  (axum)  │
//!                   └──────────┘               └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mix sources                      # check the configured graph store
//! mix stats                        # build the catalog and summarise it
//! mix plan party --budget 5        # five ingredients, most recipes
//! mix feasible --have rum --have "lime juice"
//! mix serve                        # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`connector_ntriples`] | N-Triples file graph store |
//! | [`connector_json`] | JSON record file graph store |
//! | [`connector_sparql`] | SPARQL endpoint graph store |
//! | [`sources`] | Graph store selection and catalog loading |
//! | [`analytics`] | Centrality and components via `petgraph` |
//! | [`export`] | Catalog JSON and graph GEXF export |
//! | [`server`] | HTTP API |

pub mod analytics;
pub mod config;
pub mod connector_json;
pub mod connector_ntriples;
pub mod connector_sparql;
pub mod export;
pub mod get;
pub mod logging;
pub mod plan;
pub mod search;
pub mod server;
pub mod sources;
pub mod stats;
pub mod vocab;
