//! # Cocktail Graph Core
//!
//! Pure logic for Cocktail Graph: ingredient normalization, recipe text
//! parsing, catalog building, coverage optimization, and the graph store
//! and analytics abstractions.
//!
//! This crate does no filesystem or network I/O. Graph store connectors,
//! configuration, and the CLI/HTTP surfaces live in the `cocktail-graph`
//! application crate.
//!
//! ```text
//! GraphStore ──▶ parse ──▶ normalize ──▶ CatalogBuilder ──▶ Arc<Catalog>
//!                                                              │
//!                  ┌────────────────┬───────────────┬──────────┤
//!                  ▼                ▼               ▼          ▼
//!              optimize        feasibility       search      graph
//!              (planner)
//! ```

pub mod catalog;
pub mod error;
pub mod feasibility;
pub mod graph;
pub mod models;
pub mod normalize;
pub mod optimize;
pub mod parse;
pub mod planner;
pub mod search;
pub mod store;
