//! Bipartite recipe/ingredient graph and the analytics boundary.
//!
//! The core only produces the node and edge lists; centrality and
//! community detection live behind [`GraphAnalytics`], implemented by the
//! application on top of a graph library.
//!
//! Node ids are namespaced so recipe and ingredient ids never collide:
//!
//! ```text
//! recipe:<slug>        ── uses ──▶  ingredient:<id>
//! recipe:mojito                     ingredient:white_rum
//! ```
//!
//! Output order is deterministic: recipe nodes in catalog order, then
//! ingredient nodes in catalog order; edges in recipe order, then parsed
//! ingredient order.
//!
//! [`same_vibe`] and [`bridge_recipes`] read community labels back onto
//! the catalog. Ingredients are joined by `Ingredient::id`, the same id the
//! node was built from, never by re-matching names.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::{Catalog, Recipe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Recipe,
    Ingredient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BipartiteGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

pub fn recipe_node_id(recipe_id: &str) -> String {
    format!("recipe:{recipe_id}")
}

pub fn ingredient_node_id(ingredient_id: &str) -> String {
    format!("ingredient:{ingredient_id}")
}

impl BipartiteGraph {
    /// One node per recipe and per ingredient, one edge per
    /// recipe-uses-ingredient pair.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut graph = BipartiteGraph::default();

        for recipe in &catalog.recipes {
            graph.nodes.push(GraphNode {
                id: recipe_node_id(&recipe.id),
                name: recipe.name.clone(),
                node_type: NodeType::Recipe,
            });
        }

        let mut by_key: HashMap<&str, &str> = HashMap::new();
        for ingredient in &catalog.ingredients {
            by_key.insert(ingredient.key.as_str(), ingredient.id.as_str());
            graph.nodes.push(GraphNode {
                id: ingredient_node_id(&ingredient.id),
                name: ingredient.canonical_name.clone(),
                node_type: NodeType::Ingredient,
            });
        }

        let mut seen_edges: HashSet<(&str, &str)> = HashSet::new();
        for recipe in &catalog.recipes {
            for key in &recipe.ingredient_keys {
                let Some(&ingredient_id) = by_key.get(key.as_str()) else {
                    continue;
                };
                if seen_edges.insert((recipe.id.as_str(), ingredient_id)) {
                    graph.edges.push(GraphEdge {
                        source: recipe_node_id(&recipe.id),
                        target: ingredient_node_id(ingredient_id),
                    });
                }
            }
        }
        graph
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn count(&self, node_type: NodeType) -> usize {
        self.nodes.iter().filter(|n| n.node_type == node_type).count()
    }
}

/// Scores and labels keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphAnalysis {
    /// Degree centrality.
    pub centrality: BTreeMap<String, f64>,
    #[serde(default)]
    pub betweenness: BTreeMap<String, f64>,
    #[serde(default)]
    pub closeness: BTreeMap<String, f64>,
    pub communities: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Centrality {
    #[default]
    Degree,
    Betweenness,
    Closeness,
}

impl std::str::FromStr for Centrality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "degree" => Ok(Centrality::Degree),
            "betweenness" => Ok(Centrality::Betweenness),
            "closeness" => Ok(Centrality::Closeness),
            other => Err(format!("unknown centrality measure: {other}")),
        }
    }
}

impl GraphAnalysis {
    pub fn scores(&self, measure: Centrality) -> &BTreeMap<String, f64> {
        match measure {
            Centrality::Degree => &self.centrality,
            Centrality::Betweenness => &self.betweenness,
            Centrality::Closeness => &self.closeness,
        }
    }

    /// Highest-scoring nodes of one type, ties broken by node id.
    pub fn top_central<'g>(
        &self,
        graph: &'g BipartiteGraph,
        node_type: NodeType,
        measure: Centrality,
        limit: usize,
    ) -> Vec<(&'g GraphNode, f64)> {
        let scores = self.scores(measure);
        let mut ranked: Vec<(&GraphNode, f64)> = graph
            .nodes
            .iter()
            .filter(|n| n.node_type == node_type)
            .map(|n| (n, scores.get(&n.id).copied().unwrap_or(0.0)))
            .collect();
        ranked.sort_by(|(na, a), (nb, b)| {
            b.partial_cmp(a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| na.id.cmp(&nb.id))
        });
        ranked.truncate(limit);
        ranked
    }
}

/// Centrality and community detection over a [`BipartiteGraph`].
pub trait GraphAnalytics: Send + Sync {
    fn analyze(&self, graph: &BipartiteGraph) -> Result<GraphAnalysis>;
}

/// Ingredient id by dedup key.
fn ingredient_ids(catalog: &Catalog) -> HashMap<&str, &str> {
    catalog
        .ingredients
        .iter()
        .map(|i| (i.key.as_str(), i.id.as_str()))
        .collect()
}

/// Community labels of a recipe's ingredients, in parsed order.
fn ingredient_labels(
    recipe: &Recipe,
    ids: &HashMap<&str, &str>,
    analysis: &GraphAnalysis,
) -> Vec<usize> {
    recipe
        .ingredient_keys
        .iter()
        .filter_map(|key| ids.get(key.as_str()))
        .filter_map(|id| analysis.communities.get(&ingredient_node_id(id)).copied())
        .collect()
}

/// Up to `limit` recipes in the same community as `id_or_name`.
///
/// Ranked by how many of their ingredients sit in that community, then
/// catalog order. `None` when the recipe is unknown; empty when the
/// analysis has no label for it.
pub fn same_vibe<'a>(
    catalog: &'a Catalog,
    analysis: &GraphAnalysis,
    id_or_name: &str,
    limit: usize,
) -> Option<Vec<&'a Recipe>> {
    let target = catalog.recipe(id_or_name)?;
    let Some(&label) = analysis.communities.get(&recipe_node_id(&target.id)) else {
        return Some(Vec::new());
    };
    let ids = ingredient_ids(catalog);

    let mut ranked: Vec<(usize, usize, &Recipe)> = catalog
        .recipes
        .iter()
        .enumerate()
        .filter(|(_, r)| r.uri != target.uri)
        .filter(|(_, r)| analysis.communities.get(&recipe_node_id(&r.id)) == Some(&label))
        .map(|(pos, r)| {
            let inside = ingredient_labels(r, &ids, analysis)
                .into_iter()
                .filter(|&l| l == label)
                .count();
            (inside, pos, r)
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    ranked.truncate(limit);
    Some(ranked.into_iter().map(|(_, _, r)| r).collect())
}

/// A recipe whose ingredients come from more than one community.
#[derive(Debug, Clone, Serialize)]
pub struct BridgeRecipe<'a> {
    pub recipe: &'a Recipe,
    /// Distinct ingredient communities, ascending.
    pub communities: Vec<usize>,
}

/// Up to `limit` recipes spanning two or more ingredient communities,
/// most communities first, then catalog order.
pub fn bridge_recipes<'a>(
    catalog: &'a Catalog,
    analysis: &GraphAnalysis,
    limit: usize,
) -> Vec<BridgeRecipe<'a>> {
    let ids = ingredient_ids(catalog);
    let mut bridges: Vec<BridgeRecipe<'a>> = catalog
        .recipes
        .iter()
        .filter_map(|recipe| {
            let communities: BTreeSet<usize> =
                ingredient_labels(recipe, &ids, analysis).into_iter().collect();
            (communities.len() > 1).then(|| BridgeRecipe {
                recipe,
                communities: communities.into_iter().collect(),
            })
        })
        .collect();
    // Stable sort keeps catalog order among equals.
    bridges.sort_by(|a, b| b.communities.len().cmp(&a.communities.len()));
    bridges.truncate(limit);
    bridges
}
