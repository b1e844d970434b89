//! Graph analytics over the recipe/ingredient graph, backed by `petgraph`.
//!
//! - **Degree**: `degree / (n - 1)`. A graph with a single node scores it
//!   `1.0`.
//! - **Betweenness**: Brandes over unweighted shortest paths, normalized by
//!   `(n - 1)(n - 2)` so scores fall in `[0, 1]`.
//! - **Closeness**: `(r / Σd) · (r / (n - 1))` where `r` counts the nodes
//!   reachable from the node and `Σd` sums their distances. Isolated nodes
//!   score `0.0`.
//! - **Communities**: Louvain modularity optimization. Nodes are visited
//!   in index order and only move for a strictly better gain, so the same
//!   graph always yields the same partition. Labels are numbered in order
//!   of each community's first node (recipes first, catalog order).
//!
//! ```text
//! ΔQ(i → c) ∝ k_i,in(c) − Σ_tot(c) · k_i / 2m
//! ```
//!
//! A community never spans two connected components. [`component_report`]
//! summarises the components themselves for `mix graph analyze` and
//! `GET /graph/components`.

use std::collections::{BTreeMap, HashMap, VecDeque};

use anyhow::{bail, Result};
use cocktail_graph_core::graph::{BipartiteGraph, GraphAnalysis, GraphAnalytics, NodeType};
use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::Serialize;

/// [`GraphAnalytics`] implementation on `petgraph`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PetgraphAnalytics;

impl GraphAnalytics for PetgraphAnalytics {
    fn analyze(&self, graph: &BipartiteGraph) -> Result<GraphAnalysis> {
        let g = to_petgraph(graph)?;
        let n = g.node_count();

        let betweenness = betweenness(&g);
        let closeness = closeness(&g);
        let communities = louvain_labels(&g);

        let mut analysis = GraphAnalysis::default();
        for (i, node) in graph.nodes.iter().enumerate() {
            let ix = NodeIndex::new(i);
            let degree = if n <= 1 {
                1.0
            } else {
                g.edges(ix).count() as f64 / (n - 1) as f64
            };
            analysis.centrality.insert(node.id.clone(), degree);
            analysis.betweenness.insert(node.id.clone(), betweenness[i]);
            analysis.closeness.insert(node.id.clone(), closeness[i]);
            analysis.communities.insert(node.id.clone(), communities[i]);
        }
        tracing::debug!(
            nodes = n,
            communities = communities.iter().max().map_or(0, |m| m + 1),
            "graph analyzed"
        );
        Ok(analysis)
    }
}

/// Node `i` of the petgraph graph is `graph.nodes[i]`.
fn to_petgraph(graph: &BipartiteGraph) -> Result<UnGraph<(), ()>> {
    let mut g = UnGraph::<(), ()>::with_capacity(graph.nodes.len(), graph.edges.len());
    let mut index: HashMap<&str, NodeIndex> = HashMap::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let ix = g.add_node(());
        if index.insert(node.id.as_str(), ix).is_some() {
            bail!("duplicate node id in graph: {}", node.id);
        }
    }
    for edge in &graph.edges {
        let (Some(&a), Some(&b)) = (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
        else {
            bail!("edge {} -> {} references an unknown node", edge.source, edge.target);
        };
        g.add_edge(a, b, ());
    }
    Ok(g)
}

/// Renumber arbitrary labels densely, in order of first appearance.
fn dense_labels(labels: &[usize]) -> Vec<usize> {
    let mut seen: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|&label| {
            let next = seen.len();
            *seen.entry(label).or_insert(next)
        })
        .collect()
}

/// Component label per node, in node order.
fn component_labels(g: &UnGraph<(), ()>) -> Vec<usize> {
    let mut uf = UnionFind::<usize>::new(g.node_count());
    for edge in g.raw_edges() {
        uf.union(edge.source().index(), edge.target().index());
    }
    let roots: Vec<usize> = (0..g.node_count()).map(|i| uf.find(i)).collect();
    dense_labels(&roots)
}

fn betweenness(g: &UnGraph<(), ()>) -> Vec<f64> {
    let n = g.node_count();
    let mut scores = vec![0.0; n];

    for source in g.node_indices() {
        let mut order: Vec<usize> = Vec::with_capacity(n);
        let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut paths = vec![0.0_f64; n];
        let mut dist = vec![usize::MAX; n];
        paths[source.index()] = 1.0;
        dist[source.index()] = 0;

        let mut queue = VecDeque::from([source]);
        while let Some(v) = queue.pop_front() {
            let vi = v.index();
            order.push(vi);
            for w in g.neighbors(v) {
                let wi = w.index();
                if dist[wi] == usize::MAX {
                    dist[wi] = dist[vi] + 1;
                    queue.push_back(w);
                }
                if dist[wi] == dist[vi] + 1 {
                    paths[wi] += paths[vi];
                    preds[wi].push(vi);
                }
            }
        }

        let mut delta = vec![0.0_f64; n];
        while let Some(w) = order.pop() {
            for &v in &preds[w] {
                delta[v] += paths[v] / paths[w] * (1.0 + delta[w]);
            }
            if w != source.index() {
                scores[w] += delta[w];
            }
        }
    }

    // Every unordered pair was counted from both ends.
    if n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        scores.iter_mut().for_each(|s| *s *= scale);
    } else {
        scores.iter_mut().for_each(|s| *s = 0.0);
    }
    scores
}

fn closeness(g: &UnGraph<(), ()>) -> Vec<f64> {
    let n = g.node_count();
    g.node_indices()
        .map(|ix| {
            let dist = dijkstra(g, ix, None, |_| 1usize);
            let total: usize = dist.values().sum();
            let reachable = dist.len().saturating_sub(1);
            if total == 0 || n <= 1 {
                0.0
            } else {
                (reachable as f64 / total as f64) * (reachable as f64 / (n - 1) as f64)
            }
        })
        .collect()
}

/// Louvain community label per node, in node order.
fn louvain_labels(g: &UnGraph<(), ()>) -> Vec<usize> {
    let mut level = Level::from_graph(g);
    let mut membership: Vec<usize> = (0..g.node_count()).collect();
    while let Some(assignment) = level.local_moves() {
        for m in membership.iter_mut() {
            *m = assignment[*m];
        }
        level = level.aggregate(&assignment);
    }
    dense_labels(&membership)
}

/// One Louvain level: a weighted graph whose nodes are the previous
/// level's communities. Intra-community weight is kept as self-loops.
struct Level {
    adj: Vec<BTreeMap<usize, f64>>,
    loops: Vec<f64>,
}

impl Level {
    fn empty(size: usize) -> Self {
        Level {
            adj: vec![BTreeMap::new(); size],
            loops: vec![0.0; size],
        }
    }

    fn from_graph(g: &UnGraph<(), ()>) -> Self {
        let mut level = Level::empty(g.node_count());
        for edge in g.raw_edges() {
            level.link(edge.source().index(), edge.target().index(), 1.0);
        }
        level
    }

    fn link(&mut self, a: usize, b: usize, weight: f64) {
        if a == b {
            self.loops[a] += weight;
        } else {
            *self.adj[a].entry(b).or_insert(0.0) += weight;
            *self.adj[b].entry(a).or_insert(0.0) += weight;
        }
    }

    fn degree(&self, i: usize) -> f64 {
        self.adj[i].values().sum::<f64>() + 2.0 * self.loops[i]
    }

    /// Move nodes between communities until no move improves modularity.
    /// Returns dense community labels, or `None` if nothing moved.
    fn local_moves(&self) -> Option<Vec<usize>> {
        let n = self.adj.len();
        let k: Vec<f64> = (0..n).map(|i| self.degree(i)).collect();
        let m2: f64 = k.iter().sum();
        if m2 == 0.0 {
            return None;
        }

        let mut community: Vec<usize> = (0..n).collect();
        let mut totals = k.clone();
        let mut moved_any = false;
        loop {
            let mut moved = false;
            for i in 0..n {
                let own = community[i];
                totals[own] -= k[i];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for (&j, &w) in &self.adj[i] {
                    *links.entry(community[j]).or_insert(0.0) += w;
                }
                let gain = |c: usize, totals: &[f64]| {
                    links.get(&c).copied().unwrap_or(0.0) - totals[c] * k[i] / m2
                };

                let mut best = own;
                let mut best_gain = gain(own, &totals);
                for &c in links.keys() {
                    if c == own {
                        continue;
                    }
                    let g = gain(c, &totals);
                    if g > best_gain {
                        best = c;
                        best_gain = g;
                    }
                }

                totals[best] += k[i];
                if best != own {
                    community[i] = best;
                    moved = true;
                }
            }
            if !moved {
                break;
            }
            moved_any = true;
        }
        moved_any.then(|| dense_labels(&community))
    }

    fn aggregate(&self, assignment: &[usize]) -> Level {
        let size = assignment.iter().max().map_or(0, |m| m + 1);
        let mut next = Level::empty(size);
        for (i, neighbors) in self.adj.iter().enumerate() {
            next.loops[assignment[i]] += self.loops[i];
            for (&j, &w) in neighbors.range(i + 1..) {
                next.link(assignment[i], assignment[j], w);
            }
        }
        next
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentInfo {
    pub component_id: usize,
    pub size: usize,
    pub recipe_count: usize,
    pub ingredient_count: usize,
    pub recipe_ratio: f64,
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub num_components: usize,
    pub components: Vec<ComponentInfo>,
    pub largest_component_size: usize,
    pub smallest_component_size: usize,
}

/// Break the graph into connected components.
pub fn component_report(graph: &BipartiteGraph) -> Result<ComponentReport> {
    let labels = component_labels(&to_petgraph(graph)?);
    let mut components: Vec<ComponentInfo> = Vec::new();
    for (node, &label) in graph.nodes.iter().zip(&labels) {
        if components.len() <= label {
            components.push(ComponentInfo {
                component_id: label,
                size: 0,
                recipe_count: 0,
                ingredient_count: 0,
                recipe_ratio: 0.0,
                nodes: Vec::new(),
            });
        }
        let c = &mut components[label];
        c.size += 1;
        match node.node_type {
            NodeType::Recipe => c.recipe_count += 1,
            NodeType::Ingredient => c.ingredient_count += 1,
        }
        c.nodes.push(node.id.clone());
    }
    for c in &mut components {
        c.recipe_ratio = c.recipe_count as f64 / c.size as f64;
    }

    Ok(ComponentReport {
        num_components: components.len(),
        largest_component_size: components.iter().map(|c| c.size).max().unwrap_or(0),
        smallest_component_size: components.iter().map(|c| c.size).min().unwrap_or(0),
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cocktail_graph_core::catalog::build_catalog;
    use cocktail_graph_core::graph::{bridge_recipes, same_vibe, GraphEdge, GraphNode};
    use cocktail_graph_core::models::{Catalog, RawRecipeRecord};

    fn catalog_of(recipes: &[(&str, &str)]) -> Catalog {
        let records: Vec<RawRecipeRecord> = recipes
            .iter()
            .map(|(name, text)| {
                let mut r = RawRecipeRecord::new(format!("urn:iba/{}", name.replace(' ', "_")));
                r.raw_ingredient_text = Some((*text).into());
                r
            })
            .collect();
        build_catalog(&records)
    }

    fn graph() -> BipartiteGraph {
        BipartiteGraph::from_catalog(&catalog_of(&[
            ("Mojito", "* White Rum\n* Lime Juice\n* Mint"),
            ("Daiquiri", "* White Rum\n* Lime Juice"),
            ("Negroni", "* Gin\n* Campari"),
        ]))
    }

    /// Two tight rum and gin families joined by one recipe using both spirits.
    fn two_families() -> Catalog {
        catalog_of(&[
            ("Mojito", "* White Rum\n* Lime Juice\n* Sugar"),
            ("Daiquiri", "* White Rum\n* Lime Juice\n* Sugar"),
            ("Cuba Libre", "* White Rum\n* Lime Juice\n* Sugar"),
            ("Negroni", "* Gin\n* Sweet Vermouth\n* Bitters"),
            ("Martinez", "* Gin\n* Sweet Vermouth\n* Bitters"),
            ("Gin Fizz", "* Gin\n* Sweet Vermouth\n* Bitters"),
            ("Rum Gin", "* White Rum\n* Gin"),
        ])
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_degree_centrality() {
        let g = graph();
        let analysis = PetgraphAnalytics.analyze(&g).unwrap();
        // 3 recipes + 5 ingredients = 8 nodes.
        assert_eq!(analysis.centrality.len(), 8);
        assert!(close(analysis.centrality["recipe:mojito"], 3.0 / 7.0));
        assert!(close(analysis.centrality["ingredient:white_rum"], 2.0 / 7.0));
        assert!(close(analysis.centrality["ingredient:gin"], 1.0 / 7.0));
    }

    #[test]
    fn test_betweenness_and_closeness_on_a_path() {
        // white_rum - daiquiri - lime_juice - gimlet - gin
        let g = BipartiteGraph::from_catalog(&catalog_of(&[
            ("Daiquiri", "* White Rum\n* Lime Juice"),
            ("Gimlet", "* Gin\n* Lime Juice"),
        ]));
        let analysis = PetgraphAnalytics.analyze(&g).unwrap();

        assert!(close(analysis.betweenness["ingredient:lime_juice"], 2.0 / 3.0));
        assert!(close(analysis.betweenness["recipe:daiquiri"], 0.5));
        assert!(close(analysis.betweenness["ingredient:white_rum"], 0.0));

        assert!(close(analysis.closeness["ingredient:lime_juice"], 4.0 / 6.0));
        assert!(close(analysis.closeness["recipe:gimlet"], 4.0 / 7.0));
        assert!(close(analysis.closeness["ingredient:gin"], 0.4));
    }

    #[test]
    fn test_closeness_scales_by_reachable_share() {
        let analysis = PetgraphAnalytics.analyze(&graph()).unwrap();
        // Negroni reaches 2 of 7 other nodes, each at distance 1.
        assert!(close(analysis.closeness["recipe:negroni"], 1.0 * (2.0 / 7.0)));
        assert!(analysis.closeness["recipe:mojito"] > analysis.closeness["recipe:daiquiri"]);
    }

    #[test]
    fn test_communities_stay_within_components() {
        let g = graph();
        let analysis = PetgraphAnalytics.analyze(&g).unwrap();
        assert_eq!(analysis.communities["recipe:mojito"], 0);
        assert_eq!(analysis.communities["recipe:daiquiri"], 0);
        assert_eq!(analysis.communities["ingredient:mint"], 0);
        assert_eq!(analysis.communities["recipe:negroni"], 1);
        assert_eq!(analysis.communities["ingredient:campari"], 1);
    }

    #[test]
    fn test_communities_split_a_connected_graph() {
        let catalog = two_families();
        let g = BipartiteGraph::from_catalog(&catalog);
        let analysis = PetgraphAnalytics.analyze(&g).unwrap();

        assert_eq!(component_report(&g).unwrap().num_components, 1);

        let label = |id: &str| analysis.communities[id];
        assert_eq!(label("recipe:mojito"), label("recipe:daiquiri"));
        assert_eq!(label("recipe:mojito"), label("ingredient:lime_juice"));
        assert_eq!(label("recipe:negroni"), label("ingredient:bitters"));
        assert_ne!(label("recipe:mojito"), label("recipe:negroni"));
        assert_ne!(label("ingredient:white_rum"), label("ingredient:gin"));

        // The connecting recipe carries the shortest paths between families.
        let top = analysis.betweenness["recipe:rum-gin"];
        assert!(analysis.betweenness.values().all(|&b| b <= top + 1e-12));

        let bridges = bridge_recipes(&catalog, &analysis, 5);
        assert_eq!(bridges.len(), 1);
        assert_eq!(bridges[0].recipe.id, "rum-gin");

        let vibe: Vec<&str> = same_vibe(&catalog, &analysis, "Mojito", 10)
            .unwrap()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(vibe, vec!["daiquiri", "cuba-libre"]);
    }

    #[test]
    fn test_communities_are_deterministic() {
        let g = BipartiteGraph::from_catalog(&two_families());
        let a = PetgraphAnalytics.analyze(&g).unwrap();
        let b = PetgraphAnalytics.analyze(&g).unwrap();
        assert_eq!(a.communities, b.communities);
        assert_eq!(a.communities["recipe:mojito"], 0);
    }

    #[test]
    fn test_component_report() {
        let report = component_report(&graph()).unwrap();
        assert_eq!(report.num_components, 2);
        assert_eq!(report.largest_component_size, 5);
        assert_eq!(report.smallest_component_size, 3);
        assert_eq!(report.components[1].recipe_count, 1);
        assert_eq!(report.components[1].ingredient_count, 2);
    }

    #[test]
    fn test_dangling_edge_rejected() {
        let g = BipartiteGraph {
            nodes: vec![GraphNode {
                id: "recipe:a".into(),
                name: "A".into(),
                node_type: NodeType::Recipe,
            }],
            edges: vec![GraphEdge {
                source: "recipe:a".into(),
                target: "ingredient:missing".into(),
            }],
        };
        assert!(PetgraphAnalytics.analyze(&g).is_err());
        assert!(component_report(&g).is_err());
    }

    #[test]
    fn test_empty_and_single_node() {
        let empty = PetgraphAnalytics.analyze(&BipartiteGraph::default()).unwrap();
        assert!(empty.centrality.is_empty());
        assert!(empty.communities.is_empty());

        let single = BipartiteGraph {
            nodes: vec![GraphNode {
                id: "recipe:a".into(),
                name: "A".into(),
                node_type: NodeType::Recipe,
            }],
            edges: vec![],
        };
        let analysis = PetgraphAnalytics.analyze(&single).unwrap();
        assert_eq!(analysis.centrality["recipe:a"], 1.0);
        assert_eq!(analysis.betweenness["recipe:a"], 0.0);
        assert_eq!(analysis.closeness["recipe:a"], 0.0);
        assert_eq!(analysis.communities["recipe:a"], 0);
    }
}
