//! Export the catalog as JSON and the recipe/ingredient graph as JSON or
//! GEXF (for Gephi).
//!
//! Every writer takes an optional output path; without one the document
//! goes to stdout for piping and the summary line goes to stderr.

use std::io::Cursor;
use std::path::Path;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use cocktail_graph_core::graph::{BipartiteGraph, NodeType};
use cocktail_graph_core::models::{Catalog, Ingredient, Recipe};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::Serialize;

use crate::config::Config;
use crate::sources::load_catalog;

#[derive(Serialize)]
struct ExportData<'a> {
    built_at: DateTime<Utc>,
    fingerprint: String,
    recipes: &'a [Recipe],
    ingredients: &'a [Ingredient],
}

/// Serialize a catalog (recipes, ingredients, build metadata).
pub fn catalog_json(catalog: &Catalog) -> Result<String> {
    let data = ExportData {
        built_at: catalog.built_at,
        fingerprint: catalog.fingerprint(),
        recipes: &catalog.recipes,
        ingredients: &catalog.ingredients,
    };
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Render the graph as GEXF 1.2 with a `type` node attribute.
pub fn graph_gexf(graph: &BipartiteGraph) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut gexf = BytesStart::new("gexf");
    gexf.push_attribute(("xmlns", "http://www.gexf.net/1.2draft"));
    gexf.push_attribute(("version", "1.2"));
    writer.write_event(Event::Start(gexf))?;

    let mut g = BytesStart::new("graph");
    g.push_attribute(("mode", "static"));
    g.push_attribute(("defaultedgetype", "undirected"));
    writer.write_event(Event::Start(g))?;

    let mut attributes = BytesStart::new("attributes");
    attributes.push_attribute(("class", "node"));
    writer.write_event(Event::Start(attributes))?;
    let mut attribute = BytesStart::new("attribute");
    attribute.push_attribute(("id", "0"));
    attribute.push_attribute(("title", "type"));
    attribute.push_attribute(("type", "string"));
    writer.write_event(Event::Empty(attribute))?;
    writer.write_event(Event::End(BytesEnd::new("attributes")))?;

    writer.write_event(Event::Start(BytesStart::new("nodes")))?;
    for node in &graph.nodes {
        let mut n = BytesStart::new("node");
        n.push_attribute(("id", node.id.as_str()));
        n.push_attribute(("label", node.name.as_str()));
        writer.write_event(Event::Start(n))?;
        writer.write_event(Event::Start(BytesStart::new("attvalues")))?;
        let mut value = BytesStart::new("attvalue");
        value.push_attribute(("for", "0"));
        value.push_attribute(("value", node_type_name(node.node_type)));
        writer.write_event(Event::Empty(value))?;
        writer.write_event(Event::End(BytesEnd::new("attvalues")))?;
        writer.write_event(Event::End(BytesEnd::new("node")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("nodes")))?;

    writer.write_event(Event::Start(BytesStart::new("edges")))?;
    for (i, edge) in graph.edges.iter().enumerate() {
        let id = i.to_string();
        let mut e = BytesStart::new("edge");
        e.push_attribute(("id", id.as_str()));
        e.push_attribute(("source", edge.source.as_str()));
        e.push_attribute(("target", edge.target.as_str()));
        writer.write_event(Event::Empty(e))?;
    }
    writer.write_event(Event::End(BytesEnd::new("edges")))?;

    writer.write_event(Event::End(BytesEnd::new("graph")))?;
    writer.write_event(Event::End(BytesEnd::new("gexf")))?;

    Ok(String::from_utf8(writer.into_inner().into_inner())?)
}

fn node_type_name(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Recipe => "recipe",
        NodeType::Ingredient => "ingredient",
    }
}

/// Write `content` to `output`, or to stdout when `output` is `None`.
pub fn write_output(content: &str, output: Option<&Path>, summary: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, content)?;
            eprintln!("{} to {}", summary, path.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

/// `mix export`: dump the catalog as JSON.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let json = catalog_json(&catalog)?;
    let summary = format!(
        "Exported {} recipes, {} ingredients",
        catalog.recipes.len(),
        catalog.ingredients.len()
    );
    write_output(&json, output, &summary)
}

/// `mix graph export`: dump the bipartite graph as `json` or `gexf`.
pub async fn run_graph_export(config: &Config, format: &str, output: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(config).await?;
    let graph = BipartiteGraph::from_catalog(&catalog);
    let content = match format {
        "json" => serde_json::to_string_pretty(&graph)?,
        "gexf" => graph_gexf(&graph)?,
        other => bail!("Unknown graph format: '{}'. Must be json or gexf.", other),
    };
    let summary = format!(
        "Exported {} nodes, {} edges",
        graph.nodes.len(),
        graph.edges.len()
    );
    write_output(&content, output, &summary)
}
