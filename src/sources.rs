//! Graph store selection, catalog loading, and the `mix sources` listing.

use std::sync::Arc;

use anyhow::Result;
use cocktail_graph_core::catalog::CatalogBuilder;
use cocktail_graph_core::models::Catalog;
use cocktail_graph_core::store::GraphStore;

use crate::config::{Config, SourceKind};
use crate::connector_json::JsonGraphStore;
use crate::connector_ntriples::NTriplesGraphStore;
use crate::connector_sparql::SparqlGraphStore;

/// Build the graph store named by `[source]`.
///
/// Relies on [`load_config`](crate::config::load_config) having checked
/// that the kind's required fields are present.
pub fn connector_for(config: &Config) -> Result<Box<dyn GraphStore>> {
    let source = &config.source;
    let store: Box<dyn GraphStore> = match source.kind {
        SourceKind::Ntriples => Box::new(NTriplesGraphStore::new(required_path(config)?)),
        SourceKind::Json => Box::new(JsonGraphStore::new(required_path(config)?)),
        SourceKind::Sparql => {
            let endpoint = source
                .endpoint
                .clone()
                .ok_or_else(|| anyhow::anyhow!("source.endpoint not configured"))?;
            Box::new(SparqlGraphStore::new(
                endpoint,
                source.graph.clone(),
                source.timeout_secs,
            )?)
        }
    };
    Ok(store)
}

fn required_path(config: &Config) -> Result<std::path::PathBuf> {
    config
        .source
        .path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("source.path not configured"))
}

/// One row of `mix sources`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub kind: &'static str,
    pub location: String,
    pub status: &'static str,
}

pub fn source_status(config: &Config) -> SourceStatus {
    let source = &config.source;
    match source.kind {
        SourceKind::Ntriples | SourceKind::Json => {
            let (location, status) = match &source.path {
                Some(path) if path.is_file() => (path.display().to_string(), "OK"),
                Some(path) => (path.display().to_string(), "MISSING"),
                None => (String::new(), "NOT CONFIGURED"),
            };
            SourceStatus {
                kind: source.kind.as_str(),
                location,
                status,
            }
        }
        SourceKind::Sparql => SourceStatus {
            kind: source.kind.as_str(),
            location: source.endpoint.clone().unwrap_or_default(),
            status: "REMOTE",
        },
    }
}

pub fn list_sources(config: &Config) -> Result<()> {
    let row = source_status(config);
    println!("{:<10} {:<16} LOCATION", "SOURCE", "STATUS");
    println!("{:<10} {:<16} {}", row.kind, row.status, row.location);
    Ok(())
}

/// Catalog builder over the configured graph store.
pub fn open_builder(config: &Config) -> Result<CatalogBuilder<Box<dyn GraphStore>>> {
    Ok(CatalogBuilder::new(connector_for(config)?))
}

/// Build the catalog once, for one-shot CLI commands.
pub async fn load_catalog(config: &Config) -> Result<Arc<Catalog>> {
    let builder = open_builder(config)?;
    Ok(builder.catalog().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml_str: &str) -> Config {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_source_status_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iba.nt");
        let cfg = config(&format!(
            "[source]\nkind = \"ntriples\"\npath = \"{}\"\n",
            path.display()
        ));
        assert_eq!(source_status(&cfg).status, "MISSING");

        std::fs::write(&path, "").unwrap();
        let status = source_status(&cfg);
        assert_eq!(status.kind, "ntriples");
        assert_eq!(status.status, "OK");
    }

    #[test]
    fn test_source_status_sparql() {
        let cfg = config("[source]\nkind = \"sparql\"\nendpoint = \"https://dbpedia.org/sparql\"\n");
        let status = source_status(&cfg);
        assert_eq!(status.status, "REMOTE");
        assert_eq!(status.location, "https://dbpedia.org/sparql");
        assert_eq!(connector_for(&cfg).unwrap().name(), "sparql");
    }

    #[tokio::test]
    async fn test_load_catalog_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.json");
        std::fs::write(
            &path,
            r#"[{"recipeUri": "urn:iba/Gimlet", "rawIngredientText": "* 60 ml Gin\n* 15 ml Lime juice"}]"#,
        )
        .unwrap();
        let cfg = config(&format!(
            "[source]\nkind = \"json\"\npath = \"{}\"\n",
            path.display()
        ));
        let catalog = load_catalog(&cfg).await.unwrap();
        assert_eq!(catalog.recipes[0].name, "Gimlet");
        assert_eq!(catalog.recipes[0].parsed_ingredients, vec!["Gin", "Lime Juice"]);
    }
}
