//! SPARQL endpoint graph store.
//!
//! Sends one `SELECT` to the configured endpoint and maps the
//! `application/sparql-results+json` bindings to raw recipe records.
//! Multi-valued fields (categories, images) are folded server-side with
//! `GROUP_CONCAT` so each recipe arrives as a single row.
//!
//! The request timeout comes from `[source].timeout_secs`. There is no
//! retry: a failed request fails the current catalog build and the
//! builder keeps serving its previous catalog.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use cocktail_graph_core::models::RawRecipeRecord;
use cocktail_graph_core::store::GraphStore;
use serde::Deserialize;
use tracing::debug;

use crate::vocab;

/// Separator for `GROUP_CONCAT`; `|` cannot appear unescaped in an IRI.
const LIST_SEPARATOR: &str = "|";

pub struct SparqlGraphStore {
    endpoint: String,
    graph: Option<String>,
    client: reqwest::Client,
}

impl SparqlGraphStore {
    pub fn new(endpoint: impl Into<String>, graph: Option<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            graph,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The recipe query sent to the endpoint.
    pub fn query(&self) -> String {
        let from = self
            .graph
            .as_deref()
            .map(|g| format!("FROM <{}>\n", g))
            .unwrap_or_default();
        format!(
            r#"PREFIX dbp: <{dbp}>
PREFIX dbo: <{dbo}>
PREFIX rdfs: <{rdfs}>
PREFIX dct: <{dct}>
PREFIX foaf: <{foaf}>
SELECT ?recipe ?ingredients ?label ?labelFr ?desc ?descFr ?prep ?served ?garnish ?sourcelink
       (GROUP_CONCAT(DISTINCT STR(?subject); separator="{sep}") AS ?categories)
       (GROUP_CONCAT(DISTINCT STR(?img); separator="{sep}") AS ?images)
{from}WHERE {{
  ?recipe dbp:ingredients ?ingredients .
  OPTIONAL {{ ?recipe rdfs:label ?label . FILTER(lang(?label) = "en") }}
  OPTIONAL {{ ?recipe rdfs:label ?labelFr . FILTER(lang(?labelFr) = "fr") }}
  OPTIONAL {{ ?recipe dbo:description ?desc . FILTER(lang(?desc) = "en") }}
  OPTIONAL {{ ?recipe dbo:description ?descFr . FILTER(lang(?descFr) = "fr") }}
  OPTIONAL {{ ?recipe dbp:prep ?prep }}
  OPTIONAL {{ ?recipe dbp:served ?served }}
  OPTIONAL {{ ?recipe dbp:garnish ?garnish }}
  OPTIONAL {{ ?recipe dbp:sourcelink ?sourcelink }}
  OPTIONAL {{ ?recipe dct:subject ?subject }}
  OPTIONAL {{ ?recipe foaf:depiction ?img }}
}}
GROUP BY ?recipe ?ingredients ?label ?labelFr ?desc ?descFr ?prep ?served ?garnish ?sourcelink
ORDER BY ?recipe"#,
            dbp = vocab::DBP,
            dbo = vocab::DBO,
            rdfs = vocab::RDFS,
            dct = vocab::DCT,
            foaf = vocab::FOAF,
            sep = LIST_SEPARATOR,
            from = from,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SparqlResults {
    pub results: SparqlBindings,
}

#[derive(Debug, Deserialize)]
pub struct SparqlBindings {
    pub bindings: Vec<HashMap<String, SparqlValue>>,
}

#[derive(Debug, Deserialize)]
pub struct SparqlValue {
    pub value: String,
}

/// Map result rows to records, keeping endpoint order.
///
/// Rows without a `recipe` binding are skipped.
pub fn records_from_bindings(results: SparqlResults) -> Vec<RawRecipeRecord> {
    results
        .results
        .bindings
        .into_iter()
        .filter_map(|mut row| {
            let uri = row.remove("recipe")?.value;
            let mut take = |var: &str| row.remove(var).map(|v| v.value).filter(|v| !v.is_empty());

            let mut record = RawRecipeRecord::new(uri);
            record.raw_ingredient_text = take("ingredients");
            if let Some(label) = take("label") {
                record.labels.insert("en".into(), label);
            }
            if let Some(label) = take("labelFr") {
                record.labels.insert("fr".into(), label);
            }
            if let Some(desc) = take("desc") {
                record.descriptions.insert("en".into(), desc);
            }
            if let Some(desc) = take("descFr") {
                record.descriptions.insert("fr".into(), desc);
            }
            record.preparation = take("prep");
            record.served = take("served");
            record.garnish = take("garnish");
            record.source_link = take("sourcelink");
            record.categories = split_list(take("categories"));
            record.images = split_list(take("images"));
            Some(record)
        })
        .collect()
}

fn split_list(joined: Option<String>) -> Vec<String> {
    joined
        .map(|s| {
            s.split(LIST_SEPARATOR)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl GraphStore for SparqlGraphStore {
    fn name(&self) -> &str {
        "sparql"
    }

    async fn query_recipes(&self) -> Result<Vec<RawRecipeRecord>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/sparql-results+json")
            .form(&[("query", self.query())])
            .send()
            .await
            .with_context(|| format!("SPARQL request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("SPARQL endpoint error {}: {}", status, body_text);
        }

        let results: SparqlResults = response
            .json()
            .await
            .with_context(|| "Invalid SPARQL JSON results")?;
        let records = records_from_bindings(results);
        debug!(endpoint = %self.endpoint, records = records.len(), "SPARQL query complete");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_from_bindings() {
        let json = r#"{
          "head": {"vars": ["recipe", "ingredients", "label"]},
          "results": {"bindings": [
            {
              "recipe": {"type": "uri", "value": "http://dbpedia.org/resource/Negroni"},
              "ingredients": {"type": "literal", "value": "* 30 ml Gin\n* 30 ml Campari"},
              "label": {"type": "literal", "xml:lang": "en", "value": "Negroni"},
              "categories": {"type": "literal", "value": "http://x/Cat:A|http://x/Cat:B"},
              "images": {"type": "literal", "value": ""}
            },
            {"ingredients": {"type": "literal", "value": "orphan row"}}
          ]}
        }"#;
        let results: SparqlResults = serde_json::from_str(json).unwrap();
        let records = records_from_bindings(results);
        assert_eq!(records.len(), 1);
        let negroni = &records[0];
        assert_eq!(negroni.display_name(), "Negroni");
        assert_eq!(negroni.categories, vec!["http://x/Cat:A", "http://x/Cat:B"]);
        assert!(negroni.images.is_empty());
        assert!(negroni.preparation.is_none());
    }

    #[test]
    fn test_query_shape() {
        let store = SparqlGraphStore::new("https://dbpedia.org/sparql", Some("http://dbpedia.org".into()), 5).unwrap();
        let q = store.query();
        assert!(q.contains("FROM <http://dbpedia.org>"));
        assert!(q.contains("?recipe dbp:ingredients ?ingredients"));
        assert!(q.contains("ORDER BY ?recipe"));

        let store = SparqlGraphStore::new("https://dbpedia.org/sparql", None, 5).unwrap();
        assert!(!store.query().contains("FROM"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails() {
        let store = SparqlGraphStore::new("http://127.0.0.1:9/sparql", None, 2).unwrap();
        assert!(store.query_recipes().await.is_err());
    }
}
