use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use cocktail_graph::config::Config;
use cocktail_graph::connector_ntriples::{parse_ntriples, records_from_triples};
use cocktail_graph::server::{router, AppState};
use cocktail_graph_core::catalog::CatalogBuilder;
use cocktail_graph_core::store::memory::InMemoryGraphStore;
use cocktail_graph_core::store::GraphStore;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const SAMPLE_NT: &str = include_str!("../data/iba_sample.nt");

fn config() -> Config {
    toml::from_str(
        r#"
[source]
kind = "ntriples"
path = "unused.nt"

[planner]
default_budget = 1
"#,
    )
    .unwrap()
}

fn sample_store() -> Arc<InMemoryGraphStore> {
    let records = records_from_triples(&parse_ntriples(SAMPLE_NT).unwrap());
    Arc::new(InMemoryGraphStore::new(records))
}

fn app(store: Arc<InMemoryGraphStore>) -> Router {
    let boxed: Box<dyn GraphStore> = Box::new(store);
    router(AppState::new(config(), CatalogBuilder::new(boxed)))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_reports_catalog_status() {
    let app = app(sample_store());
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["catalog"]["ready"], false);

    send(&app, Method::GET, "/stats", None).await;
    let (_, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(body["catalog"]["ready"], true);
    assert_eq!(body["catalog"]["recipe_count"], 6);
}

#[tokio::test]
async fn test_cold_start_failure_is_503() {
    let store = sample_store();
    store.set_failing(true);
    let app = app(store);

    let (status, body) = send(&app, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "data_unavailable");
}

#[tokio::test]
async fn test_recipe_lookup() {
    let app = app(sample_store());

    let (status, body) = send(&app, Method::GET, "/recipes/tom-collins", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Tom Collins");
    assert_eq!(body["parsed_ingredients"][1], "Lemon Juice");

    let (status, body) = send(&app, Method::GET, "/recipes/zombie", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_recipe_search_by_ingredient() {
    let app = app(sample_store());
    let (status, body) = send(&app, Method::GET, "/recipes?ingredients=gin,soda%20water", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Tom Collins"]);
}

#[tokio::test]
async fn test_similar_recipes() {
    let app = app(sample_store());
    let (status, body) = send(&app, Method::GET, "/recipes/daiquiri/similar?limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    // Cuba Libre shares 2 of 4 ingredients; Mojito 2 of 6.
    assert_eq!(body[0]["name"], "Cuba Libre");
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ingredient_search() {
    let app = app(sample_store());
    let (status, body) = send(&app, Method::GET, "/ingredients?q=fresh%20lime", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["canonical_name"], "Lime Juice");
    assert_eq!(body[0]["usage_count"], 4);

    let (_, body) = send(&app, Method::GET, "/ingredients?q=JUICE", None).await;
    assert_eq!(body[0]["canonical_name"], "Lime Juice");
    assert_eq!(body[1]["canonical_name"], "Lemon Juice");

    let (_, body) = send(&app, Method::GET, "/ingredients?limit=2", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_same_vibe() {
    let app = app(sample_store());
    let (status, body) = send(&app, Method::GET, "/recipes/daiquiri/same-vibe", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cuba Libre"]);

    let (status, _) = send(&app, Method::GET, "/recipes/zombie/same-vibe", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bridge_recipes() {
    let app = app(sample_store());
    let (status, body) = send(&app, Method::GET, "/graph/bridges", None).await;
    assert_eq!(status, StatusCode::OK);
    let spans: Vec<(&str, usize)> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|b| {
            (
                b["name"].as_str().unwrap(),
                b["communities"].as_array().unwrap().len(),
            )
        })
        .collect();
    assert_eq!(spans, vec![("Mojito", 3), ("Tom Collins", 3), ("Margarita", 2)]);

    let (_, body) = send(&app, Method::GET, "/graph/bridges?limit=1", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_planner_endpoints() {
    let app = app(sample_store());

    let (status, body) = send(&app, Method::POST, "/planner/party", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["budget"], 1);
    assert_eq!(body["selected_ingredients"], json!(["Lime Juice"]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/planner/impact",
        Some(json!({ "budget": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "impact");
    assert!(!body["covered_recipes"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        Method::POST,
        "/planner/playlist",
        Some(json!({ "recipes": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _) = send(
        &app,
        Method::POST,
        "/planner/shopping",
        Some(json!({ "recipes": ["Zombie"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_inventory_and_feasibility() {
    let app = app(sample_store());

    let (status, _) = send(&app, Method::GET, "/feasible/alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        "/inventory/alice",
        Some(json!({ "ingredients": ["Gin", "Campari", "sweet red vermouth", "soda water"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ingredients"], json!(["Campari", "Gin", "Soda Water", "Sweet Vermouth"]));

    let (_, body) = send(&app, Method::GET, "/feasible/alice", None).await;
    assert_eq!(body[0]["name"], "Negroni");

    let (_, body) = send(&app, Method::GET, "/almost-feasible/alice", None).await;
    assert_eq!(body[0]["name"], "Tom Collins");
    assert_eq!(body[0]["missing"], json!(["Lemon Juice", "Syrup"]));
}

#[tokio::test]
async fn test_graph_endpoints() {
    let app = app(sample_store());

    let (status, body) = send(&app, Method::GET, "/graph/components", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["num_components"], 1);

    let (status, body) = send(&app, Method::GET, "/graph/analysis", None).await;
    assert_eq!(status, StatusCode::OK);
    let lime = body["centrality"]["ingredient:lime_juice"].as_f64().unwrap();
    let mint = body["centrality"]["ingredient:mint"].as_f64().unwrap();
    assert!(lime > mint);
    // Mint hangs off the Mojito only, so no shortest path runs through it.
    assert_eq!(body["betweenness"]["ingredient:mint"], 0.0);
    assert!(body["closeness"]["ingredient:lime_juice"].as_f64().unwrap() > 0.0);
    // One component, several communities.
    let labels: std::collections::BTreeSet<u64> = body["communities"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_u64().unwrap())
        .collect();
    assert!(labels.len() > 1);

    let response = app
        .clone()
        .oneshot(Request::get("/graph/gexf").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/xml"
    );
}

#[tokio::test]
async fn test_failed_rebuild_keeps_serving() {
    let store = sample_store();
    let app = app(store.clone());

    let (status, _) = send(&app, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);

    store.set_failing(true);
    let (status, body) = send(&app, Method::POST, "/catalog/rebuild", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "data_unavailable");

    let (status, body) = send(&app, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_recipes"], 6);

    let (_, body) = send(&app, Method::GET, "/catalog/status", None).await;
    assert_eq!(body["generation"], 1);
    assert!(body["last_error"]["message"].is_string());
}

#[tokio::test]
async fn test_invalidate_triggers_rebuild() {
    let store = sample_store();
    let app = app(store.clone());

    send(&app, Method::GET, "/stats", None).await;
    let (_, body) = send(&app, Method::POST, "/catalog/invalidate", None).await;
    assert_eq!(body["stale"], true);

    send(&app, Method::GET, "/stats", None).await;
    assert_eq!(store.query_count(), 2);
}
