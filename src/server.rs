//! JSON HTTP API over the catalog, the planner, and per-user inventories.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check with catalog status |
//! | `GET`  | `/recipes?q=&ingredients=a,b` | Recipe search |
//! | `GET`  | `/recipes/{id}` | One recipe by id, URI, or name |
//! | `GET`  | `/recipes/{id}/similar?limit=` | Recipes sharing ingredients |
//! | `GET`  | `/recipes/{id}/same-vibe?limit=` | Recipes in the same community |
//! | `GET`  | `/ingredients?q=&limit=` | Ingredient search, by usage |
//! | `GET`  | `/stats` | Catalog statistics |
//! | `POST` | `/planner/party` | `{ "budget": 5 }` |
//! | `POST` | `/planner/playlist` | `{ "recipes": ["Mojito"] }` |
//! | `POST` | `/planner/impact` | `{ "budget": 5 }` |
//! | `POST` | `/planner/shopping` | `{ "recipes": ["Mojito"] }` |
//! | `GET`/`PUT` | `/inventory/{user}` | Read or replace a user's inventory |
//! | `GET`  | `/feasible/{user}` | Recipes the user can make |
//! | `GET`  | `/almost-feasible/{user}` | Recipes one or two ingredients short |
//! | `GET`  | `/graph` | Bipartite graph as JSON |
//! | `GET`  | `/graph/gexf` | Bipartite graph as GEXF |
//! | `GET`  | `/graph/analysis` | Centrality scores and community labels |
//! | `GET`  | `/graph/components` | Connected-component report |
//! | `GET`  | `/graph/bridges?limit=` | Recipes spanning ingredient communities |
//! | `GET`  | `/catalog/status` | Cache status |
//! | `POST` | `/catalog/rebuild` | Force a rebuild |
//! | `POST` | `/catalog/invalidate` | Mark the cache stale |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "recipe not found: Zombie" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `data_unavailable` (503), `internal` (500).
//!
//! Inventories live in memory and are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use cocktail_graph_core::catalog::{CatalogBuilder, CatalogStatus};
use cocktail_graph_core::error::CatalogError;
use cocktail_graph_core::feasibility::{almost_feasible, feasible, Inventory};
use cocktail_graph_core::graph::{
    bridge_recipes, same_vibe, BipartiteGraph, GraphAnalysis, GraphAnalytics,
};
use cocktail_graph_core::models::{Catalog, Ingredient, Recipe};
use cocktail_graph_core::planner::{Plan, Planner, ShoppingList};
use cocktail_graph_core::search::{
    catalog_stats, recipes_with_ingredients, search_ingredients, search_recipes, similar_recipes,
    CatalogStats,
};
use cocktail_graph_core::store::GraphStore;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::analytics::{component_report, ComponentReport, PetgraphAnalytics};
use crate::config::Config;
use crate::export::graph_gexf;
use crate::sources::open_builder;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    catalog: Arc<CatalogBuilder<Box<dyn GraphStore>>>,
    inventories: Arc<RwLock<HashMap<String, Inventory>>>,
}

impl AppState {
    pub fn new(config: Config, catalog: CatalogBuilder<Box<dyn GraphStore>>) -> Self {
        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            inventories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn current(&self) -> Result<Arc<Catalog>, AppError> {
        Ok(self.catalog.catalog().await?)
    }
}

/// Build the router. Split from [`run_server`] so tests can drive it
/// without binding a socket.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/recipes", get(handle_recipes))
        .route("/recipes/{id}", get(handle_recipe))
        .route("/recipes/{id}/similar", get(handle_similar))
        .route("/recipes/{id}/same-vibe", get(handle_same_vibe))
        .route("/ingredients", get(handle_ingredients))
        .route("/stats", get(handle_stats))
        .route("/planner/party", post(handle_party))
        .route("/planner/playlist", post(handle_playlist))
        .route("/planner/impact", post(handle_impact))
        .route("/planner/shopping", post(handle_shopping))
        .route(
            "/inventory/{user}",
            get(handle_get_inventory).put(handle_put_inventory),
        )
        .route("/feasible/{user}", get(handle_feasible))
        .route("/almost-feasible/{user}", get(handle_almost_feasible))
        .route("/graph", get(handle_graph))
        .route("/graph/gexf", get(handle_graph_gexf))
        .route("/graph/analysis", get(handle_graph_analysis))
        .route("/graph/components", get(handle_graph_components))
        .route("/graph/bridges", get(handle_graph_bridges))
        .route("/catalog/status", get(handle_catalog_status))
        .route("/catalog/rebuild", post(handle_catalog_rebuild))
        .route("/catalog/invalidate", post(handle_catalog_invalidate))
        .layer(cors)
        .with_state(state)
}

/// `mix serve`: bind `[server].bind` and serve until the process exits.
///
/// The first catalog build is attempted up front so a broken source shows
/// in the log immediately; the server starts either way and answers 503
/// until a build succeeds.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let builder = open_builder(config)?;

    match builder.catalog().await {
        Ok(catalog) => tracing::info!(
            recipes = catalog.recipes.len(),
            ingredients = catalog.ingredients.len(),
            "catalog ready"
        ),
        Err(e) => tracing::warn!(error = %e, "initial catalog build failed"),
    }

    let app = router(AppState::new(config.clone(), builder));

    tracing::info!("listening on http://{}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(err: anyhow::Error) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: format!("{:#}", err),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    catalog: CatalogStatus,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog: state.catalog.status(),
    })
}

// ============ Recipes and ingredients ============

#[derive(Deserialize)]
struct RecipeQuery {
    q: Option<String>,
    /// Comma-separated ingredient names.
    ingredients: Option<String>,
}

#[derive(Serialize)]
struct RecipeSummary {
    id: String,
    name: String,
    ingredients: Vec<String>,
}

impl From<&Recipe> for RecipeSummary {
    fn from(recipe: &Recipe) -> Self {
        RecipeSummary {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            ingredients: recipe.parsed_ingredients.clone(),
        }
    }
}

async fn handle_recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    let catalog = state.current().await?;
    let by_name = search_recipes(&catalog, query.q.as_deref().unwrap_or(""));

    let wanted: Vec<&str> = query
        .ingredients
        .as_deref()
        .map(|s| s.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let hits: Vec<RecipeSummary> = if wanted.is_empty() {
        by_name.into_iter().map(RecipeSummary::from).collect()
    } else {
        let by_ingredient = recipes_with_ingredients(&catalog, &wanted);
        by_name
            .into_iter()
            .filter(|r| by_ingredient.iter().any(|o| o.uri == r.uri))
            .map(RecipeSummary::from)
            .collect()
    };
    Ok(Json(hits))
}

async fn handle_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, AppError> {
    let catalog = state.current().await?;
    catalog
        .recipe(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(format!("recipe not found: {}", id)))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct SimilarResponse {
    id: String,
    name: String,
    score: f64,
    shared_ingredients: Vec<String>,
}

async fn handle_similar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<SimilarResponse>>, AppError> {
    let catalog = state.current().await?;
    let limit = query.limit.unwrap_or(state.config.planner.similar_limit);
    let similar = similar_recipes(&catalog, &id, limit)
        .ok_or_else(|| not_found(format!("recipe not found: {}", id)))?;
    Ok(Json(
        similar
            .into_iter()
            .map(|s| SimilarResponse {
                id: s.recipe.id.clone(),
                name: s.recipe.name.clone(),
                score: s.score,
                shared_ingredients: s.shared_ingredients,
            })
            .collect(),
    ))
}

#[derive(Deserialize)]
struct IngredientQuery {
    q: Option<String>,
    limit: Option<usize>,
}

async fn handle_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let catalog = state.current().await?;
    let limit = query.limit.unwrap_or(usize::MAX);
    Ok(Json(
        search_ingredients(&catalog, query.q.as_deref().unwrap_or(""))
            .into_iter()
            .take(limit)
            .cloned()
            .collect(),
    ))
}

async fn handle_stats(State(state): State<AppState>) -> Result<Json<CatalogStats>, AppError> {
    let catalog = state.current().await?;
    Ok(Json(catalog_stats(&catalog)))
}

// ============ Planner ============

#[derive(Deserialize)]
struct BudgetRequest {
    budget: Option<i64>,
}

#[derive(Deserialize)]
struct RecipesRequest {
    recipes: Vec<String>,
}

async fn handle_party(
    State(state): State<AppState>,
    Json(req): Json<BudgetRequest>,
) -> Result<Json<Plan>, AppError> {
    let catalog = state.current().await?;
    let budget = req.budget.unwrap_or(state.config.planner.default_budget);
    Ok(Json(Planner::new(&catalog).party(budget)))
}

async fn handle_impact(
    State(state): State<AppState>,
    Json(req): Json<BudgetRequest>,
) -> Result<Json<Plan>, AppError> {
    let catalog = state.current().await?;
    let budget = req.budget.unwrap_or(state.config.planner.default_budget);
    Ok(Json(Planner::new(&catalog).impact(budget)))
}

async fn handle_playlist(
    State(state): State<AppState>,
    Json(req): Json<RecipesRequest>,
) -> Result<Json<Plan>, AppError> {
    if req.recipes.is_empty() {
        return Err(bad_request("recipes must not be empty"));
    }
    let catalog = state.current().await?;
    Ok(Json(Planner::new(&catalog).playlist(&req.recipes)))
}

async fn handle_shopping(
    State(state): State<AppState>,
    Json(req): Json<RecipesRequest>,
) -> Result<Json<ShoppingList>, AppError> {
    if req.recipes.is_empty() {
        return Err(bad_request("recipes must not be empty"));
    }
    let catalog = state.current().await?;
    Planner::new(&catalog)
        .shopping_list(&req.recipes)
        .map(Json)
        .ok_or_else(|| not_found("none of the requested recipes are in the catalog"))
}

// ============ Inventories ============

#[derive(Deserialize)]
struct InventoryRequest {
    ingredients: Vec<String>,
}

#[derive(Serialize)]
struct InventoryResponse {
    user: String,
    ingredients: Vec<String>,
}

async fn handle_put_inventory(
    State(state): State<AppState>,
    Path(user): Path<String>,
    Json(req): Json<InventoryRequest>,
) -> Json<InventoryResponse> {
    let inventory = Inventory::new(&req.ingredients);
    let ingredients = inventory.names();
    state.inventories.write().await.insert(user.clone(), inventory);
    tracing::debug!(%user, count = ingredients.len(), "inventory replaced");
    Json(InventoryResponse { user, ingredients })
}

async fn handle_get_inventory(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<InventoryResponse>, AppError> {
    let inventories = state.inventories.read().await;
    let inventory = inventories
        .get(&user)
        .ok_or_else(|| not_found(format!("no inventory for user: {}", user)))?;
    Ok(Json(InventoryResponse {
        ingredients: inventory.names(),
        user,
    }))
}

async fn user_inventory(state: &AppState, user: &str) -> Result<Inventory, AppError> {
    state
        .inventories
        .read()
        .await
        .get(user)
        .cloned()
        .ok_or_else(|| not_found(format!("no inventory for user: {}", user)))
}

async fn handle_feasible(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    let inventory = user_inventory(&state, &user).await?;
    let catalog = state.current().await?;
    Ok(Json(
        feasible(&catalog, &inventory)
            .into_iter()
            .map(RecipeSummary::from)
            .collect(),
    ))
}

#[derive(Serialize)]
struct NearMissResponse {
    id: String,
    name: String,
    missing: Vec<String>,
}

async fn handle_almost_feasible(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> Result<Json<Vec<NearMissResponse>>, AppError> {
    let inventory = user_inventory(&state, &user).await?;
    let catalog = state.current().await?;
    Ok(Json(
        almost_feasible(&catalog, &inventory)
            .into_iter()
            .map(|m| NearMissResponse {
                id: m.recipe.id.clone(),
                name: m.recipe.name.clone(),
                missing: m.missing,
            })
            .collect(),
    ))
}

// ============ Graph ============

async fn handle_graph(State(state): State<AppState>) -> Result<Json<BipartiteGraph>, AppError> {
    let catalog = state.current().await?;
    Ok(Json(BipartiteGraph::from_catalog(&catalog)))
}

async fn handle_graph_gexf(State(state): State<AppState>) -> Result<Response, AppError> {
    let catalog = state.current().await?;
    let xml = graph_gexf(&BipartiteGraph::from_catalog(&catalog)).map_err(internal)?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}

async fn analyzed(state: &AppState) -> Result<(Arc<Catalog>, GraphAnalysis), AppError> {
    let catalog = state.current().await?;
    let graph = BipartiteGraph::from_catalog(&catalog);
    let analysis = PetgraphAnalytics.analyze(&graph).map_err(internal)?;
    Ok((catalog, analysis))
}

async fn handle_graph_analysis(
    State(state): State<AppState>,
) -> Result<Json<GraphAnalysis>, AppError> {
    let (_, analysis) = analyzed(&state).await?;
    Ok(Json(analysis))
}

async fn handle_graph_components(
    State(state): State<AppState>,
) -> Result<Json<ComponentReport>, AppError> {
    let catalog = state.current().await?;
    let graph = BipartiteGraph::from_catalog(&catalog);
    component_report(&graph).map(Json).map_err(internal)
}

#[derive(Serialize)]
struct BridgeResponse {
    id: String,
    name: String,
    communities: Vec<usize>,
}

async fn handle_graph_bridges(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<BridgeResponse>>, AppError> {
    let (catalog, analysis) = analyzed(&state).await?;
    let limit = query.limit.unwrap_or(state.config.planner.similar_limit);
    Ok(Json(
        bridge_recipes(&catalog, &analysis, limit)
            .into_iter()
            .map(|b| BridgeResponse {
                id: b.recipe.id.clone(),
                name: b.recipe.name.clone(),
                communities: b.communities,
            })
            .collect(),
    ))
}

async fn handle_same_vibe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<RecipeSummary>>, AppError> {
    let (catalog, analysis) = analyzed(&state).await?;
    let limit = query.limit.unwrap_or(state.config.planner.similar_limit);
    let recipes = same_vibe(&catalog, &analysis, &id, limit)
        .ok_or_else(|| not_found(format!("recipe not found: {}", id)))?;
    Ok(Json(recipes.into_iter().map(RecipeSummary::from).collect()))
}

// ============ Catalog cache ============

async fn handle_catalog_status(State(state): State<AppState>) -> Json<CatalogStatus> {
    Json(state.catalog.status())
}

async fn handle_catalog_rebuild(
    State(state): State<AppState>,
) -> Result<Json<CatalogStatus>, AppError> {
    state.catalog.rebuild().await?;
    Ok(Json(state.catalog.status()))
}

async fn handle_catalog_invalidate(State(state): State<AppState>) -> Json<CatalogStatus> {
    state.catalog.invalidate();
    Json(state.catalog.status())
}
