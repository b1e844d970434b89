//! Recipe catalog building and caching.
//!
//! [`build_catalog`] is the pure transformation from graph store records
//! to canonical [`Recipe`]s and [`Ingredient`]s. [`CatalogBuilder`] wraps
//! it with the process-lifetime cache.
//!
//! # Build steps
//!
//! 1. Deduplicate records by URI; the first occurrence wins regardless of
//!    how the store ordered its results.
//! 2. Parse each ingredient blob ([`crate::parse`]) and normalize every
//!    line ([`crate::normalize`]). Repeats within one recipe collapse onto
//!    their first appearance.
//! 3. Derive the recipe id from the display name (English label, else the
//!    last URI segment). Distinct URIs whose names slug alike get `-2`,
//!    `-3`, ... suffixes in catalog order, so ids are unique.
//! 4. Aggregate ingredients in recipe order, counting each recipe once per
//!    ingredient.
//! 5. Sort ingredients by descending usage, then lowercase name.
//!
//! # Cache lifecycle
//!
//! ```text
//!   catalog() ──▶ fresh? ──yes──▶ Arc<Catalog>
//!                   │no
//!                   ▼
//!             build lock ──▶ query store ──ok──▶ publish (one swap)
//!                                │err
//!                                ▼
//!                 previous catalog? ──yes──▶ serve it, record failure
//!                                │no
//!                                ▼
//!                       CatalogError::DataSource
//! ```
//!
//! Builds are serialized by a single async mutex, so concurrent callers
//! on a cold cache wait for one build and share its result. Recipes and
//! ingredients live in one [`Catalog`] value behind one `Arc`, so a reader
//! can never see one without the other.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::CatalogError;
use crate::models::{Catalog, Ingredient, RawRecipeRecord, Recipe};
use crate::normalize::{normalize, slug, title_case};
use crate::parse::parse_ingredient_lines;
use crate::store::GraphStore;

/// Build a catalog from raw records. Pure apart from the `built_at`
/// timestamp.
pub fn build_catalog(records: &[RawRecipeRecord]) -> Catalog {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut recipes = Vec::new();

    for record in records {
        let uri = record.recipe_uri.trim();
        if uri.is_empty() {
            debug!("skipping record without a URI");
            continue;
        }
        if !seen.insert(uri) {
            continue;
        }
        recipes.push(build_recipe(record));
    }
    assign_unique_ids(&mut recipes);

    let ingredients = aggregate_ingredients(&recipes);

    Catalog {
        recipes,
        ingredients,
        built_at: Utc::now(),
    }
}

fn build_recipe(record: &RawRecipeRecord) -> Recipe {
    if !record.labels.contains_key("en") {
        debug!(uri = %record.recipe_uri, "no English label, deriving name from URI");
    }
    let name = record.display_name();
    let mut id = slug(&name);
    if id.is_empty() {
        id = slug(&record.recipe_uri.replace('_', " "));
    }

    let mut ingredient_keys: Vec<String> = Vec::new();
    let mut parsed_ingredients = Vec::new();
    for line in parse_ingredient_lines(record.raw_ingredient_text.as_deref()) {
        let key = normalize(&line);
        if key.is_empty() || ingredient_keys.contains(&key) {
            continue;
        }
        parsed_ingredients.push(title_case(&key));
        ingredient_keys.push(key);
    }

    Recipe {
        id,
        uri: record.recipe_uri.trim().to_string(),
        name,
        labels: record.labels.clone(),
        descriptions: record.descriptions.clone(),
        raw_ingredient_text: record.raw_ingredient_text.clone(),
        parsed_ingredients,
        preparation: record.preparation.clone(),
        served: record.served.clone(),
        garnish: record.garnish.clone(),
        source_link: record.source_link.clone(),
        categories: if record.categories.is_empty() {
            None
        } else {
            Some(record.categories.clone())
        },
        images: record.images.clone(),
        ingredient_keys,
    }
}

/// Suffix repeated ids. A suffixed id never takes a slug that another
/// recipe derived on its own.
fn assign_unique_ids(recipes: &mut [Recipe]) {
    let natural: HashSet<String> = recipes.iter().map(|r| r.id.clone()).collect();
    let mut used: HashSet<String> = HashSet::with_capacity(recipes.len());
    for recipe in recipes.iter_mut() {
        if used.insert(recipe.id.clone()) {
            continue;
        }
        let mut n = 2;
        let id = loop {
            let candidate = format!("{}-{}", recipe.id, n);
            if !natural.contains(&candidate) && !used.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        debug!(uri = %recipe.uri, from = %recipe.id, to = %id, "recipe id collision");
        used.insert(id.clone());
        recipe.id = id;
    }
}

fn aggregate_ingredients(recipes: &[Recipe]) -> Vec<Ingredient> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut ingredients: Vec<Ingredient> = Vec::new();

    for recipe in recipes {
        for key in &recipe.ingredient_keys {
            let idx = *position.entry(key.as_str()).or_insert_with(|| {
                ingredients.push(Ingredient {
                    id: key.replace(' ', "_"),
                    canonical_name: title_case(key),
                    usage_count: 0,
                    recipe_ids: Default::default(),
                    key: key.clone(),
                });
                ingredients.len() - 1
            });
            let entry = &mut ingredients[idx];
            if entry.recipe_ids.insert(recipe.id.clone()) {
                entry.usage_count += 1;
            }
        }
    }

    ingredients.sort_by(|a, b| {
        b.usage_count
            .cmp(&a.usage_count)
            .then_with(|| {
                a.canonical_name
                    .to_lowercase()
                    .cmp(&b.canonical_name.to_lowercase())
            })
            .then_with(|| a.key.cmp(&b.key))
    });
    ingredients
}

/// A failed build that left the previous catalog in place.
#[derive(Debug, Clone, Serialize)]
pub struct BuildFailure {
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Snapshot of the cache for health and status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatus {
    pub source: String,
    pub ready: bool,
    pub stale: bool,
    /// Number of successful builds so far.
    pub generation: u64,
    pub built_at: Option<DateTime<Utc>>,
    pub recipe_count: usize,
    pub ingredient_count: usize,
    pub fingerprint: Option<String>,
    pub last_error: Option<BuildFailure>,
}

#[derive(Default)]
struct CacheState {
    current: Option<Arc<Catalog>>,
    stale: bool,
    /// Bumped by every `invalidate()`; a build only clears `stale` if
    /// this has not moved since the build started.
    invalidations: u64,
    generation: u64,
    last_error: Option<BuildFailure>,
}

/// Lock-guarded, lazily built catalog over a [`GraphStore`].
///
/// Owned by the composition root (CLI command, HTTP server) and shared by
/// reference or `Arc`. There is no global instance.
pub struct CatalogBuilder<S> {
    store: S,
    build_lock: Mutex<()>,
    state: RwLock<CacheState>,
}

impl<S: GraphStore> CatalogBuilder<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            build_lock: Mutex::new(()),
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The published catalog, if any, without triggering a build.
    pub fn published(&self) -> Option<Arc<Catalog>> {
        self.read_state().current.clone()
    }

    /// Return the cached catalog, building it first if needed.
    ///
    /// A failed build falls back to the previous catalog when one exists;
    /// the failure is then only visible through [`status`](Self::status).
    /// On a cold cache the error propagates.
    pub async fn catalog(&self) -> Result<Arc<Catalog>, CatalogError> {
        if let Some(catalog) = self.fresh() {
            return Ok(catalog);
        }

        let _guard = self.build_lock.lock().await;
        if let Some(catalog) = self.fresh() {
            return Ok(catalog);
        }

        let epoch = self.read_state().invalidations;
        match self.build().await {
            Ok(catalog) => Ok(self.publish(catalog, epoch)),
            Err(err) => {
                let previous = {
                    let mut state = self.write_state();
                    state.last_error = Some(failure(&err));
                    // Serve the last good catalog until the next explicit
                    // invalidate or rebuild.
                    if state.invalidations == epoch {
                        state.stale = false;
                    }
                    state.current.clone()
                };
                match previous {
                    Some(catalog) => {
                        warn!(error = %err, "catalog refresh failed, serving previous catalog");
                        Ok(catalog)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Build a new catalog now and publish it.
    ///
    /// On failure the previous catalog (if any) stays published and the
    /// error is returned to this caller only.
    pub async fn rebuild(&self) -> Result<Arc<Catalog>, CatalogError> {
        let _guard = self.build_lock.lock().await;
        let epoch = self.read_state().invalidations;
        match self.build().await {
            Ok(catalog) => Ok(self.publish(catalog, epoch)),
            Err(err) => {
                warn!(error = %err, "catalog rebuild failed");
                self.write_state().last_error = Some(failure(&err));
                Err(err)
            }
        }
    }

    /// Mark the catalog stale; the next [`catalog`](Self::catalog) call
    /// rebuilds recipes and ingredients together.
    pub fn invalidate(&self) {
        let mut state = self.write_state();
        state.stale = true;
        state.invalidations += 1;
        info!(source = self.store.name(), "catalog invalidated");
    }

    pub fn status(&self) -> CatalogStatus {
        let state = self.read_state();
        let current = state.current.as_ref();
        CatalogStatus {
            source: self.store.name().to_string(),
            ready: current.is_some(),
            stale: state.stale,
            generation: state.generation,
            built_at: current.map(|c| c.built_at),
            recipe_count: current.map(|c| c.recipes.len()).unwrap_or(0),
            ingredient_count: current.map(|c| c.ingredients.len()).unwrap_or(0),
            fingerprint: current.map(|c| c.fingerprint()),
            last_error: state.last_error.clone(),
        }
    }

    async fn build(&self) -> Result<Catalog, CatalogError> {
        let store = self.store.name().to_string();
        let records =
            self.store
                .query_recipes()
                .await
                .map_err(|source| CatalogError::DataSource {
                    store: store.clone(),
                    source,
                })?;

        if !records.is_empty() && records.iter().all(|r| r.recipe_uri.trim().is_empty()) {
            return Err(CatalogError::EmptyResult {
                store,
                records: records.len(),
            });
        }

        let catalog = build_catalog(&records);
        info!(
            source = %store,
            records = records.len(),
            recipes = catalog.recipes.len(),
            ingredients = catalog.ingredients.len(),
            "catalog built"
        );
        Ok(catalog)
    }

    /// Swap in a new catalog built from data fetched after invalidation
    /// `epoch`. An invalidate that landed mid-build keeps it stale.
    fn publish(&self, catalog: Catalog, epoch: u64) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        let mut state = self.write_state();
        state.current = Some(catalog.clone());
        state.stale = state.invalidations != epoch;
        state.generation += 1;
        state.last_error = None;
        catalog
    }

    fn fresh(&self) -> Option<Arc<Catalog>> {
        let state = self.read_state();
        if state.stale {
            None
        } else {
            state.current.clone()
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, CacheState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, CacheState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn failure(err: &CatalogError) -> BuildFailure {
    BuildFailure {
        message: err.to_string(),
        at: Utc::now(),
    }
}
