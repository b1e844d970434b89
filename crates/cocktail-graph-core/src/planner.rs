//! Name-aware planning on top of [`crate::optimize`].
//!
//! Callers (CLI, HTTP handlers) speak in recipe names, URIs, or ids and
//! signed budgets taken straight from user input. The [`Planner`]
//! resolves them against one catalog, runs the chosen mode, and returns
//! results that carry display names next to ids.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::Catalog;
use crate::optimize::{
    budget_cover, impact_selection, targeted_cover, union_ingredients, CoverageIndex,
};

/// Which optimizer produced a [`Plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    /// Budgeted marginal coverage over the whole catalog.
    Party,
    /// Cover a requested list of recipes.
    Playlist,
    /// Budgeted selection maximizing fully buildable recipes.
    Impact,
}

/// A recipe reference with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub mode: PlanMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<usize>,
    pub selected_ingredients: Vec<String>,
    pub covered_recipe_ids: BTreeSet<String>,
    /// Covered recipes in catalog order.
    pub covered_recipes: Vec<RecipeRef>,
    /// Requested names that matched no recipe (playlist only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_targets: Vec<String>,
    /// Requested recipes that stayed uncovered (playlist only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uncoverable: Vec<RecipeRef>,
    /// Playlist only: every request resolved and was covered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingList {
    pub recipes: Vec<RecipeRef>,
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_targets: Vec<String>,
}

/// Planner bound to one catalog snapshot.
pub struct Planner<'a> {
    catalog: &'a Catalog,
    index: CoverageIndex,
}

impl<'a> Planner<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            index: CoverageIndex::from_catalog(catalog),
        }
    }

    pub fn index(&self) -> &CoverageIndex {
        &self.index
    }

    /// Best `budget` ingredients for the broadest menu. A budget of zero
    /// or less plans nothing.
    pub fn party(&self, budget: i64) -> Plan {
        let budget = clamp_budget(budget);
        let solution = budget_cover(&self.index, budget);
        self.plan(PlanMode::Party, Some(budget), solution.selected_ingredients, solution.covered_recipe_ids)
    }

    /// Ingredients covering the requested recipes (names, URIs, or ids).
    pub fn playlist<S: AsRef<str>>(&self, requested: &[S]) -> Plan {
        let (ids, unknown) = self.resolve(requested);
        let targeted = targeted_cover(&self.index, &ids);
        let uncoverable = targeted
            .uncoverable
            .iter()
            .filter_map(|id| self.recipe_ref(id))
            .collect();
        let mut plan = self.plan(
            PlanMode::Playlist,
            None,
            targeted.solution.selected_ingredients,
            targeted.solution.covered_recipe_ids,
        );
        plan.complete = Some(targeted.complete && unknown.is_empty());
        plan.unknown_targets = unknown;
        plan.uncoverable = uncoverable;
        plan
    }

    /// Best `budget` ingredients for the most fully buildable recipes.
    pub fn impact(&self, budget: i64) -> Plan {
        let budget = clamp_budget(budget);
        let solution = impact_selection(&self.index, budget);
        self.plan(PlanMode::Impact, Some(budget), solution.selected_ingredients, solution.covered_recipe_ids)
    }

    /// Every ingredient needed by the requested recipes.
    ///
    /// `None` when a non-empty request matched no recipe at all.
    pub fn shopping_list<S: AsRef<str>>(&self, requested: &[S]) -> Option<ShoppingList> {
        let (ids, unknown_targets) = self.resolve(requested);
        let ingredients = union_ingredients(&self.index, &ids)?;
        if ids.is_empty() && !requested.is_empty() {
            return None;
        }
        Some(ShoppingList {
            recipes: ids.iter().filter_map(|id| self.recipe_ref(id)).collect(),
            ingredients,
            unknown_targets,
        })
    }

    /// Split requested names into resolved recipe ids (deduplicated, in
    /// request order) and unknown names.
    fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> (Vec<String>, Vec<String>) {
        let mut ids: Vec<String> = Vec::new();
        let mut unknown: Vec<String> = Vec::new();
        for name in requested {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            match self.catalog.recipe(name) {
                Some(recipe) => {
                    if !ids.contains(&recipe.id) {
                        ids.push(recipe.id.clone());
                    }
                }
                None => {
                    if !unknown.iter().any(|u| u == name) {
                        unknown.push(name.to_string());
                    }
                }
            }
        }
        (ids, unknown)
    }

    fn plan(
        &self,
        mode: PlanMode,
        budget: Option<usize>,
        selected_ingredients: Vec<String>,
        covered_recipe_ids: BTreeSet<String>,
    ) -> Plan {
        let mut seen = BTreeSet::new();
        let covered_recipes = self
            .catalog
            .recipes
            .iter()
            .filter(|r| covered_recipe_ids.contains(&r.id) && seen.insert(r.id.as_str()))
            .map(|r| RecipeRef {
                id: r.id.clone(),
                name: r.name.clone(),
            })
            .collect();
        Plan {
            mode,
            budget,
            selected_ingredients,
            covered_recipe_ids,
            covered_recipes,
            unknown_targets: Vec::new(),
            uncoverable: Vec::new(),
            complete: None,
        }
    }

    fn recipe_ref(&self, id: &str) -> Option<RecipeRef> {
        self.catalog.recipe(id).map(|r| RecipeRef {
            id: r.id.clone(),
            name: r.name.clone(),
        })
    }
}

/// Negative budgets come from untrusted input and plan nothing.
fn clamp_budget(budget: i64) -> usize {
    usize::try_from(budget).unwrap_or(0)
}
