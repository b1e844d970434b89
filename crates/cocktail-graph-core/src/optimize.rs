//! Greedy coverage optimization over recipes and ingredients.
//!
//! Choosing the fewest ingredients that reach the most recipes is a
//! maximum-coverage problem (NP-hard); everything here is a greedy
//! approximation with fixed tie-breaking so results are reproducible.
//!
//! # Modes
//!
//! | Function | Universe | Score per candidate | Stops when |
//! |---|---|---|---|
//! | [`budget_cover`] | all recipes | uncovered recipes it appears in | budget reached or no gain |
//! | [`targeted_cover`] | requested recipes | uncovered targets it appears in | all targets covered or no gain |
//! | [`impact_selection`] | recipes with ≤ budget ingredients | completion-weighted (see below) | budget reached |
//!
//! In the two coverage modes a recipe counts as covered as soon as one
//! selected ingredient belongs to it. Impact selection instead reports
//! only recipes whose whole ingredient list was selected.
//!
//! # Impact scoring
//!
//! Each candidate is scored over every eligible recipe containing it,
//! given the ingredients already picked:
//!
//! - the pick completes the recipe (it was the last one missing): `100`
//! - otherwise: `1 / remaining`, where `remaining` is the number of
//!   ingredients still missing after the pick
//!
//! The large completion weight makes the planner finish recipes before
//! spreading across new ones.
//!
//! # Tie-breaking
//!
//! Candidates are enumerated in ingredient discovery order (recipes in
//! catalog order, each recipe's ingredients in parsed order) and only a
//! strictly greater score replaces the current best, so the earliest
//! discovered ingredient wins a tie.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::models::{Catalog, CoverageSolution};

/// Weight added to an impact score when a pick completes a recipe.
pub const COMPLETION_BONUS: f64 = 100.0;

/// Recipe ↔ ingredient membership, indexed for the greedy loops.
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    recipe_ids: Vec<String>,
    recipe_positions: HashMap<String, usize>,
    /// Ingredient indices per recipe, in parsed order.
    recipe_ingredients: Vec<Vec<usize>>,
    /// Ingredient names in discovery order.
    ingredients: Vec<String>,
    ingredient_positions: HashMap<String, usize>,
    /// Recipe indices per ingredient, ascending.
    members: Vec<Vec<usize>>,
}

impl CoverageIndex {
    /// Index a catalog by recipe id and canonical ingredient name.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self::from_pairs(
            catalog
                .recipes
                .iter()
                .map(|r| (r.id.as_str(), r.parsed_ingredients.iter().map(String::as_str))),
        )
    }

    /// Build an index from `(recipe_id, ingredients)` pairs.
    ///
    /// A repeated recipe id keeps its first ingredient list; a repeated
    /// ingredient within one recipe is counted once.
    pub fn from_pairs<R, I, N>(pairs: impl IntoIterator<Item = (R, I)>) -> Self
    where
        R: AsRef<str>,
        I: IntoIterator<Item = N>,
        N: AsRef<str>,
    {
        let mut index = Self::default();
        for (recipe_id, ingredients) in pairs {
            let recipe_id = recipe_id.as_ref();
            if index.recipe_positions.contains_key(recipe_id) {
                continue;
            }
            let r = index.recipe_ids.len();
            index.recipe_ids.push(recipe_id.to_string());
            index.recipe_positions.insert(recipe_id.to_string(), r);

            let mut own: Vec<usize> = Vec::new();
            for name in ingredients {
                let name = name.as_ref();
                let i = match index.ingredient_positions.get(name) {
                    Some(&i) => i,
                    None => {
                        let i = index.ingredients.len();
                        index.ingredients.push(name.to_string());
                        index.ingredient_positions.insert(name.to_string(), i);
                        index.members.push(Vec::new());
                        i
                    }
                };
                if !own.contains(&i) {
                    own.push(i);
                    index.members[i].push(r);
                }
            }
            index.recipe_ingredients.push(own);
        }
        index
    }

    pub fn recipe_count(&self) -> usize {
        self.recipe_ids.len()
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredients.len()
    }

    pub fn contains_recipe(&self, id: &str) -> bool {
        self.recipe_positions.contains_key(id)
    }

    /// Ingredient names in discovery order.
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(String::as_str)
    }

    /// Ingredients of one recipe in parsed order.
    pub fn ingredients_of(&self, recipe_id: &str) -> Option<Vec<&str>> {
        let &r = self.recipe_positions.get(recipe_id)?;
        Some(
            self.recipe_ingredients[r]
                .iter()
                .map(|&i| self.ingredients[i].as_str())
                .collect(),
        )
    }

    fn solution(&self, selected: &[usize], covered: impl IntoIterator<Item = usize>) -> CoverageSolution {
        CoverageSolution {
            selected_ingredients: selected.iter().map(|&i| self.ingredients[i].clone()).collect(),
            covered_recipe_ids: covered
                .into_iter()
                .map(|r| self.recipe_ids[r].clone())
                .collect(),
        }
    }
}

/// Pick up to `budget` ingredients maximizing the number of recipes they
/// touch.
///
/// Returns an empty solution for a zero budget. A budget above the number
/// of useful ingredients simply stops early.
pub fn budget_cover(index: &CoverageIndex, budget: usize) -> CoverageSolution {
    let universe = vec![true; index.recipe_count()];
    let (selected, covered) = greedy_cover(index, &universe, Some(budget));
    index.solution(&selected, covered)
}

/// Outcome of [`targeted_cover`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TargetedCoverage {
    pub solution: CoverageSolution,
    /// Requested ids that are not in the index.
    pub unknown_targets: Vec<String>,
    /// Requested recipes no ingredient can cover (empty ingredient list).
    pub uncoverable: Vec<String>,
    /// Every requested recipe is known and covered.
    pub complete: bool,
}

/// Pick ingredients until every requested recipe is touched, or no
/// remaining ingredient helps.
///
/// Unknown ids are excluded and reported, never an error. An empty
/// request yields an empty, complete result; a request naming only
/// unknown recipes yields an empty, incomplete one.
pub fn targeted_cover<S: AsRef<str>>(index: &CoverageIndex, targets: &[S]) -> TargetedCoverage {
    let mut universe = vec![false; index.recipe_count()];
    let mut unknown_targets = Vec::new();
    for target in targets {
        let target = target.as_ref();
        match index.recipe_positions.get(target) {
            Some(&r) => universe[r] = true,
            None => {
                if !unknown_targets.iter().any(|t| t == target) {
                    unknown_targets.push(target.to_string());
                }
            }
        }
    }

    let (selected, covered) = greedy_cover(index, &universe, None);

    let uncoverable: Vec<String> = universe
        .iter()
        .enumerate()
        .filter(|&(r, &wanted)| wanted && !covered.contains(&r))
        .map(|(r, _)| index.recipe_ids[r].clone())
        .collect();

    TargetedCoverage {
        complete: unknown_targets.is_empty() && uncoverable.is_empty(),
        solution: index.solution(&selected, covered),
        unknown_targets,
        uncoverable,
    }
}

fn greedy_cover(
    index: &CoverageIndex,
    universe: &[bool],
    limit: Option<usize>,
) -> (Vec<usize>, BTreeSet<usize>) {
    let mut selected: Vec<usize> = Vec::new();
    let mut taken = vec![false; index.ingredient_count()];
    let mut covered: BTreeSet<usize> = BTreeSet::new();

    loop {
        if limit.is_some_and(|limit| selected.len() >= limit) {
            break;
        }

        let mut best: Option<(usize, usize)> = None;
        for (i, recipes) in index.members.iter().enumerate() {
            if taken[i] {
                continue;
            }
            let gain = recipes
                .iter()
                .filter(|&&r| universe[r] && !covered.contains(&r))
                .count();
            if gain > best.map_or(0, |(_, g)| g) {
                best = Some((i, gain));
            }
        }

        let Some((i, _)) = best else {
            break;
        };
        taken[i] = true;
        selected.push(i);
        covered.extend(index.members[i].iter().copied().filter(|&r| universe[r]));
    }

    (selected, covered)
}

/// Pick up to `budget` ingredients maximizing the number of fully
/// buildable recipes, using impact scoring.
///
/// Only recipes with a non-empty ingredient list of at most `budget`
/// entries take part. `covered_recipe_ids` lists the recipes whose every
/// ingredient was selected.
pub fn impact_selection(index: &CoverageIndex, budget: usize) -> CoverageSolution {
    let eligible: Vec<bool> = index
        .recipe_ingredients
        .iter()
        .map(|ings| !ings.is_empty() && ings.len() <= budget)
        .collect();

    // Candidate → eligible recipes containing it, in discovery order.
    let candidates: Vec<(usize, Vec<usize>)> = index
        .members
        .iter()
        .enumerate()
        .filter_map(|(i, recipes)| {
            let own: Vec<usize> = recipes.iter().copied().filter(|&r| eligible[r]).collect();
            (!own.is_empty()).then_some((i, own))
        })
        .collect();

    let mut taken = vec![false; index.ingredient_count()];
    let mut selected: Vec<usize> = Vec::new();

    while selected.len() < budget {
        let mut best: Option<(usize, f64)> = None;
        for (i, recipes) in &candidates {
            if taken[*i] {
                continue;
            }
            let score: f64 = recipes
                .iter()
                .map(|&r| {
                    let missing = index.recipe_ingredients[r]
                        .iter()
                        .filter(|&&j| !taken[j])
                        .count();
                    if missing == 1 {
                        COMPLETION_BONUS
                    } else {
                        1.0 / (missing - 1) as f64
                    }
                })
                .sum();
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((*i, score));
            }
        }

        let Some((i, _)) = best else {
            break;
        };
        taken[i] = true;
        selected.push(i);
    }

    let covered = (0..index.recipe_count()).filter(|&r| {
        eligible[r] && index.recipe_ingredients[r].iter().all(|&j| taken[j])
    });
    index.solution(&selected, covered)
}

/// Union of the ingredient lists of the requested recipes, in request
/// order then parsed order (a shopping list).
///
/// Returns `None` when a non-empty request names no known recipe.
pub fn union_ingredients<S: AsRef<str>>(index: &CoverageIndex, targets: &[S]) -> Option<Vec<String>> {
    let mut found_any = false;
    let mut seen = vec![false; index.ingredient_count()];
    let mut out = Vec::new();
    for target in targets {
        let Some(&r) = index.recipe_positions.get(target.as_ref()) else {
            continue;
        };
        found_any = true;
        for &i in &index.recipe_ingredients[r] {
            if !seen[i] {
                seen[i] = true;
                out.push(index.ingredients[i].clone());
            }
        }
    }
    if !found_any && !targets.is_empty() {
        return None;
    }
    Some(out)
}
