//! What can be made from a bar inventory.
//!
//! Inventory entries go through [`normalize`] and are joined against each
//! recipe's ingredient keys, so `"Fresh Lime Juice"` in an inventory
//! satisfies a recipe listing `"Lime Juice"` and matching is
//! case-insensitive by construction.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{Catalog, Recipe};
use crate::normalize::{normalize, title_case};

/// Largest number of missing ingredients still reported as "almost".
pub const ALMOST_MAX_MISSING: usize = 2;

/// A user's available ingredients, held as normalized keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    keys: BTreeSet<String>,
}

impl Inventory {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keys: names
                .into_iter()
                .map(|n| normalize(n.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains(&normalize(name))
    }

    /// Display names (Title Case), sorted.
    pub fn names(&self) -> Vec<String> {
        self.keys.iter().map(|k| title_case(k)).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Canonical names of the recipe's ingredients not in this inventory,
    /// in recipe order.
    pub fn missing_for(&self, recipe: &Recipe) -> Vec<String> {
        recipe
            .ingredient_keys
            .iter()
            .zip(&recipe.parsed_ingredients)
            .filter(|(key, _)| !self.keys.contains(*key))
            .map(|(_, name)| name.clone())
            .collect()
    }
}

/// A recipe one or two ingredients short.
#[derive(Debug, Clone, Serialize)]
pub struct NearMiss<'a> {
    pub recipe: &'a Recipe,
    pub missing: Vec<String>,
}

/// Recipes whose every ingredient is in the inventory, in catalog order.
pub fn feasible<'a>(catalog: &'a Catalog, inventory: &Inventory) -> Vec<&'a Recipe> {
    catalog
        .recipes
        .iter()
        .filter(|r| r.ingredient_keys.iter().all(|k| inventory.keys.contains(k)))
        .collect()
}

/// Recipes missing between one and [`ALMOST_MAX_MISSING`] ingredients,
/// in catalog order.
pub fn almost_feasible<'a>(catalog: &'a Catalog, inventory: &Inventory) -> Vec<NearMiss<'a>> {
    catalog
        .recipes
        .iter()
        .filter_map(|recipe| {
            let missing = inventory.missing_for(recipe);
            (1..=ALMOST_MAX_MISSING)
                .contains(&missing.len())
                .then_some(NearMiss { recipe, missing })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::models::RawRecipeRecord;

    fn catalog() -> Catalog {
        let rec = |uri: &str, text: &str| {
            let mut r = RawRecipeRecord::new(uri);
            r.raw_ingredient_text = Some(text.into());
            r
        };
        build_catalog(&[
            rec("urn:x/Rum_Lime", "* Rum\n* Lime"),
            rec("urn:x/Mojito", "* Rum\n* Lime\n* Mint\n* Sugar"),
            rec("urn:x/Negroni", "* Gin\n* Campari\n* Sweet Red Vermouth"),
        ])
    }

    #[test]
    fn test_feasible_case_insensitive() {
        let catalog = catalog();
        let inv = Inventory::new(["rum", "LIME", "soda"]);
        let names: Vec<&str> = feasible(&catalog, &inv).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Rum Lime"]);
    }

    #[test]
    fn test_almost_feasible_missing_one() {
        let catalog = catalog();
        let inv = Inventory::new(["rum"]);
        assert!(feasible(&catalog, &inv).is_empty());
        let near = almost_feasible(&catalog, &inv);
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].recipe.name, "Rum Lime");
        assert_eq!(near[0].missing, vec!["Lime"]);
    }

    #[test]
    fn test_almost_feasible_interval_is_closed() {
        let catalog = catalog();
        let inv = Inventory::new(["rum", "lime"]);
        let near = almost_feasible(&catalog, &inv);
        // Mojito misses exactly two; Negroni misses three.
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].missing, vec!["Mint", "Sugar"]);
    }

    #[test]
    fn test_inventory_normalizes_modifiers() {
        let catalog = catalog();
        let inv = Inventory::new(["Gin", "campari", "sweet vermouth"]);
        let names: Vec<&str> = feasible(&catalog, &inv).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Negroni"]);
        assert!(inv.contains("Sweet Red Vermouth"));
        assert_eq!(inv.names(), vec!["Campari", "Gin", "Sweet Vermouth"]);
    }

    #[test]
    fn test_empty_inventory() {
        let catalog = catalog();
        let inv = Inventory::new(Vec::<String>::new());
        assert!(inv.is_empty());
        assert!(feasible(&catalog, &inv).is_empty());
        assert!(almost_feasible(&catalog, &inv).len() == 1);
    }
}
