//! The combined catalog: static recipes plus locally authored ones, with
//! locally recorded reviews folded in. Rebuilt on every run, never stored.

pub mod loader;
pub mod merge;

pub use loader::{load_static_catalog, CatalogSource};
pub use merge::{merge_and_filter, sort_recipes, SortKey};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::models::{LocalRecipe, Recipe};
use crate::navigation::Category;
use crate::normalizer::normalize_local_recipe;
use crate::reviews::{aggregate, load_review_map};
use crate::storage::{JsonStore, KeyValueStore, LOCAL_RECIPES_KEY};

/// Reads the local recipe list. An unreadable list is empty; unreadable
/// entries inside a readable list are skipped.
pub fn load_local_recipes<S: KeyValueStore + ?Sized>(store: &S) -> Vec<LocalRecipe> {
    let raw: Vec<Value> = store.get_or_default(LOCAL_RECIPES_KEY);
    raw.into_iter()
        .filter_map(|value| match serde_json::from_value::<LocalRecipe>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "skipping unreadable local recipe");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub static_recipes: Vec<Recipe>,
    pub local_recipes: Vec<Recipe>,
}

impl Catalog {
    /// Normalizes the stored local recipes and appends persisted reviews to
    /// every recipe that has some.
    pub fn build<S: KeyValueStore + ?Sized>(static_recipes: Vec<Recipe>, store: &S) -> Self {
        let mut reviews = load_review_map(store);
        let mut fold = |recipe: Recipe| {
            let persisted = reviews.remove(&recipe.id).unwrap_or_default();
            aggregate(recipe, &persisted)
        };

        let static_recipes: Vec<Recipe> = static_recipes.into_iter().map(&mut fold).collect();
        let local_recipes: Vec<Recipe> = load_local_recipes(store)
            .iter()
            .map(normalize_local_recipe)
            .map(&mut fold)
            .collect();

        debug!(
            static_count = static_recipes.len(),
            local_count = local_recipes.len(),
            "catalog built"
        );
        Self {
            static_recipes,
            local_recipes,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.static_recipes.iter().chain(&self.local_recipes)
    }

    pub fn len(&self) -> usize {
        self.static_recipes.len() + self.local_recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First recipe whose id matches; static recipes shadow local ones.
    pub fn find(&self, recipe_id: &str) -> Option<&Recipe> {
        self.iter().find(|r| r.id == recipe_id)
    }

    pub fn require(&self, recipe_id: &str) -> Result<&Recipe> {
        self.find(recipe_id)
            .ok_or_else(|| CatalogError::RecipeNotFound(recipe_id.to_string()))
    }

    pub fn list(&self, category: Option<Category>, sort: SortKey) -> Vec<Recipe> {
        let merged = merge_and_filter(&self.static_recipes, &self.local_recipes, category);
        sort_recipes(&merged, sort)
    }
}

/// Heading of a category listing, e.g. "전체 한식 레시피 (총 12개)".
pub fn listing_heading(category: Option<Category>, count: usize) -> String {
    match category {
        Some(c) => format!("전체 {} 레시피 (총 {}개)", c.label(), count),
        None => format!("전체 레시피 (총 {}개)", count),
    }
}
