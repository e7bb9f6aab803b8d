use std::cmp::Ordering;
use std::str::FromStr;

use crate::models::Recipe;
use crate::navigation::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Most reviewed first.
    #[default]
    Review,
    /// Highest rated first.
    Rating,
    /// Alphabetical by title.
    Title,
    /// Most viewed first.
    Views,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "review" => Ok(SortKey::Review),
            "rating" => Ok(SortKey::Rating),
            "title" | "name" => Ok(SortKey::Title),
            "views" => Ok(SortKey::Views),
            other => Err(format!("unknown sort key '{}'", other)),
        }
    }
}

/// Static recipes first, then local ones, keeping only those in `category`
/// when one is given.
pub fn merge_and_filter(
    static_recipes: &[Recipe],
    local_recipes: &[Recipe],
    category: Option<Category>,
) -> Vec<Recipe> {
    let merged: Vec<Recipe> = static_recipes.iter().chain(local_recipes).cloned().collect();
    match category {
        Some(category) => filter_by_category(merged, category),
        None => merged,
    }
}

pub fn filter_by_category(recipes: Vec<Recipe>, category: Category) -> Vec<Recipe> {
    recipes
        .into_iter()
        .filter(|r| category.matches(&r.category))
        .collect()
}

/// Returns a sorted copy. The sort is stable, so ties keep their input order.
pub fn sort_recipes(recipes: &[Recipe], key: SortKey) -> Vec<Recipe> {
    let mut sorted = recipes.to_vec();
    match key {
        SortKey::Review => sorted.sort_by(|a, b| b.review_count.cmp(&a.review_count)),
        SortKey::Rating => sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::Title => sorted.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortKey::Views => sorted.sort_by(|a, b| b.views.value().cmp(&a.views.value())),
    }
    sorted
}

/// Hangul syllables are encoded in dictionary (가나다) order, so comparing
/// case-folded code points gives Korean collation for Hangul titles.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
