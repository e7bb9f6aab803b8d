//! Review aggregation and submission.

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{Result, ValidationError};
use crate::models::{Recipe, Review};
use crate::storage::{
    JsonStore, KeyValueStore, CURRENT_USER_KEY, REVIEWS_KEY, USERNAME_KEY, USERS_KEY,
};

pub const ANONYMOUS_USER: &str = "익명 사용자";

/// Reviews recorded locally, keyed by recipe id. Kept apart from the recipe
/// records so read-only catalog recipes can still collect reviews.
pub type ReviewMap = HashMap<String, Vec<Review>>;

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mean of the review ratings rounded to one decimal, `None` when empty.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: f64 = reviews.iter().map(|r| f64::from(r.rating)).sum();
    Some(round_to_tenth(total / reviews.len() as f64))
}

/// Appends locally persisted reviews after the recipe's own and recomputes
/// the aggregates. `review_count` always ends up equal to `reviews.len()`;
/// the rating is only recomputed when persisted reviews were added.
pub fn aggregate(mut recipe: Recipe, persisted: &[Review]) -> Recipe {
    if !persisted.is_empty() {
        recipe.reviews.extend_from_slice(persisted);
        if let Some(mean) = average_rating(&recipe.reviews) {
            recipe.rating = mean;
        }
    }
    recipe.review_count = recipe.reviews.len();
    recipe
}

/// Reads the persisted reviews per recipe. Entries that cannot be read are
/// skipped; they stay in the store untouched.
pub fn load_review_map<S: KeyValueStore + ?Sized>(store: &S) -> ReviewMap {
    let raw: Map<String, Value> = store.get_or_default(REVIEWS_KEY);
    raw.into_iter()
        .map(|(recipe_id, entries)| {
            let reviews = match entries {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| match serde_json::from_value::<Review>(item) {
                        Ok(review) => Some(review),
                        Err(e) => {
                            warn!(recipe_id = %recipe_id, error = %e, "skipping unreadable review");
                            None
                        }
                    })
                    .collect(),
                _ => {
                    warn!(recipe_id = %recipe_id, "stored reviews are not a list");
                    Vec::new()
                }
            };
            (recipe_id, reviews)
        })
        .collect()
}

pub fn persisted_reviews<S: KeyValueStore + ?Sized>(store: &S, recipe_id: &str) -> Vec<Review> {
    load_review_map(store).remove(recipe_id).unwrap_or_default()
}

/// Profile entry in the user map, looked up by the session user id.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct UserProfile {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Picks the display name for a new review: the logged-in user's nickname,
/// then a handle derived from the session id, then the stored username,
/// then the anonymous placeholder.
pub fn resolve_author<S: KeyValueStore + ?Sized>(store: &S) -> String {
    let session: Option<String> = store.get_or(CURRENT_USER_KEY, None);
    if let Some(session_id) = session.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let users: HashMap<String, UserProfile> = store.get_or_default(USERS_KEY);
        let nickname = users
            .get(session_id)
            .and_then(|profile| profile.nickname.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty());
        if let Some(nickname) = nickname {
            return nickname.to_string();
        }
        return session_handle(session_id);
    }

    let username: Option<String> = store.get_or(USERNAME_KEY, None);
    match username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => ANONYMOUS_USER.to_string(),
    }
}

/// `cook@example.com` becomes `cook`; other ids are used as-is.
fn session_handle(session_id: &str) -> String {
    match session_id.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => session_id.to_string(),
    }
}

pub fn format_review_date(date: NaiveDate) -> String {
    date.format("%Y.%m.%d").to_string()
}

pub fn validate_review(rating: u8, text: &str) -> std::result::Result<(), ValidationError> {
    if text.trim().is_empty() || rating == 0 {
        return Err(ValidationError::EmptyReview);
    }
    if rating > 5 {
        return Err(ValidationError::RatingOutOfRange(rating));
    }
    Ok(())
}

/// Validates and records a review dated today.
pub fn submit_review<S: KeyValueStore + ?Sized>(
    store: &mut S,
    recipe_id: &str,
    rating: u8,
    text: &str,
    author: &str,
) -> Result<Review> {
    submit_review_on(store, recipe_id, rating, text, author, Local::now().date_naive())
}

/// Validates and records a review. The new review goes to the front of the
/// persisted list for `recipe_id`; every other stored entry is written back
/// as it was read. Nothing is written when validation fails.
pub fn submit_review_on<S: KeyValueStore + ?Sized>(
    store: &mut S,
    recipe_id: &str,
    rating: u8,
    text: &str,
    author: &str,
    date: NaiveDate,
) -> Result<Review> {
    validate_review(rating, text)?;

    let review = Review {
        user: author.to_string(),
        rating,
        text: text.trim().to_string(),
        date: format_review_date(date),
    };

    let mut map: Map<String, Value> = store.get_or_default(REVIEWS_KEY);
    let entry = serde_json::to_value(&review)?;
    match map.get_mut(recipe_id) {
        Some(Value::Array(list)) => list.insert(0, entry),
        _ => {
            map.insert(recipe_id.to_string(), Value::Array(vec![entry]));
        }
    }
    store.set(REVIEWS_KEY, &map)?;

    info!(recipe_id, rating, "review recorded");
    Ok(review)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::storage::MemoryStore;
    use anyhow::Result;
    use serde_json::json;

    fn review(rating: u8) -> Review {
        Review {
            user: "tester".into(),
            rating,
            text: "맛있어요".into(),
            date: "2025.05.01".into(),
        }
    }

    fn kimchi_fried_rice() -> Result<Recipe> {
        Ok(serde_json::from_value(json!({
            "id": "kimchi_fried_rice",
            "title": "김치볶음밥",
            "rating": 4.0,
            "review_count": 2,
            "reviews": [
                { "user": "a", "rating": 4, "text": "좋아요", "date": "2025.01.01" },
                { "user": "b", "rating": 4, "text": "맛있어요", "date": "2025.01.02" }
            ]
        }))?)
    }

    #[test]
    fn test_aggregate_appends_local_reviews_and_recomputes() -> Result<()> {
        let recipe = aggregate(kimchi_fried_rice()?, &[review(5)]);
        assert_eq!(recipe.review_count, 3);
        assert_eq!(recipe.reviews.len(), 3);
        assert_eq!(recipe.reviews[2].rating, 5);
        assert_eq!(recipe.rating, 4.3);
        Ok(())
    }

    #[test]
    fn test_aggregate_without_local_reviews_keeps_rating() -> Result<()> {
        let mut recipe = kimchi_fried_rice()?;
        recipe.rating = 4.7;
        recipe.review_count = 152;
        let recipe = aggregate(recipe, &[]);
        assert_eq!(recipe.rating, 4.7);
        assert_eq!(recipe.review_count, recipe.reviews.len());
        Ok(())
    }

    #[test]
    fn test_aggregate_with_no_reviews_at_all() -> Result<()> {
        let recipe: Recipe = serde_json::from_value(json!({ "id": "x", "rating": 3.5 }))?;
        let recipe = aggregate(recipe, &[]);
        assert_eq!(recipe.rating, 3.5);
        assert_eq!(recipe.review_count, 0);
        Ok(())
    }

    #[test]
    fn test_empty_text_is_rejected_without_writing() {
        let mut store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let result = submit_review_on(&mut store, "kimchi_fried_rice", 4, "   ", "tester", date);
        assert!(matches!(result, Err(CatalogError::Validation(ValidationError::EmptyReview))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_and_out_of_range_ratings_are_rejected() {
        let mut store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert!(submit_review_on(&mut store, "x", 0, "좋아요", "tester", date).is_err());
        assert!(matches!(
            submit_review_on(&mut store, "x", 6, "좋아요", "tester", date),
            Err(CatalogError::Validation(ValidationError::RatingOutOfRange(6)))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_submission_prepends_and_formats_date() -> Result<()> {
        let mut store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        submit_review_on(&mut store, "x", 3, "first", "a", date)?;
        let second = submit_review_on(&mut store, "x", 5, "  second  ", "b", date)?;
        assert_eq!(second.date, "2025.03.07");
        assert_eq!(second.text, "second");

        let stored = persisted_reviews(&store, "x");
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].text, "second");
        assert_eq!(stored[1].text, "first");
        Ok(())
    }

    #[test]
    fn test_author_resolution_order() -> Result<()> {
        let mut store = MemoryStore::new();
        assert_eq!(resolve_author(&store), ANONYMOUS_USER);

        store.set(USERNAME_KEY, "  ")?;
        assert_eq!(resolve_author(&store), ANONYMOUS_USER);

        store.set(USERNAME_KEY, "냠냠이")?;
        assert_eq!(resolve_author(&store), "냠냠이");

        store.set(CURRENT_USER_KEY, "cook@example.com")?;
        assert_eq!(resolve_author(&store), "cook");

        store.set(
            USERS_KEY,
            &json!({ "cook@example.com": { "nickname": "요리왕", "email": "cook@example.com" } }),
        )?;
        assert_eq!(resolve_author(&store), "요리왕");
        Ok(())
    }

    #[test]
    fn test_submission_keeps_other_recipes_reviews_when_one_is_malformed() -> Result<()> {
        let mut store = MemoryStore::new();
        store.set(
            REVIEWS_KEY,
            &json!({
                "kimchi_fried_rice": [{ "user": "a", "rating": 5, "text": "최고", "date": "2025.01.01" }],
                "tiramisu": [{ "user": "b", "rating": "4", "text": "달아요" }, "옛 형식", 17]
            }),
        )?;
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        submit_review_on(&mut store, "bulgogi", 4, "좋아요", "c", date)?;

        assert_eq!(persisted_reviews(&store, "kimchi_fried_rice").len(), 1);
        assert_eq!(persisted_reviews(&store, "bulgogi").len(), 1);
        let tiramisu = persisted_reviews(&store, "tiramisu");
        assert_eq!(tiramisu.len(), 1);
        assert_eq!(tiramisu[0].rating, 4);

        let raw: Value = store.get_or(REVIEWS_KEY, Value::Null);
        assert_eq!(raw["tiramisu"][1], json!("옛 형식"));
        assert_eq!(raw["tiramisu"][2], json!(17));
        Ok(())
    }

    #[test]
    fn test_submission_replaces_a_non_list_entry() -> Result<()> {
        let mut store = MemoryStore::new();
        store.set(REVIEWS_KEY, &json!({ "x": "broken", "y": [] }))?;
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        submit_review_on(&mut store, "x", 5, "좋아요", "c", date)?;
        assert_eq!(persisted_reviews(&store, "x").len(), 1);
        assert!(load_review_map(&store).contains_key("y"));
        Ok(())
    }
}
