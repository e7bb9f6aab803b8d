use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Recipe, RecentEntry};
use crate::navigation::detail_link;
use crate::storage::{JsonStore, KeyValueStore, RECENT_RECIPES_KEY};

pub const MAX_RECENT: usize = 10;

pub fn recent_entry(recipe: &Recipe, detail_page: &str) -> RecentEntry {
    RecentEntry {
        id: recipe.id.clone(),
        title: recipe.title.clone(),
        info: format!("{} · 리뷰 {}개", recipe.category, recipe.review_count),
        link: detail_link(detail_page, &recipe.id),
        thumbnail: recipe.display_image().to_string(),
        rating: recipe.rating,
        review_count: recipe.review_count,
    }
}

fn decode_entries(raw: &[Value]) -> Vec<RecentEntry> {
    raw.iter()
        .filter_map(|value| match RecentEntry::deserialize(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable recent entry");
                None
            }
        })
        .collect()
}

/// Stored ids may be strings or numbers.
fn stored_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

pub fn recent_views<S: KeyValueStore + ?Sized>(store: &S) -> Vec<RecentEntry> {
    let raw: Vec<Value> = store.get_or_default(RECENT_RECIPES_KEY);
    decode_entries(&raw)
}

/// Moves `recipe` to the front of the recent-views list with fresh data,
/// dropping any older entry for the same id and anything past the limit.
/// Entries that cannot be read are kept as stored.
pub fn record_view<S: KeyValueStore + ?Sized>(
    store: &mut S,
    recipe: &Recipe,
    detail_page: &str,
) -> Result<Vec<RecentEntry>> {
    let mut raw: Vec<Value> = store.get_or_default(RECENT_RECIPES_KEY);
    raw.retain(|value| stored_id(value).as_deref() != Some(recipe.id.as_str()));
    raw.insert(0, serde_json::to_value(recent_entry(recipe, detail_page))?);
    raw.truncate(MAX_RECENT);

    store.set(RECENT_RECIPES_KEY, &raw)?;
    debug!(recipe_id = %recipe.id, len = raw.len(), "recent views updated");
    Ok(decode_entries(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use anyhow::Result;
    use serde_json::json;

    fn recipe(id: &str) -> Recipe {
        serde_json::from_value(json!({
            "id": id,
            "title": format!("레시피 {}", id),
            "category": "한식",
            "review_count": 3
        }))
        .unwrap()
    }

    #[test]
    fn test_entry_summarizes_recipe() {
        let entry = recent_entry(&recipe("a b"), "recipe.html");
        assert_eq!(entry.info, "한식 · 리뷰 3개");
        assert_eq!(entry.link, "recipe.html?id=a%20b");
        assert_eq!(entry.thumbnail, "default.png");
    }

    #[test]
    fn test_revisit_moves_to_front_without_duplicating() -> Result<()> {
        let mut store = MemoryStore::new();
        for id in ["a", "b", "c"] {
            record_view(&mut store, &recipe(id), "recipe.html")?;
        }
        let list = record_view(&mut store, &recipe("a"), "recipe.html")?;
        let ids: Vec<&str> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "b"]);
        assert_eq!(recent_views(&store).len(), 3);
        Ok(())
    }

    #[test]
    fn test_list_is_capped() -> Result<()> {
        let mut store = MemoryStore::new();
        for n in 0..15 {
            record_view(&mut store, &recipe(&n.to_string()), "recipe.html")?;
        }
        let list = recent_views(&store);
        assert_eq!(list.len(), MAX_RECENT);
        assert_eq!(list[0].id, "14");
        assert_eq!(list[MAX_RECENT - 1].id, "5");
        Ok(())
    }

    #[test]
    fn test_numeric_ids_in_stored_list_match() -> Result<()> {
        let mut store = MemoryStore::new();
        store.set(
            RECENT_RECIPES_KEY,
            &json!([{ "id": 1764000000000_i64, "title": "old" }, { "id": "x", "title": "other" }]),
        )?;
        let list = record_view(&mut store, &recipe("1764000000000"), "recipe.html")?;
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "레시피 1764000000000");
        Ok(())
    }

    #[test]
    fn test_unreadable_entries_do_not_clear_the_list() -> Result<()> {
        let mut store = MemoryStore::new();
        store.set(
            RECENT_RECIPES_KEY,
            &json!([
                { "id": "a", "title": "A", "rating": 4.0 },
                { "id": "b", "title": "B", "rating": null },
                { "title": "no id" }
            ]),
        )?;
        assert_eq!(recent_views(&store).len(), 2);

        let list = record_view(&mut store, &recipe("c"), "recipe.html")?;
        let ids: Vec<&str> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let raw: Vec<serde_json::Value> = store.get_or_default(RECENT_RECIPES_KEY);
        assert_eq!(raw.len(), 4);
        assert_eq!(raw[3], json!({ "title": "no id" }));
        Ok(())
    }
}
