//! Record shapes shared by the catalog, the local store and the pages.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_THUMBNAIL: &str = "default.png";

/// Accepts either a JSON string or a JSON number and yields a string.
///
/// Static recipes carry slugs while locally authored ones carry millisecond
/// timestamps, so every id is compared as text.
pub fn string_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(f) => f.to_string(),
    })
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Text field that also takes numbers (`"amount": 200`); null and
/// structured values read as empty.
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?))
}

/// Number that may be stored as text (`"4.5"`) or null.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_number(&Value::deserialize(deserializer)?).unwrap_or(0.0))
}

pub fn lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_number(&Value::deserialize(deserializer)?))
}

pub fn lenient_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_number(&Value::deserialize(deserializer)?)
        .filter(|v| *v >= 0.0)
        .map_or(0, |v| v.round() as usize))
}

/// Star rating of a single review, rounded to a whole star in `0..=5`.
pub fn lenient_rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_number(&Value::deserialize(deserializer)?)
        .map_or(0, |v| v.round().clamp(0.0, 5.0) as u8))
}

/// List field that keeps the entries it can read. Null or non-list values
/// read as empty.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "skipping unreadable list entry");
                None
            }
        })
        .collect())
}

pub fn lenient_opt_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        items @ Value::Array(_) => lenient_list(items).map(Some).map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Ingredient {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub amount: String,
}

impl Ingredient {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: String::new(),
        }
    }
}

/// A cooking step in display form.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Step {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub desc: String,
}

/// A cooking step as written by the current registration form.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct AuthoredStep {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Review {
    #[serde(default, deserialize_with = "lenient_text")]
    pub user: String,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: u8,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
}

/// View counter. Older data abbreviates large counts as `"1.2K"`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum ViewCount {
    Count(u64),
    Label(String),
}

impl<'de> Deserialize<'de> for ViewCount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(label) => ViewCount::Label(label),
            other => ViewCount::Count(
                scalar_number(&other)
                    .filter(|v| *v >= 0.0)
                    .map_or(0, |v| v.round() as u64),
            ),
        })
    }
}

impl Default for ViewCount {
    fn default() -> Self {
        ViewCount::Count(0)
    }
}

impl ViewCount {
    pub fn value(&self) -> u64 {
        match self {
            ViewCount::Count(n) => *n,
            ViewCount::Label(label) => parse_view_label(label),
        }
    }
}

fn parse_view_label(label: &str) -> u64 {
    let trimmed = label.trim().replace(',', "");
    let (digits, multiplier) = match trimmed.strip_suffix(['K', 'k']) {
        Some(rest) => (rest.trim(), 1000.0),
        None => (trimmed.as_str(), 1.0),
    };
    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => (v * multiplier).round() as u64,
        _ => 0,
    }
}

/// Canonical recipe shape used by every page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recipe {
    #[serde(deserialize_with = "string_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub image: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub review_count: usize,
    #[serde(default, deserialize_with = "lenient_list")]
    pub ingredients_required: Vec<Ingredient>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub ingredients_optional: Vec<Ingredient>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub steps: Vec<Step>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub views: ViewCount,
}

impl Recipe {
    /// Thumbnail and image stand in for each other.
    pub fn display_image(&self) -> &str {
        if !self.thumbnail.is_empty() {
            &self.thumbnail
        } else if !self.image.is_empty() {
            &self.image
        } else {
            DEFAULT_THUMBNAIL
        }
    }
}

/// Ingredients as persisted by either generation of the registration form.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum IngredientsField {
    Items(Vec<Ingredient>),
    Text(String),
}

/// Steps as persisted by any generation of the registration form.
///
/// Variant order matters for untagged decoding: `Authored` requires a
/// `description` key, so `{title, desc}` arrays fall through to `Display`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum StepsField {
    Authored(Vec<AuthoredStep>),
    Display(Vec<Step>),
    Text(String),
}

/// A recipe authored through the registration form and kept in the local store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocalRecipe {
    #[serde(deserialize_with = "string_id")]
    pub id: String,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub difficulty: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub thumbnail: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<IngredientsField>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub ingredients_required: Option<Vec<Ingredient>>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub optional_ingredients: Option<Vec<Ingredient>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients_optional: Option<IngredientsField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<StepsField>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub rating: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub reviews: Option<Vec<Review>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<ViewCount>,
    #[serde(
        default,
        rename = "createdAt",
        alias = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<i64>,
}

impl LocalRecipe {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            category: None,
            summary: None,
            difficulty: None,
            time: None,
            thumbnail: None,
            image: None,
            ingredients: None,
            ingredients_required: None,
            optional_ingredients: None,
            ingredients_optional: None,
            steps: None,
            rating: None,
            reviews: None,
            views: None,
            created_at: None,
        }
    }
}

/// Lightweight summary kept in the recent-views list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecentEntry {
    #[serde(deserialize_with = "string_id")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub info: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub thumbnail: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub rating: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub review_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_numeric_and_string_ids_become_strings() -> Result<()> {
        let local: LocalRecipe = serde_json::from_value(json!({ "id": 1764000000000_i64 }))?;
        assert_eq!(local.id, "1764000000000");

        let recipe: Recipe = serde_json::from_value(json!({ "id": "kimchi_fried_rice" }))?;
        assert_eq!(recipe.id, "kimchi_fried_rice");
        Ok(())
    }

    #[test]
    fn test_view_count_parses_k_suffix() -> Result<()> {
        let views: Vec<ViewCount> = serde_json::from_value(json!([120, "1.2K", "3k", "950", "abc"]))?;
        let values: Vec<u64> = views.iter().map(ViewCount::value).collect();
        assert_eq!(values, vec![120, 1200, 3000, 950, 0]);
        Ok(())
    }

    #[test]
    fn test_steps_field_variants_decode_by_shape() -> Result<()> {
        let authored: StepsField =
            serde_json::from_value(json!([{ "title": "", "description": "끓인다" }]))?;
        assert!(matches!(authored, StepsField::Authored(_)));

        let display: StepsField = serde_json::from_value(json!([{ "title": "준비", "desc": "썬다" }]))?;
        assert!(matches!(display, StepsField::Display(_)));

        let text: StepsField = serde_json::from_value(json!("1. 물을 끓인다"))?;
        assert!(matches!(text, StepsField::Text(_)));
        Ok(())
    }

    #[test]
    fn test_recipe_tolerates_missing_fields() -> Result<()> {
        let recipe: Recipe = serde_json::from_value(json!({ "id": "a", "title": "떡볶이" }))?;
        assert_eq!(recipe.title, "떡볶이");
        assert!(recipe.reviews.is_empty());
        assert_eq!(recipe.display_image(), DEFAULT_THUMBNAIL);
        Ok(())
    }

    #[test]
    fn test_review_rating_shapes_are_coerced() -> Result<()> {
        let reviews: Vec<Review> = serde_json::from_value(json!([
            { "user": "a", "rating": 4.5, "text": "좋아요" },
            { "user": "b", "rating": "3", "text": "보통" },
            { "user": "c", "rating": null, "text": "글쎄요" },
            { "user": 7, "rating": 9, "text": "최고" }
        ]))?;
        let ratings: Vec<u8> = reviews.iter().map(|r| r.rating).collect();
        assert_eq!(ratings, vec![5, 3, 0, 5]);
        assert_eq!(reviews[3].user, "7");
        Ok(())
    }

    #[test]
    fn test_numeric_ingredient_amounts_are_kept_as_text() -> Result<()> {
        let recipe: Recipe = serde_json::from_value(json!({
            "id": "bulgogi",
            "title": "불고기",
            "rating": "4.6",
            "review_count": null,
            "views": 1200.0,
            "ingredients_required": [{ "name": "소고기", "amount": 200 }, { "name": "간장", "amount": null }]
        }))?;
        assert_eq!(recipe.ingredients_required[0].amount, "200");
        assert_eq!(recipe.ingredients_required[1].amount, "");
        assert_eq!(recipe.rating, 4.6);
        assert_eq!(recipe.review_count, 0);
        assert_eq!(recipe.views, ViewCount::Count(1200));

        let recipe: Recipe = serde_json::from_value(json!({
            "id": "tiramisu",
            "reviews": null,
            "steps": [{ "title": "크림", "desc": "섞는다" }, "굳힌다"]
        }))?;
        assert!(recipe.reviews.is_empty());
        assert_eq!(recipe.steps.len(), 1);
        Ok(())
    }

    #[test]
    fn test_local_recipe_with_loose_scalars_still_reads() -> Result<()> {
        let local: LocalRecipe = serde_json::from_value(json!({
            "id": 1764000000000_i64,
            "title": 42,
            "rating": "n/a",
            "views": null,
            "ingredients": [{ "name": "두부", "amount": 1 }]
        }))?;
        assert_eq!(local.title.as_deref(), Some("42"));
        assert_eq!(local.rating, None);
        assert_eq!(local.views, None);
        assert_eq!(
            local.ingredients,
            Some(IngredientsField::Items(vec![Ingredient {
                name: "두부".into(),
                amount: "1".into()
            }]))
        );
        Ok(())
    }
}
