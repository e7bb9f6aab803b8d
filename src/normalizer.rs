//! Converts locally authored recipe records into the canonical [`Recipe`].
//!
//! Records written by older versions of the registration form keep their
//! ingredients and steps as free text, newer ones as structured lists. Each
//! shape is resolved to a source variant first and then normalized by the
//! function for that variant. Every branch has a default; normalization
//! never fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{
    AuthoredStep, Ingredient, IngredientsField, LocalRecipe, Recipe, Step, StepsField, ViewCount,
};

pub const UNTITLED_RECIPE: &str = "제목 없는 레시피";
pub const DEFAULT_CATEGORY: &str = "기타";
pub const UNKNOWN_DIFFICULTY: &str = "난이도 정보 없음";
pub const UNKNOWN_TIME: &str = "시간 정보 없음";

/// Leading ordinal such as `1.`, `2 단계` or `3. 단계`.
static STEP_MARKER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d+\s*\.?\s*(단계)?\s*").ok());

pub fn step_placeholder(index: usize) -> String {
    format!("단계 {}", index + 1)
}

#[derive(Debug, Clone, PartialEq)]
pub enum IngredientSource<'a> {
    Structured(&'a [Ingredient]),
    Text(&'a str),
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepSource<'a> {
    Authored(&'a [AuthoredStep]),
    Display(&'a [Step]),
    Text(&'a str),
    Missing,
}

/// Structured `ingredients`, then the `ingredients_required` list, then text.
pub fn required_ingredient_source(record: &LocalRecipe) -> IngredientSource<'_> {
    match (&record.ingredients, &record.ingredients_required) {
        (Some(IngredientsField::Items(items)), _) => IngredientSource::Structured(items),
        (_, Some(items)) => IngredientSource::Structured(items),
        (Some(IngredientsField::Text(text)), None) => IngredientSource::Text(text),
        (None, None) => IngredientSource::Missing,
    }
}

/// Structured `optional_ingredients` take priority over the older field.
pub fn optional_ingredient_source(record: &LocalRecipe) -> IngredientSource<'_> {
    match (&record.optional_ingredients, &record.ingredients_optional) {
        (Some(items), _) => IngredientSource::Structured(items),
        (None, Some(IngredientsField::Items(items))) => IngredientSource::Structured(items),
        (None, Some(IngredientsField::Text(text))) => IngredientSource::Text(text),
        (None, None) => IngredientSource::Missing,
    }
}

pub fn step_source(record: &LocalRecipe) -> StepSource<'_> {
    match &record.steps {
        Some(StepsField::Authored(steps)) => StepSource::Authored(steps),
        Some(StepsField::Display(steps)) => StepSource::Display(steps),
        Some(StepsField::Text(text)) => StepSource::Text(text),
        None => StepSource::Missing,
    }
}

pub fn normalize_ingredients(source: IngredientSource<'_>) -> Vec<Ingredient> {
    match source {
        IngredientSource::Structured(items) => items.to_vec(),
        IngredientSource::Text(text) => split_ingredient_text(text),
        IngredientSource::Missing => Vec::new(),
    }
}

/// One entry per non-empty comma or newline separated segment.
pub fn split_ingredient_text(text: &str) -> Vec<Ingredient> {
    text.split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Ingredient::named)
        .collect()
}

pub fn normalize_steps(source: StepSource<'_>) -> Vec<Step> {
    match source {
        StepSource::Authored(steps) => steps
            .iter()
            .enumerate()
            .map(|(idx, step)| Step {
                title: non_empty_or(&step.title, || step_placeholder(idx)),
                desc: step.description.clone(),
            })
            .collect(),
        StepSource::Display(steps) => steps.to_vec(),
        StepSource::Text(text) => split_step_text(text),
        StepSource::Missing => Vec::new(),
    }
}

/// Splits free text into blank-line separated blocks.
///
/// A block of several lines uses its first line (minus any ordinal marker)
/// as the title and the rest as the description. A single-line block has
/// no separate title: it becomes the description under a placeholder title.
pub fn split_step_text(text: &str) -> Vec<Step> {
    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
        .into_iter()
        .enumerate()
        .map(|(idx, lines)| match lines.split_first() {
            Some((first, rest)) if !rest.is_empty() => Step {
                title: non_empty_or(strip_step_marker(first), || step_placeholder(idx)),
                desc: rest.join("\n"),
            },
            _ => Step {
                title: step_placeholder(idx),
                desc: lines.first().map(|l| strip_step_marker(l)).unwrap_or_default().to_string(),
            },
        })
        .collect()
}

pub fn strip_step_marker(line: &str) -> &str {
    match STEP_MARKER.as_ref().and_then(|re| re.find(line)) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

fn non_empty_or(value: &str, fallback: impl FnOnce() -> String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback()
    } else {
        trimmed.to_string()
    }
}

fn text_or(value: &Option<String>, fallback: &str) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}

pub fn normalize_local_recipe(record: &LocalRecipe) -> Recipe {
    let reviews = record.reviews.clone().unwrap_or_default();
    let thumbnail = text_or(&record.thumbnail, "");
    let image = text_or(&record.image, "");

    Recipe {
        id: record.id.clone(),
        title: text_or(&record.title, UNTITLED_RECIPE),
        category: text_or(&record.category, DEFAULT_CATEGORY),
        summary: text_or(&record.summary, ""),
        difficulty: text_or(&record.difficulty, UNKNOWN_DIFFICULTY),
        time: text_or(&record.time, UNKNOWN_TIME),
        thumbnail: if thumbnail.is_empty() { image.clone() } else { thumbnail.clone() },
        image: if image.is_empty() { thumbnail } else { image },
        rating: record.rating.filter(|r| r.is_finite()).unwrap_or(0.0),
        review_count: reviews.len(),
        ingredients_required: normalize_ingredients(required_ingredient_source(record)),
        ingredients_optional: normalize_ingredients(optional_ingredient_source(record)),
        steps: normalize_steps(step_source(record)),
        reviews,
        views: record.views.clone().unwrap_or(ViewCount::Count(0)),
    }
}

/// Fills display placeholders on a recipe from the static catalog, whose
/// records may omit fields.
pub fn fill_display_defaults(mut recipe: Recipe) -> Recipe {
    if recipe.title.trim().is_empty() {
        recipe.title = UNTITLED_RECIPE.to_string();
    }
    if recipe.category.trim().is_empty() {
        recipe.category = DEFAULT_CATEGORY.to_string();
    }
    if recipe.difficulty.trim().is_empty() {
        recipe.difficulty = UNKNOWN_DIFFICULTY.to_string();
    }
    if recipe.time.trim().is_empty() {
        recipe.time = UNKNOWN_TIME.to_string();
    }
    if recipe.thumbnail.is_empty() {
        recipe.thumbnail = recipe.image.clone();
    }
    if recipe.image.is_empty() {
        recipe.image = recipe.thumbnail.clone();
    }
    if !recipe.rating.is_finite() {
        recipe.rating = 0.0;
    }
    recipe
}
