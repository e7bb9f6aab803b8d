//! Registration, editing and drafts for locally authored recipes.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::info;

use crate::error::{CatalogError, Result, ValidationError};
use crate::models::{IngredientsField, LocalRecipe, StepsField, ViewCount};
use crate::storage::{JsonStore, KeyValueStore, DRAFT_KEY, LOCAL_RECIPES_KEY};

/// Text fields of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub steps: String,
    #[serde(default)]
    pub category: String,
}

impl RecipeForm {
    fn trimmed(&self) -> RecipeForm {
        RecipeForm {
            title: self.title.trim().to_string(),
            ingredients: self.ingredients.trim().to_string(),
            steps: self.steps.trim().to_string(),
            category: self.category.trim().to_string(),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        let fields = [
            ("title", &self.title),
            ("ingredients", &self.ingredients),
            ("steps", &self.steps),
            ("category", &self.category),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ValidationError::MissingField(*name)),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    #[serde(flatten)]
    pub form: RecipeForm,
    #[serde(default)]
    pub image_name: String,
    #[serde(default)]
    pub saved_at: Option<i64>,
}

fn value_id(value: &Value) -> Option<String> {
    match value.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Appends a new local recipe built from `form` and clears the draft.
/// The id is the creation time in milliseconds.
pub fn register<S: KeyValueStore + ?Sized>(
    store: &mut S,
    form: &RecipeForm,
    image: Option<String>,
    now: DateTime<Local>,
) -> Result<LocalRecipe> {
    form.validate()?;
    let form = form.trimmed();
    let created_at = now.timestamp_millis();

    let mut record = LocalRecipe::new(created_at.to_string());
    record.title = Some(form.title);
    record.category = Some(form.category);
    record.image = Some(image.unwrap_or_default());
    record.ingredients = Some(IngredientsField::Text(form.ingredients));
    record.steps = Some(StepsField::Text(form.steps));
    record.views = Some(ViewCount::Count(0));
    record.rating = Some(0.0);
    record.created_at = Some(created_at);

    let mut list: Vec<Value> = store.get_or_default(LOCAL_RECIPES_KEY);
    list.push(serde_json::to_value(&record)?);
    store.set(LOCAL_RECIPES_KEY, &list)?;
    store.remove(DRAFT_KEY)?;

    info!(recipe_id = %record.id, "local recipe registered");
    Ok(record)
}

/// Rewrites the text fields of the local recipe `recipe_id`. The image is
/// only replaced when a new one is given. Other stored entries are written
/// back untouched.
pub fn update<S: KeyValueStore + ?Sized>(
    store: &mut S,
    recipe_id: &str,
    form: &RecipeForm,
    image: Option<String>,
) -> Result<LocalRecipe> {
    form.validate()?;
    let form = form.trimmed();

    let mut list: Vec<Value> = store.get_or_default(LOCAL_RECIPES_KEY);
    let slot = list
        .iter_mut()
        .find(|value| value_id(value).as_deref() == Some(recipe_id))
        .ok_or_else(|| CatalogError::RecipeNotFound(recipe_id.to_string()))?;

    let mut record: LocalRecipe = serde_json::from_value(slot.clone())?;
    record.title = Some(form.title);
    record.category = Some(form.category);
    record.ingredients = Some(IngredientsField::Text(form.ingredients));
    record.ingredients_required = None;
    record.steps = Some(StepsField::Text(form.steps));
    if let Some(image) = image {
        record.image = Some(image);
    }
    *slot = serde_json::to_value(&record)?;

    store.set(LOCAL_RECIPES_KEY, &list)?;
    info!(recipe_id, "local recipe updated");
    Ok(record)
}

/// Form values of an existing local recipe, for pre-filling edit mode.
pub fn edit_form<S: KeyValueStore + ?Sized>(store: &S, recipe_id: &str) -> Result<RecipeForm> {
    let list: Vec<Value> = store.get_or_default(LOCAL_RECIPES_KEY);
    let value = list
        .into_iter()
        .find(|value| value_id(value).as_deref() == Some(recipe_id))
        .ok_or_else(|| CatalogError::RecipeNotFound(recipe_id.to_string()))?;
    let record: LocalRecipe = serde_json::from_value(value)?;

    let ingredients = match record.ingredients {
        Some(IngredientsField::Text(text)) => text,
        Some(IngredientsField::Items(items)) => items
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        None => String::new(),
    };
    let steps = match record.steps {
        Some(StepsField::Text(text)) => text,
        Some(StepsField::Authored(steps)) => steps
            .into_iter()
            .map(|s| s.description)
            .collect::<Vec<_>>()
            .join("\n\n"),
        Some(StepsField::Display(steps)) => steps
            .into_iter()
            .map(|s| s.desc)
            .collect::<Vec<_>>()
            .join("\n\n"),
        None => String::new(),
    };

    Ok(RecipeForm {
        title: record.title.unwrap_or_default(),
        ingredients,
        steps,
        category: record.category.unwrap_or_default(),
    })
}

pub fn save_draft<S: KeyValueStore + ?Sized>(
    store: &mut S,
    form: &RecipeForm,
    image_name: &str,
    now: DateTime<Local>,
) -> Result<Draft> {
    let draft = Draft {
        form: form.trimmed(),
        image_name: image_name.to_string(),
        saved_at: Some(now.timestamp_millis()),
    };
    store.set(DRAFT_KEY, &draft)?;
    Ok(draft)
}

pub fn load_draft<S: KeyValueStore + ?Sized>(store: &S) -> Option<Draft> {
    store.get_or(DRAFT_KEY, None)
}

pub fn format_timestamp(millis: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|t| t.format("%Y.%m.%d %H:%M").to_string())
}

pub fn describe_draft(draft: Option<&Draft>) -> String {
    match draft.and_then(|d| d.saved_at).and_then(format_timestamp) {
        Some(when) => format!("마지막 임시저장: {}", when),
        None => "현재 임시저장된 내용이 없습니다.".to_string(),
    }
}

pub fn image_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Reads an image file into a `data:` URL.
pub async fn load_image_data_url(path: &Path) -> Result<String> {
    let bytes = fs::read(path).await?;
    Ok(format!("data:{};base64,{}", image_mime_type(path), STANDARD.encode(bytes)))
}
