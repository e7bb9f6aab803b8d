use std::path::Path;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::error::{CatalogError, Result};
use crate::models::Recipe;
use crate::normalizer::fill_display_defaults;

/// Where the static catalog document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Url(String),
    File(String),
}

impl CatalogSource {
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            CatalogSource::Url(source.to_string())
        } else {
            CatalogSource::File(source.to_string())
        }
    }
}

/// Loads the baseline catalog. The whole document must be valid JSON; a
/// missing or non-list `recipes` field reads as an empty catalog and
/// individual records that cannot be read are skipped.
pub async fn load_static_catalog(source: &CatalogSource) -> Result<Vec<Recipe>> {
    let body = match source {
        CatalogSource::Url(url) => fetch_catalog_document(url).await,
        CatalogSource::File(path) => read_catalog_document(Path::new(path)).await,
    }
    .inspect_err(|e| error!(?source, error = %e, "failed to load static catalog"))?;

    let recipes = parse_catalog_document(&body)?;
    info!(count = recipes.len(), "static catalog loaded");
    Ok(recipes)
}

async fn fetch_catalog_document(url: &str) -> Result<String> {
    debug!(url, "fetching static catalog");
    let response = Client::new().get(url).send().await?;
    if !response.status().is_success() {
        return Err(CatalogError::HttpStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }
    Ok(response.text().await?)
}

async fn read_catalog_document(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "reading static catalog");
    Ok(fs::read_to_string(path).await?)
}

pub fn parse_catalog_document(body: &str) -> Result<Vec<Recipe>> {
    let document: Value = serde_json::from_str(body)?;
    let Some(records) = document.get("recipes").and_then(Value::as_array) else {
        warn!("catalog document has no 'recipes' list");
        return Ok(Vec::new());
    };

    let recipes = records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| match read_catalog_record(record) {
            Ok(recipe) => Some(fill_display_defaults(recipe)),
            Err(e) => {
                warn!(index = idx, error = %e, "skipping unreadable catalog record");
                None
            }
        })
        .collect();
    Ok(recipes)
}

/// Older catalog entries carry `name` instead of `title`.
fn read_catalog_record(record: &Value) -> serde_json::Result<Recipe> {
    let mut recipe = Recipe::deserialize(record)?;
    if recipe.title.trim().is_empty() {
        if let Some(name) = record.get("name").and_then(Value::as_str) {
            recipe.title = name.to_string();
        }
    }
    Ok(recipe)
}
