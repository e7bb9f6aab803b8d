use std::env;
use std::path::PathBuf;

use dotenv::dotenv;

use crate::catalog::CatalogSource;

pub const CATALOG_SOURCE_ENV_VAR: &str = "RECIPE_CATALOG_SOURCE";
pub const STORE_DIR_ENV_VAR: &str = "RECIPE_STORE_DIR";
pub const DETAIL_PAGE_ENV_VAR: &str = "RECIPE_DETAIL_PAGE";

pub const DEFAULT_CATALOG_SOURCE: &str = "recipes.json";
pub const DEFAULT_STORE_DIR: &str = ".recipe_store";
pub const DEFAULT_DETAIL_PAGE: &str = "recipe.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub catalog_source: CatalogSource,
    pub store_dir: PathBuf,
    pub detail_page: String,
}

impl AppConfig {
    /// Reads the environment (after loading `.env`, if present). Command-line
    /// values, when given, take precedence.
    pub fn load(catalog_override: Option<&str>, store_override: Option<&str>) -> Self {
        dotenv().ok();
        Self::resolve(
            catalog_override.map(str::to_string).or_else(|| env::var(CATALOG_SOURCE_ENV_VAR).ok()),
            store_override.map(str::to_string).or_else(|| env::var(STORE_DIR_ENV_VAR).ok()),
            env::var(DETAIL_PAGE_ENV_VAR).ok(),
        )
    }

    fn resolve(
        catalog_source: Option<String>,
        store_dir: Option<String>,
        detail_page: Option<String>,
    ) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            catalog_source: CatalogSource::parse(
                &non_empty(catalog_source).unwrap_or_else(|| DEFAULT_CATALOG_SOURCE.to_string()),
            ),
            store_dir: PathBuf::from(
                non_empty(store_dir).unwrap_or_else(|| DEFAULT_STORE_DIR.to_string()),
            ),
            detail_page: non_empty(detail_page).unwrap_or_else(|| DEFAULT_DETAIL_PAGE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_unset_or_blank() {
        let config = AppConfig::resolve(None, Some("  ".into()), None);
        assert_eq!(config.catalog_source, CatalogSource::File(DEFAULT_CATALOG_SOURCE.into()));
        assert_eq!(config.store_dir, PathBuf::from(DEFAULT_STORE_DIR));
        assert_eq!(config.detail_page, DEFAULT_DETAIL_PAGE);
    }

    #[test]
    fn test_explicit_values_are_used() {
        let config = AppConfig::resolve(
            Some("https://example.com/recipes.json".into()),
            Some("/tmp/store".into()),
            Some("detail.html".into()),
        );
        assert_eq!(
            config.catalog_source,
            CatalogSource::Url("https://example.com/recipes.json".into())
        );
        assert_eq!(config.store_dir, PathBuf::from("/tmp/store"));
        assert_eq!(config.detail_page, "detail.html");
    }
}
