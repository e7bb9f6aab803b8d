//! Key-value persistence standing in for the browser's local storage.
//!
//! Backends only move raw text; [`JsonStore`] layers JSON encoding on top and
//! turns unreadable values into caller-supplied defaults.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

pub const LOCAL_RECIPES_KEY: &str = "nn_recipes";
pub const DRAFT_KEY: &str = "nn_recipe_draft";
pub const RECENT_RECIPES_KEY: &str = "nn_recent_recipes";
pub const REVIEWS_KEY: &str = "nn_reviews";
pub const USERNAME_KEY: &str = "nn_username";
pub const CURRENT_USER_KEY: &str = "nn_current_user";
pub const USERS_KEY: &str = "nn_users";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to persist value: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_raw(&mut self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

pub trait JsonStore: KeyValueStore {
    /// Reads `key`, falling back to `default` when it is missing, unreadable
    /// or not valid JSON for `T`. Never fails.
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.get_raw(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value");
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored value is not valid JSON, using default");
                default
            }
        }
    }

    fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get_or(key, T::default())
    }

    fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(key, encoded)
    }
}

impl<S: KeyValueStore + ?Sized> JsonStore for S {}
