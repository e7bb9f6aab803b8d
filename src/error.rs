use thiserror::Error;

use crate::storage::StorageError;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// User input that was rejected before any state was touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("리뷰 내용과 별점을 입력해주세요!")]
    EmptyReview,

    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("required field '{0}' is empty")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    /// Fetching the static catalog over HTTP failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Catalog request to {url} failed with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("준비 중인 레시피거나 데이터를 찾을 수 없습니다. (ID: {0})")]
    RecipeNotFound(String),

    #[error("잘못된 카테고리입니다. ({0})")]
    UnknownCategory(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
