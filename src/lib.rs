pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod normalizer;
pub mod recent;
pub mod register;
pub mod render;
pub mod reviews;
pub mod storage;

pub use error::{CatalogError, Result, ValidationError};
