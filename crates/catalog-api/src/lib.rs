//! Catalogue API library for fetching anime and genre records.
//!
//! This library provides the HTTP client for the catalogue service, the
//! validation boundary for its responses, and an on-disk response cache.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod error;

pub use api::{AnimePage, CatalogClient, ListQuery, RecordError};
pub use cache::{CacheManager, CacheStats};
pub use catalog::{CachedCatalog, CatalogApi};
pub use error::{FetchError, FetchResult};
pub use reqwest::StatusCode;
