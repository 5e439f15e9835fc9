//! Catalogue service client implementation.
//!
//! This module provides the HTTP client for the anime catalogue API together
//! with its wire types and the validation that turns them into domain records.

pub mod client;
pub mod request;
pub mod types;

pub use client::CatalogClient;
pub use request::ListQuery;
pub use types::*;
