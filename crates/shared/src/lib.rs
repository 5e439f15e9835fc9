//! Shared library for the anime browser workspace.
//!
//! This crate provides common functionality used across all crates:
//! - Configuration management
//! - Domain models (anime, genres, list entries)
//! - SQLite database and the personal list store
//! - Logging infrastructure
//! - Title slugs for detail page paths

pub mod config;
pub mod db;
pub mod lists;
pub mod logging;
pub mod models;
pub mod slug;

// Re-export commonly used types
pub use config::{Config, Strategy};
pub use db::Database;
pub use lists::{ListStats, UserLists};
pub use logging::LogConfig;
pub use models::*;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
