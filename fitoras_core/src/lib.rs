#![forbid(unsafe_code)]

//! Core domain model and business logic for the Fitoras workout planner.
//!
//! This crate provides:
//! - Domain types (exercises, splits, day groups, split tags, completions)
//! - Pure split edits and the split document store
//! - Split tag registry with cascading delete
//! - Exercise catalog cache and filter engine
//! - Calendar aggregation and dashboard statistics
//! - Key-value persistence, configuration and logging

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod storage;
pub mod catalog;
pub mod filter;
pub mod editor;
pub mod splits;
pub mod categories;
pub mod calendar;
pub mod stats;
pub mod app;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use app::App;
pub use catalog::{CatalogClient, CatalogState, ExerciseCatalog};
pub use categories::CategoryRegistry;
pub use splits::SplitStore;
pub use calendar::{CompletionStore, DaySummary};
pub use filter::{apply_filters, FilterOptions};
pub use stats::DashboardStats;
pub use storage::{FileStore, KeyValueStore, MemoryStore, Partition};

/// Fresh unique identifier for splits, day groups and split tags
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
