//! Application facade wiring the stores over one key-value backend.

use crate::calendar::{date_key, CompletionStore, DaySummary};
use crate::catalog::ExerciseCatalog;
use crate::categories::CategoryRegistry;
use crate::config::Config;
use crate::splits::SplitStore;
use crate::stats::DashboardStats;
use crate::storage::{FileStore, KeyValueStore};
use crate::types::Split;
use crate::Result;
use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;

pub struct App {
    pub splits: SplitStore,
    pub categories: CategoryRegistry,
    pub completions: CompletionStore,
    pub catalog: ExerciseCatalog,
}

impl App {
    /// Open every store over `store` and hydrate from it.
    ///
    /// The catalog is only read from cache here; fetching is the caller's
    /// decision since it is the one networked operation.
    pub fn open(store: Arc<dyn KeyValueStore>, config: &Config) -> Result<Self> {
        let mut app = Self {
            splits: SplitStore::new(store.clone()),
            categories: CategoryRegistry::new(store.clone()),
            completions: CompletionStore::new(store.clone()),
            catalog: ExerciseCatalog::new(store, config.catalog.cache_key.clone()),
        };
        app.splits.load()?;
        app.categories.load()?;
        app.completions.load()?;
        app.catalog.load_cached()?;
        Ok(app)
    }

    /// Open a file-backed app rooted at `data_dir`
    pub fn open_dir(data_dir: &Path, config: &Config) -> Result<Self> {
        Self::open(Arc::new(FileStore::new(data_dir)), config)
    }

    pub fn active_split(&self) -> Option<&Split> {
        self.splits.active_split()
    }

    /// Delete a split tag and detach it from every split
    pub fn remove_category(&mut self, id: &str) -> bool {
        let splits = &mut self.splits;
        self.categories
            .remove_category(id, |tag_id| splits.clear_category(tag_id))
    }

    /// Toggle completion of an exercise on `date`; returns the new state
    pub fn toggle_exercise(&mut self, date: NaiveDate, exercise_id: &str) -> bool {
        self.completions.toggle_exercise(&date_key(date), exercise_id)
    }

    pub fn day_summary(&self, date: NaiveDate) -> DaySummary {
        DaySummary::for_date(self.active_split(), self.completions.log(), date)
    }

    pub fn stats(&self, today: NaiveDate) -> DashboardStats {
        DashboardStats::compute(self.splits.splits(), self.completions.log(), today)
    }
}
