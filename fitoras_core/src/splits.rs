//! Split document store.
//!
//! Owns the ordered list of splits and is the only place they change.
//! The first split in the list is the active one. Each mutation updates
//! memory first and then persists; a failed write is logged and the
//! in-memory list stays authoritative.

use crate::editor::empty_week;
use crate::storage::{load_json, save_json, KeyValueStore, Partition};
use crate::types::{Split, SplitDraft, SplitPatch, Weekday, WorkoutDay};
use crate::{new_id, Error, Result};
use std::sync::Arc;

const SPLITS_KEY: &str = "splits";

/// Days must cover the whole week once each, Monday first
fn check_week(days: &[WorkoutDay]) -> Result<()> {
    let in_order = days.len() == Weekday::ALL.len()
        && days.iter().zip(Weekday::ALL).all(|(d, day)| d.day == day);
    if !in_order {
        return Err(Error::validation(
            "split days must list Monday through Sunday exactly once",
        ));
    }
    Ok(())
}

pub struct SplitStore {
    store: Arc<dyn KeyValueStore>,
    splits: Vec<Split>,
    loaded: bool,
}

impl SplitStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            splits: Vec::new(),
            loaded: false,
        }
    }

    /// Hydrate from storage once; later calls do nothing.
    ///
    /// A stored value that no longer parses is logged and replaced by an
    /// empty list, the way a corrupted state file falls back to defaults.
    pub fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }

        self.splits = match load_json::<Vec<Split>>(self.store.as_ref(), Partition::Splits, SPLITS_KEY) {
            Ok(Some(splits)) => splits,
            Ok(None) => Vec::new(),
            Err(Error::Json(e)) => {
                tracing::warn!("Stored splits are unreadable: {}. Starting empty.", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        self.loaded = true;
        tracing::info!("Loaded {} splits", self.splits.len());
        Ok(())
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn get(&self, id: &str) -> Option<&Split> {
        self.splits.iter().find(|s| s.id == id)
    }

    /// The split that drives the calendar and dashboard
    pub fn active_split(&self) -> Option<&Split> {
        self.splits.first()
    }

    /// Create a split with seven empty days and append it
    pub fn add_split(&mut self, draft: SplitDraft) -> Result<Split> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(Error::validation("split name must not be empty"));
        }

        let split = Split {
            id: new_id(),
            name: name.to_string(),
            description: draft.description.filter(|d| !d.trim().is_empty()),
            days: empty_week(),
            category: None,
        };
        self.splits.push(split.clone());
        tracing::debug!("Added split {} ({})", split.id, split.name);
        self.persist();
        Ok(split)
    }

    /// Returns true if a split was removed
    pub fn remove_split(&mut self, id: &str) -> bool {
        let before = self.splits.len();
        self.splits.retain(|s| s.id != id);
        if self.splits.len() == before {
            return false;
        }
        tracing::debug!("Removed split {}", id);
        self.persist();
        true
    }

    /// Shallow-merge `patch` into the split with `id`.
    ///
    /// Returns `Ok(false)` if no split has that id.
    pub fn update_split(&mut self, id: &str, patch: SplitPatch) -> Result<bool> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(Error::validation("split name must not be empty"));
            }
        }
        if let Some(days) = &patch.days {
            check_week(days)?;
        }

        let Some(split) = self.splits.iter_mut().find(|s| s.id == id) else {
            tracing::debug!("Split {} not found; update ignored", id);
            return Ok(false);
        };

        if let Some(name) = patch.name {
            split.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            split.description = description;
        }
        if let Some(days) = patch.days {
            split.days = days;
        }
        if let Some(category) = patch.category {
            split.category = category;
        }
        tracing::debug!("Updated split {}", id);
        self.persist();
        Ok(true)
    }

    /// Run a pure edit against the current split and commit its days.
    ///
    /// The edit always sees the latest state, so two edits issued back to
    /// back compose instead of overwriting each other.
    pub fn edit<F>(&mut self, id: &str, f: F) -> Result<Option<Split>>
    where
        F: FnOnce(&Split) -> Result<Split>,
    {
        let Some(current) = self.get(id) else {
            tracing::debug!("Split {} not found; edit ignored", id);
            return Ok(None);
        };

        let next = f(current)?;
        if &next == current {
            return Ok(Some(next));
        }
        self.update_split(id, SplitPatch::days(next.days.clone()))?;
        Ok(Some(next))
    }

    /// Replace the whole ordered list.
    ///
    /// Nothing changes unless every split carries a full week.
    pub fn set_splits(&mut self, splits: Vec<Split>) -> Result<()> {
        for split in &splits {
            check_week(&split.days)?;
        }
        self.splits = splits;
        tracing::debug!("Replaced split list ({} splits)", self.splits.len());
        self.persist();
        Ok(())
    }

    /// Move the split at `from` to position `to`
    pub fn move_split(&mut self, from: usize, to: usize) -> bool {
        if from >= self.splits.len() || to >= self.splits.len() || from == to {
            return false;
        }
        let split = self.splits.remove(from);
        self.splits.insert(to, split);
        tracing::debug!("Moved split from {} to {}", from, to);
        self.persist();
        true
    }

    /// Make the split with `id` the active one
    pub fn activate(&mut self, id: &str) -> bool {
        match self.splits.iter().position(|s| s.id == id) {
            Some(0) => true,
            Some(index) => self.move_split(index, 0),
            None => false,
        }
    }

    /// Detach a deleted split tag from every split carrying it
    pub fn clear_category(&mut self, tag_id: &str) {
        let mut cleared = 0;
        for split in &mut self.splits {
            if split.category.as_ref().is_some_and(|c| c.id == tag_id) {
                split.category = None;
                cleared += 1;
            }
        }
        if cleared > 0 {
            tracing::debug!("Cleared tag {} from {} splits", tag_id, cleared);
            self.persist();
        }
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), Partition::Splits, SPLITS_KEY, &self.splits) {
            tracing::warn!("Failed to persist splits: {}", e);
        }
    }
}
