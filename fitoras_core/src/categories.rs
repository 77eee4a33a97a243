//! Registry of split tags.
//!
//! Tags are reusable named colours attached to whole splits. The registry
//! owns tag identity; splits carry a copy. Deleting a tag runs a caller
//! supplied cascade so splits never keep a tag that no longer exists.

use crate::storage::{load_json, save_json, KeyValueStore, Partition};
use crate::types::{LabelPatch, SplitTag, SplitTagDraft};
use crate::{new_id, Error, Result};
use std::sync::Arc;

const CATEGORIES_KEY: &str = "categories";

pub struct CategoryRegistry {
    store: Arc<dyn KeyValueStore>,
    tags: Vec<SplitTag>,
    loaded: bool,
}

impl CategoryRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            tags: Vec::new(),
            loaded: false,
        }
    }

    /// Hydrate from storage once; later calls do nothing
    pub fn load(&mut self) -> Result<()> {
        if self.loaded {
            return Ok(());
        }

        self.tags = match load_json::<Vec<SplitTag>>(self.store.as_ref(), Partition::Categories, CATEGORIES_KEY) {
            Ok(tags) => tags.unwrap_or_default(),
            Err(Error::Json(e)) => {
                tracing::warn!("Stored categories are unreadable: {}. Starting empty.", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        self.loaded = true;
        tracing::info!("Loaded {} categories", self.tags.len());
        Ok(())
    }

    pub fn tags(&self) -> &[SplitTag] {
        &self.tags
    }

    pub fn get(&self, id: &str) -> Option<&SplitTag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Create a tag and return it so the caller can select it right away
    pub fn add_category(&mut self, draft: SplitTagDraft) -> Result<SplitTag> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(Error::validation("category name must not be empty"));
        }

        let tag = SplitTag {
            id: new_id(),
            name: name.to_string(),
            color: draft.color,
        };
        self.tags.push(tag.clone());
        tracing::debug!("Added category {} ({})", tag.id, tag.name);
        self.persist();
        Ok(tag)
    }

    /// Returns `Ok(false)` if no tag has that id
    pub fn update_category(&mut self, id: &str, patch: LabelPatch) -> Result<bool> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(Error::validation("category name must not be empty"));
            }
        }

        let Some(tag) = self.tags.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if let Some(name) = patch.name {
            tag.name = name.trim().to_string();
        }
        if let Some(color) = patch.color {
            tag.color = color;
        }
        self.persist();
        Ok(true)
    }

    /// Delete a tag, then let `cascade` detach it from its splits.
    ///
    /// Typical call: `registry.remove_category(id, |tag| splits.clear_category(tag))`.
    /// Both sides have been updated when this returns.
    pub fn remove_category<F>(&mut self, id: &str, cascade: F) -> bool
    where
        F: FnOnce(&str),
    {
        let before = self.tags.len();
        self.tags.retain(|t| t.id != id);
        if self.tags.len() == before {
            return false;
        }

        cascade(id);
        tracing::debug!("Removed category {}", id);
        self.persist();
        true
    }

    fn persist(&self) {
        if let Err(e) = save_json(self.store.as_ref(), Partition::Categories, CATEGORIES_KEY, &self.tags) {
            tracing::warn!("Failed to persist categories: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splits::SplitStore;
    use crate::storage::MemoryStore;
    use crate::types::{SplitDraft, SplitPatch};

    fn draft(name: &str) -> SplitTagDraft {
        SplitTagDraft {
            name: name.into(),
            color: "#3366ff".into(),
        }
    }

    #[test]
    fn test_add_returns_created_tag() {
        let mut registry = CategoryRegistry::new(Arc::new(MemoryStore::new()));
        let tag = registry.add_category(draft(" Hypertrophy ")).unwrap();

        assert_eq!(tag.name, "Hypertrophy");
        assert_eq!(registry.get(&tag.id), Some(&tag));
        assert!(registry.add_category(draft("")).is_err());
        assert_eq!(registry.tags().len(), 1);
    }

    #[test]
    fn test_update_category() {
        let mut registry = CategoryRegistry::new(Arc::new(MemoryStore::new()));
        let tag = registry.add_category(draft("Strength")).unwrap();

        let patch = LabelPatch {
            name: None,
            color: Some("#000000".into()),
        };
        assert!(registry.update_category(&tag.id, patch).unwrap());
        assert_eq!(registry.get(&tag.id).unwrap().color, "#000000");
        assert_eq!(registry.get(&tag.id).unwrap().name, "Strength");
        assert!(!registry.update_category("missing", LabelPatch::default()).unwrap());
    }

    #[test]
    fn test_remove_cascades_to_splits() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut registry = CategoryRegistry::new(kv.clone());
        let mut splits = SplitStore::new(kv.clone());

        let tag = registry.add_category(draft("Cut")).unwrap();
        let other = registry.add_category(draft("Bulk")).unwrap();
        let tagged = splits.add_split(SplitDraft::named("PPL")).unwrap();
        let kept = splits.add_split(SplitDraft::named("Full body")).unwrap();
        splits
            .update_split(
                &tagged.id,
                SplitPatch {
                    category: Some(Some(tag.clone())),
                    ..SplitPatch::default()
                },
            )
            .unwrap();
        splits
            .update_split(
                &kept.id,
                SplitPatch {
                    category: Some(Some(other.clone())),
                    ..SplitPatch::default()
                },
            )
            .unwrap();

        assert!(registry.remove_category(&tag.id, |id| splits.clear_category(id)));

        assert!(registry.get(&tag.id).is_none());
        assert!(splits.get(&tagged.id).unwrap().category.is_none());
        assert_eq!(splits.get(&kept.id).unwrap().category.as_ref(), Some(&other));

        // Both stores were persisted before returning
        let mut reloaded = SplitStore::new(kv.clone());
        reloaded.load().unwrap();
        assert!(reloaded.get(&tagged.id).unwrap().category.is_none());
        let mut reloaded_registry = CategoryRegistry::new(kv);
        reloaded_registry.load().unwrap();
        assert_eq!(reloaded_registry.tags(), &[other]);
    }

    #[test]
    fn test_remove_missing_skips_cascade() {
        let mut registry = CategoryRegistry::new(Arc::new(MemoryStore::new()));
        let mut called = false;
        assert!(!registry.remove_category("missing", |_| called = true));
        assert!(!called);
    }
}
