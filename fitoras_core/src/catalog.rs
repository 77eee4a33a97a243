//! Exercise catalog: fetched once, cached locally, read-only afterwards.
//!
//! Loading checks the local cache first and only goes to the network when
//! the cache key is absent. Until a load resolves the catalog reports
//! `Loading` and exposes no exercises, never a partial list.

use crate::config::CatalogConfig;
use crate::storage::{load_json, save_json, KeyValueStore, Partition};
use crate::types::Exercise;
use crate::{Error, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for the static catalog JSON
pub struct CatalogClient {
    client: Client,
    url: String,
}

impl CatalogClient {
    /// Create a client for the configured catalog URL
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Self::with_url(&config.url, config.timeout_secs)
    }

    /// Create a client for an explicit URL (tests, mirrors)
    pub fn with_url(url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the catalog and decode it
    pub async fn fetch(&self) -> Result<Vec<Exercise>> {
        tracing::info!("Fetching exercise catalog from {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Catalog(format!(
                "GET {} returned {}",
                self.url, status
            )));
        }

        let exercises: Vec<Exercise> = response.json().await?;
        tracing::info!("Fetched {} exercises", exercises.len());
        Ok(exercises)
    }
}

/// Observable load state of the catalog
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogState {
    Loading,
    Ready,
    Failed(String),
}

pub struct ExerciseCatalog {
    store: Arc<dyn KeyValueStore>,
    cache_key: String,
    state: CatalogState,
    exercises: Vec<Exercise>,
}

impl ExerciseCatalog {
    pub fn new(store: Arc<dyn KeyValueStore>, cache_key: impl Into<String>) -> Self {
        Self {
            store,
            cache_key: cache_key.into(),
            state: CatalogState::Loading,
            exercises: Vec::new(),
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    /// Loaded exercises; empty unless the catalog is `Ready`
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Load from the local cache only.
    ///
    /// Returns `Ok(false)` if nothing usable is cached; the state is left
    /// as it was in that case.
    pub fn load_cached(&mut self) -> Result<bool> {
        if self.state == CatalogState::Ready {
            return Ok(true);
        }

        match load_json::<Vec<Exercise>>(self.store.as_ref(), Partition::Exercises, &self.cache_key) {
            Ok(Some(exercises)) => {
                tracing::info!("Loaded {} exercises from cache", exercises.len());
                self.exercises = exercises;
                self.state = CatalogState::Ready;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(Error::Json(e)) => {
                tracing::warn!("Cached catalog is unreadable: {}. Ignoring cache.", e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Cache first, network second.
    ///
    /// A successful fetch is written to the cache. A failed fetch leaves
    /// the catalog empty in the `Failed` state and returns the error.
    pub async fn load(&mut self, client: &CatalogClient) -> Result<()> {
        if self.load_cached()? {
            return Ok(());
        }

        match client.fetch().await {
            Ok(exercises) => {
                if let Err(e) = save_json(
                    self.store.as_ref(),
                    Partition::Exercises,
                    &self.cache_key,
                    &exercises,
                ) {
                    tracing::warn!("Failed to cache exercise catalog: {}", e);
                }
                self.exercises = exercises;
                self.state = CatalogState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Exercise catalog fetch failed: {}", e);
                self.exercises.clear();
                self.state = CatalogState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Drop the cached copy so the next load fetches again
    pub fn clear_cache(&mut self) -> Result<()> {
        let removed = self.store.remove(Partition::Exercises, &self.cache_key)?;
        self.exercises.clear();
        self.state = CatalogState::Loading;
        tracing::info!("Cleared catalog cache (present: {})", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    const BODY: &str = r#"[
        {"id": "bench", "name": "Bench Press", "force": "push", "primaryMuscles": ["chest"],
         "secondaryMuscles": [], "images": [], "instructions": ["Press."]},
        {"id": "row", "name": "Barbell Row", "force": "pull", "primaryMuscles": ["lats"],
         "secondaryMuscles": [], "images": [], "instructions": ["Row."]}
    ]"#;

    fn memory() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn test_fetch_fills_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exercises.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BODY)
            .expect(1)
            .create_async()
            .await;

        let kv = memory();
        let client = CatalogClient::with_url(&format!("{}/exercises.json", server.url()), 5).unwrap();
        let mut catalog = ExerciseCatalog::new(kv.clone(), "catalog");
        assert_eq!(catalog.state(), &CatalogState::Loading);
        assert!(catalog.exercises().is_empty());

        catalog.load(&client).await.unwrap();
        assert_eq!(catalog.state(), &CatalogState::Ready);
        assert_eq!(catalog.exercises().len(), 2);
        assert_eq!(catalog.get("row").unwrap().name, "Barbell Row");

        // Second catalog instance reads the cache without touching the network
        let mut cached = ExerciseCatalog::new(kv, "catalog");
        cached.load(&client).await.unwrap();
        assert_eq!(cached.exercises().len(), 2);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_catalog_empty() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exercises.json")
            .with_status(500)
            .create_async()
            .await;

        let client = CatalogClient::with_url(&format!("{}/exercises.json", server.url()), 5).unwrap();
        let mut catalog = ExerciseCatalog::new(memory(), "catalog");

        let err = catalog.load(&client).await.unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
        assert!(matches!(catalog.state(), CatalogState::Failed(_)));
        assert!(catalog.exercises().is_empty());
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exercises.json")
            .with_status(200)
            .with_body(BODY)
            .expect(2)
            .create_async()
            .await;

        let client = CatalogClient::with_url(&format!("{}/exercises.json", server.url()), 5).unwrap();
        let mut catalog = ExerciseCatalog::new(memory(), "catalog");
        catalog.load(&client).await.unwrap();
        catalog.clear_cache().unwrap();
        assert_eq!(catalog.state(), &CatalogState::Loading);

        catalog.load(&client).await.unwrap();
        assert_eq!(catalog.exercises().len(), 2);
        mock.assert_async().await;
    }

    #[test]
    fn test_load_cached_without_cache() {
        let mut catalog = ExerciseCatalog::new(memory(), "catalog");
        assert!(!catalog.load_cached().unwrap());
        assert_eq!(catalog.state(), &CatalogState::Loading);
    }

    #[test]
    fn test_corrupt_cache_is_ignored() {
        let kv = memory();
        kv.put(Partition::Exercises, "catalog", &serde_json::json!({"oops": true}))
            .unwrap();
        let mut catalog = ExerciseCatalog::new(kv, "catalog");
        assert!(!catalog.load_cached().unwrap());
    }
}
