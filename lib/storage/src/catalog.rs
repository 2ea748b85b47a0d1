//! Catalog access
//!
//! The engine only reads catalog items and, during backfill, writes computed
//! feature vectors back.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;
use vismatch_core::{CatalogItem, Error, FeatureVector, ItemId, Result};

#[async_trait]
pub trait CatalogAccess: Send + Sync {
    /// Items, optionally restricted to one category (case-insensitive)
    async fn list_items(&self, category: Option<&str>) -> Result<Vec<CatalogItem>>;

    /// Store a computed feature vector for an item
    async fn persist_features(&self, id: &ItemId, features: &FeatureVector) -> Result<()>;

    /// Distinct categories, sorted
    async fn categories(&self) -> Result<Vec<String>> {
        let items = self.list_items(None).await?;
        let categories: BTreeSet<String> = items.into_iter().map(|item| item.category).collect();
        Ok(categories.into_iter().collect())
    }
}

fn unknown_item(id: &ItemId) -> Error {
    Error::Catalog(format!("item not found: {}", id))
}

/// Catalog held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    items: RwLock<Vec<CatalogItem>>,
}

impl InMemoryCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn get(&self, id: &ItemId) -> Option<CatalogItem> {
        self.items.read().iter().find(|item| &item.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<CatalogItem> {
        self.items.read().clone()
    }

    fn items_in(&self, category: Option<&str>) -> Vec<CatalogItem> {
        let items = self.items.read();
        match category {
            Some(category) => items
                .iter()
                .filter(|item| item.in_category(category))
                .cloned()
                .collect(),
            None => items.clone(),
        }
    }

    fn set_features(&self, id: &ItemId, features: &FeatureVector) -> Result<()> {
        let mut items = self.items.write();
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| unknown_item(id))?;
        item.features = Some(features.clone());
        Ok(())
    }

    /// Copy of every item with `features` applied to `id`, leaving `self` untouched
    fn snapshot_with(&self, id: &ItemId, features: &FeatureVector) -> Result<Vec<CatalogItem>> {
        let mut items = self.snapshot();
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| unknown_item(id))?;
        item.features = Some(features.clone());
        Ok(items)
    }
}

#[async_trait]
impl CatalogAccess for InMemoryCatalog {
    async fn list_items(&self, category: Option<&str>) -> Result<Vec<CatalogItem>> {
        Ok(self.items_in(category))
    }

    async fn persist_features(&self, id: &ItemId, features: &FeatureVector) -> Result<()> {
        self.set_features(id, features)
    }
}

/// Catalog stored as a JSON array of items on disk.
///
/// Persisted features are written back with write-to-temp + rename. Memory
/// only changes once the file on disk holds the new vector.
#[derive(Debug)]
pub struct JsonCatalog {
    path: PathBuf,
    inner: InMemoryCatalog,
    write_lock: Mutex<()>,
}

impl JsonCatalog {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path)?;
        let items: Vec<CatalogItem> = serde_json::from_slice(&data)?;
        info!(path = %path.display(), items = items.len(), "catalog loaded");
        Ok(Self {
            path,
            inner: InMemoryCatalog::new(items),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Write the current items back to disk
    pub async fn save(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_items(&self.inner.snapshot()).await
    }

    async fn write_items(&self, items: &[CatalogItem]) -> Result<()> {
        let data = serde_json::to_vec_pretty(items)?;
        let temp_file = self.path.with_extension("tmp");
        tokio::fs::write(&temp_file, &data).await?;
        tokio::fs::rename(&temp_file, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogAccess for JsonCatalog {
    async fn list_items(&self, category: Option<&str>) -> Result<Vec<CatalogItem>> {
        Ok(self.inner.items_in(category))
    }

    async fn persist_features(&self, id: &ItemId, features: &FeatureVector) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let items = self.inner.snapshot_with(id, features)?;
        self.write_items(&items).await?;
        self.inner.set_features(id, features)
    }
}
