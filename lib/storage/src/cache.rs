//! Per-process cache of computed catalog features
//!
//! Entries are created lazily and only dropped by [`FeatureCache::clear`].
//! Concurrent requests for the same uncached item share one extraction.

use crate::pipeline::FeaturePipeline;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::debug;
use vismatch_core::{CatalogItem, FeatureVector, ItemId};
use vismatch_extract::FeatureOrigin;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub features: FeatureVector,
    pub origin: FeatureOrigin,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries with a computed vector
    pub size: usize,
    /// Items ever requested since the last clear, including in-flight ones
    pub total_known_items: usize,
    /// Entries holding a fallback vector
    pub fallbacks: usize,
}

pub struct FeatureCache {
    entries: Mutex<AHashMap<ItemId, Arc<OnceCell<CacheEntry>>>>,
    pipeline: FeaturePipeline,
}

impl FeatureCache {
    pub fn new(pipeline: FeaturePipeline) -> Self {
        Self {
            entries: Mutex::new(AHashMap::new()),
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    fn slot(&self, id: &ItemId) -> Arc<OnceCell<CacheEntry>> {
        self.entries
            .lock()
            .entry(id.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Cached vector for `item`, computing it on first request
    pub async fn get_or_compute(&self, item: &CatalogItem) -> FeatureVector {
        self.entry_for(item).await.features
    }

    /// Like [`get_or_compute`](Self::get_or_compute) but returns the whole entry
    pub async fn entry_for(&self, item: &CatalogItem) -> CacheEntry {
        let slot = self.slot(&item.id);
        let entry = slot
            .get_or_init(|| async {
                debug!(id = %item.id, image = %item.image_url, "computing catalog features");
                let extraction = self.pipeline.extract(&item.image_url).await;
                CacheEntry {
                    features: extraction.features,
                    origin: extraction.origin,
                    computed_at: Utc::now(),
                }
            })
            .await
            .clone();
        entry
    }

    /// Entry for `id` if it has been computed
    pub fn get(&self, id: &ItemId) -> Option<CacheEntry> {
        self.entries.lock().get(id).and_then(|slot| slot.get().cloned())
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        debug!(entries = entries.len(), "clearing feature cache");
        entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let mut size = 0;
        let mut fallbacks = 0;
        for entry in entries.values().filter_map(|slot| slot.get()) {
            size += 1;
            if entry.origin == FeatureOrigin::Fallback {
                fallbacks += 1;
            }
        }
        CacheStats {
            size,
            total_known_items: entries.len(),
            fallbacks,
        }
    }
}

impl std::fmt::Debug for FeatureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureCache")
            .field("stats", &self.stats())
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
