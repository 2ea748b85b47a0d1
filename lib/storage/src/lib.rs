//! # vismatch Storage
//!
//! Everything between a catalog and a ranked result list.
//!
//! - [`ImageSource`] - Image bytes from disk, HTTP(S) or memory
//! - [`FeaturePipeline`] - Fetch then extract, with a seeded fallback on any failure
//! - [`FeatureCache`] - Per-item features, computed once even under concurrent requests
//! - [`CatalogAccess`] - Item listing and feature persistence ([`InMemoryCatalog`], [`JsonCatalog`])
//! - [`SearchEngine`] - Request context tying catalog, cache and configuration together
//! - [`backfill_features`] - Batch computation of missing catalog features
//!
//! ## Search flow
//!
//! ```text
//! list_items(category) ──> persisted features | cache.get_or_compute
//!                      ──> (bounded by max_concurrency) ──> rank
//! ```

pub mod backfill;
pub mod cache;
pub mod catalog;
pub mod engine;
pub mod pipeline;
pub mod source;

pub use backfill::{backfill_features, BackfillReport};
pub use cache::{CacheEntry, CacheStats, FeatureCache};
pub use catalog::{CatalogAccess, InMemoryCatalog, JsonCatalog};
pub use engine::SearchEngine;
pub use pipeline::FeaturePipeline;
pub use source::{
    DefaultImageSource, FetchError, FileImageSource, HttpImageSource, ImageSource,
    MemoryImageSource,
};
