//! # vismatch
//!
//! Visual product search over a catalog of images.
//!
//! vismatch turns an image into a deterministic 64-element descriptor built
//! from pixel statistics, caches descriptors per catalog item, and ranks the
//! catalog against a query descriptor by cosine or Euclidean-derived
//! similarity.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! vismatch extract shoe.jpg
//! vismatch search --catalog catalog.json --image shoe.jpg --category Footwear
//! vismatch backfill --catalog catalog.json
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vismatch::prelude::*;
//!
//! # async fn run() -> vismatch::Result<()> {
//! let config = EngineConfig::default();
//! let catalog = Arc::new(JsonCatalog::open("catalog.json")?);
//! let source = Arc::new(DefaultImageSource::new(
//!     FileImageSource::new(),
//!     HttpImageSource::new(config.fetch_timeout)?,
//! ));
//! let pipeline = FeaturePipeline::new(
//!     Arc::new(StatisticalExtractor::new()),
//!     source,
//!     config.fetch_timeout,
//! );
//! let engine = SearchEngine::new(catalog, Arc::new(FeatureCache::new(pipeline)), config)?;
//!
//! let query = engine.query_features("shoe.jpg").await.features;
//! let results = engine.find_similar(&query, &SearchOptions::default()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - [`vismatch-core`](https://docs.rs/vismatch-core) - Feature vectors, catalog items, errors, configuration
//! - [`vismatch-extract`](https://docs.rs/vismatch-extract) - Image decoding and feature extraction
//! - [`vismatch-similarity`](https://docs.rs/vismatch-similarity) - Metrics, ranking and result statistics
//! - [`vismatch-storage`](https://docs.rs/vismatch-storage) - Image sources, catalogs, feature cache, search engine

// Re-export core types
pub use vismatch_core::{
    CatalogItem, EngineConfig, Error, ErrorKind, ErrorResponse, FeatureVector, ItemId, Result,
    FEATURE_DIM,
};

// Re-export extraction
pub use vismatch_extract::{
    fallback_features, inspect, Extraction, ExtractionError, FeatureExtractor, FeatureOrigin,
    ImageInfo, StatisticalExtractor,
};

// Re-export similarity
pub use vismatch_similarity::{
    Metric, Ranker, ResultStats, SearchOptions, SearchRequest, SearchResponse, SimilarityResult,
};

// Re-export storage
pub use vismatch_storage::{
    backfill_features, BackfillReport, CacheStats, CatalogAccess, DefaultImageSource,
    FeatureCache, FeaturePipeline, FileImageSource, HttpImageSource, ImageSource,
    InMemoryCatalog, JsonCatalog, SearchEngine,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CatalogAccess, CatalogItem, DefaultImageSource, EngineConfig, Error, FeatureCache,
        FeatureExtractor, FeaturePipeline, FeatureVector, FileImageSource, HttpImageSource,
        ImageSource, ItemId, JsonCatalog, Metric, Result, SearchEngine, SearchOptions,
        SimilarityResult, StatisticalExtractor,
    };
}
