use crate::cache::FeatureCache;
use crate::catalog::CatalogAccess;
use crate::pipeline::FeaturePipeline;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use vismatch_core::{CatalogItem, EngineConfig, Error, FeatureVector, Result};
use vismatch_extract::Extraction;
use vismatch_similarity::{Ranker, SearchOptions, SearchRequest, SearchResponse, SimilarityResult};

/// Request context: the catalog, the feature cache and engine settings,
/// injected once at startup and shared across searches.
pub struct SearchEngine {
    catalog: Arc<dyn CatalogAccess>,
    cache: Arc<FeatureCache>,
    config: EngineConfig,
}

impl SearchEngine {
    pub fn new(
        catalog: Arc<dyn CatalogAccess>,
        cache: Arc<FeatureCache>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        if cache.pipeline().dimension() != config.dimension {
            return Err(Error::InvalidConfig(format!(
                "extractor produces {} features, engine expects {}",
                cache.pipeline().dimension(),
                config.dimension
            )));
        }
        Ok(Self {
            catalog,
            cache,
            config,
        })
    }

    pub fn cache(&self) -> &Arc<FeatureCache> {
        &self.cache
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogAccess> {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &FeaturePipeline {
        self.cache.pipeline()
    }

    /// Features of a query image; falls back like any catalog image
    pub async fn query_features(&self, image_ref: &str) -> Extraction {
        self.pipeline().extract(image_ref).await
    }

    async fn resolve(&self, item: CatalogItem) -> (CatalogItem, FeatureVector) {
        let features = match item.persisted_features() {
            Some(features) => features.clone(),
            None => self.cache.get_or_compute(&item).await,
        };
        (item, features)
    }

    /// Rank catalog items against `query`.
    ///
    /// Candidate features are resolved concurrently, bounded by
    /// `max_concurrency`; the final order depends only on similarity and id.
    pub async fn find_similar(
        &self,
        query: &FeatureVector,
        options: &SearchOptions,
    ) -> Result<Vec<SimilarityResult>> {
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let items: Vec<CatalogItem> = self
            .catalog
            .list_items(options.category_filter.as_deref())
            .await?
            .into_iter()
            .filter(|item| options.admits(item))
            .collect();

        if items.is_empty() {
            debug!(category = ?options.category_filter, "no candidates");
            return Ok(Vec::new());
        }

        // Stale persisted vectors abort before any image is fetched
        for features in items.iter().filter_map(|item| item.persisted_features()) {
            query.ensure_same_dim(features)?;
        }

        let candidates: Vec<(CatalogItem, FeatureVector)> = stream::iter(items)
            .map(|item| self.resolve(item))
            .buffer_unordered(self.config.max_concurrency)
            .collect()
            .await;

        Ranker::new(options.clone()).rank(query, candidates)
    }

    /// Handle a boundary search request end to end
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let start = Instant::now();
        let (query, options) = request.into_parts()?;
        let results = self.find_similar(&query, &options).await?;
        let response = SearchResponse::new(results, start.elapsed());

        info!(
            results = response.count,
            method = %options.method,
            category = ?options.category_filter,
            elapsed_ms = response.search_time_ms,
            "search completed"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}
