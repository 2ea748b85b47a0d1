//! Ranking of catalog candidates against a query vector
//!
//! Scores every admitted candidate, drops those under the similarity
//! threshold, sorts by similarity descending with ties broken by ascending
//! item id, and truncates to the result limit.

use crate::metric::{match_score, Metric};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;
use vismatch_core::{CatalogItem, Error, FeatureVector, ItemId, Result};

/// Results returned when the caller does not ask for a limit
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Hard upper bound on returned results
pub const MAX_RESULTS_CAP: usize = 100;

/// Filtering and ranking options for one search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub category_filter: Option<String>,
    pub min_similarity: f32,
    pub max_results: usize,
    pub method: Metric,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category_filter: None,
            min_similarity: 0.0,
            max_results: DEFAULT_MAX_RESULTS,
            method: Metric::Cosine,
        }
    }
}

impl SearchOptions {
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category_filter = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Metric) -> Self {
        self.method = method;
        self
    }

    /// Requested limit clamped to [`MAX_RESULTS_CAP`]
    pub fn result_limit(&self) -> usize {
        self.max_results.min(MAX_RESULTS_CAP)
    }

    /// Whether the category filter lets `item` through
    pub fn admits(&self, item: &CatalogItem) -> bool {
        match &self.category_filter {
            Some(category) => item.in_category(category),
            None => true,
        }
    }
}

/// A catalog item with its similarity to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_url: String,
    pub similarity: f32,
    /// `similarity` as a rounded percentage
    pub match_score: u8,
}

impl SimilarityResult {
    pub fn new(item: CatalogItem, similarity: f32) -> Self {
        Self {
            id: item.id,
            name: item.name,
            category: item.category,
            price: item.price,
            description: item.description,
            image_url: item.image_url,
            similarity,
            match_score: match_score(similarity),
        }
    }
}

/// Descending similarity, then ascending id
fn ranking_order(a: &(CatalogItem, f32), b: &(CatalogItem, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id))
}

/// Stateless ranker configured with one search's options
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    options: SearchOptions,
}

impl Ranker {
    pub fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Rank candidates paired with their feature vectors.
    ///
    /// Candidates outside the category filter or with empty vectors are
    /// skipped. A candidate whose vector length differs from the query's
    /// aborts the whole ranking.
    pub fn rank(
        &self,
        query: &FeatureVector,
        candidates: Vec<(CatalogItem, FeatureVector)>,
    ) -> Result<Vec<SimilarityResult>> {
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let mut scored: Vec<(CatalogItem, f32)> = Vec::with_capacity(candidates.len());
        for (item, features) in candidates {
            if !self.options.admits(&item) {
                continue;
            }
            if features.is_empty() {
                debug!(id = %item.id, "skipping candidate without features");
                continue;
            }

            let similarity = self.options.method.similarity(query, &features)?;
            if !similarity.is_finite() {
                debug!(id = %item.id, "skipping candidate with non-finite similarity");
                continue;
            }
            if similarity < self.options.min_similarity {
                continue;
            }
            scored.push((item, similarity));
        }

        scored.sort_by(ranking_order);
        scored.truncate(self.options.result_limit());

        Ok(scored
            .into_iter()
            .map(|(item, similarity)| SimilarityResult::new(item, similarity))
            .collect())
    }
}
