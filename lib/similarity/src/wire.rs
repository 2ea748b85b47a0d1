//! Request and response shapes exchanged with boundary layers

use crate::metric::Metric;
use crate::rank::{SearchOptions, SimilarityResult, DEFAULT_MAX_RESULTS};
use crate::stats::ResultStats;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vismatch_core::{Error, FeatureVector, Result};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub features: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_similarity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Metric>,
}

impl SearchRequest {
    pub fn new(features: impl Into<Vec<f32>>) -> Self {
        Self {
            features: features.into(),
            ..Self::default()
        }
    }

    /// Split into the query vector and ranking options
    pub fn into_parts(self) -> Result<(FeatureVector, SearchOptions)> {
        if self.features.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let options = SearchOptions {
            category_filter: self.category_filter.filter(|c| !c.trim().is_empty()),
            min_similarity: self.min_similarity.unwrap_or(0.0),
            max_results: self.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            method: self.method.unwrap_or_default(),
        };
        Ok((FeatureVector::new(self.features), options))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SimilarityResult>,
    pub count: usize,
    pub stats: ResultStats,
    pub search_time_ms: u64,
}

impl SearchResponse {
    pub fn new(results: Vec<SimilarityResult>, elapsed: Duration) -> Self {
        let stats = ResultStats::compute(&results);
        Self {
            count: results.len(),
            results,
            stats,
            search_time_ms: elapsed.as_millis() as u64,
        }
    }

    pub fn empty(elapsed: Duration) -> Self {
        Self::new(Vec::new(), elapsed)
    }
}
