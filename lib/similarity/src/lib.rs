//! # vismatch Similarity
//!
//! Scoring and ranking of catalog items against a query feature vector.
//!
//! - [`Metric`] - Cosine or Euclidean-derived similarity
//! - [`Ranker`] - Category filter, threshold, ordering and truncation
//! - [`ResultStats`] - Min/max/avg and per-category counts of a result list
//! - [`SearchRequest`] / [`SearchResponse`] - Boundary wire shapes
//!
//! ## Example
//!
//! ```rust
//! use vismatch_core::{CatalogItem, FeatureVector};
//! use vismatch_similarity::{Metric, Ranker, SearchOptions};
//!
//! let query = FeatureVector::new(vec![1.0, 0.0]);
//! let candidates = vec![
//!     (CatalogItem::new(1, "Tote", "Bags", 35.0, "1.jpg"), FeatureVector::new(vec![0.9, 0.1])),
//!     (CatalogItem::new(2, "Boot", "Shoes", 80.0, "2.jpg"), FeatureVector::new(vec![0.1, 0.9])),
//! ];
//!
//! let ranker = Ranker::new(SearchOptions::default().with_method(Metric::Cosine));
//! let results = ranker.rank(&query, candidates).unwrap();
//! assert_eq!(results[0].name, "Tote");
//! ```
//!
//! ## Ordering
//!
//! ```text
//! similarity desc ──> item id asc ──> truncate(min(max_results, 100))
//! ```

pub mod metric;
pub mod rank;
pub mod stats;
pub mod wire;

pub use metric::{
    cosine_similarity, distance_to_similarity, euclidean_similarity, match_score, Metric,
    MAX_EUCLIDEAN_DISTANCE,
};
pub use rank::{Ranker, SearchOptions, SimilarityResult, DEFAULT_MAX_RESULTS, MAX_RESULTS_CAP};
pub use stats::ResultStats;
pub use wire::{SearchRequest, SearchResponse};
