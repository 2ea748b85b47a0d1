use crate::rank::SimilarityResult;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate view of a ranked result list
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ResultStats {
    pub count: usize,
    pub min: f32,
    pub max: f32,
    pub avg: f32,
    /// Result count per category
    pub categories: BTreeMap<String, usize>,
}

impl ResultStats {
    /// Compute stats from results; all zero when `results` is empty
    pub fn compute(results: &[SimilarityResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut categories = BTreeMap::new();

        for result in results {
            min = min.min(result.similarity);
            max = max.max(result.similarity);
            sum += f64::from(result.similarity);
            *categories.entry(result.category.clone()).or_insert(0) += 1;
        }

        Self {
            count: results.len(),
            min,
            max,
            avg: (sum / results.len() as f64) as f32,
            categories,
        }
    }
}
