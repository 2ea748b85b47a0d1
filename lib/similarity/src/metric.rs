//! Similarity metrics over feature vectors
//!
//! Every metric rejects vectors of different lengths with `DimensionMismatch`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use vismatch_core::{Error, FeatureVector, Result};

/// Distance at which Euclidean similarity reaches zero.
///
/// Calibrated against the value ranges of the statistical extractor; it has
/// to be re-derived if the feature normalization changes.
pub const MAX_EUCLIDEAN_DISTANCE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
}

impl Metric {
    /// Similarity between two vectors under this metric
    pub fn similarity(&self, a: &FeatureVector, b: &FeatureVector) -> Result<f32> {
        match self {
            Metric::Cosine => cosine_similarity(a, b),
            Metric::Euclidean => euclidean_similarity(a, b),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
        }
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            other => Err(Error::InvalidConfig(format!("unknown similarity method: {}", other))),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `dot(a, b) / (|a| * |b|)`, defined as 0 when either norm is zero
pub fn cosine_similarity(a: &FeatureVector, b: &FeatureVector) -> Result<f32> {
    let dot = a.dot(b)?;
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// `max(0, 1 - d / MAX_EUCLIDEAN_DISTANCE)` for Euclidean distance `d`
pub fn euclidean_similarity(a: &FeatureVector, b: &FeatureVector) -> Result<f32> {
    let distance = a.l2_distance(b)?;
    Ok(distance_to_similarity(distance))
}

#[inline]
pub fn distance_to_similarity(distance: f32) -> f32 {
    (1.0 - distance / MAX_EUCLIDEAN_DISTANCE).max(0.0)
}

/// Similarity as a rounded percentage, clamped to 0..=100
#[inline]
pub fn match_score(similarity: f32) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(data: &[f32]) -> FeatureVector {
        FeatureVector::from_slice(data)
    }

    #[test]
    fn test_cosine_basics() {
        let a = v(&[1.0, 2.0, 3.0]);
        let b = v(&[3.0, 1.0, 0.5]);
        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-6);
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
        assert!((cosine_similarity(&v(&[1.0, 0.0]), &v(&[0.0, 1.0])).unwrap()).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let zero = v(&[0.0; 4]);
        let other = v(&[0.3, 0.1, 0.9, 0.4]);
        assert_eq!(cosine_similarity(&zero, &other).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&other, &zero).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero).unwrap(), 0.0);
    }

    #[test]
    fn test_euclidean_similarity() {
        let a = v(&[0.0, 0.0]);
        assert_eq!(euclidean_similarity(&a, &a).unwrap(), 1.0);
        assert!((euclidean_similarity(&a, &v(&[0.6, 0.8])).unwrap() - 0.5).abs() < 1e-6);
        assert_eq!(euclidean_similarity(&a, &v(&[3.0, 4.0])).unwrap(), 0.0);
    }

    #[test]
    fn test_euclidean_is_monotonic() {
        let mut previous = f32::INFINITY;
        for step in 0..50 {
            let s = distance_to_similarity(step as f32 * 0.05);
            assert!(s <= previous);
            previous = s;
        }
    }

    #[test]
    fn test_mismatch_is_an_error() {
        let a = v(&[0.5; 64]);
        let b = v(&[0.5; 32]);
        for metric in [Metric::Cosine, Metric::Euclidean] {
            assert!(matches!(
                metric.similarity(&a, &b),
                Err(Error::DimensionMismatch { expected: 64, actual: 32 })
            ));
        }
    }

    #[test]
    fn test_match_score() {
        assert_eq!(match_score(0.876), 88);
        assert_eq!(match_score(1.0), 100);
        assert_eq!(match_score(-0.3), 0);
        assert_eq!(match_score(0.0), 0);
    }

    #[test]
    fn test_metric_parsing() {
        assert_eq!("Cosine".parse::<Metric>().unwrap(), Metric::Cosine);
        assert_eq!("euclidean".parse::<Metric>().unwrap(), Metric::Euclidean);
        assert!("manhattan".parse::<Metric>().is_err());
        assert_eq!(serde_json::to_string(&Metric::Euclidean).unwrap(), "\"euclidean\"");
    }
}
