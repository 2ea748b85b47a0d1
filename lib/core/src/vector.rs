use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Length of every feature vector produced by the statistical extractor
pub const FEATURE_DIM: usize = 64;

/// Fixed-length numeric descriptor of an image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct FeatureVector {
    data: Vec<f32>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Fails with `DimensionMismatch` unless both vectors have the same length
    #[inline]
    pub fn ensure_same_dim(&self, other: &FeatureVector) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(())
    }

    pub fn dot(&self, other: &FeatureVector) -> Result<f32> {
        self.ensure_same_dim(other)?;
        Ok(dot_scalar(&self.data, &other.data))
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        dot_scalar(&self.data, &self.data).sqrt()
    }

    /// Euclidean distance to another vector of the same length
    pub fn l2_distance(&self, other: &FeatureVector) -> Result<f32> {
        self.ensure_same_dim(other)?;
        let sum: f32 = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum();
        Ok(sum.sqrt())
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

// Two accumulators for better pipelining
#[inline]
fn dot_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut sum1 = 0.0f32;
    let mut sum2 = 0.0f32;
    let chunks = a.len() / 2;
    for i in 0..chunks {
        sum1 += a[2 * i] * b[2 * i];
        sum2 += a[2 * i + 1] * b[2 * i + 1];
    }
    if a.len() % 2 == 1 {
        let last = a.len() - 1;
        sum1 += a[last] * b[last];
    }
    sum1 + sum2
}
