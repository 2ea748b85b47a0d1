use crate::decode::decode;
use crate::error::ExtractionError;
use crate::fallback::fallback_features;
use crate::features::{self, ChannelStats};
use serde::Serialize;
use tracing::{debug, warn};
use vismatch_core::{FeatureVector, FEATURE_DIM};

/// Whether a vector was measured from pixels or substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeatureOrigin {
    Measured,
    Fallback,
}

/// Output of [`FeatureExtractor::extract`]
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub features: FeatureVector,
    pub origin: FeatureOrigin,
}

impl Extraction {
    pub fn measured(features: FeatureVector) -> Self {
        Self { features, origin: FeatureOrigin::Measured }
    }

    pub fn fallback(features: FeatureVector) -> Self {
        Self { features, origin: FeatureOrigin::Fallback }
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == FeatureOrigin::Fallback
    }
}

/// Strategy that turns encoded image bytes into a feature vector.
///
/// Implementations are chosen once at startup and shared behind an `Arc`.
pub trait FeatureExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Length of every vector this extractor returns
    fn dimension(&self) -> usize;

    /// Measure features, reporting why when that is impossible
    fn try_extract(&self, bytes: &[u8]) -> Result<FeatureVector, ExtractionError>;

    fn fallback(&self, seed: &str) -> FeatureVector {
        fallback_features(seed, self.dimension())
    }

    /// Measure features, substituting the seeded fallback on failure
    fn extract(&self, bytes: &[u8], seed: &str) -> Extraction {
        match self.try_extract(bytes) {
            Ok(features) => Extraction::measured(features),
            Err(e) => {
                warn!(seed, error = %e, "feature extraction failed, using fallback vector");
                Extraction::fallback(self.fallback(seed))
            }
        }
    }
}

/// Color, histogram and texture statistics; no learned model
#[derive(Debug, Clone)]
pub struct StatisticalExtractor {
    dimension: usize,
}

impl Default for StatisticalExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticalExtractor {
    pub fn new() -> Self {
        Self::with_dimension(FEATURE_DIM)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl FeatureExtractor for StatisticalExtractor {
    fn name(&self) -> &'static str {
        "statistical"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn try_extract(&self, bytes: &[u8]) -> Result<FeatureVector, ExtractionError> {
        let image = decode(bytes)?;
        let color_channels = image.color().channel_count();
        let rgb = image.to_rgb8();
        let stats = ChannelStats::measure(&rgb);

        let groups: [(&str, Result<Vec<f32>, ExtractionError>); 5] = [
            ("geometry", features::geometry(image.width(), image.height())),
            ("channel", features::channel_statistics(&stats, color_channels)),
            ("derived", features::derived_color(&stats)),
            ("histogram", features::histogram(&rgb)),
            ("texture", features::texture(&image)),
        ];

        let mut values = Vec::with_capacity(self.dimension.max(features::MEASURED_LEN));
        for (group, result) in groups {
            match result {
                Ok(group_values) => values.extend(group_values),
                Err(e) => debug!(group, error = %e, "skipping feature group"),
            }
        }
        if values.is_empty() {
            return Err(ExtractionError::NoFeatures);
        }

        Ok(FeatureVector::new(features::pad(values, self.dimension)))
    }
}
