use crate::source::ImageSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use vismatch_extract::{Extraction, FeatureExtractor};

/// Fetch-then-extract for a single image reference.
///
/// Never fails: fetch errors, timeouts and undecodable images all yield the
/// extractor's seeded fallback vector, seeded by the image reference.
#[derive(Clone)]
pub struct FeaturePipeline {
    extractor: Arc<dyn FeatureExtractor>,
    source: Arc<dyn ImageSource>,
    fetch_timeout: Duration,
}

impl FeaturePipeline {
    pub fn new(
        extractor: Arc<dyn FeatureExtractor>,
        source: Arc<dyn ImageSource>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            source,
            fetch_timeout,
        }
    }

    pub fn extractor(&self) -> &Arc<dyn FeatureExtractor> {
        &self.extractor
    }

    pub fn dimension(&self) -> usize {
        self.extractor.dimension()
    }

    pub async fn extract(&self, image_ref: &str) -> Extraction {
        let bytes = match tokio::time::timeout(self.fetch_timeout, self.source.fetch(image_ref)).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                warn!(image_ref, error = %e, "image fetch failed, using fallback vector");
                return Extraction::fallback(self.extractor.fallback(image_ref));
            }
            Err(_) => {
                warn!(image_ref, timeout = ?self.fetch_timeout, "image fetch timed out, using fallback vector");
                return Extraction::fallback(self.extractor.fallback(image_ref));
            }
        };

        debug!(image_ref, bytes = bytes.len(), "extracting features");
        let extractor = self.extractor.clone();
        let seed = image_ref.to_string();
        match tokio::task::spawn_blocking(move || extractor.extract(&bytes, &seed)).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!(image_ref, error = %e, "extraction task failed, using fallback vector");
                Extraction::fallback(self.extractor.fallback(image_ref))
            }
        }
    }
}

impl std::fmt::Debug for FeaturePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeaturePipeline")
            .field("extractor", &self.extractor.name())
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryImageSource;
    use crate::test_support::png;
    use vismatch_extract::{fallback_features, FeatureOrigin, StatisticalExtractor};

    fn pipeline(source: MemoryImageSource, timeout: Duration) -> FeaturePipeline {
        FeaturePipeline::new(Arc::new(StatisticalExtractor::new()), Arc::new(source), timeout)
    }

    #[tokio::test]
    async fn test_measures_available_images() {
        let source = MemoryImageSource::new();
        source.insert("shoe.png", png(48, 32));
        let out = pipeline(source, Duration::from_secs(1)).extract("shoe.png").await;
        assert_eq!(out.origin, FeatureOrigin::Measured);
        assert_eq!(out.features.dim(), 64);
    }

    #[tokio::test]
    async fn test_missing_image_falls_back() {
        let out = pipeline(MemoryImageSource::new(), Duration::from_secs(1))
            .extract("gone.png")
            .await;
        assert!(out.is_fallback());
        assert_eq!(out.features, fallback_features("gone.png", 64));
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out_to_fallback() {
        let source = MemoryImageSource::new().with_latency(Duration::from_millis(200));
        source.insert("slow.png", png(48, 32));
        let out = pipeline(source, Duration::from_millis(20)).extract("slow.png").await;
        assert!(out.is_fallback());
        assert_eq!(out.features, fallback_features("slow.png", 64));
    }
}
