//! # vismatch Extract
//!
//! Deterministic image descriptors built from pixel statistics.
//!
//! [`StatisticalExtractor`] decodes an image (JPEG, PNG, WebP or GIF, 10 to
//! 10000 pixels per side, at most 50 MiB) and concatenates five feature
//! groups: geometry, channel statistics, derived color, histogram and
//! texture. The result is padded to the configured dimension (64 by default).
//!
//! Failures never escape [`FeatureExtractor::extract`]: the caller receives a
//! seeded fallback vector instead, tagged with [`FeatureOrigin::Fallback`].
//!
//! ```rust,no_run
//! use vismatch_extract::{FeatureExtractor, StatisticalExtractor};
//!
//! let bytes = std::fs::read("product.jpg").unwrap();
//! let extraction = StatisticalExtractor::new().extract(&bytes, "product.jpg");
//! assert_eq!(extraction.features.dim(), 64);
//! ```

pub mod decode;
pub mod error;
pub mod extractor;
pub mod fallback;
mod features;
mod stats;

pub use decode::{decode, inspect, ImageInfo, MAX_DIMENSION, MAX_IMAGE_BYTES, MIN_DIMENSION};
pub use error::ExtractionError;
pub use extractor::{Extraction, FeatureExtractor, FeatureOrigin, StatisticalExtractor};
pub use fallback::fallback_features;
