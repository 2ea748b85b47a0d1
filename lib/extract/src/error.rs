use thiserror::Error;

/// Why a real feature vector could not be measured from an image
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("empty image buffer")]
    Empty,

    #[error("image buffer of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("image dimensions {width}x{height} outside the allowed range")]
    Dimensions { width: u32, height: u32 },

    #[error("{group} features produced a non-finite value")]
    NonFinite { group: &'static str },

    #[error("no feature group could be measured")]
    NoFeatures,
}

impl From<image::ImageError> for ExtractionError {
    fn from(e: image::ImageError) -> Self {
        ExtractionError::Decode(e.to_string())
    }
}

impl From<ExtractionError> for vismatch_core::Error {
    fn from(e: ExtractionError) -> Self {
        vismatch_core::Error::InvalidImage(e.to_string())
    }
}
