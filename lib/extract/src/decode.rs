//! Image decoding and validation
//!
//! Only JPEG, PNG, WebP and GIF are accepted. Bounds are checked on the
//! header before the full pixel buffer is allocated.

use crate::error::ExtractionError;
use image::{DynamicImage, ImageFormat, ImageReader};
use serde::Serialize;
use std::io::Cursor;

/// Smallest accepted width or height in pixels
pub const MIN_DIMENSION: u32 = 10;

/// Largest accepted width or height in pixels
pub const MAX_DIMENSION: u32 = 10_000;

/// Largest accepted encoded buffer (50 MiB)
pub const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024;

const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

/// Basic metadata about an encoded image
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub format: String,
    pub color: String,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub size_bytes: usize,
}

fn check_buffer(bytes: &[u8]) -> Result<ImageFormat, ExtractionError> {
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(ExtractionError::TooLarge {
            size: bytes.len(),
            limit: MAX_IMAGE_BYTES,
        });
    }

    let format = image::guess_format(bytes)?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(ExtractionError::UnsupportedFormat(format!("{:?}", format)));
    }
    Ok(format)
}

fn check_dimensions(width: u32, height: u32) -> Result<(), ExtractionError> {
    let allowed = MIN_DIMENSION..=MAX_DIMENSION;
    if !allowed.contains(&width) || !allowed.contains(&height) {
        return Err(ExtractionError::Dimensions { width, height });
    }
    Ok(())
}

fn decode_checked(bytes: &[u8]) -> Result<(DynamicImage, ImageFormat), ExtractionError> {
    let format = check_buffer(bytes)?;

    let (width, height) = ImageReader::with_format(Cursor::new(bytes), format).into_dimensions()?;
    check_dimensions(width, height)?;

    let image = image::load_from_memory_with_format(bytes, format)?;
    check_dimensions(image.width(), image.height())?;
    Ok((image, format))
}

/// Decode and validate an encoded image
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ExtractionError> {
    decode_checked(bytes).map(|(image, _)| image)
}

/// Read format, color type and dimensions without measuring features
pub fn inspect(bytes: &[u8]) -> Result<ImageInfo, ExtractionError> {
    let (image, format) = decode_checked(bytes)?;
    let color = image.color();

    Ok(ImageInfo {
        format: format!("{:?}", format),
        color: format!("{:?}", color),
        width: image.width(),
        height: image.height(),
        channels: color.channel_count(),
        size_bytes: bytes.len(),
    })
}

#[cfg(test)]
pub(crate) mod test_images {
    use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    pub fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    /// Diagonal color gradient with a checker overlay
    pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let checker = if (x / 4 + y / 4) % 2 == 0 { 40 } else { 0 };
            image::Rgb([
                ((x * 255) / width.max(1)) as u8,
                ((y * 255) / height.max(1)) as u8,
                (128 + checker) as u8,
            ])
        });
        encode(&DynamicImage::ImageRgb8(img), ImageFormat::Png)
    }

    pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, image::Rgb(rgb));
        encode(&DynamicImage::ImageRgb8(img), ImageFormat::Png)
    }

    pub fn gray_png(width: u32, height: u32) -> Vec<u8> {
        let img = GrayImage::from_fn(width, height, |x, _| image::Luma([(x * 7 % 256) as u8]));
        encode(&DynamicImage::ImageLuma8(img), ImageFormat::Png)
    }
}
