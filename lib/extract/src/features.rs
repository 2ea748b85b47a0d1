//! Feature groups of the statistical extractor.
//!
//! Groups are emitted in a fixed order: geometry (4), channel statistics (18),
//! derived color (8), histogram (16), texture (8). The 54 measured values are
//! padded up to the configured dimension.

use crate::error::ExtractionError;
use crate::stats::{correlation, entropy, mean, percentile, sorted};
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage};

pub const GEOMETRY_LEN: usize = 4;
pub const CHANNEL_LEN: usize = 18;
pub const DERIVED_LEN: usize = 8;
pub const HISTOGRAM_LEN: usize = 16;
pub const TEXTURE_LEN: usize = 8;

/// Values produced before padding
pub const MEASURED_LEN: usize =
    GEOMETRY_LEN + CHANNEL_LEN + DERIVED_LEN + HISTOGRAM_LEN + TEXTURE_LEN;

/// Side of the grid the histogram group samples
const HISTOGRAM_GRID: u32 = 64;
/// Side of the grayscale grid the texture group samples
const TEXTURE_GRID: u32 = 32;

const MAX_PIXEL: f64 = 255.0;
const MAX_PIXEL_SQ: f64 = 255.0 * 255.0;

/// Per-channel statistics over every pixel, in raw 0..=255 units
#[derive(Debug, Clone, Copy)]
pub(crate) struct ChannelStats {
    pub mean: [f64; 3],
    pub std: [f64; 3],
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl ChannelStats {
    pub(crate) fn measure(rgb: &RgbImage) -> Self {
        let mut sum = [0.0f64; 3];
        let mut sum_sq = [0.0f64; 3];
        let mut min = [MAX_PIXEL; 3];
        let mut max = [0.0f64; 3];

        for pixel in rgb.pixels() {
            for c in 0..3 {
                let v = f64::from(pixel[c]);
                sum[c] += v;
                sum_sq[c] += v * v;
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
            }
        }

        let n = (u64::from(rgb.width()) * u64::from(rgb.height())).max(1) as f64;
        let mut mean = [0.0f64; 3];
        let mut std = [0.0f64; 3];
        for c in 0..3 {
            mean[c] = sum[c] / n;
            std[c] = (sum_sq[c] / n - mean[c] * mean[c]).max(0.0).sqrt();
        }
        Self { mean, std, min, max }
    }
}

fn finish(group: &'static str, values: Vec<f64>) -> Result<Vec<f32>, ExtractionError> {
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ExtractionError::NonFinite { group });
    }
    Ok(values.into_iter().map(|v| v as f32).collect())
}

/// Normalized width, height, aspect ratio and area
pub(crate) fn geometry(width: u32, height: u32) -> Result<Vec<f32>, ExtractionError> {
    let w = f64::from(width);
    let h = f64::from(height);
    if h == 0.0 {
        return Err(ExtractionError::Dimensions { width, height });
    }
    finish(
        "geometry",
        vec![
            (w / 1000.0).min(2.0),
            (h / 1000.0).min(2.0),
            (w / h).min(5.0),
            (w * h / 1e6).min(2.0),
        ],
    )
}

/// Mean, std, min, max per channel, then ranges, then cross-channel ratios.
/// Images with fewer than three color channels get a neutral 0.5 everywhere.
pub(crate) fn channel_statistics(
    stats: &ChannelStats,
    color_channels: u8,
) -> Result<Vec<f32>, ExtractionError> {
    if color_channels < 3 {
        return Ok(vec![0.5; CHANNEL_LEN]);
    }

    let mut values = Vec::with_capacity(CHANNEL_LEN);
    for c in 0..3 {
        values.push(stats.mean[c] / MAX_PIXEL);
        values.push(stats.std[c] / MAX_PIXEL);
        values.push(stats.min[c] / MAX_PIXEL);
        values.push(stats.max[c] / MAX_PIXEL);
    }
    for c in 0..3 {
        values.push((stats.max[c] - stats.min[c]) / MAX_PIXEL);
    }
    let [r, g, b] = stats.mean;
    values.push(r / (g + 1.0));
    values.push(g / (b + 1.0));
    values.push(b / (r + 1.0));

    finish("channel", values)
}

/// Brightness, contrast, dominance, saturation, warmth and color variance
pub(crate) fn derived_color(stats: &ChannelStats) -> Result<Vec<f32>, ExtractionError> {
    let [r, g, b] = stats.mean;
    let [sr, sg, sb] = stats.std;

    let brightness = (r + g + b) / 3.0 / MAX_PIXEL;
    let contrast = (sr + sg + sb) / 3.0 / MAX_PIXEL;

    let total = r + g + b;
    let dominance = if total > 0.0 {
        [r / total, g / total, b / total]
    } else {
        [1.0 / 3.0; 3]
    };

    let max_mean = r.max(g).max(b);
    let min_mean = r.min(g).min(b);
    let saturation = if max_mean > 0.0 {
        (max_mean - min_mean) / max_mean
    } else {
        0.0
    };

    let warmth = ((r + g) / (b + 1.0) / 4.0).min(1.0);
    let color_variance = (sr * sr + sg * sg + sb * sb).sqrt() / MAX_PIXEL;

    finish(
        "derived",
        vec![
            brightness,
            contrast,
            dominance[0],
            dominance[1],
            dominance[2],
            saturation,
            warmth,
            color_variance,
        ],
    )
}

/// Percentiles and skew per channel on a 64x64 grid, channel correlations,
/// and the red channel's 16-bin entropy.
pub(crate) fn histogram(rgb: &RgbImage) -> Result<Vec<f32>, ExtractionError> {
    let grid = imageops::resize(rgb, HISTOGRAM_GRID, HISTOGRAM_GRID, FilterType::Triangle);

    let mut channels: [Vec<f64>; 3] = Default::default();
    let mut red_bins = [0u32; 16];
    for pixel in grid.pixels() {
        for c in 0..3 {
            channels[c].push(f64::from(pixel[c]));
        }
        red_bins[usize::from(pixel[0] >> 4)] += 1;
    }

    let mut values = Vec::with_capacity(HISTOGRAM_LEN);
    for channel in &channels {
        let ordered = sorted(channel);
        let median = percentile(&ordered, 0.5);
        values.push(percentile(&ordered, 0.25) / MAX_PIXEL);
        values.push(median / MAX_PIXEL);
        values.push(percentile(&ordered, 0.75) / MAX_PIXEL);
        values.push(mean(channel) / MAX_PIXEL - median / MAX_PIXEL);
    }

    values.push(correlation(&channels[0], &channels[1]));
    values.push(correlation(&channels[1], &channels[2]));
    values.push(correlation(&channels[0], &channels[2]));
    values.push(entropy(&red_bins) / 4.0);

    finish("histogram", values)
}

/// Gradient densities, neighborhood variance percentiles, edge direction bias
/// and smoothness on a 32x32 grayscale grid.
pub(crate) fn texture(image: &DynamicImage) -> Result<Vec<f32>, ExtractionError> {
    let gray = imageops::resize(&image.to_luma8(), TEXTURE_GRID, TEXTURE_GRID, FilterType::Triangle);
    let side = TEXTURE_GRID as usize;
    let px: Vec<f64> = gray.pixels().map(|p| f64::from(p[0])).collect();
    let at = |x: usize, y: usize| px[y * side + x];

    let mut horizontal = 0.0;
    let mut vertical = 0.0;
    for y in 0..side {
        for x in 0..side {
            if x + 1 < side {
                horizontal += (at(x + 1, y) - at(x, y)).abs();
            }
            if y + 1 < side {
                vertical += (at(x, y + 1) - at(x, y)).abs();
            }
        }
    }

    let mut local_variance = Vec::with_capacity((side - 2) * (side - 2));
    for y in 1..side - 1 {
        for x in 1..side - 1 {
            let mut window = [0.0f64; 9];
            let mut k = 0;
            for dy in 0..3 {
                for dx in 0..3 {
                    window[k] = at(x + dx - 1, y + dy - 1);
                    k += 1;
                }
            }
            let m = mean(&window);
            let var = window.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / 9.0;
            local_variance.push(var);
        }
    }
    if local_variance.is_empty() {
        return Err(ExtractionError::NoFeatures);
    }

    let norm = (side * side) as f64 * MAX_PIXEL;
    let ordered = sorted(&local_variance);

    let direction = if horizontal > 0.0 {
        vertical / horizontal
    } else if vertical > 0.0 {
        3.0
    } else {
        1.0
    };

    finish(
        "texture",
        vec![
            horizontal / norm,
            vertical / norm,
            (horizontal + vertical) / norm,
            percentile(&ordered, 0.25) / MAX_PIXEL_SQ,
            percentile(&ordered, 0.5) / MAX_PIXEL_SQ,
            percentile(&ordered, 0.75) / MAX_PIXEL_SQ,
            direction.min(3.0) / 3.0,
            (mean(&local_variance) / MAX_PIXEL_SQ).min(1.0),
        ],
    )
}

/// Extend `features` to `target` with rotating transforms of an earlier
/// value, clamped to [0, 1], then truncate to exactly `target`.
pub(crate) fn pad(mut features: Vec<f32>, target: usize) -> Vec<f32> {
    if features.is_empty() {
        return features;
    }

    let mut step = 0usize;
    while features.len() < target {
        let len = features.len() as i64;
        let offset = len - 30;
        let source = features[offset.rem_euclid(offset.max(1)) as usize];

        let value = match step % 4 {
            0 => source.abs().sqrt(),
            1 => source * source,
            2 => (source.sin() + 1.0) / 2.0,
            _ => 1.0 - source,
        };
        features.push(value.clamp(0.0, 1.0));
        step += 1;
    }

    features.truncate(target);
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn two_tone(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([200, 100, 0])
            } else {
                Rgb([0, 100, 200])
            }
        })
    }

    #[test]
    fn test_geometry_caps() {
        let g = geometry(500, 250).unwrap();
        assert_eq!(g, vec![0.5, 0.25, 2.0, 0.125]);

        let capped = geometry(10_000, 10).unwrap();
        assert_eq!(capped[0], 2.0);
        assert_eq!(capped[2], 5.0);
    }

    #[test]
    fn test_channel_statistics_layout() {
        let stats = ChannelStats::measure(&two_tone(20, 10));
        let values = channel_statistics(&stats, 3).unwrap();
        assert_eq!(values.len(), CHANNEL_LEN);

        // red: mean 100, min 0, max 200
        assert!((values[0] - 100.0 / 255.0).abs() < 1e-6);
        assert!((values[1] - 100.0 / 255.0).abs() < 1e-6);
        assert_eq!(values[2], 0.0);
        assert!((values[3] - 200.0 / 255.0).abs() < 1e-6);
        // green is constant
        assert_eq!(values[5], 0.0);
        assert_eq!(values[13], 0.0);
        // R/(G+1)
        assert!((values[15] - 100.0 / 101.0).abs() < 1e-6);
    }

    #[test]
    fn test_channel_statistics_neutral_for_gray() {
        let stats = ChannelStats::measure(&two_tone(20, 10));
        assert_eq!(channel_statistics(&stats, 1).unwrap(), vec![0.5; CHANNEL_LEN]);
    }

    #[test]
    fn test_derived_color_black_image() {
        let stats = ChannelStats::measure(&RgbImage::new(12, 12));
        let values = derived_color(&stats).unwrap();
        assert_eq!(values.len(), DERIVED_LEN);
        assert_eq!(values[0], 0.0);
        assert!((values[2] - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(values[5], 0.0);
        assert_eq!(values[6], 0.0);
    }

    #[test]
    fn test_histogram_solid_image() {
        let img = RgbImage::from_pixel(64, 64, Rgb([255, 0, 51]));
        let values = histogram(&img).unwrap();
        assert_eq!(values.len(), HISTOGRAM_LEN);
        assert!((values[0] - 1.0).abs() < 1e-6);
        assert!((values[9] - 0.2).abs() < 1e-6);
        // constant channels have no correlation and no entropy
        assert_eq!(&values[12..16], &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_texture_direction_bias() {
        let stripes = RgbImage::from_fn(32, 32, |x, _| {
            if (x / 2) % 2 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
        });
        let values = texture(&DynamicImage::ImageRgb8(stripes)).unwrap();
        assert_eq!(values.len(), TEXTURE_LEN);
        // vertical stripes only change horizontally
        assert!(values[0] > 0.0);
        assert_eq!(values[1], 0.0);
        assert_eq!(values[6], 0.0);
    }

    #[test]
    fn test_texture_flat_image() {
        let flat = DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([90, 90, 90])));
        let values = texture(&flat).unwrap();
        assert_eq!(&values[..6], &[0.0; 6]);
        assert!((values[6] - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(values[7], 0.0);
    }

    #[test]
    fn test_pad_rotates_transforms_and_truncates() {
        let base: Vec<f32> = (0..54).map(|i| if i == 0 { 0.25 } else { 0.9 }).collect();
        let padded = pad(base, 64);
        assert_eq!(padded.len(), 64);
        assert_eq!(padded[54], 0.5);
        assert_eq!(padded[55], 0.0625);
        assert!((padded[56] - (0.25f32.sin() + 1.0) / 2.0).abs() < 1e-6);
        assert_eq!(padded[57], 0.75);
        assert_eq!(padded[58], 0.5);

        let truncated = pad(vec![0.1; 70], 64);
        assert_eq!(truncated.len(), 64);
    }

    #[test]
    fn test_pad_handles_short_input() {
        let padded = pad(vec![0.81], 8);
        assert_eq!(padded.len(), 8);
        assert!(padded.iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(pad(Vec::new(), 8).is_empty());
    }
}
