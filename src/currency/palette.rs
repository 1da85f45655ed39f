//! Dominant color extraction over a strided pixel sample.

use std::collections::HashMap;

use tracing::debug;

use super::types::{DominantColor, Rgb};
use crate::config::SamplingConfig;
use crate::frame::{luma, Frame};

/// Colors and brightness gathered from one sampling pass
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteSample {
    /// Top buckets by descending count
    pub colors: Vec<DominantColor>,
    /// Mean luma of the sampled opaque pixels, 0 when nothing was sampled
    pub average_brightness: f32,
    /// Number of sampled pixels that passed the alpha test
    pub sampled: usize,
}

/// Sample every `stride`-th pixel and rank quantized colors by frequency
pub fn sample_palette(frame: &Frame, config: &SamplingConfig) -> PaletteSample {
    if frame.is_empty() || !frame.validate_size() {
        return PaletteSample {
            colors: Vec::new(),
            average_brightness: 0.0,
            sampled: 0,
        };
    }

    let stride = config.stride.max(1) as usize;
    let bucket = config.bucket_size.clamp(1, 255) as u8;
    let top_k = config.top_k as usize;

    // Insertion order is kept so equal counts rank by first appearance
    let mut index: HashMap<Rgb, usize> = HashMap::new();
    let mut buckets: Vec<DominantColor> = Vec::new();
    let mut brightness_sum = 0.0f64;
    let mut sampled = 0usize;

    for i in (0..frame.pixel_count()).step_by(stride) {
        let [r, g, b, a] = frame.rgba(i);
        if (a as u32) < config.alpha_threshold {
            continue;
        }

        sampled += 1;
        brightness_sum += luma(r, g, b) as f64;

        let key = Rgb::new(r / bucket * bucket, g / bucket * bucket, b / bucket * bucket);
        match index.get(&key) {
            Some(&slot) => buckets[slot].count += 1,
            None => {
                index.insert(key, buckets.len());
                buckets.push(DominantColor {
                    color: key,
                    count: 1,
                });
            }
        }
    }

    // Stable sort keeps first-seen order among ties
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets.truncate(top_k);

    let average_brightness = if sampled > 0 {
        (brightness_sum / sampled as f64) as f32
    } else {
        0.0
    };

    debug!(
        "Frame {}: sampled {} pixels into {} dominant colors (avg brightness {:.1})",
        frame.id,
        sampled,
        buckets.len(),
        average_brightness
    );

    PaletteSample {
        colors: buckets,
        average_brightness,
        sampled,
    }
}

/// Dominant colors only
pub fn dominant_colors(frame: &Frame, config: &SamplingConfig) -> Vec<DominantColor> {
    sample_palette(frame, config).colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CashsightConfig;
    use crate::frame::FrameFormat;
    use image::{Rgba, RgbaImage};

    fn sampling() -> SamplingConfig {
        CashsightConfig::default().sampling
    }

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Frame {
        Frame::from_rgba_image(1, RgbaImage::from_pixel(width, height, Rgba(rgba)))
    }

    #[test]
    fn test_single_color_frame_has_one_bucket() {
        // 20x10 = 200 pixels, stride 10 -> 20 samples
        let frame = solid(20, 10, [100, 160, 80, 255]);
        let colors = dominant_colors(&frame, &sampling());

        assert_eq!(colors.len(), 1);
        assert_eq!(colors[0].count, 20);
        assert_eq!(colors[0].color, Rgb::new(100, 160, 80));
    }

    #[test]
    fn test_quantization_floors_to_bucket() {
        let frame = solid(10, 10, [119, 59, 255, 255]);
        let colors = dominant_colors(&frame, &sampling());
        assert_eq!(colors[0].color, Rgb::new(100, 40, 240));
    }

    #[test]
    fn test_empty_frame_yields_nothing() {
        let frame = Frame::new(1, Vec::new(), 0, 0, FrameFormat::Rgba32).unwrap();
        let sample = sample_palette(&frame, &sampling());
        assert!(sample.colors.is_empty());
        assert_eq!(sample.sampled, 0);
        assert_eq!(sample.average_brightness, 0.0);
    }

    #[test]
    fn test_translucent_pixels_are_skipped() {
        let frame = solid(20, 10, [255, 0, 0, 40]);
        let sample = sample_palette(&frame, &sampling());
        assert!(sample.colors.is_empty());
        assert_eq!(sample.sampled, 0);
    }

    #[test]
    fn test_ranked_by_frequency_and_bounded() {
        let mut config = sampling();
        config.stride = 1;
        config.top_k = 3;

        // Row-major columns of five distinct colors with different widths
        let widths = [1u32, 4, 2, 6, 3];
        let total: u32 = widths.iter().sum();
        let mut image = RgbaImage::new(total, 2);
        let mut x = 0;
        for (i, w) in widths.iter().enumerate() {
            let shade = (i as u8) * 40;
            for _ in 0..*w {
                image.put_pixel(x, 0, Rgba([shade, shade, shade, 255]));
                image.put_pixel(x, 1, Rgba([shade, shade, shade, 255]));
                x += 1;
            }
        }

        let colors = dominant_colors(&Frame::from_rgba_image(1, image), &config);
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0].color, Rgb::new(120, 120, 120));
        assert_eq!(colors[0].count, 12);
        assert_eq!(colors[1].color, Rgb::new(40, 40, 40));
        assert_eq!(colors[2].color, Rgb::new(160, 160, 160));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let mut config = sampling();
        config.stride = 1;

        let mut image = RgbaImage::from_pixel(2, 1, Rgba([200, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 200, 255]));

        let colors = dominant_colors(&Frame::from_rgba_image(1, image), &config);
        assert_eq!(colors[0].color, Rgb::new(200, 0, 0));
        assert_eq!(colors[1].color, Rgb::new(0, 0, 200));
    }

    #[test]
    fn test_average_brightness() {
        let frame = solid(20, 10, [255, 255, 255, 255]);
        let sample = sample_palette(&frame, &sampling());
        assert!((sample.average_brightness - 255.0).abs() < 0.01);
    }
}
