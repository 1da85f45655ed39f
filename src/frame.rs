use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};
use tracing::debug;

use crate::error::{CashsightError, Result};

/// Pixel layout of a raw frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// 8-bit RGBA, 4 bytes per pixel
    Rgba32,
    /// 8-bit RGB, 3 bytes per pixel (treated as fully opaque)
    Rgb24,
}

impl FrameFormat {
    /// Get bytes per pixel for the format
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            FrameFormat::Rgba32 => 4,
            FrameFormat::Rgb24 => 3,
        }
    }
}

/// Perceptual brightness of an RGB triple on a 0-255 scale
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

/// A single still image handed to the classifier
#[derive(Debug, Clone)]
pub struct Frame {
    /// Caller-assigned identifier, used only for logging
    pub id: u64,
    /// Raw pixel data (shared ownership for cheap clones)
    pub data: Arc<Vec<u8>>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel layout
    pub format: FrameFormat,
}

impl Frame {
    /// Create a frame, rejecting buffers whose length does not match the dimensions
    pub fn new(id: u64, data: Vec<u8>, width: u32, height: u32, format: FrameFormat) -> Result<Self> {
        let frame = Self {
            id,
            data: Arc::new(data),
            width,
            height,
            format,
        };

        let Some(expected) = frame.expected_size() else {
            return Err(CashsightError::frame(format!(
                "frame {} is {}x{} {:?}, too large to address",
                id, width, height, format
            )));
        };
        if frame.data.len() != expected {
            return Err(CashsightError::frame(format!(
                "frame {} is {}x{} {:?} and needs {} bytes, got {}",
                id,
                width,
                height,
                format,
                expected,
                frame.data.len()
            )));
        }

        Ok(frame)
    }

    /// Wrap an RGBA image buffer
    pub fn from_rgba_image(id: u64, image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            id,
            data: Arc::new(image.into_raw()),
            width,
            height,
            format: FrameFormat::Rgba32,
        }
    }

    /// Convert any decoded image to an RGBA frame
    pub fn from_dynamic_image(id: u64, image: DynamicImage) -> Self {
        Self::from_rgba_image(id, image.to_rgba8())
    }

    /// Decode an image file into a frame
    pub fn load<P: AsRef<Path>>(id: u64, path: P) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)?;
        debug!(
            "Decoded {} as frame {} ({}x{})",
            path.display(),
            id,
            image.width(),
            image.height()
        );
        Ok(Self::from_dynamic_image(id, image))
    }

    /// Expected buffer length for the declared dimensions, `None` on overflow
    pub fn expected_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.format.bytes_per_pixel())
    }

    /// Validate frame data size against expected size
    pub fn validate_size(&self) -> bool {
        self.expected_size() == Some(self.data.len())
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// RGBA value of the pixel at a flattened index
    pub fn rgba(&self, index: usize) -> [u8; 4] {
        let bpp = self.format.bytes_per_pixel();
        let base = index * bpp;
        let px = &self.data[base..base + bpp];
        match self.format {
            FrameFormat::Rgba32 => [px[0], px[1], px[2], px[3]],
            FrameFormat::Rgb24 => [px[0], px[1], px[2], 255],
        }
    }

    /// RGBA value at (x, y); callers keep coordinates in bounds
    pub fn rgba_at(&self, x: u32, y: u32) -> [u8; 4] {
        self.rgba(y as usize * self.width as usize + x as usize)
    }

    /// Luma brightness at (x, y)
    pub fn luma_at(&self, x: u32, y: u32) -> f32 {
        let [r, g, b, _] = self.rgba_at(x, y);
        luma(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_frame_format_properties() {
        assert_eq!(FrameFormat::Rgba32.bytes_per_pixel(), 4);
        assert_eq!(FrameFormat::Rgb24.bytes_per_pixel(), 3);
    }

    #[test]
    fn test_frame_size_validation() {
        let valid = Frame::new(1, vec![0u8; 64 * 48 * 4], 64, 48, FrameFormat::Rgba32);
        assert!(valid.is_ok());

        let invalid = Frame::new(2, vec![0u8; 100], 64, 48, FrameFormat::Rgba32);
        assert!(matches!(invalid, Err(CashsightError::Frame { .. })));

        let rgb = Frame::new(3, vec![0u8; 64 * 48 * 3], 64, 48, FrameFormat::Rgb24);
        assert!(rgb.is_ok());
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let result = Frame::new(1, Vec::new(), u32::MAX, u32::MAX, FrameFormat::Rgba32);
        assert!(matches!(result, Err(CashsightError::Frame { .. })));

        // Hand-built frames skip `new`, so the size check itself must not overflow
        let frame = Frame {
            id: 2,
            data: Arc::new(Vec::new()),
            width: u32::MAX,
            height: u32::MAX,
            format: FrameFormat::Rgba32,
        };
        assert_eq!(frame.expected_size(), None);
        assert!(!frame.validate_size());
    }

    #[test]
    fn test_empty_frame() {
        let frame = Frame::new(1, Vec::new(), 0, 480, FrameFormat::Rgba32).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.pixel_count(), 0);
    }

    #[test]
    fn test_rgb24_is_opaque() {
        let frame = Frame::new(1, vec![10, 20, 30, 40, 50, 60], 2, 1, FrameFormat::Rgb24).unwrap();
        assert_eq!(frame.rgba(0), [10, 20, 30, 255]);
        assert_eq!(frame.rgba_at(1, 0), [40, 50, 60, 255]);
    }

    #[test]
    fn test_from_rgba_image() {
        let mut image = RgbaImage::from_pixel(4, 3, Rgba([200, 100, 50, 255]));
        image.put_pixel(3, 2, Rgba([0, 0, 0, 255]));

        let frame = Frame::from_rgba_image(7, image);
        assert_eq!(frame.id, 7);
        assert_eq!((frame.width, frame.height), (4, 3));
        assert!(frame.validate_size());
        assert_eq!(frame.rgba_at(0, 0), [200, 100, 50, 255]);
        assert_eq!(frame.luma_at(3, 2), 0.0);
    }

    #[test]
    fn test_luma_weights() {
        assert!((luma(255, 255, 255) - 255.0).abs() < 0.01);
        assert!(luma(0, 255, 0) > luma(255, 0, 0));
        assert!(luma(255, 0, 0) > luma(0, 0, 255));
    }
}
