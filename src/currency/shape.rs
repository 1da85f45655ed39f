//! Coarse note/coin shape heuristics.
//!
//! Neither test locates an object. The rectangle test only measures how busy
//! the frame is, and the ring test only looks at a fixed circle around the
//! frame center. Boxes are placed by convention, not by detection.

use std::f64::consts::PI;

use tracing::debug;

use super::types::BoundingBox;
use crate::config::ShapeConfig;
use crate::frame::Frame;

/// Result of the neighbor contrast scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeScan {
    pub pairs: usize,
    pub high_contrast_pairs: usize,
}

impl EdgeScan {
    /// Fraction of compared pairs that were high-contrast
    pub fn density(&self) -> f64 {
        if self.pairs == 0 {
            0.0
        } else {
            self.high_contrast_pairs as f64 / self.pairs as f64
        }
    }
}

/// Result of sampling the metallic ring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingScan {
    pub radius: u32,
    pub samples: usize,
    pub metallic: usize,
}

/// Compare each grid pixel with its right and lower neighbor
pub fn scan_edges(frame: &Frame, config: &ShapeConfig) -> EdgeScan {
    let mut scan = EdgeScan::default();
    if frame.is_empty() || !frame.validate_size() {
        return scan;
    }

    let step = config.edge_step.max(1) as usize;
    for y in (0..frame.height).step_by(step) {
        for x in (0..frame.width).step_by(step) {
            let here = frame.luma_at(x, y);

            if x + 1 < frame.width {
                scan.pairs += 1;
                if (here - frame.luma_at(x + 1, y)).abs() > config.edge_threshold {
                    scan.high_contrast_pairs += 1;
                }
            }
            if y + 1 < frame.height {
                scan.pairs += 1;
                if (here - frame.luma_at(x, y + 1)).abs() > config.edge_threshold {
                    scan.high_contrast_pairs += 1;
                }
            }
        }
    }

    debug!(
        "Frame {}: {} of {} neighbor pairs high-contrast (density {:.4})",
        frame.id,
        scan.high_contrast_pairs,
        scan.pairs,
        scan.density()
    );
    scan
}

/// Report a centered note-sized box when the frame is busy enough
pub fn detect_rectangle(frame: &Frame, edges: &EdgeScan, config: &ShapeConfig) -> Option<BoundingBox> {
    if frame.is_empty() || edges.density() <= config.rectangle_density {
        return None;
    }

    let width = fraction_of(frame.width, config.note_width_fraction);
    let height = fraction_of(frame.height, config.note_height_fraction);

    Some(BoundingBox {
        x: (frame.width - width) / 2,
        y: (frame.height - height) / 2,
        width,
        height,
    })
}

/// Sample a fixed ring around the frame center and count metallic-looking points
pub fn scan_ring(frame: &Frame, config: &ShapeConfig) -> RingScan {
    let mut scan = RingScan::default();
    if frame.is_empty() || !frame.validate_size() {
        return scan;
    }

    let radius = (config.ring_radius_fraction * frame.width.min(frame.height) as f64).round();
    if radius < 1.0 {
        return scan;
    }
    scan.radius = radius as u32;

    let cx = frame.width as f64 / 2.0;
    let cy = frame.height as f64 / 2.0;
    let max_x = (frame.width - 1) as f64;
    let max_y = (frame.height - 1) as f64;

    let step = config.ring_step_degrees.clamp(1, 360);
    for degrees in (0..360).step_by(step as usize) {
        let angle = degrees as f64 * PI / 180.0;
        let x = (cx + radius * angle.cos()).floor().clamp(0.0, max_x) as u32;
        let y = (cy + radius * angle.sin()).floor().clamp(0.0, max_y) as u32;

        scan.samples += 1;
        let brightness = frame.luma_at(x, y);
        if brightness >= config.metallic_min && brightness <= config.metallic_max {
            scan.metallic += 1;
        }
    }

    debug!(
        "Frame {}: {} of {} ring samples metallic (radius {})",
        frame.id, scan.metallic, scan.samples, scan.radius
    );
    scan
}

/// Report a box around the sampling ring when enough of it looks metallic
pub fn detect_circle(frame: &Frame, config: &ShapeConfig) -> Option<BoundingBox> {
    let ring = scan_ring(frame, config);
    if ring.samples == 0 || ring.metallic < config.metallic_min_points as usize {
        return None;
    }

    let diameter = ring.radius * 2;
    let x = (frame.width / 2).saturating_sub(ring.radius);
    let y = (frame.height / 2).saturating_sub(ring.radius);

    Some(BoundingBox {
        x,
        y,
        width: diameter.min(frame.width - x),
        height: diameter.min(frame.height - y),
    })
}

fn fraction_of(extent: u32, fraction: f64) -> u32 {
    ((extent as f64 * fraction).round() as u32).clamp(1, extent)
}
