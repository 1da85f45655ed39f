use std::sync::Arc;

use tracing::{debug, info};

use super::matcher::{DenominationMatcher, MatchInput};
use super::noise::{FixedJitter, NoiseSource};
use super::palette::sample_palette;
use super::shape::{detect_circle, detect_rectangle, scan_edges, EdgeScan};
use super::templates::TemplateTable;
use super::types::{BoundingBox, ClassificationResult, DominantColor, ShapeClass};
use crate::config::{CashsightConfig, MatcherConfig, SamplingConfig, ShapeConfig};
use crate::error::Result;
use crate::frame::Frame;

/// Frame-wide signals shared by both matching passes
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSignals {
    pub colors: Vec<DominantColor>,
    pub average_brightness: f32,
    pub edges: EdgeScan,
    pub high_contrast: bool,
}

/// Heuristic banknote and coin recognizer.
///
/// This is a placeholder for real object detection: it looks at dominant
/// colors, overall busyness and a fixed sampling ring, then matches colors
/// against a reference table. Expect false positives and negatives.
///
/// The classifier holds no per-call state, so one instance can be shared
/// across threads and called concurrently on independent frames.
#[derive(Debug, Clone)]
pub struct CurrencyClassifier {
    sampling: SamplingConfig,
    shape: ShapeConfig,
    matcher: MatcherConfig,
    table: Arc<TemplateTable>,
}

impl CurrencyClassifier {
    /// Create a classifier over an already resolved template table
    pub fn new(config: &CashsightConfig, table: TemplateTable) -> Self {
        info!(
            "Initializing currency classifier with {} table ({} templates)",
            table.currency(),
            table.len()
        );

        Self {
            sampling: config.sampling.clone(),
            shape: config.shape.clone(),
            matcher: config.matcher.clone(),
            table: Arc::new(table),
        }
    }

    /// Create a classifier, resolving the template table from the configuration
    pub fn from_config(config: &CashsightConfig) -> Result<Self> {
        let table = TemplateTable::from_config(&config.currency)?;
        Ok(Self::new(config, table))
    }

    pub fn table(&self) -> &TemplateTable {
        &self.table
    }

    /// Classify a frame using the configured fixed jitter
    pub fn classify(&self, frame: &Frame) -> Vec<ClassificationResult> {
        let mut noise = FixedJitter(self.matcher.jitter);
        self.classify_with_noise(frame, &mut noise)
    }

    /// Classify a frame, drawing confidence jitter from `noise`
    pub fn classify_with_noise(
        &self,
        frame: &Frame,
        noise: &mut dyn NoiseSource,
    ) -> Vec<ClassificationResult> {
        if frame.is_empty() || !frame.validate_size() {
            debug!(
                "Skipping frame {} ({}x{}, {} bytes)",
                frame.id,
                frame.width,
                frame.height,
                frame.data.len()
            );
            return Vec::new();
        }

        let signals = self.signals(frame);
        let mut results = Vec::with_capacity(2);

        if let Some(bbox) = detect_rectangle(frame, &signals.edges, &self.shape) {
            debug!("Frame {}: rectangular region at {:?}", frame.id, bbox);
            results.extend(self.match_region(frame, &signals, ShapeClass::Note, bbox, noise));
        }

        if let Some(bbox) = detect_circle(frame, &self.shape) {
            debug!("Frame {}: circular region at {:?}", frame.id, bbox);
            results.extend(self.match_region(frame, &signals, ShapeClass::Coin, bbox, noise));
        }

        if results.is_empty() {
            debug!("No currency recognized in frame {}", frame.id);
        }
        results
    }

    /// Dominant colors, brightness and contrast for a frame
    pub fn signals(&self, frame: &Frame) -> FrameSignals {
        let palette = sample_palette(frame, &self.sampling);
        let edges = scan_edges(frame, &self.shape);

        FrameSignals {
            colors: palette.colors,
            average_brightness: palette.average_brightness,
            high_contrast: edges.density() >= self.shape.high_contrast_density,
            edges,
        }
    }

    fn match_region(
        &self,
        frame: &Frame,
        signals: &FrameSignals,
        shape: ShapeClass,
        bbox: BoundingBox,
        noise: &mut dyn NoiseSource,
    ) -> Option<ClassificationResult> {
        let input = MatchInput {
            colors: &signals.colors,
            shape,
            average_brightness: signals.average_brightness,
            high_contrast: signals.high_contrast,
        };

        let found = DenominationMatcher::new(&self.matcher, &self.table).best_match(&input, noise)?;
        info!(
            "Frame {}: {} {} {} recognized ({}% confidence)",
            frame.id,
            found.template.currency,
            shape,
            found.template.denomination,
            found.confidence
        );

        Some(ClassificationResult {
            kind: shape,
            denomination: found.template.denomination.clone(),
            currency: found.template.currency.clone(),
            value: found.template.value,
            confidence: found.confidence,
            bounding_box: Some(bbox),
        })
    }
}
