mod builder;
mod classifier;
mod matcher;
mod noise;
mod palette;
mod shape;
mod templates;
mod types;

pub use builder::CurrencyClassifierBuilder;
pub use classifier::{CurrencyClassifier, FrameSignals};
pub use matcher::{DenominationMatch, DenominationMatcher, MatchInput};
pub use noise::{FixedJitter, NoiseSource, SeededJitter};
pub use palette::{dominant_colors, sample_palette, PaletteSample};
pub use shape::{detect_circle, detect_rectangle, scan_edges, scan_ring, EdgeScan, RingScan};
pub use templates::{BuiltinTable, TemplateTable};
pub use types::{BoundingBox, ClassificationResult, CurrencyTemplate, DominantColor, Rgb, ShapeClass};

#[cfg(test)]
mod tests;
