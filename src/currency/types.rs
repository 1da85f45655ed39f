use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse geometric category used to partition templates before color matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeClass {
    /// Rectangular banknote
    Note,
    /// Circular coin
    Coin,
}

impl fmt::Display for ShapeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeClass::Note => write!(f, "note"),
            ShapeClass::Coin => write!(f, "coin"),
        }
    }
}

/// An RGB triple; serialized as `[r, g, b]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Euclidean distance in RGB space
    pub fn distance(&self, other: &Rgb) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        [color.r, color.g, color.b]
    }
}

/// A quantized, frequency-ranked color from a frame sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DominantColor {
    pub color: Rgb,
    pub count: usize,
}

/// Pixel-space rectangle; always lies inside the frame it was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// True when the box fits inside a `width` x `height` frame
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// Reference visual signature for one denomination
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyTemplate {
    /// Display label, e.g. "$20" or "₹500"
    pub denomination: String,
    /// Face value in units of the currency
    pub value: f64,
    /// ISO currency code
    pub currency: String,
    pub shape: ShapeClass,
    pub primary: Rgb,
    pub alternates: Vec<Rgb>,
    /// Descriptive only; never used for scoring
    pub features: Vec<String>,
}

impl CurrencyTemplate {
    /// Primary color followed by the alternates
    pub fn colors(&self) -> impl Iterator<Item = &Rgb> {
        std::iter::once(&self.primary).chain(self.alternates.iter())
    }
}

/// One recognized note or coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub kind: ShapeClass,
    pub denomination: String,
    pub currency: String,
    pub value: f64,
    /// Heuristic match strength in 0..=100, not a calibrated probability
    pub confidence: u8,
    pub bounding_box: Option<BoundingBox>,
}
