use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::currency::{BuiltinTable, ShapeClass};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CashsightConfig {
    pub sampling: SamplingConfig,
    pub shape: ShapeConfig,
    pub matcher: MatcherConfig,
    pub currency: CurrencyConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Sample every Nth pixel of the flattened buffer
    #[serde(default = "default_stride")]
    pub stride: u32,

    /// Pixels with alpha below this are skipped
    #[serde(default = "default_alpha_threshold")]
    pub alpha_threshold: u32,

    /// Channel quantization step used to merge near-identical colors
    #[serde(default = "default_bucket_size")]
    pub bucket_size: u32,

    /// Number of dominant colors kept
    #[serde(default = "default_top_k")]
    pub top_k: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ShapeConfig {
    /// Grid step for the neighbor contrast scan
    #[serde(default = "default_edge_step")]
    pub edge_step: u32,

    /// Luma difference that makes an adjacent pair high-contrast
    #[serde(default = "default_edge_threshold")]
    pub edge_threshold: f32,

    /// Fraction of high-contrast pairs that signals a banknote
    #[serde(default = "default_rectangle_density")]
    pub rectangle_density: f64,

    /// Fraction of high-contrast pairs that sets the high-contrast flag
    #[serde(default = "default_high_contrast_density")]
    pub high_contrast_density: f64,

    /// Reported note box width as a fraction of the frame width
    #[serde(default = "default_note_width_fraction")]
    pub note_width_fraction: f64,

    /// Reported note box height as a fraction of the frame height
    #[serde(default = "default_note_height_fraction")]
    pub note_height_fraction: f64,

    /// Ring radius as a fraction of min(width, height)
    #[serde(default = "default_ring_radius_fraction")]
    pub ring_radius_fraction: f64,

    /// Angular step between ring samples in degrees
    #[serde(default = "default_ring_step_degrees")]
    pub ring_step_degrees: u32,

    /// Lower bound of the metallic luma band
    #[serde(default = "default_metallic_min")]
    pub metallic_min: f32,

    /// Upper bound of the metallic luma band
    #[serde(default = "default_metallic_max")]
    pub metallic_max: f32,

    /// Metallic ring samples needed to report a coin
    #[serde(default = "default_metallic_min_points")]
    pub metallic_min_points: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MatcherConfig {
    /// RGB distance below which a note color pair counts
    #[serde(default = "default_note_distance_threshold")]
    pub note_distance_threshold: f64,

    /// RGB distance below which a coin color pair counts
    #[serde(default = "default_coin_distance_threshold")]
    pub coin_distance_threshold: f64,

    /// Minimum score for a note candidate
    #[serde(default = "default_note_confidence_floor")]
    pub note_confidence_floor: f64,

    /// Minimum score for a coin candidate
    #[serde(default = "default_coin_confidence_floor")]
    pub coin_confidence_floor: f64,

    #[serde(default = "default_note_confidence_cap")]
    pub note_confidence_cap: u32,

    #[serde(default = "default_coin_confidence_cap")]
    pub coin_confidence_cap: u32,

    /// Added to note scores when the frame is high-contrast
    #[serde(default = "default_high_contrast_bonus")]
    pub high_contrast_bonus: f64,

    /// Frames darker than this favor upper-tier denominations
    #[serde(default = "default_dark_brightness")]
    pub dark_brightness: f32,

    /// Frames brighter than this favor lower-tier denominations
    #[serde(default = "default_bright_brightness")]
    pub bright_brightness: f32,

    #[serde(default = "default_brightness_bonus")]
    pub brightness_bonus: f64,

    /// Fixed jitter added to every score
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Upper bound of seeded jitter
    #[serde(default = "default_seeded_jitter_max")]
    pub seeded_jitter_max: f64,
}

impl MatcherConfig {
    pub fn distance_threshold(&self, shape: ShapeClass) -> f64 {
        match shape {
            ShapeClass::Note => self.note_distance_threshold,
            ShapeClass::Coin => self.coin_distance_threshold,
        }
    }

    pub fn confidence_floor(&self, shape: ShapeClass) -> f64 {
        match shape {
            ShapeClass::Note => self.note_confidence_floor,
            ShapeClass::Coin => self.coin_confidence_floor,
        }
    }

    pub fn confidence_cap(&self, shape: ShapeClass) -> u32 {
        match shape {
            ShapeClass::Note => self.note_confidence_cap,
            ShapeClass::Coin => self.coin_confidence_cap,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CurrencyConfig {
    /// Built-in reference table
    #[serde(default = "default_table")]
    pub table: BuiltinTable,

    /// Custom TOML template table; overrides `table` when set
    pub templates_path: Option<String>,
}

impl CashsightConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("cashsight.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("sampling.stride", default_stride())?
            .set_default("sampling.alpha_threshold", default_alpha_threshold())?
            .set_default("sampling.bucket_size", default_bucket_size())?
            .set_default("sampling.top_k", default_top_k())?
            .set_default("shape.edge_step", default_edge_step())?
            .set_default("shape.edge_threshold", default_edge_threshold() as f64)?
            .set_default("shape.rectangle_density", default_rectangle_density())?
            .set_default("shape.high_contrast_density", default_high_contrast_density())?
            .set_default("shape.note_width_fraction", default_note_width_fraction())?
            .set_default("shape.note_height_fraction", default_note_height_fraction())?
            .set_default("shape.ring_radius_fraction", default_ring_radius_fraction())?
            .set_default("shape.ring_step_degrees", default_ring_step_degrees())?
            .set_default("shape.metallic_min", default_metallic_min() as f64)?
            .set_default("shape.metallic_max", default_metallic_max() as f64)?
            .set_default("shape.metallic_min_points", default_metallic_min_points())?
            .set_default(
                "matcher.note_distance_threshold",
                default_note_distance_threshold(),
            )?
            .set_default(
                "matcher.coin_distance_threshold",
                default_coin_distance_threshold(),
            )?
            .set_default("matcher.note_confidence_floor", default_note_confidence_floor())?
            .set_default("matcher.coin_confidence_floor", default_coin_confidence_floor())?
            .set_default("matcher.note_confidence_cap", default_note_confidence_cap())?
            .set_default("matcher.coin_confidence_cap", default_coin_confidence_cap())?
            .set_default("matcher.high_contrast_bonus", default_high_contrast_bonus())?
            .set_default("matcher.dark_brightness", default_dark_brightness() as f64)?
            .set_default("matcher.bright_brightness", default_bright_brightness() as f64)?
            .set_default("matcher.brightness_bonus", default_brightness_bonus())?
            .set_default("matcher.jitter", default_jitter())?
            .set_default("matcher.seeded_jitter_max", default_seeded_jitter_max())?
            .set_default("currency.table", "usd")?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // CASHSIGHT_MATCHER__JITTER=2.5 style overrides
            .add_source(
                Environment::with_prefix("CASHSIGHT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: CashsightConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> crate::error::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sampling = &self.sampling;
        if sampling.stride == 0 {
            return Err(message("Sampling stride must be greater than 0"));
        }
        if sampling.bucket_size == 0 || sampling.bucket_size > 255 {
            return Err(message("Sampling bucket_size must be within 1..=255"));
        }
        if sampling.top_k == 0 {
            return Err(message("Sampling top_k must be greater than 0"));
        }
        if sampling.alpha_threshold > 255 {
            return Err(message("Sampling alpha_threshold must be within 0..=255"));
        }

        let shape = &self.shape;
        if shape.edge_step == 0 {
            return Err(message("Shape edge_step must be greater than 0"));
        }
        if shape.ring_step_degrees == 0 || shape.ring_step_degrees > 360 {
            return Err(message("Shape ring_step_degrees must be within 1..=360"));
        }
        for (name, value) in [
            ("note_width_fraction", shape.note_width_fraction),
            ("note_height_fraction", shape.note_height_fraction),
            ("ring_radius_fraction", shape.ring_radius_fraction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(message(&format!("Shape {} must be within (0, 1]", name)));
            }
        }
        if shape.ring_radius_fraction > 0.5 {
            return Err(message("Shape ring_radius_fraction must not exceed 0.5"));
        }
        if shape.metallic_min > shape.metallic_max {
            return Err(message("Shape metallic_min must not exceed metallic_max"));
        }

        let matcher = &self.matcher;
        for shape in [ShapeClass::Note, ShapeClass::Coin] {
            let cap = matcher.confidence_cap(shape);
            if cap > 100 {
                return Err(message(&format!("{} confidence cap must not exceed 100", shape)));
            }
            if matcher.confidence_floor(shape) > cap as f64 {
                return Err(message(&format!(
                    "{} confidence floor must not exceed its cap",
                    shape
                )));
            }
            if matcher.distance_threshold(shape) <= 0.0 {
                return Err(message(&format!(
                    "{} distance threshold must be greater than 0",
                    shape
                )));
            }
        }
        if matcher.jitter < 0.0 || matcher.seeded_jitter_max < 0.0 {
            return Err(message("Matcher jitter values must not be negative"));
        }

        Ok(())
    }
}

fn message(text: &str) -> ConfigError {
    ConfigError::Message(text.to_string())
}

impl Default for CashsightConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig {
                stride: default_stride(),
                alpha_threshold: default_alpha_threshold(),
                bucket_size: default_bucket_size(),
                top_k: default_top_k(),
            },
            shape: ShapeConfig {
                edge_step: default_edge_step(),
                edge_threshold: default_edge_threshold(),
                rectangle_density: default_rectangle_density(),
                high_contrast_density: default_high_contrast_density(),
                note_width_fraction: default_note_width_fraction(),
                note_height_fraction: default_note_height_fraction(),
                ring_radius_fraction: default_ring_radius_fraction(),
                ring_step_degrees: default_ring_step_degrees(),
                metallic_min: default_metallic_min(),
                metallic_max: default_metallic_max(),
                metallic_min_points: default_metallic_min_points(),
            },
            matcher: MatcherConfig {
                note_distance_threshold: default_note_distance_threshold(),
                coin_distance_threshold: default_coin_distance_threshold(),
                note_confidence_floor: default_note_confidence_floor(),
                coin_confidence_floor: default_coin_confidence_floor(),
                note_confidence_cap: default_note_confidence_cap(),
                coin_confidence_cap: default_coin_confidence_cap(),
                high_contrast_bonus: default_high_contrast_bonus(),
                dark_brightness: default_dark_brightness(),
                bright_brightness: default_bright_brightness(),
                brightness_bonus: default_brightness_bonus(),
                jitter: default_jitter(),
                seeded_jitter_max: default_seeded_jitter_max(),
            },
            currency: CurrencyConfig {
                table: default_table(),
                templates_path: None,
            },
        }
    }
}

// Default value functions
fn default_stride() -> u32 {
    10
}
fn default_alpha_threshold() -> u32 {
    128
}
fn default_bucket_size() -> u32 {
    20
}
fn default_top_k() -> u32 {
    8
}

fn default_edge_step() -> u32 {
    2
}
fn default_edge_threshold() -> f32 {
    40.0
}
fn default_rectangle_density() -> f64 {
    0.015
}
fn default_high_contrast_density() -> f64 {
    0.05
}
fn default_note_width_fraction() -> f64 {
    0.6
}
fn default_note_height_fraction() -> f64 {
    0.4
}
fn default_ring_radius_fraction() -> f64 {
    0.3
}
fn default_ring_step_degrees() -> u32 {
    10
}
fn default_metallic_min() -> f32 {
    80.0
}
fn default_metallic_max() -> f32 {
    220.0
}
fn default_metallic_min_points() -> u32 {
    8
}

fn default_note_distance_threshold() -> f64 {
    80.0
}
fn default_coin_distance_threshold() -> f64 {
    60.0
}
fn default_note_confidence_floor() -> f64 {
    60.0
}
fn default_coin_confidence_floor() -> f64 {
    50.0
}
fn default_note_confidence_cap() -> u32 {
    95
}
fn default_coin_confidence_cap() -> u32 {
    90
}
fn default_high_contrast_bonus() -> f64 {
    5.0
}
fn default_dark_brightness() -> f32 {
    90.0
}
fn default_bright_brightness() -> f32 {
    180.0
}
fn default_brightness_bonus() -> f64 {
    3.0
}
fn default_jitter() -> f64 {
    0.0
}
fn default_seeded_jitter_max() -> f64 {
    4.0
}

fn default_table() -> BuiltinTable {
    BuiltinTable::Usd
}
