//! Reference color tables for banknotes and coins.
//!
//! Colors are rough visual signatures, not measured spectra. They are good
//! enough for the heuristic matcher and nothing more.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::types::{CurrencyTemplate, Rgb, ShapeClass};
use crate::config::CurrencyConfig;
use crate::error::{CashsightError, Result};

/// Tables compiled into the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinTable {
    Usd,
    Inr,
}

type Entry = (&'static str, f64, [u8; 3], &'static [[u8; 3]], &'static [&'static str]);

const USD_NOTES: &[Entry] = &[
    ("$1", 1.0, [120, 140, 100], &[[200, 200, 180]], &["Washington portrait", "green seal"]),
    ("$5", 5.0, [140, 120, 160], &[[210, 200, 220]], &["Lincoln portrait", "purple tint"]),
    ("$10", 10.0, [220, 160, 100], &[[240, 210, 170]], &["Hamilton portrait", "orange torch"]),
    ("$20", 20.0, [100, 160, 80], &[[180, 200, 160]], &["Jackson portrait", "green-peach background"]),
    ("$50", 50.0, [180, 80, 100], &[[220, 180, 190]], &["Grant portrait", "pink-blue background"]),
    ("$100", 100.0, [60, 120, 140], &[[150, 190, 200]], &["Franklin portrait", "blue security ribbon"]),
];

const USD_COINS: &[Entry] = &[
    ("$0.01", 0.01, [180, 100, 60], &[[140, 80, 40]], &["Lincoln profile", "copper plated"]),
    ("$0.05", 0.05, [160, 160, 150], &[[120, 120, 110]], &["Jefferson profile", "smooth edge"]),
    ("$0.10", 0.10, [180, 180, 180], &[[200, 200, 210]], &["Roosevelt profile", "reeded edge"]),
    ("$0.25", 0.25, [200, 200, 200], &[[170, 170, 170]], &["Washington profile", "reeded edge"]),
    ("$0.50", 0.50, [210, 210, 200], &[[160, 160, 160]], &["Kennedy profile"]),
    ("$1.00", 1.00, [200, 170, 60], &[[160, 130, 40]], &["Sacagawea profile", "golden"]),
];

const INR_NOTES: &[Entry] = &[
    ("₹10", 10.0, [140, 90, 60], &[[190, 150, 110]], &["chocolate brown", "Konark Sun Temple"]),
    ("₹20", 20.0, [190, 200, 90], &[[220, 220, 150]], &["greenish yellow", "Ellora Caves"]),
    ("₹50", 50.0, [90, 180, 200], &[[160, 210, 220]], &["fluorescent blue", "Hampi chariot"]),
    ("₹100", 100.0, [170, 150, 200], &[[200, 190, 220]], &["lavender", "Rani ki Vav"]),
    ("₹200", 200.0, [240, 180, 60], &[[250, 210, 130]], &["bright yellow", "Sanchi Stupa"]),
    ("₹500", 500.0, [150, 150, 140], &[[190, 190, 180]], &["stone grey", "Red Fort"]),
    ("₹2000", 2000.0, [200, 60, 140], &[[220, 140, 190]], &["magenta", "Mangalyaan"]),
];

const INR_COINS: &[Entry] = &[
    ("₹1", 1.0, [190, 190, 190], &[[160, 160, 160]], &["stainless steel"]),
    ("₹2", 2.0, [180, 180, 170], &[[140, 140, 130]], &["stainless steel", "rounded square edge"]),
    ("₹5", 5.0, [200, 170, 90], &[[170, 140, 70]], &["nickel brass"]),
    ("₹10", 10.0, [210, 180, 90], &[[180, 180, 180]], &["bimetallic"]),
    ("₹20", 20.0, [200, 180, 100], &[[190, 190, 180]], &["bimetallic", "twelve-edged"]),
];

/// Immutable set of templates for one currency, partitioned by shape class
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateTable {
    currency: String,
    notes: Vec<CurrencyTemplate>,
    coins: Vec<CurrencyTemplate>,
}

impl TemplateTable {
    /// Build a table, rejecting empty or malformed template sets
    pub fn new(
        currency: impl Into<String>,
        notes: Vec<CurrencyTemplate>,
        coins: Vec<CurrencyTemplate>,
    ) -> Result<Self> {
        let currency = currency.into();
        if currency.trim().is_empty() {
            return Err(CashsightError::template("currency code is empty"));
        }
        if notes.is_empty() && coins.is_empty() {
            return Err(CashsightError::template(format!(
                "{} table has no templates",
                currency
            )));
        }

        for (expected, template) in notes
            .iter()
            .map(|t| (ShapeClass::Note, t))
            .chain(coins.iter().map(|t| (ShapeClass::Coin, t)))
        {
            if template.denomination.trim().is_empty() {
                return Err(CashsightError::template("denomination label is empty"));
            }
            if !template.value.is_finite() || template.value < 0.0 {
                return Err(CashsightError::template(format!(
                    "{} has invalid face value {}",
                    template.denomination, template.value
                )));
            }
            if template.currency != currency {
                return Err(CashsightError::template(format!(
                    "{} is a {} template in the {} table",
                    template.denomination, template.currency, currency
                )));
            }
            if template.shape != expected {
                return Err(CashsightError::template(format!(
                    "{} is a {} listed among {}s",
                    template.denomination, template.shape, expected
                )));
            }
        }

        Ok(Self {
            currency,
            notes,
            coins,
        })
    }

    pub fn builtin(table: BuiltinTable) -> Self {
        match table {
            BuiltinTable::Usd => Self::usd(),
            BuiltinTable::Inr => Self::inr(),
        }
    }

    /// United States dollar notes and coins
    pub fn usd() -> Self {
        Self::from_entries("USD", USD_NOTES, USD_COINS)
    }

    /// Indian rupee notes and coins
    pub fn inr() -> Self {
        Self::from_entries("INR", INR_NOTES, INR_COINS)
    }

    fn from_entries(currency: &str, notes: &[Entry], coins: &[Entry]) -> Self {
        let build = |entries: &[Entry], shape: ShapeClass| -> Vec<CurrencyTemplate> {
            entries
                .iter()
                .map(|(label, value, primary, alternates, features)| CurrencyTemplate {
                    denomination: label.to_string(),
                    value: *value,
                    currency: currency.to_string(),
                    shape,
                    primary: Rgb::from(*primary),
                    alternates: alternates.iter().copied().map(Rgb::from).collect(),
                    features: features.iter().map(|f| f.to_string()).collect(),
                })
                .collect()
        };

        Self {
            currency: currency.to_string(),
            notes: build(notes, ShapeClass::Note),
            coins: build(coins, ShapeClass::Coin),
        }
    }

    /// Parse a table from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: TemplateFile = toml::from_str(text)?;
        let currency = file.currency.trim().to_string();

        let convert = |entries: Vec<TemplateEntry>, shape: ShapeClass| {
            entries
                .into_iter()
                .map(|entry| CurrencyTemplate {
                    denomination: entry.denomination,
                    value: entry.value,
                    currency: currency.clone(),
                    shape,
                    primary: entry.primary,
                    alternates: entry.alternates,
                    features: entry.features,
                })
                .collect::<Vec<_>>()
        };

        let notes = convert(file.notes, ShapeClass::Note);
        let coins = convert(file.coins, ShapeClass::Coin);
        Self::new(currency.clone(), notes, coins)
    }

    /// Load a table from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading template table from: {}", path.display());

        let text = fs::read_to_string(path)?;
        let table = Self::from_toml_str(&text)?;

        info!(
            "Loaded {} template table with {} notes and {} coins",
            table.currency,
            table.notes.len(),
            table.coins.len()
        );
        Ok(table)
    }

    /// Resolve the table a configuration asks for
    pub fn from_config(config: &CurrencyConfig) -> Result<Self> {
        match &config.templates_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::builtin(config.table)),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Templates of one shape class, in declaration order
    pub fn templates(&self, shape: ShapeClass) -> &[CurrencyTemplate] {
        match shape {
            ShapeClass::Note => &self.notes,
            ShapeClass::Coin => &self.coins,
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len() + self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurrencyTemplate> {
        self.notes.iter().chain(self.coins.iter())
    }
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    currency: String,
    #[serde(default)]
    notes: Vec<TemplateEntry>,
    #[serde(default)]
    coins: Vec<TemplateEntry>,
}

#[derive(Debug, Deserialize)]
struct TemplateEntry {
    denomination: String,
    value: f64,
    primary: Rgb,
    #[serde(default)]
    alternates: Vec<Rgb>,
    #[serde(default)]
    features: Vec<String>,
}
