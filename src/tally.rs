use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::currency::{ClassificationResult, ShapeClass};

/// One accepted recognition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub result: ClassificationResult,
    pub scanned_at: DateTime<Utc>,
    /// Where the frame came from, e.g. an image path
    pub source: Option<String>,
}

/// Running total of recognized money, with spoken-style announcements
#[derive(Debug, Clone, Default)]
pub struct ScanTally {
    records: Vec<ScanRecord>,
    totals: BTreeMap<String, f64>,
}

impl ScanTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result to the tally and return its announcement
    pub fn record(&mut self, result: ClassificationResult, source: Option<String>) -> String {
        *self.totals.entry(result.currency.clone()).or_insert(0.0) += result.value;
        let announcement = self.announcement(&result);

        info!(
            "Tallied {} {} (running total {:.2} {})",
            result.denomination,
            result.currency,
            self.total(&result.currency),
            result.currency
        );

        self.records.push(ScanRecord {
            result,
            scanned_at: Utc::now(),
            source,
        });
        announcement
    }

    /// "Note recognized: $20 USD. Confidence: 95 percent. Total amount: 20.00 USD."
    pub fn announcement(&self, result: &ClassificationResult) -> String {
        let kind = match result.kind {
            ShapeClass::Note => "Note",
            ShapeClass::Coin => "Coin",
        };
        format!(
            "{} recognized: {} {}. Confidence: {} percent. Total amount: {:.2} {}.",
            kind,
            result.denomination,
            result.currency,
            result.confidence,
            self.total(&result.currency),
            result.currency
        )
    }

    /// Summary of everything scanned so far
    pub fn summary(&self) -> String {
        if self.records.is_empty() {
            return "No currency scanned yet.".to_string();
        }

        let amounts: Vec<String> = self
            .totals
            .iter()
            .map(|(currency, total)| format!("{:.2} {}", total, currency))
            .collect();
        let noun = if self.records.len() == 1 { "item" } else { "items" };

        format!(
            "Total amount scanned: {}. You have scanned {} {}.",
            amounts.join(", "),
            self.records.len(),
            noun
        )
    }

    /// Forget every record and total
    pub fn clear(&mut self) -> String {
        debug!("Clearing tally of {} records", self.records.len());
        self.records.clear();
        self.totals.clear();
        "Total cleared. Ready to scan new currency.".to_string()
    }

    pub fn total(&self, currency: &str) -> f64 {
        self.totals.get(currency).copied().unwrap_or(0.0)
    }

    pub fn totals(&self) -> &BTreeMap<String, f64> {
        &self.totals
    }

    pub fn records(&self) -> &[ScanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
