use super::classifier::CurrencyClassifier;
use super::templates::TemplateTable;
use crate::config::CashsightConfig;
use crate::error::Result;

/// Builder for the currency classifier
pub struct CurrencyClassifierBuilder {
    config: Option<CashsightConfig>,
    table: Option<TemplateTable>,
}

impl CurrencyClassifierBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            table: None,
        }
    }

    pub fn config(mut self, config: CashsightConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this table instead of the one named by the configuration
    pub fn table(mut self, table: TemplateTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn build(self) -> Result<CurrencyClassifier> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        match self.table {
            Some(table) => Ok(CurrencyClassifier::new(&config, table)),
            None => CurrencyClassifier::from_config(&config),
        }
    }
}

impl Default for CurrencyClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
