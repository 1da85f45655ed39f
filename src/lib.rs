pub mod config;
pub mod currency;
pub mod error;
pub mod frame;
pub mod tally;

pub use config::CashsightConfig;
pub use currency::{
    BoundingBox, BuiltinTable, ClassificationResult, CurrencyClassifier,
    CurrencyClassifierBuilder, CurrencyTemplate, FixedJitter, NoiseSource, SeededJitter,
    ShapeClass, TemplateTable,
};
pub use error::{CashsightError, Result};
pub use frame::{Frame, FrameFormat};
pub use tally::{ScanRecord, ScanTally};
