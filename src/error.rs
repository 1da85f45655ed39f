use thiserror::Error;

#[derive(Error, Debug)]
pub enum CashsightError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),

    #[error("Invalid frame: {details}")]
    Frame { details: String },

    #[error("Invalid template table: {details}")]
    Template { details: String },
}

impl CashsightError {
    pub fn frame<S: Into<String>>(details: S) -> Self {
        Self::Frame {
            details: details.into(),
        }
    }

    pub fn template<S: Into<String>>(details: S) -> Self {
        Self::Template {
            details: details.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CashsightError>;
