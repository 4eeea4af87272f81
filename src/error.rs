use chrono::naive::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoesCdnError {
    #[error("Product '{0}' not found in available products.")]
    UnknownProduct(String),
    #[error("Unknown satellite: '{0}'")]
    UnknownSatellite(String),
    #[error("No products requested.")]
    NoProducts,
    #[error("Invalid time range: start - {start} end - {end}")]
    InvalidTimeRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Download worker failure: {0}")]
    Worker(String),
}

impl GoesCdnError {
    pub fn config(message: impl Into<String>) -> Self {
        GoesCdnError::Config(message.into())
    }
}
