use thiserror::Error;

use crate::external::market_data::MarketDataError;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Portions sum to {sum}, expected 100")]
    PortionSum { sum: i64 },
    #[error("No price series supplied for asset {0}")]
    MissingConstituent(String),
    #[error("Series for {asset_id} is not calendar-aligned: {reason}")]
    MisalignedSeries { asset_id: String, reason: String },
    #[error("Basket has no assets")]
    EmptyBasket,
    #[error("External error: {0}")]
    External(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<MarketDataError> for EngineError {
    fn from(value: MarketDataError) -> Self {
        EngineError::External(value.to_string())
    }
}
