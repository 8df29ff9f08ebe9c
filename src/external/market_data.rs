use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AssetMeta, PricePoint};

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("rate limited")]
    RateLimited,
}

/// Source of asset metadata and raw daily price histories.
///
/// Histories are ascending by `time` but carry no gap guarantees.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Top `limit` assets by market rank.
    async fn fetch_assets(&self, limit: usize) -> Result<Vec<AssetMeta>, MarketDataError>;

    /// Observations for `asset_id` with `start_time <= time < end_time`.
    async fn fetch_history(
        &self,
        asset_id: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Vec<PricePoint>, MarketDataError>;
}
