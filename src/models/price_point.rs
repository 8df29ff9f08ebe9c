use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Serialize};

/// One daily observation for an asset (or a synthesized index).
///
/// `time` is UTC milliseconds at 00:00 of the day and `date` its ISO-8601 form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub time: i64,
    pub date: String,
    pub price_usd: BigDecimal,
    /// Date of the observed point this entry was copied from by gap filling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloned_from: Option<String>,
}

impl PricePoint {
    pub fn new(time: i64, date: String, price_usd: BigDecimal) -> Self {
        Self {
            time,
            date,
            price_usd,
            cloned_from: None,
        }
    }

    /// Price as a float for arithmetic; non-representable values read as 0.
    pub fn price(&self) -> f64 {
        self.price_usd.to_f64().unwrap_or(0.0)
    }

    pub fn is_cloned(&self) -> bool {
        self.cloned_from.is_some()
    }
}

/// Chronological price history of a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSeries {
    pub asset_id: String,
    pub points: Vec<PricePoint>,
}

impl AssetSeries {
    pub fn new(asset_id: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            asset_id: asset_id.into(),
            points,
        }
    }

    pub fn empty(asset_id: impl Into<String>) -> Self {
        Self::new(asset_id, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Synthesized basket value over time; same shape as an asset history.
pub type IndexSeries = Vec<PricePoint>;
