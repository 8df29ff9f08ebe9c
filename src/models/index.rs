use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AssetSeries, IndexSeries, Portion, SortBy, WeightBy};

/// Trailing-window returns of a series, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryOverview {
    pub days1: f64,
    pub days7: f64,
    pub days30: f64,
    pub total: f64,
}

/// Largest peak-to-trough decline of a series.
///
/// `value` is a non-negative percentage. The timestamps are ISO dates of the
/// peak and the trough, and are empty when there is no decline to report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxDrawDown {
    pub value: f64,
    pub start_time: String,
    pub end_time: String,
}

impl MaxDrawDown {
    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }
}

/// Parameters for building a new index from market candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRequest {
    pub index_id: Uuid,
    pub name: String,
    /// Number of assets to hold; the configured default when absent
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub sort_by: Option<SortBy>,
    #[serde(default)]
    pub weight_by: Option<WeightBy>,
    /// Inclusive UTC day start, milliseconds; the configured history length
    /// before `end_time` when absent
    #[serde(default)]
    pub start_time: Option<i64>,
    /// Exclusive UTC day start, milliseconds
    pub end_time: i64,
    #[serde(default)]
    pub starting_balance: Option<f64>,
}

/// Everything the persistence layer stores for one index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexOverview {
    pub index_id: Uuid,
    pub name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub starting_balance: f64,
    pub portions: Vec<Portion>,
    pub series: IndexSeries,
    pub overview: HistoryOverview,
    pub max_drawdown: MaxDrawDown,
}

/// Aligned history and summary statistics of a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAnalysis {
    pub series: AssetSeries,
    pub overview: HistoryOverview,
    pub max_drawdown: MaxDrawDown,
}

/// Output of index synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedIndex {
    pub series: IndexSeries,
    pub overview: HistoryOverview,
}
