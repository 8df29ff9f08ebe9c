mod price_point;
mod portion;
mod strategy;
mod index;

pub use price_point::{AssetSeries, IndexSeries, PricePoint};
pub use portion::{AssetMeta, Basket, Portion, RankedAsset};
pub use strategy::{SortBy, WeightBy};
pub use index::{
    AssetAnalysis, HistoryOverview, IndexOverview, IndexRequest, MaxDrawDown, SynthesizedIndex,
};
