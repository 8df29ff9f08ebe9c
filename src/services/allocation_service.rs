use std::collections::HashMap;

use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::models::{Portion, RankedAsset, SortBy, WeightBy};
use crate::services::portion_corrector::{correct, PORTION_TOTAL};

/// Order candidates for selection. Ties fall back to market rank.
pub fn sort_assets(assets: &[RankedAsset], sort_by: SortBy) -> Vec<RankedAsset> {
    let mut sorted = assets.to_vec();
    match sort_by {
        SortBy::Rank => sorted.sort_by_key(|a| a.rank),
        SortBy::Profit => sorted.sort_by(|a, b| {
            b.profit.total_cmp(&a.profit).then(a.rank.cmp(&b.rank))
        }),
        SortBy::Drawdown => sorted.sort_by(|a, b| {
            a.drawdown.total_cmp(&b.drawdown).then(a.rank.cmp(&b.rank))
        }),
    }
    sorted
}

/// Compute portions for the first `count` of `assets` and correct them to a
/// total of 100.
pub fn allocate(
    assets: &[RankedAsset],
    count: usize,
    weight_by: WeightBy,
) -> Result<Vec<Portion>, EngineError> {
    let raw = match weight_by {
        WeightBy::Rank => by_rank(assets, count),
        WeightBy::Profit => by_rank_and_profit(assets, count),
        WeightBy::Drawdown => by_inverse_drawdown(assets, count),
        WeightBy::Equal => equal(assets, count),
        WeightBy::Optimal => blended(assets, count)?,
    };
    debug!("Allocated {} portions by {}", raw.len(), weight_by);
    correct(&raw)
}

/// Weight `1 / rank`.
pub fn by_rank(assets: &[RankedAsset], count: usize) -> Vec<Portion> {
    let weighted: Vec<(&RankedAsset, f64)> = assets
        .iter()
        .take(count)
        .map(|a| (a, 1.0 / rank_of(a)))
        .collect();
    proportional(&weighted, PORTION_TOTAL)
}

/// Weight `(1 / rank) * (profit / 100)` over the first `count` assets that
/// made a profit.
pub fn by_rank_and_profit(assets: &[RankedAsset], count: usize) -> Vec<Portion> {
    let weighted: Vec<(&RankedAsset, f64)> = assets
        .iter()
        .filter(|a| a.profit.is_finite() && a.profit > 0.0)
        .take(count)
        .map(|a| (a, (1.0 / rank_of(a)) * (a.profit / 100.0)))
        .collect();
    if weighted.is_empty() {
        warn!("No profitable assets among {} candidates", assets.len());
    }
    proportional(&weighted, PORTION_TOTAL)
}

/// Weight `1 / drawdown`. Assets that never drew down get a single point;
/// if none did, everyone gets an equal share.
pub fn by_inverse_drawdown(assets: &[RankedAsset], count: usize) -> Vec<Portion> {
    let selected: Vec<&RankedAsset> = assets.iter().take(count).collect();
    let (drawn, flat): (Vec<&RankedAsset>, Vec<&RankedAsset>) =
        selected.iter().copied().partition(|a| a.drawdown > 0.0);

    if drawn.is_empty() {
        return equal(assets, count);
    }

    let weighted: Vec<(&RankedAsset, f64)> = drawn.iter().map(|a| (*a, 1.0 / a.drawdown)).collect();
    let remaining = PORTION_TOTAL.saturating_sub(flat.len() as u32);
    let shares = proportional(&weighted, remaining);

    // Keep the caller's ordering.
    selected
        .iter()
        .map(|a| {
            let portion = shares
                .iter()
                .find(|p| p.asset_id == a.id)
                .map(|p| p.portion)
                .unwrap_or(1);
            Portion::new(a.id.clone(), portion)
        })
        .collect()
}

/// `floor(100 / n)` each, at least 1.
pub fn equal(assets: &[RankedAsset], count: usize) -> Vec<Portion> {
    let selected: Vec<&RankedAsset> = assets.iter().take(count).collect();
    if selected.is_empty() {
        return Vec::new();
    }
    let share = (PORTION_TOTAL / selected.len() as u32).max(1);
    selected
        .into_iter()
        .map(|a| Portion::new(a.id.clone(), share))
        .collect()
}

/// Average of the rank-and-profit and inverse-drawdown allocations.
///
/// An asset missing from one side counts as 0 there. Halves round away from
/// zero and the result still needs [`correct`].
pub fn blended(assets: &[RankedAsset], count: usize) -> Result<Vec<Portion>, EngineError> {
    let profit_side = corrected_or_empty(by_rank_and_profit(assets, count))?;
    let drawdown_side = corrected_or_empty(by_inverse_drawdown(assets, count))?;

    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, u32> = HashMap::new();
    for p in profit_side.iter().chain(drawdown_side.iter()) {
        let entry = totals.entry(p.asset_id.as_str()).or_insert_with(|| {
            order.push(p.asset_id.as_str());
            0
        });
        *entry += p.portion;
    }

    Ok(order
        .into_iter()
        .map(|id| {
            let averaged = (totals[id] as f64 / 2.0).round() as u32;
            Portion::new(id, averaged)
        })
        .collect())
}

fn corrected_or_empty(portions: Vec<Portion>) -> Result<Vec<Portion>, EngineError> {
    match correct(&portions) {
        Ok(corrected) => Ok(corrected),
        Err(EngineError::EmptyBasket) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Split `total` points by weight. Every asset but the best-ranked one is
/// rounded to the nearest point; the best-ranked one takes what is left.
fn proportional(weighted: &[(&RankedAsset, f64)], total: u32) -> Vec<Portion> {
    let weight_sum: f64 = weighted.iter().map(|(_, w)| w).sum();
    if weighted.is_empty() || !(weight_sum.is_finite() && weight_sum > 0.0) {
        return Vec::new();
    }

    let best = weighted
        .iter()
        .enumerate()
        .min_by_key(|(_, (a, _))| a.rank)
        .map(|(i, _)| i)
        .unwrap_or(0);

    let shares: Vec<f64> = weighted
        .iter()
        .map(|(_, w)| w / weight_sum * total as f64)
        .collect();
    let others_sum = |rounded: &[u32]| -> u32 {
        rounded
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != best)
            .map(|(_, v)| v)
            .sum()
    };

    let nearest: Vec<u32> = shares.iter().map(|s| s.round() as u32).collect();
    // Rounding up can leave nothing for the best-ranked asset; flooring the
    // others always leaves it at least one point.
    let rounded = if others_sum(&nearest) >= total {
        shares.iter().map(|s| s.floor() as u32).collect()
    } else {
        nearest
    };
    let others = others_sum(&rounded);

    weighted
        .iter()
        .zip(rounded)
        .enumerate()
        .map(|(i, ((asset, _), portion))| {
            let portion = if i == best { total.saturating_sub(others) } else { portion };
            Portion::new(asset.id.clone(), portion)
        })
        .collect()
}

fn rank_of(asset: &RankedAsset) -> f64 {
    asset.rank.max(1) as f64
}
