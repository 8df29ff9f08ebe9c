use futures::future::join_all;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::EngineError;
use crate::external::market_data::MarketDataProvider;
use crate::models::{
    AssetAnalysis, AssetSeries, Basket, IndexOverview, IndexRequest, RankedAsset,
};
use crate::services::allocation_service::{allocate, sort_assets};
use crate::services::calendar::{day_start, days_between, DAY_MS};
use crate::services::drawdown_service::max_drawdown;
use crate::services::history_service::{align, latest_before};
use crate::services::index_service::synthesize;
use crate::services::portion_corrector::assert_portions;
use crate::services::profit_service::history_overview;

/// How far before the window to look for an observation to carry forward.
const CARRY_LOOKBACK_DAYS: i64 = 30;

/// Fetch one asset's history, align it to `[start_time, end_time)` and
/// summarize it.
///
/// The latest observation before the window (within the lookback) seeds the
/// gap fill when the asset has no price on the first day. An asset with no
/// anchor comes back with an empty series and zero statistics.
pub async fn analyze_asset(
    provider: &dyn MarketDataProvider,
    asset_id: &str,
    start_time: i64,
    end_time: i64,
) -> Result<AssetAnalysis, EngineError> {
    let start = day_start(start_time);
    let raw = provider
        .fetch_history(asset_id, start - CARRY_LOOKBACK_DAYS * DAY_MS, end_time)
        .await?;
    let history = AssetSeries::new(asset_id, raw);

    let carry_from = latest_before(&history.points, start).cloned();
    let series = align(&history, start, end_time, carry_from.as_ref());

    let overview = history_overview(&series.points);
    let max_drawdown = max_drawdown(&series.points);

    Ok(AssetAnalysis {
        series,
        overview,
        max_drawdown,
    })
}

/// Pick, weight and synthesize a new index from the provider's top assets.
///
/// Candidates whose history fails to load or can't be anchored are skipped.
/// The rest are ranked by window profit and drawdown, sorted, allocated and
/// synthesized.
///
/// # Arguments
/// * `provider` – source of candidate assets and their raw histories
/// * `config` – candidate limit plus defaults for anything the request omits
///   (count, sort/weight strategy, starting balance, window length)
/// * `request` – index id, name and window; `start_time` defaults to
///   `history_days` before `end_time`
///
/// # Returns
/// An [`IndexOverview`] whose portions sum to 100, or an error when the
/// window is empty or no candidate can be weighted.
pub async fn generate_index(
    provider: &dyn MarketDataProvider,
    config: &EngineConfig,
    request: &IndexRequest,
) -> Result<IndexOverview, EngineError> {
    let count = request.count.unwrap_or(config.default_count);
    let sort_by = request.sort_by.unwrap_or(config.sort_by);
    let weight_by = request.weight_by.unwrap_or(config.weight_by);
    let start_time = request
        .start_time
        .unwrap_or_else(|| day_start(request.end_time) - config.history_days * DAY_MS);
    let end_time = request.end_time;
    validate_window(start_time, end_time)?;
    if count == 0 {
        return Err(EngineError::Validation("Index must hold at least one asset".to_string()));
    }

    info!(
        "📈 Generating index {} ({} assets, sort by {}, weight by {})",
        request.name, count, sort_by, weight_by
    );

    let candidates = provider.fetch_assets(config.candidate_limit).await?;
    let results = join_all(candidates.iter().map(|meta| async move {
        let analysis = analyze_asset(provider, &meta.id, start_time, end_time).await;
        (meta, analysis)
    }))
    .await;

    let mut ranked = Vec::new();
    let mut aligned = Vec::new();
    for (meta, result) in results {
        match result {
            Ok(analysis) if analysis.series.is_empty() => {
                warn!("Skipping {}: no price history to anchor the window", meta.id);
            }
            Ok(analysis) => {
                ranked.push(RankedAsset::from_meta(
                    meta,
                    analysis.overview.total,
                    analysis.max_drawdown.value,
                ));
                aligned.push(analysis.series);
            }
            Err(e) => warn!("Skipping {}: {}", meta.id, e),
        }
    }

    info!("{} of {} candidates have usable history", ranked.len(), candidates.len());

    let sorted = sort_assets(&ranked, sort_by);
    let portions = allocate(&sorted, count, weight_by)?;

    let basket = Basket::new(request.name.clone(), portions)
        .with_starting_balance(request.starting_balance.unwrap_or(config.starting_balance));

    build_overview(request.index_id, &basket, &aligned, start_time, end_time)
}

/// Rebuild the overview of a stored basket over a new window.
///
/// Unlike [`generate_index`] every constituent is required: a failed fetch
/// or an unanchored history fails the whole recompute.
///
/// # Arguments
/// * `provider` – source of the constituents' raw histories
/// * `index_id` – identifier the persistence layer stores the result under
/// * `basket` – previously stored portions and starting balance
/// * `start_time` / `end_time` – window `[start_time, end_time)` in UTC ms
///
/// # Returns
/// The rebuilt [`IndexOverview`], carrying the basket's portions unchanged.
pub async fn recompute_index(
    provider: &dyn MarketDataProvider,
    index_id: Uuid,
    basket: &Basket,
    start_time: i64,
    end_time: i64,
) -> Result<IndexOverview, EngineError> {
    validate_window(start_time, end_time)?;
    assert_portions(&basket.portions)?;

    info!("🔄 Recomputing index {} ({})", basket.name, index_id);

    let analyses = join_all(
        basket
            .portions
            .iter()
            .map(|p| analyze_asset(provider, &p.asset_id, start_time, end_time)),
    )
    .await;

    let constituents = analyses
        .into_iter()
        .map(|result| result.map(|analysis| analysis.series))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(empty) = constituents.iter().find(|s| s.is_empty()) {
        return Err(EngineError::MisalignedSeries {
            asset_id: empty.asset_id.clone(),
            reason: "no price history to anchor the window".to_string(),
        });
    }

    build_overview(index_id, basket, &constituents, start_time, end_time)
}

fn build_overview(
    index_id: Uuid,
    basket: &Basket,
    constituents: &[AssetSeries],
    start_time: i64,
    end_time: i64,
) -> Result<IndexOverview, EngineError> {
    let synthesized = synthesize(basket, constituents)?;
    let max_drawdown = max_drawdown(&synthesized.series);

    info!(
        "✅ Index {} total return {:.2}%, max drawdown {:.2}%",
        basket.name, synthesized.overview.total, max_drawdown.value
    );

    Ok(IndexOverview {
        index_id,
        name: basket.name.clone(),
        start_time: day_start(start_time),
        end_time,
        starting_balance: basket.starting_balance,
        portions: basket.portions.clone(),
        series: synthesized.series,
        overview: synthesized.overview,
        max_drawdown,
    })
}

fn validate_window(start_time: i64, end_time: i64) -> Result<(), EngineError> {
    if days_between(day_start(start_time), end_time) == 0 {
        return Err(EngineError::Validation(format!(
            "Window end {} must be after start {}",
            end_time, start_time
        )));
    }
    Ok(())
}
