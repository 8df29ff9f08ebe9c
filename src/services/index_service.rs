use std::str::FromStr;

use bigdecimal::BigDecimal;
use tracing::debug;

use crate::errors::EngineError;
use crate::models::{AssetSeries, Basket, IndexSeries, PricePoint, SynthesizedIndex};
use crate::services::calendar::{is_day_aligned, DAY_MS};
use crate::services::portion_corrector::{assert_portions, PORTION_TOTAL};
use crate::services::profit_service::history_overview;

/// Build the buy-and-hold value series of `basket` from its constituents.
///
/// Each asset is bought at the first day with `portion / 100` of the
/// starting balance and then held, so
/// `value(t) = Σ portion_i / 100 * balance * price_i(t) / price_i(start)`.
/// Weights drift with relative performance; there is no rebalancing.
///
/// Constituents must already be calendar-aligned over the same window. That
/// and the portion total are checked before anything is computed.
///
/// # Arguments
/// * `basket` – portions (summing to 100) and the starting balance
/// * `constituents` – one aligned series per portion, matched by asset id
///
/// # Returns
/// The index series (one point per day, prices rounded to 8 places) and its
/// [`HistoryOverview`](crate::models::HistoryOverview).
pub fn synthesize(
    basket: &Basket,
    constituents: &[AssetSeries],
) -> Result<SynthesizedIndex, EngineError> {
    if !(basket.starting_balance.is_finite() && basket.starting_balance > 0.0) {
        return Err(EngineError::Validation(format!(
            "Starting balance must be positive, got {}",
            basket.starting_balance
        )));
    }
    assert_portions(&basket.portions)?;

    let holdings = basket
        .portions
        .iter()
        .map(|portion| {
            constituents
                .iter()
                .find(|s| s.asset_id == portion.asset_id)
                .map(|series| (portion.portion, series))
                .ok_or_else(|| EngineError::MissingConstituent(portion.asset_id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let calendar = check_calendar(&holdings)?;

    // Money allocated to each asset, expressed as units bought on day 0.
    let units: Vec<f64> = holdings
        .iter()
        .map(|(portion, series)| {
            let opening = series.points[0].price();
            if opening > 0.0 {
                Ok(*portion as f64 / PORTION_TOTAL as f64 * basket.starting_balance / opening)
            } else {
                Err(EngineError::Validation(format!(
                    "Opening price of {} must be positive",
                    series.asset_id
                )))
            }
        })
        .collect::<Result<_, _>>()?;

    let series: IndexSeries = calendar
        .iter()
        .enumerate()
        .map(|(day, point)| {
            let value: f64 = holdings
                .iter()
                .zip(&units)
                .map(|((_, series), units)| units * series.points[day].price())
                .sum();
            Ok(PricePoint::new(point.time, point.date.clone(), decimal_from_f64(value)?))
        })
        .collect::<Result<_, EngineError>>()?;

    debug!(
        "Synthesized {} with {} constituents over {} days",
        basket.name,
        holdings.len(),
        series.len()
    );

    let overview = history_overview(&series);
    Ok(SynthesizedIndex { series, overview })
}

/// Every constituent must cover the same consecutive UTC days. Returns the
/// shared calendar.
fn check_calendar<'a>(holdings: &[(u32, &'a AssetSeries)]) -> Result<&'a [PricePoint], EngineError> {
    let reference: &'a AssetSeries = holdings
        .first()
        .map(|(_, series)| *series)
        .ok_or(EngineError::EmptyBasket)?;
    let misaligned = |asset_id: &str, reason: String| EngineError::MisalignedSeries {
        asset_id: asset_id.to_string(),
        reason,
    };

    if reference.is_empty() {
        return Err(misaligned(&reference.asset_id, "series is empty".to_string()));
    }
    if let Some(point) = reference.points.iter().find(|p| !is_day_aligned(p.time)) {
        return Err(misaligned(
            &reference.asset_id,
            format!("{} is not at 00:00 UTC", point.date),
        ));
    }
    if let Some(pair) = reference.points.windows(2).find(|w| w[1].time - w[0].time != DAY_MS) {
        return Err(misaligned(
            &reference.asset_id,
            format!("gap between {} and {}", pair[0].date, pair[1].date),
        ));
    }

    for (_, series) in &holdings[1..] {
        if series.len() != reference.len() {
            return Err(misaligned(
                &series.asset_id,
                format!("{} points, expected {}", series.len(), reference.len()),
            ));
        }
        if let Some((point, expected)) = series
            .points
            .iter()
            .zip(&reference.points)
            .find(|(p, r)| p.time != r.time)
        {
            return Err(misaligned(
                &series.asset_id,
                format!("{} where {} was expected", point.date, expected.date),
            ));
        }
    }

    Ok(&reference.points)
}

fn decimal_from_f64(value: f64) -> Result<BigDecimal, EngineError> {
    if !value.is_finite() {
        return Err(EngineError::Validation(format!("Index value {} is not finite", value)));
    }
    BigDecimal::from_str(&format!("{:.8}", value))
        .map_err(|e| EngineError::Validation(format!("Index value {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Portion;
    use crate::services::calendar::iso_date;

    const JAN_1: i64 = 1_704_067_200_000;

    fn create_series(asset_id: &str, start_day: i64, prices: &[f64]) -> AssetSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let time = JAN_1 + (start_day + i as i64) * DAY_MS;
                PricePoint::new(time, iso_date(time), BigDecimal::from_str(&price.to_string()).unwrap())
            })
            .collect();
        AssetSeries::new(asset_id, points)
    }

    fn basket(portions: &[(&str, u32)]) -> Basket {
        Basket::new(
            "test index",
            portions.iter().map(|(id, p)| Portion::new(*id, *p)).collect(),
        )
    }

    #[test]
    fn test_synthesize_buy_and_hold() {
        let constituents = vec![
            create_series("btc", 0, &[100.0, 200.0, 150.0]),
            create_series("eth", 0, &[10.0, 10.0, 5.0]),
        ];
        let basket = basket(&[("btc", 60), ("eth", 40)]).with_starting_balance(1000.0);

        let index = synthesize(&basket, &constituents).unwrap();

        let values: Vec<f64> = index.series.iter().map(|p| p.price()).collect();
        // 600 * 2 + 400 * 1, then 600 * 1.5 + 400 * 0.5
        assert_eq!(values, vec![1000.0, 1600.0, 1100.0]);
        assert_eq!(index.series[1].time, JAN_1 + DAY_MS);
        assert_eq!(index.series[1].date, iso_date(JAN_1 + DAY_MS));
        assert!((index.overview.total - 10.0).abs() < 1e-9);
        assert!((index.overview.days1 - (1100.0 - 1600.0) / 1600.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_synthesize_defaults_to_unit_balance() {
        let constituents = vec![create_series("btc", 0, &[50.0, 75.0])];

        let index = synthesize(&basket(&[("btc", 100)]), &constituents).unwrap();

        assert_eq!(index.series[0].price(), 1.0);
        assert_eq!(index.series[1].price(), 1.5);
    }

    #[test]
    fn test_synthesize_rejects_bad_portion_sum() {
        let constituents = vec![create_series("btc", 0, &[1.0, 2.0])];

        let result = synthesize(&basket(&[("btc", 99)]), &constituents);

        assert_eq!(result, Err(EngineError::PortionSum { sum: 99 }));
    }

    #[test]
    fn test_synthesize_rejects_missing_constituent() {
        let constituents = vec![create_series("btc", 0, &[1.0, 2.0])];

        let result = synthesize(&basket(&[("btc", 50), ("eth", 50)]), &constituents);

        assert_eq!(result, Err(EngineError::MissingConstituent("eth".to_string())));
    }

    #[test]
    fn test_synthesize_rejects_mismatched_calendars() {
        let shorter = vec![
            create_series("btc", 0, &[1.0, 2.0, 3.0]),
            create_series("eth", 0, &[1.0, 2.0]),
        ];
        let shifted = vec![
            create_series("btc", 0, &[1.0, 2.0, 3.0]),
            create_series("eth", 1, &[1.0, 2.0, 3.0]),
        ];
        let basket = basket(&[("btc", 50), ("eth", 50)]);

        assert!(matches!(
            synthesize(&basket, &shorter),
            Err(EngineError::MisalignedSeries { asset_id, .. }) if asset_id == "eth"
        ));
        assert!(matches!(
            synthesize(&basket, &shifted),
            Err(EngineError::MisalignedSeries { .. })
        ));
    }

    #[test]
    fn test_synthesize_rejects_gapped_calendar() {
        let mut gapped = create_series("btc", 0, &[1.0, 2.0, 3.0]);
        gapped.points.remove(1);

        let result = synthesize(&basket(&[("btc", 100)]), &[gapped]);

        assert!(matches!(result, Err(EngineError::MisalignedSeries { .. })));
    }

    #[test]
    fn test_synthesize_rejects_non_positive_balance() {
        let constituents = vec![create_series("btc", 0, &[1.0, 2.0])];
        let basket = basket(&[("btc", 100)]).with_starting_balance(0.0);

        assert!(matches!(synthesize(&basket, &constituents), Err(EngineError::Validation(_))));
    }
}
