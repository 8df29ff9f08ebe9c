use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{AssetSeries, PricePoint};
use crate::services::calendar::{day_start, days_between, iso_date, DAY_MS};

/// Fill gaps in `series` so that every UTC day in `[start_time, end_time)` has
/// exactly one point.
///
/// Missing days copy the most recent earlier point (observed or already
/// filled) and record the date of the original observation in `cloned_from`.
/// When the first day has no observation, `carry_from` seeds the fill.
///
/// Returns an empty series when the first day can't be anchored.
pub fn align(
    series: &AssetSeries,
    start_time: i64,
    end_time: i64,
    carry_from: Option<&PricePoint>,
) -> AssetSeries {
    let start = day_start(start_time);

    // Later duplicates for the same day win.
    let observed: BTreeMap<i64, &PricePoint> = series
        .points
        .iter()
        .filter(|p| p.time >= start && p.time < end_time)
        .map(|p| (day_start(p.time), p))
        .collect();

    let seed = if observed.contains_key(&start) {
        None
    } else {
        match carry_from {
            Some(point) => Some(point.clone()),
            None => {
                debug!(
                    "No anchor for {} at {}; returning empty series",
                    series.asset_id,
                    iso_date(start)
                );
                return AssetSeries::empty(series.asset_id.clone());
            }
        }
    };

    let points: Vec<PricePoint> = (0..days_between(start, end_time))
        .map(|day| start + day * DAY_MS)
        .scan(seed, |prev, time| {
            let point = match observed.get(&time) {
                Some(point) => (*point).clone(),
                None => clone_forward(prev.as_ref()?, time),
            };
            *prev = Some(point.clone());
            Some(point)
        })
        .collect();

    let filled = points.iter().filter(|p| p.is_cloned()).count();
    if filled > 0 {
        debug!(
            "Filled {} of {} days for {}",
            filled,
            points.len(),
            series.asset_id
        );
    }

    AssetSeries::new(series.asset_id.clone(), points)
}

/// Most recent observation strictly before `time`, used to seed [`align`]
/// when a history starts after the window does.
pub fn latest_before(points: &[PricePoint], time: i64) -> Option<&PricePoint> {
    points.iter().filter(|p| p.time < time).max_by_key(|p| p.time)
}

fn clone_forward(source: &PricePoint, time: i64) -> PricePoint {
    PricePoint {
        time,
        date: iso_date(time),
        price_usd: source.price_usd.clone(),
        cloned_from: Some(
            source
                .cloned_from
                .clone()
                .unwrap_or_else(|| source.date.clone()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use rand::Rng;
    use std::str::FromStr;

    const JAN_1: i64 = 1_704_067_200_000;

    fn point(day: i64, price: &str) -> PricePoint {
        let time = JAN_1 + day * DAY_MS;
        PricePoint::new(time, iso_date(time), BigDecimal::from_str(price).unwrap())
    }

    fn series(points: Vec<PricePoint>) -> AssetSeries {
        AssetSeries::new("bitcoin", points)
    }

    #[test]
    fn test_align_fills_gaps_from_previous_day() {
        let input = series(vec![point(0, "100"), point(3, "130")]);

        let aligned = align(&input, JAN_1, JAN_1 + 4 * DAY_MS, None);

        assert_eq!(aligned.len(), 4);
        assert_eq!(aligned.points[1].price(), 100.0);
        assert_eq!(aligned.points[2].price(), 100.0);
        assert_eq!(aligned.points[3].price(), 130.0);

        let day1 = iso_date(JAN_1);
        assert_eq!(aligned.points[1].cloned_from.as_deref(), Some(day1.as_str()));
        assert_eq!(aligned.points[2].cloned_from.as_deref(), Some(day1.as_str()));
        assert_eq!(aligned.points[2].time, JAN_1 + 2 * DAY_MS);
        assert_eq!(aligned.points[2].date, iso_date(JAN_1 + 2 * DAY_MS));
        assert!(!aligned.points[0].is_cloned());
        assert!(!aligned.points[3].is_cloned());
    }

    #[test]
    fn test_align_without_anchor_returns_empty() {
        let input = series(vec![point(2, "100")]);

        let aligned = align(&input, JAN_1, JAN_1 + 4 * DAY_MS, None);

        assert!(aligned.is_empty());
        assert_eq!(aligned.asset_id, "bitcoin");
    }

    #[test]
    fn test_align_seeds_from_carry_point() {
        let carry = point(-3, "90");
        let input = series(vec![point(2, "100")]);

        let aligned = align(&input, JAN_1, JAN_1 + 4 * DAY_MS, Some(&carry));

        let prices: Vec<f64> = aligned.points.iter().map(|p| p.price()).collect();
        assert_eq!(prices, vec![90.0, 90.0, 100.0, 100.0]);
        assert_eq!(aligned.points[0].time, JAN_1);
        assert_eq!(aligned.points[0].cloned_from, Some(carry.date.clone()));
        assert_eq!(aligned.points[3].cloned_from, Some(iso_date(JAN_1 + 2 * DAY_MS)));
    }

    #[test]
    fn test_align_ignores_points_outside_window() {
        let input = series(vec![point(-1, "50"), point(0, "100"), point(5, "500")]);

        let aligned = align(&input, JAN_1, JAN_1 + 3 * DAY_MS, None);

        assert_eq!(aligned.len(), 3);
        assert!(aligned.points.iter().all(|p| p.price() == 100.0));
    }

    #[test]
    fn test_latest_before_picks_closest_prior_point() {
        let points = vec![point(-5, "10"), point(-2, "20"), point(0, "30")];

        let seed = latest_before(&points, JAN_1).unwrap();

        assert_eq!(seed.price(), 20.0);
        assert!(latest_before(&points, JAN_1 - 10 * DAY_MS).is_none());
    }

    #[test]
    fn test_align_produces_one_point_per_day_for_random_gaps() {
        let mut rng = rand::rng();

        for _ in 0..50 {
            let days: i64 = rng.random_range(1..60);
            let mut points = vec![point(0, "1")];
            for day in 1..days {
                if rng.random_bool(0.6) {
                    let price = rng.random_range(1..1_000).to_string();
                    points.push(point(day, &price));
                }
            }
            let input = series(points);

            let aligned = align(&input, JAN_1, JAN_1 + days * DAY_MS, None);

            assert_eq!(aligned.len() as i64, days);
            for (i, pair) in aligned.points.windows(2).enumerate() {
                assert_eq!(pair[1].time - pair[0].time, DAY_MS, "gap after day {}", i);
                if pair[1].is_cloned() {
                    assert_eq!(pair[1].price_usd, pair[0].price_usd);
                }
            }
        }
    }
}
