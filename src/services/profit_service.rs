use crate::models::{HistoryOverview, PricePoint};
use crate::services::calendar::DAY_MS;

/// Percentage change between the first and last point with
/// `start_time <= time <= end_time`.
///
/// Returns 0 when fewer than two points fall inside the window.
pub fn profit_over_window(series: &[PricePoint], start_time: i64, end_time: i64) -> f64 {
    let mut window = series
        .iter()
        .filter(|p| p.time >= start_time && p.time <= end_time);

    let Some(first) = window.next() else {
        return 0.0;
    };
    let Some(last) = window.last() else {
        return 0.0;
    };

    let start_price = first.price();
    if start_price <= 0.0 {
        return 0.0;
    }
    (last.price() - start_price) / start_price * 100.0
}

/// 1/7/30-day and whole-series returns, each ending at the last point.
pub fn history_overview(series: &[PricePoint]) -> HistoryOverview {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return HistoryOverview::default();
    };
    let end = last.time;
    let trailing = |days: i64| profit_over_window(series, end - days * DAY_MS, end);

    HistoryOverview {
        days1: trailing(1),
        days7: trailing(7),
        days30: trailing(30),
        total: profit_over_window(series, first.time, end),
    }
}
