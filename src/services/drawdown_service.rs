use crate::models::{MaxDrawDown, PricePoint};

/// Largest decline from any earlier high to any later low, in percent.
///
/// Scans once while tracking the running peak. Equal declines keep the
/// first one found. Fewer than two points yield the zero value.
pub fn max_drawdown(series: &[PricePoint]) -> MaxDrawDown {
    let Some(first) = series.first() else {
        return MaxDrawDown::default();
    };
    if series.len() < 2 {
        return MaxDrawDown::default();
    }

    let mut peak = first.price();
    let mut peak_date = &first.date;
    let mut worst = MaxDrawDown::default();

    for point in series {
        let price = point.price();
        if peak > 0.0 {
            let drawdown = (peak - price) / peak * 100.0;
            if drawdown > worst.value {
                worst = MaxDrawDown {
                    value: drawdown,
                    start_time: peak_date.clone(),
                    end_time: point.date.clone(),
                };
            }
        }
        if price > peak {
            peak = price;
            peak_date = &point.date;
        }
    }

    worst
}
