use chrono::{DateTime, SecondsFormat, Utc};

/// Milliseconds in one UTC day.
pub const DAY_MS: i64 = 86_400_000;

/// Start (00:00 UTC) of the day containing `time`.
pub fn day_start(time: i64) -> i64 {
    time.div_euclid(DAY_MS) * DAY_MS
}

pub fn is_day_aligned(time: i64) -> bool {
    time.rem_euclid(DAY_MS) == 0
}

/// ISO-8601 form of a millisecond timestamp, e.g. `2024-01-01T00:00:00.000Z`.
pub fn iso_date(time: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(time)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Number of whole days in `[start, end)`.
pub fn days_between(start: i64, end: i64) -> i64 {
    if end <= start {
        0
    } else {
        (end - start + DAY_MS - 1) / DAY_MS
    }
}
