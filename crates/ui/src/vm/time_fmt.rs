use chrono::{DateTime, Utc};

/// Minute precision, UTC.
#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[must_use]
pub fn format_percent(ratio: f64) -> String {
    format!("{:.0}%", ratio * 100.0)
}
