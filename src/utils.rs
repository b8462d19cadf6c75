use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Rounds to cents using round-half-to-even on the scaled value.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Coerces a raw amount such as `"$12.50"` or `"-$40"` into a number.
///
/// Every `$` is removed before parsing. Anything that still fails to parse
/// (or parses to NaN) yields `None` and is left out of every aggregate.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace('$', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parses a transaction date, accepting plain ISO dates and ISO timestamps.
/// Plain dates resolve to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Last day of a month under the fixed calendar rule: February always ends
/// on the 28th (leap years are not considered), April, June, September and
/// November on the 30th, every other month on the 31st.
pub fn fixed_month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let day = match month {
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Sunday closing the Monday-to-Sunday calendar week that contains `date`.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let offset = (7 - date.weekday().num_days_from_sunday()) % 7;
    date.checked_add_days(Days::new(u64::from(offset)))
        .unwrap_or(date)
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

pub fn day_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
