//! Formatting of numbers and dates for the card.

use chrono::{DateTime, Utc};

const UNITS: [(u64, &str); 2] = [(1_000_000, "m"), (1_000, "k")];

/// Format a statistic to fit in about five characters.
///
/// `999` -> `999`, `1590` -> `1.59k`, `2100` -> `2.1k`, `12_345_678` -> `12.3m`.
pub fn format_stat(number: u64) -> String {
    if number < 1_000 {
        return number.to_string();
    }
    for (value, suffix) in UNITS {
        if number >= value {
            let n = number as f64 / value as f64;
            let digits = if n < 10.0 {
                trim_zeros(format!("{n:.2}"))
            } else if n < 100.0 {
                trim_zeros(format!("{n:.1}"))
            } else {
                format!("{}", n.round() as u64)
            };
            return digits + suffix;
        }
    }
    number.to_string()
}

/// Drop trailing fractional zeros, and the dot if nothing is left after it.
fn trim_zeros(mut s: String) -> String {
    if s.contains('.') {
        let kept = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(kept);
    }
    s
}

/// `July 25, 2019`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}
