// src/utils/format.rs

//! Human-readable formatting for prices and times.

use chrono::NaiveDateTime;

/// `12345` -> `$123.45`
pub fn format_cents(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Price of an optional fare, `sold out` when nothing is bookable.
pub fn format_fare(cents: Option<u32>) -> String {
    cents.map(format_cents).unwrap_or_else(|| "sold out".to_string())
}

pub fn format_datetime(time: &NaiveDateTime) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

/// Clock time like `3:04 PM`.
pub fn format_clock(time: &NaiveDateTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Calendar date like `Fri Mar 15 2024`.
pub fn format_day(time: &NaiveDateTime) -> String {
    time.format("%a %b %-d %Y").to_string()
}
