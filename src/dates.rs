/// Pure date parsing and formatting helpers (Discord-agnostic)
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::constants::SENTINEL_YEAR;

/// Error returned when a submitted birthday string cannot be parsed
#[derive(Debug)]
pub struct BirthdayParseError {
    input: String,
}

impl std::fmt::Display for BirthdayParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}` is not a valid date. Use the abbreviated month and day, e.g. `Jun 06`.",
            self.input
        )
    }
}

impl std::error::Error for BirthdayParseError {}

/// Parse a free-text birthday ("Jun 06") into a UTC instant at midnight of
/// that month/day in the sentinel year. The year carries no meaning beyond
/// making the value storable as epoch seconds.
pub fn parse_birthday(input: &str) -> Result<DateTime<Utc>, BirthdayParseError> {
    let trimmed = input.trim();
    let date = NaiveDate::parse_from_str(&format!("{} {}", SENTINEL_YEAR, trimmed), "%Y %b %d")
        .map_err(|_| BirthdayParseError {
            input: trimmed.to_string(),
        })?;

    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Format a date as "MonthName DayOrdinal" (e.g., "June 6th")
pub fn format_date_display(month: u32, day: u32) -> String {
    format!("{} {}{}", month_name(month), day, ordinal_suffix(day))
}

/// Get month name from month number (1-12)
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// English ordinal suffix for a day number
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}
