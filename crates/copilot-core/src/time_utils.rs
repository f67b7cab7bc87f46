use chrono::{Datelike, NaiveDate};

/// Full English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Convert `"June 2024"` into the `"2024-06"` period key.
///
/// Accepts a full month name (any case), a single space and a four-digit
/// year, nothing else. Returns `None` for anything that does not parse.
///
/// # Examples
///
/// ```
/// use copilot_core::time_utils::parse_month_year;
///
/// assert_eq!(parse_month_year("June 2024").as_deref(), Some("2024-06"));
/// assert_eq!(parse_month_year("june 2024").as_deref(), Some("2024-06"));
/// assert_eq!(parse_month_year("Jun 2024"), None);
/// assert_eq!(parse_month_year("Juno 2024"), None);
/// ```
pub fn parse_month_year(text: &str) -> Option<String> {
    let (name, year) = text.split_once(' ')?;

    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // chrono's %B also accepts abbreviations; only full names are valid here.
    if !MONTH_NAMES.iter().any(|m| m.eq_ignore_ascii_case(name)) {
        return None;
    }

    let date = NaiveDate::parse_from_str(&format!("01 {} {}", name, year), "%d %B %Y").ok()?;
    Some(month_key(date))
}

/// `YYYY-MM` key for the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ── Tests ──────────────────────────────────────────────────────────────────────
