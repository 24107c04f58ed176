use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_english::{parse_date_string, Dialect};
use chrono_tz::Tz;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum DueDateError {
    #[error("Failed to parse due date '{0}'. Use YYYY-MM-DD or a phrase like 'tomorrow'")]
    Unrecognized(String),
    #[error("Unknown timezone '{0}'")]
    Timezone(String),
}

/// Parses a due date typed by the user, relative to the current date in
/// `timezone`.
pub fn parse_due_date(date_str: &str, timezone: &str) -> Result<NaiveDate, DueDateError> {
    let tz = Tz::from_str(timezone).map_err(|_| DueDateError::Timezone(timezone.to_string()))?;
    parse_due_date_at(date_str, Utc::now().with_timezone(&tz))
}

pub fn parse_due_date_at<Z>(date_str: &str, now: DateTime<Z>) -> Result<NaiveDate, DueDateError>
where
    Z: TimeZone,
    Z::Offset: Copy,
{
    let input = date_str.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    parse_date_string(input, now, Dialect::Uk)
        .map(|parsed| parsed.date_naive())
        .map_err(|_| DueDateError::Unrecognized(date_str.to_string()))
}
