use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

fn parse_timezone(timezone: &str) -> Result<Tz, CoreError> {
    Tz::from_str(timezone)
        .map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// Validate IANA timezone name
pub fn validate_timezone(timezone: &str) -> Result<(), CoreError> {
    parse_timezone(timezone).map(|_| ())
}

/// Calendar date at `at_time` in the given timezone.
///
/// Due dates carry no time, so "overdue" and "today" are decided against the
/// user's local date rather than the UTC one.
pub fn local_date(timezone: &str, at_time: DateTime<Utc>) -> Result<NaiveDate, CoreError> {
    let tz = parse_timezone(timezone)?;
    Ok(at_time.with_timezone(&tz).date_naive())
}

/// Format datetime with timezone-aware display
pub fn format_with_timezone(
    datetime: DateTime<Utc>,
    timezone: &str,
    format: &str,
) -> Result<String, CoreError> {
    let tz = parse_timezone(timezone)?;
    let local_dt = datetime.with_timezone(&tz);
    Ok(local_dt.format(format).to_string())
}
