use chrono::{DateTime, FixedOffset, Local, NaiveDate, SecondsFormat, TimeZone};

use crate::error::{Result, UpError};

/// Parse a user-supplied date or date-time.
///
/// A bare `YYYY-MM-DD` becomes local midnight of that day. A full RFC 3339
/// timestamp keeps its own offset.
pub fn parse_date_time(input: &str) -> Result<DateTime<FixedOffset>> {
    let input = input.trim();
    let invalid = || UpError::InvalidDateFormat {
        field: "date",
        input: input.to_string(),
    };

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        // A DST gap at midnight has no local instant, so try the later side.
        let local = Local
            .from_local_datetime(&midnight)
            .earliest()
            .or_else(|| Local.from_local_datetime(&(midnight + chrono::Duration::hours(1))).earliest())
            .ok_or_else(invalid)?;
        return Ok(local.fixed_offset());
    }

    DateTime::parse_from_rfc3339(input).map_err(|_| invalid())
}

/// Serialize an instant the way the transactions endpoint expects in
/// `filter[since]` / `filter[until]`.
pub fn to_query_value(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}
