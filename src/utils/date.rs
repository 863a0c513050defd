use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Renders a timestamp as UTC ISO-8601 with millisecond precision,
/// e.g. `2024-03-09T14:05:07.042Z`.
pub(crate) fn iso8601_millis(at: OffsetDateTime) -> Result<String, time::error::Format> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    at.to_offset(UtcOffset::UTC).format(format)
}

pub(crate) fn now_iso8601() -> Result<String, time::error::Format> {
    iso8601_millis(OffsetDateTime::now_utc())
}
