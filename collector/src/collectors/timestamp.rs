use crate::error::TimestampParseError;
use chrono::DateTime;

/// RFC 3339 timestamp as whole Unix epoch seconds.
pub fn parse_timestamp(value: &str) -> Result<f64, TimestampParseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.timestamp() as f64)
        .map_err(|source| TimestampParseError {
            value: value.to_string(),
            source,
        })
}
