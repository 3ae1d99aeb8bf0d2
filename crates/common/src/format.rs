//! Wire formatting helpers.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Date format used by every poll payload (`DD.MM.YYYY HH:MM:SS`).
pub const DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Format a timestamp in the wire date format.
#[must_use]
pub fn format_date<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    date.format(DATE_FORMAT).to_string()
}

/// Parse a timestamp from the wire date format, read as UTC.
///
/// RFC 3339 input is accepted as well so clients may send explicit offsets.
pub fn parse_date(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();
    match NaiveDateTime::parse_from_str(value, DATE_FORMAT) {
        Ok(naive) => Ok(naive.and_utc()),
        Err(_) => DateTime::parse_from_rfc3339(value).map(|d| d.with_timezone(&Utc)),
    }
}

/// Serde adapter for wire-format dates, for `#[serde(deserialize_with)]`.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

/// Like [`deserialize_date`], for optional fields.
pub fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse_date(&raw).map_err(serde::de::Error::custom))
        .transpose()
}
