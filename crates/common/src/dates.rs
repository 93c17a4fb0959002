//! Calendar dates on the wire.
//!
//! Series files and feed payloads carry dates as `DD-MM-YYYY`; reports
//! carry ISO `YYYY-MM-DD`. Dates never have a time-of-day or timezone.

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Day-first format used by the series files and feed payloads.
pub const WIRE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse a `DD-MM-YYYY` date.
pub fn parse_wire_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), WIRE_DATE_FORMAT)
        .map_err(|_| Error::InvalidDate(value.to_string()))
}

/// Format a date as `DD-MM-YYYY`.
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(WIRE_DATE_FORMAT).to_string()
}

/// Serde adapter for `NaiveDate` fields in `DD-MM-YYYY` form.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(with = "common::dates::wire")]
///     date: NaiveDate,
/// }
/// ```
pub mod wire {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_wire_date(*date))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_wire_date(&raw).map_err(de::Error::custom)
    }
}
