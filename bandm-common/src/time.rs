//! Timestamp utilities

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Parse a backend timestamp
///
/// Accepts RFC 3339 (`2025-03-01T19:00:00Z`, with any offset) and zone-less
/// ISO local date-times (`2025-03-01T19:00:00`, optional fractional seconds),
/// which are taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(Error::InvalidInput(format!("unrecognized timestamp: {raw}")))
}

/// Serde adapter for backend timestamps, see [`parse_timestamp`]
pub mod flexible {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        // After 2020-01-01, before 2100-01-01
        assert!(timestamp.timestamp() > 1_577_836_800);
        assert!(timestamp.timestamp() < 4_102_444_800);
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_timestamp("2025-03-01T19:00:00-03:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_local_datetime_as_utc() {
        let parsed = parse_timestamp("2025-03-01T19:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 19, 0, 0).unwrap());

        let with_fraction = parse_timestamp("2025-03-01T19:00:00.250").unwrap();
        assert_eq!(with_fraction.timestamp(), parsed.timestamp());
    }

    #[test]
    fn test_parse_minute_precision() {
        let parsed = parse_timestamp("2025-03-01T19:30").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 1, 19, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_timestamp("tomorrow"), Err(Error::InvalidInput(_))));
    }
}
