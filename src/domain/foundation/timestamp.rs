//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Creates a timestamp from Unix seconds, as the gateway reports times.
    ///
    /// Returns `None` for values chrono cannot represent.
    pub fn from_unix_secs(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Returns the timestamp as Unix seconds.
    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Adds whole days. `None` when the result is not representable.
    pub fn plus_days(&self, days: i64) -> Option<Self> {
        Duration::try_days(days)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
    }

    /// Adds whole hours. `None` when the result is not representable.
    pub fn plus_hours(&self, hours: i64) -> Option<Self> {
        Duration::try_hours(hours)
            .and_then(|delta| self.0.checked_add_signed(delta))
            .map(Self)
    }

    /// RFC 3339 rendering with second precision.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_from_unix_secs_roundtrips() {
        let ts = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        assert_eq!(ts.as_unix_secs(), 1_700_000_000);
    }

    #[test]
    fn plus_days_adds_whole_days() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let later = ts.plus_days(30).unwrap();
        assert_eq!(later.as_unix_secs() - ts.as_unix_secs(), 30 * 86_400);
    }

    #[test]
    fn plus_hours_adds_hours() {
        let ts = Timestamp::from_unix_secs(0).unwrap();
        assert_eq!(ts.plus_hours(1).unwrap().as_unix_secs(), 3_600);
    }

    #[test]
    fn arithmetic_overflow_is_none() {
        let ts = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        assert!(ts.plus_days(200_000_000).is_none());
        assert!(ts.plus_days(i64::MAX).is_none());
        assert!(ts.plus_hours(i64::MAX).is_none());
    }

    #[test]
    fn rfc3339_rendering_uses_zulu_suffix() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap());
        assert_eq!(ts.to_rfc3339(), "2024-03-05T10:30:00Z");
    }

    #[test]
    fn timestamp_ordering_works() {
        let earlier = Timestamp::from_unix_secs(100).unwrap();
        let later = Timestamp::from_unix_secs(200).unwrap();
        assert!(earlier.is_before(&later));
        assert!(earlier < later);
    }

    #[test]
    fn timestamp_serializes_to_json() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15T10:30:00"));
    }
}
