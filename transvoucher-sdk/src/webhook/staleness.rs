//! Replay/staleness check for webhook timestamps.
//!
//! The check is advisory.  The parser never applies it on its own because
//! acceptable clock skew depends on the deployment.

use std::time::Duration;

use time::{Date, OffsetDateTime, PrimitiveDateTime};
use time::format_description::well_known::{Iso8601, Rfc3339};

/// Default tolerance between an event timestamp and the local clock.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(5 * 60);

/// A webhook timestamp as it appears on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum EventTimestamp {
    /// An ISO-8601 / RFC 3339 date-time or date string.  Values without an
    /// offset are read as UTC.
    Text(String),
    /// Seconds since the Unix epoch.
    Epoch(f64),
}

impl From<&str> for EventTimestamp {
    fn from(value: &str) -> Self {
        EventTimestamp::Text(value.to_owned())
    }
}

impl From<String> for EventTimestamp {
    fn from(value: String) -> Self {
        EventTimestamp::Text(value)
    }
}

impl From<i64> for EventTimestamp {
    fn from(value: i64) -> Self {
        EventTimestamp::Epoch(value as f64)
    }
}

impl From<f64> for EventTimestamp {
    fn from(value: f64) -> Self {
        EventTimestamp::Epoch(value)
    }
}

impl From<OffsetDateTime> for EventTimestamp {
    fn from(value: OffsetDateTime) -> Self {
        EventTimestamp::Epoch(value.unix_timestamp_nanos() as f64 / 1e9)
    }
}

impl EventTimestamp {
    /// Milliseconds since the Unix epoch, or `None` if unparseable.
    pub fn to_epoch_millis(&self) -> Option<f64> {
        match self {
            EventTimestamp::Text(text) => {
                let parsed = parse_text(text.trim())?;
                Some(parsed.unix_timestamp_nanos() as f64 / 1e6)
            }
            EventTimestamp::Epoch(secs) if secs.is_finite() => Some(secs * 1000.0),
            EventTimestamp::Epoch(_) => None,
        }
    }
}

fn parse_text(text: &str) -> Option<OffsetDateTime> {
    let date_only = time::macros::format_description!("[year]-[month]-[day]");
    OffsetDateTime::parse(text, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(text, &Iso8601::DEFAULT))
        .or_else(|_| PrimitiveDateTime::parse(text, &Iso8601::DEFAULT).map(|t| t.assume_utc()))
        .or_else(|_| Date::parse(text, &date_only).map(|d| d.midnight().assume_utc()))
        .ok()
}

/// Whether `timestamp` lies within `tolerance` of the current time, in either
/// direction.  Unparseable timestamps are never recent.
pub fn is_event_recent(timestamp: impl Into<EventTimestamp>, tolerance: Duration) -> bool {
    is_event_recent_at(timestamp, tolerance, OffsetDateTime::now_utc())
}

/// [`is_event_recent`] against an explicit `now`.
pub fn is_event_recent_at(
    timestamp: impl Into<EventTimestamp>,
    tolerance: Duration,
    now: OffsetDateTime,
) -> bool {
    let Some(event_millis) = timestamp.into().to_epoch_millis() else {
        return false;
    };
    let now_millis = now.unix_timestamp_nanos() as f64 / 1e6;
    let difference_secs = (now_millis - event_millis).abs() / 1000.0;
    difference_secs <= tolerance.as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn iso(t: OffsetDateTime) -> String {
        t.format(&Rfc3339).unwrap()
    }

    #[test]
    fn test_now_is_recent() {
        let now = OffsetDateTime::now_utc();
        assert!(is_event_recent(iso(now), DEFAULT_TOLERANCE));
        assert!(is_event_recent(now.unix_timestamp(), DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_old_and_future_timestamps() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let ten_minutes = time::Duration::minutes(10);

        assert!(!is_event_recent_at(iso(now - ten_minutes), DEFAULT_TOLERANCE, now));
        assert!(!is_event_recent_at(iso(now + ten_minutes), DEFAULT_TOLERANCE, now));
        assert!(is_event_recent_at(
            iso(now - ten_minutes),
            Duration::from_secs(600),
            now
        ));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let now = datetime!(2024-06-01 12:00:00 UTC);
        let edge = now - time::Duration::seconds(300);
        assert!(is_event_recent_at(edge.unix_timestamp(), DEFAULT_TOLERANCE, now));
        assert!(!is_event_recent_at(
            edge.unix_timestamp() - 1,
            DEFAULT_TOLERANCE,
            now
        ));
    }

    #[test]
    fn test_text_formats() {
        let now = datetime!(2024-01-01 00:00:00 UTC);
        assert!(is_event_recent_at("2024-01-01T00:00:00Z", DEFAULT_TOLERANCE, now));
        assert!(is_event_recent_at("2024-01-01T00:00:00.000Z", DEFAULT_TOLERANCE, now));
        assert!(is_event_recent_at("2024-01-01T02:00:00+02:00", DEFAULT_TOLERANCE, now));
    }

    #[test]
    fn test_offsetless_text_is_utc() {
        let now = datetime!(2024-01-01 00:00:00 UTC);
        assert!(is_event_recent_at("2024-01-01T00:00:00", DEFAULT_TOLERANCE, now));
        assert!(is_event_recent_at("2024-01-01T00:04:00.500", DEFAULT_TOLERANCE, now));
        assert!(is_event_recent_at("2024-01-01", DEFAULT_TOLERANCE, now));
        assert!(!is_event_recent_at("2024-01-01T00:10:00", DEFAULT_TOLERANCE, now));
        assert!(!is_event_recent_at("2023-12-31", DEFAULT_TOLERANCE, now));
        assert!(!is_event_recent_at("2024-13-01", DEFAULT_TOLERANCE, now));
    }

    #[test]
    fn test_unparseable_is_not_recent() {
        assert!(!is_event_recent("not a date", DEFAULT_TOLERANCE));
        assert!(!is_event_recent("", DEFAULT_TOLERANCE));
        assert!(!is_event_recent(f64::NAN, DEFAULT_TOLERANCE));
    }
}
