use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Largest magnitude, in milliseconds, a browser date may sit from the epoch
/// (100,000,000 days).
///
/// `DateTime<Utc>` stops short of this at roughly 8.21e15 ms (year 262143), so
/// values between the two limits are valid in a browser but come out
/// [`Timestamp::Invalid`] here, and strict mode reports them as out of range.
pub const MAX_TIME_MS: f64 = 8.64e15;

/// A converted timestamp field.
///
/// Mirrors a browser `Date`: either a real instant or an invalid date
/// produced from a value that could not be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timestamp {
    Valid(DateTime<Utc>),
    Invalid,
}

impl Timestamp {
    /// Builds a date from whole or fractional seconds since the Unix epoch.
    pub fn from_epoch_seconds(seconds: f64) -> Self {
        Self::from_epoch_millis(seconds * 1000.0)
    }

    /// Builds a date from milliseconds since the Unix epoch, truncating any
    /// fractional part toward zero.
    pub fn from_epoch_millis(millis: f64) -> Self {
        if !millis.is_finite() || millis.abs() > MAX_TIME_MS {
            return Timestamp::Invalid;
        }

        DateTime::from_timestamp_millis(millis.trunc() as i64)
            .map_or(Timestamp::Invalid, Timestamp::Valid)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Timestamp::Valid(_))
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Valid(dt) => Some(*dt),
            Timestamp::Invalid => None,
        }
    }

    pub fn timestamp_millis(&self) -> Option<i64> {
        self.as_datetime().map(|dt| dt.timestamp_millis())
    }

    /// ISO-8601 with millisecond precision and a `Z` suffix, or `None` for an
    /// invalid date.
    pub fn to_iso_string(&self) -> Option<String> {
        self.as_datetime()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Valid(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_iso_string() {
            Some(iso) => f.write_str(&iso),
            None => f.write_str("Invalid Date"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_are_scaled_to_millis() {
        let ts = Timestamp::from_epoch_seconds(1_700_000_000.0);
        assert_eq!(ts.timestamp_millis(), Some(1_700_000_000_000));
        assert_eq!(ts.to_string(), "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn fractional_seconds_keep_millisecond_precision() {
        let ts = Timestamp::from_epoch_seconds(1_700_000_000.25);
        assert_eq!(ts.timestamp_millis(), Some(1_700_000_000_250));
    }

    #[test]
    fn sub_millisecond_part_truncates_toward_zero() {
        assert_eq!(Timestamp::from_epoch_millis(1.9).timestamp_millis(), Some(1));
        assert_eq!(Timestamp::from_epoch_millis(-1.9).timestamp_millis(), Some(-1));
    }

    #[test]
    fn non_finite_and_out_of_range_are_invalid() {
        assert_eq!(Timestamp::from_epoch_millis(f64::NAN), Timestamp::Invalid);
        assert_eq!(Timestamp::from_epoch_millis(f64::INFINITY), Timestamp::Invalid);
        assert_eq!(Timestamp::from_epoch_millis(MAX_TIME_MS * 2.0), Timestamp::Invalid);
        assert_eq!(Timestamp::Invalid.to_string(), "Invalid Date");
        assert!(!Timestamp::Invalid.is_valid());
    }

    #[test]
    fn beyond_chrono_range_is_invalid() {
        assert!(Timestamp::from_epoch_millis(8.0e15).is_valid());
        assert_eq!(Timestamp::from_epoch_millis(8.5e15), Timestamp::Invalid);
        assert_eq!(Timestamp::from_epoch_millis(-8.5e15), Timestamp::Invalid);
    }
}
