//! World Time Types
//!
//! World events are driven by wall-clock time expressed as milliseconds since
//! the Unix epoch. Durations (event length, cooldowns, scheduler lead) use
//! [`std::time::Duration`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use event_types::Timestamp;
//!
//! let start = Timestamp::from_millis(1_000);
//! let end = start + Duration::from_secs(60);
//! assert_eq!(end.as_millis(), 61_000);
//! assert!(end > start);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::time::Duration;

/// Milliseconds in one minute.
pub const MS_PER_MINUTE: u64 = 60_000;

/// Milliseconds in one hour.
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// A point in world time, in milliseconds since the Unix epoch.
///
/// Serializes as a bare integer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch itself.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Creates a timestamp from milliseconds since the epoch.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns milliseconds since the epoch.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Returns this timestamp moved forward by `minutes`.
    pub fn plus_minutes(self, minutes: u64) -> Self {
        Self(self.0.saturating_add(minutes.saturating_mul(MS_PER_MINUTE)))
    }

    /// Returns this timestamp moved forward by a (possibly fractional) number of hours.
    pub fn plus_hours(self, hours: f64) -> Self {
        self + hours_to_duration(hours)
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn saturating_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        let millis = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(millis))
    }
}

impl From<u64> for Timestamp {
    fn from(millis: u64) -> Self {
        Self(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Converts a whole number of minutes to a [`Duration`].
pub fn minutes_to_duration(minutes: u32) -> Duration {
    Duration::from_secs(u64::from(minutes) * 60)
}

/// Converts a (possibly fractional) number of hours to a [`Duration`].
///
/// Negative, NaN and infinite inputs collapse to zero; the result is rounded
/// to the nearest millisecond.
pub fn hours_to_duration(hours: f64) -> Duration {
    if !hours.is_finite() || hours <= 0.0 {
        return Duration::ZERO;
    }
    let millis = (hours * MS_PER_HOUR as f64).round();
    if millis >= u64::MAX as f64 {
        Duration::from_millis(u64::MAX)
    } else {
        Duration::from_millis(millis as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plus_minutes() {
        let ts = Timestamp::from_millis(500);
        assert_eq!(ts.plus_minutes(2).as_millis(), 500 + 2 * MS_PER_MINUTE);
    }

    #[test]
    fn test_plus_fractional_hours() {
        let ts = Timestamp::ZERO.plus_hours(5.5);
        assert_eq!(ts.as_millis(), 5 * MS_PER_HOUR + 30 * MS_PER_MINUTE);
    }

    #[test]
    fn test_hours_to_duration_rejects_garbage() {
        assert_eq!(hours_to_duration(-1.0), Duration::ZERO);
        assert_eq!(hours_to_duration(f64::NAN), Duration::ZERO);
        assert_eq!(hours_to_duration(f64::INFINITY), Duration::ZERO);
    }

    #[test]
    fn test_add_saturates() {
        let ts = Timestamp::from_millis(u64::MAX - 1);
        assert_eq!((ts + Duration::from_secs(10)).as_millis(), u64::MAX);
    }

    #[test]
    fn test_saturating_since() {
        let a = Timestamp::from_millis(1_000);
        let b = Timestamp::from_millis(4_000);
        assert_eq!(b.saturating_since(a), Duration::from_secs(3));
        assert_eq!(a.saturating_since(b), Duration::ZERO);
    }

    #[test]
    fn test_timestamp_serializes_as_integer() {
        let ts = Timestamp::from_millis(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
        let parsed: Timestamp = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_minutes_to_duration() {
        assert_eq!(minutes_to_duration(30), Duration::from_secs(1_800));
    }
}
