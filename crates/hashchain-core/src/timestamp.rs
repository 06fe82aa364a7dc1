//! Tick-resolution timestamps
//!
//! Link timestamps are stored as ticks: 100 ns intervals since
//! 0001-01-01T00:00:00Z. Values read from the clock are truncated to tick
//! resolution so a timestamp survives export and import unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ticks per second
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Ticks between 0001-01-01 and the Unix epoch
pub const UNIX_EPOCH_TICKS: i64 = 621_355_968_000_000_000;

const NANOS_PER_TICK: i64 = 100;

/// Timestamp in ticks
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Current wall-clock time
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Create from a raw tick count
    pub fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Create from a chrono datetime, truncating sub-tick precision.
    ///
    /// Datetimes beyond the tick range saturate at `i64::MIN` / `i64::MAX`.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let secs = dt.timestamp();
        let sub_ticks = i64::from(dt.timestamp_subsec_nanos()) / NANOS_PER_TICK;
        let ticks = secs
            .checked_mul(TICKS_PER_SECOND)
            .and_then(|t| t.checked_add(UNIX_EPOCH_TICKS))
            .and_then(|t| t.checked_add(sub_ticks));
        match ticks {
            Some(ticks) => Self(ticks),
            None if secs < 0 => Self(i64::MIN),
            None => Self(i64::MAX),
        }
    }

    /// Raw tick count
    pub fn ticks(&self) -> i64 {
        self.0
    }

    /// As chrono datetime, `None` when out of chrono's range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let unix_ticks = self.0.checked_sub(UNIX_EPOCH_TICKS)?;
        let secs = unix_ticks.div_euclid(TICKS_PER_SECOND);
        let nanos = unix_ticks.rem_euclid(TICKS_PER_SECOND) * NANOS_PER_TICK;
        DateTime::from_timestamp(secs, nanos as u32)
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

/// Decimal tick count; this is the form fed into link hashes
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};

    #[test]
    fn test_unix_epoch_ticks() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        assert_eq!(Timestamp::from_datetime(epoch).ticks(), UNIX_EPOCH_TICKS);
    }

    #[test]
    fn test_datetime_roundtrip_truncates_to_ticks() {
        let dt = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let ts = Timestamp::from_datetime(dt);
        let back = ts.to_datetime().unwrap();

        assert_eq!(back.timestamp(), 1_700_000_000);
        assert_eq!(back.timestamp_subsec_nanos(), 123_456_700);
        assert_eq!(Timestamp::from_datetime(back), ts);
    }

    #[test]
    fn test_pre_epoch_ticks() {
        let dt = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap();
        let ts = Timestamp::from_datetime(dt);
        assert_eq!(ts.ticks(), UNIX_EPOCH_TICKS - TICKS_PER_SECOND);
        assert_eq!(ts.to_datetime().unwrap(), dt);
    }

    #[test]
    fn test_extreme_ticks_do_not_overflow() {
        assert!(Timestamp::from_ticks(i64::MIN).to_datetime().is_none());
        assert!(Timestamp::from_ticks(i64::MIN + UNIX_EPOCH_TICKS - 1).to_datetime().is_none());

        // i64::MAX ticks is still inside chrono's range (year ~29228).
        let far = Timestamp::from_ticks(i64::MAX).to_datetime().unwrap();
        assert_eq!(Timestamp::from_datetime(far).ticks(), i64::MAX);
    }

    #[test]
    fn test_far_datetimes_saturate() {
        let max = Timestamp::from_datetime(Utc.from_utc_datetime(&NaiveDateTime::MAX));
        let min = Timestamp::from_datetime(Utc.from_utc_datetime(&NaiveDateTime::MIN));
        assert_eq!(max.ticks(), i64::MAX);
        assert_eq!(min.ticks(), i64::MIN);
    }

    #[test]
    fn test_display_is_tick_count() {
        assert_eq!(Timestamp::from_ticks(42).to_string(), "42");
    }

    #[test]
    fn test_now_is_after_2020() {
        let floor = Timestamp::from_datetime(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert!(Timestamp::now() > floor);
    }
}
