//! Wall-clock timestamps, clocks and calendar-day bucketing

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// A point in time, in seconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Timestamp(pub f64);

impl Timestamp {
    /// Create a timestamp from seconds since the epoch.
    #[inline]
    pub const fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Seconds since the epoch.
    #[inline]
    pub fn secs(self) -> f64 {
        self.0
    }

    /// Shift forward by `secs` (negative values shift backwards).
    #[inline]
    pub fn offset(self, secs: f64) -> Self {
        Self(self.0 + secs)
    }

    /// Seconds elapsed from `earlier` to `self`, clamped to zero.
    ///
    /// Future-dated `earlier` values yield zero rather than a negative span.
    #[inline]
    pub fn saturating_elapsed(self, earlier: Timestamp) -> f64 {
        let dt = self.0 - earlier.0;
        if dt.is_finite() && dt > 0.0 { dt } else { 0.0 }
    }

    /// Calendar day index for a timezone `utc_offset_secs` east of UTC.
    #[inline]
    pub fn day_index(self, utc_offset_secs: i64) -> i64 {
        ((self.0 + utc_offset_secs as f64) / SECONDS_PER_DAY).floor() as i64
    }

    /// Whether both timestamps fall on the same local calendar day.
    #[inline]
    pub fn same_day(self, other: Timestamp, utc_offset_secs: i64) -> bool {
        self.day_index(utc_offset_secs) == other.day_index(utc_offset_secs)
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Reads the operating system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        Timestamp(secs)
    }
}

/// Manually advanced clock, shareable between the driver and tests.
#[derive(Clone, Debug)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.0.to_bits())),
        }
    }

    /// Move the clock to an absolute time.
    pub fn set(&self, t: Timestamp) {
        self.bits.store(t.0.to_bits(), Ordering::SeqCst);
    }

    /// Advance the clock by `secs` and return the new time.
    pub fn advance(&self, secs: f64) -> Timestamp {
        let next = self.now().offset(secs);
        self.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(f64::from_bits(self.bits.load(Ordering::SeqCst)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_elapsed_clamps_future() {
        let now = Timestamp(100.0);
        assert_eq!(now.saturating_elapsed(Timestamp(40.0)), 60.0);
        assert_eq!(now.saturating_elapsed(Timestamp(500.0)), 0.0);
        assert_eq!(now.saturating_elapsed(Timestamp(f64::NAN)), 0.0);
    }

    #[test]
    fn test_day_index_boundaries() {
        let midnight = Timestamp(SECONDS_PER_DAY * 3.0);
        assert_eq!(midnight.day_index(0), 3);
        assert_eq!(midnight.offset(-0.5).day_index(0), 2);
        assert!(!midnight.same_day(midnight.offset(-1.0), 0));
        assert!(midnight.same_day(midnight.offset(SECONDS_PER_DAY - 1.0), 0));
    }

    #[test]
    fn test_day_index_with_offset() {
        // 23:00 UTC is already the next day at UTC+2
        let t = Timestamp(SECONDS_PER_DAY * 10.0 + 23.0 * 3600.0);
        assert_eq!(t.day_index(0), 10);
        assert_eq!(t.day_index(2 * 3600), 11);
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(Timestamp(5.0));
        let other = clock.clone();
        clock.advance(2.5);
        assert_eq!(other.now(), Timestamp(7.5));
        other.set(Timestamp(1.0));
        assert_eq!(clock.now(), Timestamp(1.0));
    }
}
