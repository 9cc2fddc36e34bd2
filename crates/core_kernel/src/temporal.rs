//! Time handling for the billing system
//!
//! All time-dependent rules read the current instant through a [`Clock`]
//! capability that is handed to them at construction, never from global
//! state. Production code uses [`SystemClock`]; tests use [`ManualClock`]
//! or a plain closure to pin time to a deterministic instant.

use chrono::{DateTime, Days, TimeDelta, Utc};
use std::sync::RwLock;
use thiserror::Error;

/// Number of days in one billing week
pub const DAYS_PER_WEEK: u64 = 7;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Date out of range: {start} + {weeks} weeks")]
    OutOfRange {
        start: String,
        weeks: u32,
    },
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Returns the current time according to this clock
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Any zero-argument function returning an instant is a clock
impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// A clock that only moves when told to
///
/// Used to simulate the passage of weeks in tests.
#[derive(Debug)]
pub struct ManualClock {
    current: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    /// Moves the clock to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = instant;
    }

    /// Moves the clock forward (or backward, for a negative delta)
    pub fn advance(&self, delta: TimeDelta) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current += delta;
    }

    /// Moves the clock forward by whole days
    pub fn advance_days(&self, days: i64) {
        self.advance(TimeDelta::days(days));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Adds `weeks` calendar weeks to `start`
///
/// # Errors
///
/// Returns `TemporalError::OutOfRange` if the result is not representable
pub fn add_weeks(start: DateTime<Utc>, weeks: u32) -> Result<DateTime<Utc>, TemporalError> {
    start
        .checked_add_days(Days::new(u64::from(weeks) * DAYS_PER_WEEK))
        .ok_or_else(|| TemporalError::OutOfRange {
            start: start.to_rfc3339(),
            weeks,
        })
}

/// Whole weeks elapsed from `since` to `now`, truncated toward zero
///
/// Partial weeks do not count. If `now` is before `since` the result is
/// zero or negative.
pub fn whole_weeks_between(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - since).num_weeks()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_add_weeks() {
        let due = add_weeks(start(), 50).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 12, 16, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_add_weeks_out_of_range() {
        let result = add_weeks(DateTime::<Utc>::MAX_UTC, 1);
        assert!(matches!(result, Err(TemporalError::OutOfRange { weeks: 1, .. })));
    }

    #[test]
    fn test_whole_weeks_truncates_partial_weeks() {
        let since = start();
        assert_eq!(whole_weeks_between(since, since), 0);
        assert_eq!(whole_weeks_between(since, since + TimeDelta::days(6)), 0);
        assert_eq!(
            whole_weeks_between(since, since + TimeDelta::days(13) + TimeDelta::hours(23)),
            1
        );
        assert_eq!(whole_weeks_between(since, since + TimeDelta::days(14)), 2);
    }

    #[test]
    fn test_whole_weeks_before_start() {
        let since = start();
        assert_eq!(whole_weeks_between(since, since - TimeDelta::days(3)), 0);
        assert_eq!(whole_weeks_between(since, since - TimeDelta::days(8)), -1);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new(start());
        assert_eq!(clock.now(), start());

        clock.advance_days(14);
        assert_eq!(clock.now(), start() + TimeDelta::days(14));

        clock.set(start());
        assert_eq!(clock.now(), start());
    }

    #[test]
    fn test_closure_is_a_clock() {
        let fixed = start();
        let clock = move || fixed;
        assert_eq!(Clock::now(&clock), fixed);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
