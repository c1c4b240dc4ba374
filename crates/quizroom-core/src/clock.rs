//! Clock abstraction for determinism.

use chrono::{DateTime, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Milliseconds from `since` to `until`, clamped at zero.
#[must_use]
pub fn elapsed_ms(since: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    (until - since).num_milliseconds().max(0)
}

/// Whole seconds from `since` to `until`, clamped at zero.
#[must_use]
pub fn elapsed_secs(since: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    (until - since).num_seconds().max(0)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    #[test]
    fn test_elapsed_ms_clamps_negative_intervals() {
        let start = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();

        assert_eq!(elapsed_ms(start, start + Duration::milliseconds(1500)), 1500);
        assert_eq!(elapsed_ms(start, start - Duration::seconds(3)), 0);
        assert_eq!(elapsed_secs(start, start + Duration::milliseconds(12_900)), 12);
    }
}
