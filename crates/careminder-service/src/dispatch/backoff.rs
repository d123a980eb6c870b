//! Retry backoff schedule.

use chrono::Duration;

/// Per-retry-count wait table for failed deliveries.
///
/// Retry counts beyond the table length reuse the last entry. The retry
/// ceiling that stops automatic requeueing is enforced by the store's
/// requeue query, not here; this table only answers "how long to wait".
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    minutes: Vec<i64>,
}

impl BackoffSchedule {
    /// Create a schedule from a per-retry wait table in minutes.
    ///
    /// An empty table falls back to the default 1/5/15/30 progression.
    pub fn new(minutes: Vec<i64>) -> Self {
        if minutes.is_empty() {
            return Self::default();
        }
        Self { minutes }
    }

    /// Wait before the `retry_count`-th retry (1-based).
    pub fn delay_for(&self, retry_count: i32) -> Duration {
        let index = (retry_count.max(1) as usize - 1).min(self.minutes.len() - 1);
        Duration::minutes(self.minutes[index])
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self {
            minutes: vec![1, 5, 15, 30],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_progression() {
        let schedule = BackoffSchedule::default();
        assert_eq!(schedule.delay_for(1), Duration::minutes(1));
        assert_eq!(schedule.delay_for(2), Duration::minutes(5));
        assert_eq!(schedule.delay_for(3), Duration::minutes(15));
        assert_eq!(schedule.delay_for(4), Duration::minutes(30));
        assert_eq!(schedule.delay_for(10), Duration::minutes(30));
    }

    #[test]
    fn delays_are_monotonic() {
        let schedule = BackoffSchedule::default();
        for count in 1..5 {
            assert!(schedule.delay_for(count + 1) >= schedule.delay_for(count));
        }
    }

    #[test]
    fn empty_table_uses_default() {
        let schedule = BackoffSchedule::new(Vec::new());
        assert_eq!(schedule.delay_for(1), Duration::minutes(1));
    }
}
