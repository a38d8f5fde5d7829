//! Aging policy for idle threads.
//!
//! Threads whose newest message is old enough are archived without
//! consulting the AI judge. Age trumps semantic content, and skipping the
//! judgment call keeps stale backlog sweeps cheap.

use chrono::{DateTime, Utc};

/// Decides whether a thread is old enough to be archived as aged.
///
/// The decision compares calendar days, not elapsed hours, so a thread
/// does not flip between aged and fresh as the clock moves within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgingPolicy {
    history_days: i64,
}

impl AgingPolicy {
    /// Creates a policy with the given threshold in days.
    pub fn new(history_days: i64) -> Self {
        Self { history_days }
    }

    /// Returns the configured threshold in days.
    pub fn history_days(&self) -> i64 {
        self.history_days
    }

    /// Returns true when the newest message is at least the threshold old.
    ///
    /// The difference is taken between calendar dates; a thread whose
    /// newest message is exactly the threshold number of days old counts
    /// as aged.
    pub fn is_aged(&self, latest: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let elapsed_days = now
            .date_naive()
            .signed_duration_since(latest.date_naive())
            .num_days();
        elapsed_days >= self.history_days
    }
}

impl Default for AgingPolicy {
    fn default() -> Self {
        Self { history_days: 10 }
    }
}
