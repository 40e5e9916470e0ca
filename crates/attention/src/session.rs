//! Session statistics

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Completed distraction episodes (incremented on latch reset)
    pub distraction_count: u64,
    /// Monotonic session start, used for durations
    pub started: Instant,
    /// Wall-clock session start, for display
    pub started_at: DateTime<Utc>,
}

impl SessionStats {
    pub fn new(now: Instant) -> Self {
        Self {
            distraction_count: 0,
            started: now,
            started_at: Utc::now(),
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Session length as `HH:MM:SS`
    pub fn duration_string(&self, now: Instant) -> String {
        format_hms(self.elapsed(now))
    }

    pub fn reset(&mut self, now: Instant) {
        *self = Self::new(now);
    }
}

pub(crate) fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
