//! Wall-clock timestamps derived from tokio's monotonic clock.
//!
//! Anchoring once and adding monotonic elapsed time keeps event
//! timestamps consistent with the scheduler's sleeps, including under
//! tokio's paused test clock.

use chrono::{DateTime, Duration, Utc};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    wall: DateTime<Utc>,
    mono: Instant,
}

impl SessionClock {
    pub fn start() -> Self {
        Self::anchored(Utc::now(), Instant::now())
    }

    pub fn anchored(wall: DateTime<Utc>, mono: Instant) -> Self {
        Self { wall, mono }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.wall + Duration::from_std(self.mono.elapsed()).unwrap_or(Duration::zero())
    }

    /// Monotonic instant corresponding to `at`. Instants before the anchor
    /// map to the anchor itself; `None` when `at` lies beyond what the
    /// monotonic clock can represent.
    pub fn instant_at(&self, at: DateTime<Utc>) -> Option<Instant> {
        match (at - self.wall).to_std() {
            Ok(offset) => self.mono.checked_add(offset),
            Err(_) => Some(self.mono),
        }
    }
}
