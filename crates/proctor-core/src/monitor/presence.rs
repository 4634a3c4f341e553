//! Presence axis: raises `UserAbsent` once no face has been seen for the
//! absence threshold.

use chrono::{DateTime, Duration, Utc};

use super::debounce::{DebounceTimer, TimerState};
use crate::events::{Event, EventKind};

#[derive(Debug, Clone)]
pub struct PresenceTimer {
    timer: DebounceTimer,
}

impl PresenceTimer {
    pub fn new(absence_threshold: Duration) -> Self {
        Self {
            timer: DebounceTimer::new(absence_threshold),
        }
    }

    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.timer.deadline()
    }

    /// Only zero versus non-zero matters here.
    pub fn observe(&mut self, face_count: usize, now: DateTime<Utc>) {
        self.timer.observe(face_count == 0, now);
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.timer
            .poll(now)
            .map(|at| Event::new(EventKind::UserAbsent, at))
    }

    pub fn reset(&mut self) {
        self.timer.clear();
    }
}
