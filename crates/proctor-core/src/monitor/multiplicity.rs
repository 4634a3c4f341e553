//! Multi-face gate: raises `MultipleFacesDetected` when more than one face
//! is in frame, either on every such sample or once the condition has
//! persisted, depending on [`MultiplicityPolicy`].

use chrono::{DateTime, Duration, Utc};

use super::debounce::{DebounceTimer, TimerState};
use crate::events::{Event, EventKind};
use crate::storage::MultiplicityPolicy;

#[derive(Debug, Clone)]
pub struct MultiplicityGate {
    policy: MultiplicityPolicy,
    timer: DebounceTimer,
}

impl MultiplicityGate {
    pub fn new(policy: MultiplicityPolicy, debounce: Duration) -> Self {
        let interval = match policy {
            MultiplicityPolicy::Immediate => Duration::zero(),
            MultiplicityPolicy::Debounced => debounce,
        };
        Self {
            policy,
            timer: DebounceTimer::new(interval),
        }
    }

    pub fn policy(&self) -> MultiplicityPolicy {
        self.policy
    }

    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.timer.deadline()
    }

    /// Under the immediate policy, returns an event for every crowded sample.
    pub fn observe(&mut self, face_count: usize, now: DateTime<Utc>) -> Option<Event> {
        let crowded = face_count > 1;
        self.timer.observe(crowded, now);
        match self.policy {
            MultiplicityPolicy::Immediate if crowded => {
                self.timer.poll(now);
                Some(Event::new(EventKind::MultipleFacesDetected, now))
            }
            _ => None,
        }
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.timer
            .poll(now)
            .map(|at| Event::new(EventKind::MultipleFacesDetected, at))
    }

    pub fn reset(&mut self) {
        self.timer.clear();
    }
}
