//! Attention axis: raises `UserLookingAway` once the gaze has stayed off
//! center for the debounce interval.
//!
//! Gaze is approximated by the horizontal distance between the nose tip
//! and the midpoint of the eyes.

use chrono::{DateTime, Duration, Utc};

use super::debounce::{DebounceTimer, TimerState};
use crate::events::{Event, EventKind};
use crate::perception::FaceObservation;
use crate::storage::FaceRequirement;

#[derive(Debug, Clone)]
pub struct AttentionTimer {
    timer: DebounceTimer,
    offset_threshold: f64,
    requirement: FaceRequirement,
}

impl AttentionTimer {
    pub fn new(offset_threshold: f64, debounce: Duration, requirement: FaceRequirement) -> Self {
        Self {
            timer: DebounceTimer::new(debounce),
            offset_threshold,
            requirement,
        }
    }

    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.timer.deadline()
    }

    pub fn observe(&mut self, faces: &[FaceObservation], now: DateTime<Utc>) {
        let primary = match (self.requirement, faces) {
            (_, []) => None,
            (FaceRequirement::ExactlyOne, [only]) => Some(only),
            (FaceRequirement::ExactlyOne, _) => None,
            (FaceRequirement::AtLeastOne, [first, ..]) => Some(first),
        };
        let Some(face) = primary else {
            self.timer.clear();
            return;
        };
        // Missing landmarks: no signal either way.
        if let Some(offset) = face.horizontal_offset() {
            self.timer.observe(offset.abs() > self.offset_threshold, now);
        }
    }

    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.timer
            .poll(now)
            .map(|at| Event::new(EventKind::UserLookingAway, at))
    }

    pub fn reset(&mut self) {
        self.timer.clear();
    }
}
