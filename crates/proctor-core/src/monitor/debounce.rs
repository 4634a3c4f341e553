//! Debounce timer shared by the presence, attention and multi-face axes.
//!
//! A condition must hold continuously for `interval` before the timer
//! fires, and it fires at most once per continuous occurrence.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --condition--> Pending --deadline--> Fired
//!   ^                    |                    |
//!   +----- clear --------+------- clear ------+
//! ```
//!
//! The timer has no thread or callback of its own. The deadline held in
//! `Pending` is the deferred check: the owner asks for [`DebounceTimer::deadline`]
//! to know when to wake and calls [`DebounceTimer::poll`] then. Leaving
//! `Pending` drops the deadline, so a stale check can never fire.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Pending {
        armed_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    },
    Fired,
}

#[derive(Debug, Clone)]
pub struct DebounceTimer {
    interval: Duration,
    state: TimerState,
}

impl DebounceTimer {
    /// Negative intervals are treated as zero.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::zero()),
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_idle(&self) -> bool {
        self.state == TimerState::Idle
    }

    /// When the pending check is due, if one is armed.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self.state {
            TimerState::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    /// Feed the condition observed at `now`.
    ///
    /// Arms from `Idle` when the condition holds; any other state is left
    /// alone while it holds. A false condition returns to `Idle` from
    /// anywhere, discarding a pending deadline.
    pub fn observe(&mut self, condition: bool, now: DateTime<Utc>) {
        if !condition {
            self.clear();
            return;
        }
        if self.state == TimerState::Idle {
            // A deadline past the representable range is never reached.
            let deadline = now
                .checked_add_signed(self.interval)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            self.state = TimerState::Pending {
                armed_at: now,
                deadline,
            };
        }
    }

    /// Fire if the pending deadline has been reached.
    ///
    /// Returns the deadline instant when the timer transitions to `Fired`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.state {
            TimerState::Pending { deadline, .. } if deadline <= now => {
                self.state = TimerState::Fired;
                Some(deadline)
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.state = TimerState::Idle;
    }
}
