//! A single monitored assessment.
//!
//! The session owns the event log and every axis's timer state. It is
//! purely synchronous and never reads a clock: callers pass `now` in, which
//! is what lets tests and offline replay run on a virtual timeline.
//!
//! Within one call, events are appended in a fixed order: deadlines that
//! came due (earliest first; ties resolved presence, attention,
//! multiplicity), then presence, attention, multiplicity and finally
//! objects for the sample itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attention::AttentionTimer;
use super::debounce::TimerState;
use super::multiplicity::MultiplicityGate;
use super::objects::ObjectFlagEvaluator;
use super::presence::PresenceTimer;
use crate::error::ConfigError;
use crate::event_log::EventLog;
use crate::events::Event;
use crate::perception::Sample;
use crate::storage::MonitorConfig;

/// Timer states of the three debounced axes, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisStates {
    pub presence: TimerState,
    pub attention: TimerState,
    pub multiplicity: TimerState,
}

/// What a session leaves behind once terminated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub events: Vec<Event>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl SessionOutcome {
    /// Session length rounded to the nearest second.
    pub fn duration_seconds(&self) -> u64 {
        let ms = (self.ended_at - self.started_at).num_milliseconds().max(0) as u64;
        (ms + 500) / 1000
    }
}

#[derive(Debug, Clone)]
pub struct MonitorSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    presence: PresenceTimer,
    attention: AttentionTimer,
    multiplicity: MultiplicityGate,
    objects: ObjectFlagEvaluator,
    log: EventLog,
}

impl MonitorSession {
    /// Start a session at `started_at`.
    ///
    /// # Errors
    ///
    /// Fails if the configuration does not validate; nothing is started.
    pub fn new(config: &MonitorConfig, started_at: DateTime<Utc>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            started_at,
            presence: PresenceTimer::new(config.absence_threshold()),
            attention: AttentionTimer::new(
                config.attention.offset_threshold,
                config.attention_debounce(),
                config.attention.face_requirement,
            ),
            multiplicity: MultiplicityGate::new(
                config.multiplicity.policy,
                config.multiplicity_debounce(),
            ),
            objects: ObjectFlagEvaluator::from_config(&config.objects),
            log: EventLog::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Chronological copy of the log as of now.
    pub fn snapshot(&self) -> Vec<Event> {
        self.log.snapshot()
    }

    pub fn axis_states(&self) -> AxisStates {
        AxisStates {
            presence: self.presence.state(),
            attention: self.attention.state(),
            multiplicity: self.multiplicity.state(),
        }
    }

    /// Earliest pending deferred check across all axes.
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        [
            self.presence.deadline(),
            self.attention.deadline(),
            self.multiplicity.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Fire every deferred check due at or before `now`.
    ///
    /// Returns the events that were actually appended.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut due: Vec<Event> = [
            self.presence.poll(now),
            self.attention.poll(now),
            self.multiplicity.poll(now),
        ]
        .into_iter()
        .flatten()
        .collect();
        // Stable sort keeps axis order for equal deadlines.
        due.sort_by_key(|e| e.timestamp);
        self.append_all(due)
    }

    /// Apply one sample observed at `now`.
    ///
    /// Deadlines reached by `now` fire first, so a clearing sample that
    /// lands exactly on a deadline does not suppress it.
    pub fn observe(&mut self, sample: &Sample, now: DateTime<Utc>) -> Vec<Event> {
        let mut appended = self.fire_due(now);
        let face_count = sample.face_count();

        self.presence.observe(face_count, now);
        self.attention.observe(&sample.faces, now);
        let mut raised: Vec<Event> =
            self.multiplicity.observe(face_count, now).into_iter().collect();
        raised.extend(self.objects.evaluate(&sample.objects, now));

        appended.extend(self.append_all(raised));
        appended
    }

    /// End the session. Pending checks are discarded without firing.
    pub fn terminate(mut self, ended_at: DateTime<Utc>) -> SessionOutcome {
        self.presence.reset();
        self.attention.reset();
        self.multiplicity.reset();
        SessionOutcome {
            session_id: self.id,
            events: self.log.into_events(),
            started_at: self.started_at,
            ended_at,
        }
    }

    fn append_all(&mut self, candidates: Vec<Event>) -> Vec<Event> {
        let mut appended = Vec::new();
        for event in candidates {
            if self.log.append(event.clone()) {
                tracing::info!(
                    session_id = %self.id,
                    kind = %event.kind.label(),
                    at = %event.timestamp,
                    "event raised"
                );
                appended.push(event);
            }
        }
        appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use crate::perception::{
        FaceObservation, Keypoint, ObjectObservation, LEFT_EYE, NOSE_TIP, RIGHT_EYE,
    };
    use crate::storage::MultiplicityPolicy;
    use chrono::{Duration, TimeZone};

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn face(nose: f64) -> FaceObservation {
        FaceObservation::new(vec![
            Keypoint::new(NOSE_TIP, nose, 50.0),
            Keypoint::new(LEFT_EYE, 80.0, 40.0),
            Keypoint::new(RIGHT_EYE, 90.0, 40.0),
        ])
    }

    fn faces(n: usize) -> Sample {
        Sample::new((0..n).map(|_| face(85.0)).collect(), vec![])
    }

    fn kinds(events: &[Event]) -> Vec<EventKind> {
        events.iter().map(|e| e.kind.clone()).collect()
    }

    #[test]
    fn invalid_config_fails_at_construction() {
        let mut config = MonitorConfig::default();
        config.objects.classes.clear();
        assert!(MonitorSession::new(&config, t(0)).is_err());
    }

    #[test]
    fn oversized_threshold_fails_at_construction() {
        let mut config = MonitorConfig::default();
        config.presence.absence_threshold_ms = u64::MAX;
        assert!(matches!(
            MonitorSession::new(&config, t(0)),
            Err(ConfigError::InvalidValue { .. })
        ));
        config.presence.absence_threshold_ms = 9_000_000_000_000_000_000;
        assert!(MonitorSession::new(&config, t(0)).is_err());
    }

    #[test]
    fn absence_never_fires_before_threshold() {
        let mut config = MonitorConfig::default();
        config.presence.absence_threshold_ms = crate::storage::MAX_INTERVAL_MS;
        let mut session = MonitorSession::new(&config, t(0)).unwrap();
        session.observe(&faces(0), t(0));
        assert!(session.fire_due(t(0)).is_empty());
        assert!(session.fire_due(t(60_000)).is_empty());
        assert_eq!(
            session.next_deadline(),
            Some(t(crate::storage::MAX_INTERVAL_MS as i64))
        );
    }

    #[test]
    fn absence_for_twelve_seconds_logs_once() {
        let mut session = MonitorSession::new(&MonitorConfig::default(), t(0)).unwrap();
        for ms in (0..=12_000).step_by(2_000) {
            session.observe(&faces(0), t(ms));
        }
        assert_eq!(kinds(session.log().as_slice()), vec![EventKind::UserAbsent]);
        assert_eq!(session.log().as_slice()[0].timestamp, t(10_000));
    }

    #[test]
    fn presence_before_threshold_prevents_absence() {
        let mut session = MonitorSession::new(&MonitorConfig::default(), t(0)).unwrap();
        for ms in (0..10_000).step_by(2_000) {
            session.observe(&faces(0), t(ms));
        }
        session.observe(&faces(1), t(9_999));
        session.fire_due(t(10_000));
        assert!(session.log().is_empty());
    }

    #[test]
    fn deadline_fires_between_samples() {
        let mut session = MonitorSession::new(&MonitorConfig::default(), t(0)).unwrap();
        session.observe(&faces(0), t(0));
        assert_eq!(session.next_deadline(), Some(t(10_000)));
        let fired = session.fire_due(t(10_000));
        assert_eq!(kinds(&fired), vec![EventKind::UserAbsent]);
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn immediate_policy_logs_on_first_crowded_sample() {
        let mut config = MonitorConfig::default();
        config.multiplicity.policy = MultiplicityPolicy::Immediate;
        let mut session = MonitorSession::new(&config, t(0)).unwrap();
        let appended = session.observe(&faces(2), t(0));
        assert_eq!(kinds(&appended), vec![EventKind::MultipleFacesDetected]);
        // Repeats collapse in the log.
        assert!(session.observe(&faces(2), t(2_000)).is_empty());
        assert_eq!(session.log().len(), 1);
    }

    #[test]
    fn debounced_policy_waits() {
        let mut session = MonitorSession::new(&MonitorConfig::default(), t(0)).unwrap();
        assert!(session.observe(&faces(2), t(0)).is_empty());
        let appended = session.observe(&faces(2), t(2_000));
        assert_eq!(kinds(&appended), vec![EventKind::MultipleFacesDetected]);
        assert_eq!(appended[0].timestamp, t(2_000));
    }

    #[test]
    fn objects_append_after_axis_events() {
        let mut config = MonitorConfig::default();
        config.multiplicity.policy = MultiplicityPolicy::Immediate;
        let mut session = MonitorSession::new(&config, t(0)).unwrap();
        let sample = Sample::new(
            vec![face(85.0), face(85.0)],
            vec![
                ObjectObservation::new("book", 0.9),
                ObjectObservation::new("cell phone", 0.9),
            ],
        );
        let appended = session.observe(&sample, t(0));
        assert_eq!(
            kinds(&appended),
            vec![
                EventKind::MultipleFacesDetected,
                EventKind::suspicious_object("book"),
                EventKind::suspicious_object("cell phone"),
            ]
        );
    }

    #[test]
    fn due_checks_fire_in_deadline_order() {
        let mut config = MonitorConfig::default();
        config.attention.face_requirement = crate::storage::FaceRequirement::AtLeastOne;
        config.multiplicity.debounce_ms = 3_000;
        let mut session = MonitorSession::new(&config, t(0)).unwrap();
        session.observe(&Sample::new(vec![face(150.0), face(150.0)], vec![]), t(0));
        let fired = session.fire_due(t(8_000));
        assert_eq!(
            kinds(&fired),
            vec![EventKind::MultipleFacesDetected, EventKind::UserLookingAway]
        );
        assert_eq!(fired[0].timestamp, t(3_000));
        assert_eq!(fired[1].timestamp, t(5_000));
    }

    #[test]
    fn deadlines_fire_at_their_own_instants() {
        let mut config = MonitorConfig::default();
        config.presence.absence_threshold_ms = 3_000;
        let mut session = MonitorSession::new(&config, t(0)).unwrap();
        // Averted gaze arms attention at 0 (due 5000).
        session.observe(&Sample::new(vec![face(150.0)], vec![]), t(0));
        // Face lost at 1000: attention clears, presence arms (due 4000).
        session.observe(&faces(0), t(1_000));
        session.observe(&Sample::new(vec![face(150.0)], vec![]), t(4_500));
        assert_eq!(kinds(session.log().as_slice()), vec![EventKind::UserAbsent]);
        let fired = session.fire_due(t(9_500));
        assert_eq!(kinds(&fired), vec![EventKind::UserLookingAway]);
        assert_eq!(fired[0].timestamp, t(9_500));
    }

    #[test]
    fn axis_states_track_pending_checks() {
        let mut session = MonitorSession::new(&MonitorConfig::default(), t(0)).unwrap();
        session.observe(&faces(2), t(0));
        let states = session.axis_states();
        assert_eq!(states.presence, TimerState::Idle);
        // Two faces: attention needs exactly one, so it stays idle.
        assert_eq!(states.attention, TimerState::Idle);
        assert_eq!(
            states.multiplicity,
            TimerState::Pending {
                armed_at: t(0),
                deadline: t(2_000)
            }
        );
        session.observe(&faces(2), t(2_000));
        assert_eq!(session.axis_states().multiplicity, TimerState::Fired);
    }

    #[test]
    fn terminate_discards_pending() {
        let mut session = MonitorSession::new(&MonitorConfig::default(), t(0)).unwrap();
        session.observe(&faces(0), t(0));
        let outcome = session.terminate(t(9_000));
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.duration_seconds(), 9);
    }

    #[test]
    fn duration_rounds_to_nearest_second() {
        let outcome = SessionOutcome {
            session_id: Uuid::new_v4(),
            events: vec![],
            started_at: t(0),
            ended_at: t(2_500) + Duration::milliseconds(1),
        };
        assert_eq!(outcome.duration_seconds(), 3);
    }
}
