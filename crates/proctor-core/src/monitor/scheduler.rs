//! Sampling scheduler.
//!
//! Drives one [`MonitorSession`] on a fixed period inside a tokio task.
//! Each tick grabs the current frame and runs face estimation and object
//! detection on it; between ticks the loop sleeps until either the next
//! tick or the session's earliest pending deadline.
//!
//! Cycles never overlap: the loop awaits perception before looking at the
//! next tick, and ticks missed meanwhile are dropped rather than queued.
//! A failed or timed-out perception call, or a frame that is not ready,
//! skips the sample without touching any timer.

use std::future::Future;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;
use uuid::Uuid;

use super::clock::SessionClock;
use super::session::{MonitorSession, SessionOutcome};
use crate::error::{ConfigError, CoreError, PerceptionError};
use crate::events::Event;
use crate::perception::{FrameSource, PerceptionPort, Sample};
use crate::storage::MonitorConfig;

pub struct SamplingScheduler<S, P> {
    config: MonitorConfig,
    source: S,
    perception: P,
}

impl<S, P> SamplingScheduler<S, P>
where
    S: FrameSource + 'static,
    P: PerceptionPort<Frame = S::Frame> + 'static,
{
    pub fn new(config: MonitorConfig, source: S, perception: P) -> Self {
        Self {
            config,
            source,
            perception,
        }
    }

    /// Create the session and spawn its sampling loop on the current runtime.
    ///
    /// # Errors
    ///
    /// Fails fast on an invalid configuration; no task is spawned.
    pub fn start(self) -> Result<MonitorHandle, ConfigError> {
        let clock = SessionClock::start();
        let session = MonitorSession::new(&self.config, clock.now())?;
        let session_id = session.id();
        let (stop_tx, stop_rx) = oneshot::channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());

        let sampling = SamplingLoop {
            period: Duration::from_millis(self.config.sampling.period_ms),
            perception_timeout: Duration::from_millis(self.config.sampling.perception_timeout_ms),
            session,
            clock,
            source: self.source,
            perception: self.perception,
            snapshots: snapshot_tx,
        };
        let span = tracing::info_span!("monitor", %session_id);
        let task = tokio::spawn(sampling.run(stop_rx).instrument(span));

        Ok(MonitorHandle {
            session_id,
            stop: stop_tx,
            task,
            snapshots: snapshot_rx,
        })
    }
}

/// Owner's grip on a running session.
///
/// Dropping the handle without calling [`MonitorHandle::terminate`] also
/// stops the loop, but the outcome is lost.
pub struct MonitorHandle {
    session_id: Uuid,
    stop: oneshot::Sender<()>,
    task: JoinHandle<SessionOutcome>,
    snapshots: watch::Receiver<Vec<Event>>,
}

impl MonitorHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Chronological event log as of the latest append.
    pub fn snapshot(&self) -> Vec<Event> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified on every append.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Event>> {
        self.snapshots.clone()
    }

    /// Stop sampling and collect the session outcome.
    ///
    /// Once this returns no further sample is evaluated and every pending
    /// deferred check has been discarded. An in-flight perception call is
    /// abandoned.
    pub async fn terminate(self) -> Result<SessionOutcome, CoreError> {
        // The loop may already be gone if it panicked; the join reports that.
        let _ = self.stop.send(());
        self.task.await.map_err(|e| CoreError::Task(e.to_string()))
    }
}

struct SamplingLoop<S, P> {
    period: Duration,
    perception_timeout: Duration,
    session: MonitorSession,
    clock: SessionClock,
    source: S,
    perception: P,
    snapshots: watch::Sender<Vec<Event>>,
}

impl<S, P> SamplingLoop<S, P>
where
    S: FrameSource,
    P: PerceptionPort<Frame = S::Frame>,
{
    async fn run(mut self, mut stop: oneshot::Receiver<()>) -> SessionOutcome {
        tracing::info!(period_ms = self.period.as_millis() as u64, "monitoring started");
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let wake = self
                .session
                .next_deadline()
                .and_then(|deadline| self.clock.instant_at(deadline));

            tokio::select! {
                biased;
                _ = &mut stop => break,
                _ = sleep_until_deadline(wake) => {
                    let fired = self.session.fire_due(self.clock.now());
                    self.publish(&fired);
                }
                _ = ticker.tick() => {
                    let sampled = tokio::select! {
                        biased;
                        _ = &mut stop => break,
                        sampled = self.sample() => sampled,
                    };
                    match sampled {
                        Ok(sample) => {
                            let appended = self.session.observe(&sample, self.clock.now());
                            self.publish(&appended);
                        }
                        Err(err @ PerceptionError::TimedOut { .. }) => {
                            tracing::warn!(error = %err, "sample skipped");
                        }
                        Err(err) => {
                            tracing::debug!(error = %err, "sample skipped");
                        }
                    }
                }
            }
        }

        let outcome = self.session.terminate(self.clock.now());
        tracing::info!(
            events = outcome.events.len(),
            duration_secs = outcome.duration_seconds(),
            "monitoring terminated"
        );
        outcome
    }

    async fn sample(&mut self) -> Result<Sample, PerceptionError> {
        let frame = self
            .source
            .current_frame()
            .ok_or(PerceptionError::FrameNotReady)?;
        let faces = bounded(
            self.perception_timeout,
            self.perception.estimate_faces(&frame),
        )
        .await?;
        let objects = bounded(
            self.perception_timeout,
            self.perception.detect_objects(&frame),
        )
        .await?;
        Ok(Sample::new(faces, objects))
    }

    fn publish(&self, appended: &[Event]) {
        if !appended.is_empty() {
            self.snapshots.send_replace(self.session.snapshot());
        }
    }
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, PerceptionError>>,
) -> Result<T, PerceptionError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PerceptionError::TimedOut {
            timeout_ms: limit.as_millis() as u64,
        }),
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
