//! # Proctor Core Library
//!
//! This library provides the attention/integrity monitoring engine behind
//! Proctor. It watches the perception results of a live assessment and
//! turns them into a timestamped log of behavioral events, which is later
//! reduced to a single integrity score.
//!
//! ## Architecture
//!
//! - **Monitor**: per-axis debounce state machines (presence, attention,
//!   multiple faces), a stateless suspicious-object check, and the
//!   sampling scheduler that drives them on a fixed period
//! - **Event Log**: append-only log with single-slot deduplication
//! - **Scoring**: pure reduction from an event log to a 0-100 score
//! - **Report**: report model and HTTP client for the external report store
//! - **Storage**: TOML-based configuration
//!
//! Perception models are not part of this crate. They are consumed through
//! [`PerceptionPort`], so every component can be tested with fakes.
//!
//! ## Key Components
//!
//! - [`MonitorSession`]: synchronous session state driven with explicit instants
//! - [`SamplingScheduler`]: tokio task driving a session from live perception
//! - [`IntegrityScorer`]: event log to score
//! - [`MonitorConfig`]: configuration management

pub mod error;
pub mod event_log;
pub mod events;
pub mod monitor;
pub mod perception;
pub mod report;
pub mod scoring;
pub mod storage;

pub use error::{ConfigError, CoreError, PerceptionError, TransportError};
pub use event_log::EventLog;
pub use events::{Event, EventKind};
pub use monitor::{
    AxisStates, MonitorHandle, MonitorSession, SamplingScheduler, SessionClock, SessionOutcome,
    TimerState,
};
pub use perception::{
    FaceObservation, FrameSource, Keypoint, ObjectObservation, PerceptionPort, Sample,
};
pub use report::{HttpReportClient, Report, ReportId, ReportTransport, StoredReport};
pub use scoring::{DeductionLine, DeductionTable, IntegrityScorer, ScoreBreakdown};
pub use storage::{FaceRequirement, MonitorConfig, MultiplicityPolicy};
