//! Report model and the transport to the external report store.
//!
//! The store itself is out of scope; this module only shapes what is sent
//! and received and never retries on the caller's behalf.

mod client;

pub use client::HttpReportClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TransportError;
use crate::events::Event;
use crate::monitor::SessionOutcome;

/// Opaque identifier assigned by the report store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(pub String);

impl ReportId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReportId {
    fn from(id: &str) -> Self {
        ReportId(id.to_string())
    }
}

/// What a finished session hands to the report store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub candidate_name: String,
    /// Session length in whole seconds.
    pub interview_duration: u64,
    /// Chronological.
    pub events: Vec<Event>,
    pub created_at: DateTime<Utc>,
}

impl Report {
    pub fn from_outcome(candidate_name: impl Into<String>, outcome: &SessionOutcome) -> Self {
        Self {
            candidate_name: candidate_name.into(),
            interview_duration: outcome.duration_seconds(),
            events: outcome.events.clone(),
            created_at: outcome.ended_at,
        }
    }
}

/// A report as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    pub id: ReportId,
    #[serde(flatten)]
    pub report: Report,
}

/// Submission and retrieval against the report store.
#[async_trait]
pub trait ReportTransport: Send + Sync {
    async fn submit(&self, report: &Report) -> Result<ReportId, TransportError>;

    /// `TransportError::NotFound` when the store has no such report.
    async fn fetch(&self, id: &ReportId) -> Result<StoredReport, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn report_from_outcome() {
        let outcome = SessionOutcome {
            session_id: Uuid::new_v4(),
            events: vec![Event::new(EventKind::UserAbsent, t(12))],
            started_at: t(0),
            ended_at: t(95),
        };
        let report = Report::from_outcome("Ada Lovelace", &outcome);
        assert_eq!(report.interview_duration, 95);
        assert_eq!(report.created_at, t(95));
        assert_eq!(report.events.len(), 1);
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let report = Report {
            candidate_name: "Ada".into(),
            interview_duration: 60,
            events: vec![],
            created_at: t(0),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["candidateName"], "Ada");
        assert_eq!(json["interviewDuration"], 60);
        assert!(json["events"].is_array());
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn stored_report_flattens_id() {
        let json = r#"{
            "id": "abc123",
            "candidateName": "Ada",
            "interviewDuration": 42,
            "events": [{"kind": "user_absent", "timestamp": "2024-01-01T00:00:10Z"}],
            "createdAt": "2024-01-01T00:00:42Z"
        }"#;
        let stored: StoredReport = serde_json::from_str(json).unwrap();
        assert_eq!(stored.id, ReportId::from("abc123"));
        assert_eq!(stored.report.events[0].kind, EventKind::UserAbsent);
    }
}
