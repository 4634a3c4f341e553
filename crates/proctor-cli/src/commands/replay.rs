use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use proctor_core::error::{CoreError, Result};
use proctor_core::{
    FaceObservation, HttpReportClient, IntegrityScorer, MonitorSession, ObjectObservation,
    Report, ReportTransport, Sample,
};
use serde::Deserialize;
use serde_json::json;

use super::{load_config, read_json, runtime};

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON array of recorded samples
    file: PathBuf,
    /// Candidate name written into the report
    #[arg(long, default_value = "anonymous")]
    candidate: String,
    /// Session start instant (RFC 3339); defaults to now
    #[arg(long)]
    start: Option<DateTime<Utc>>,
    /// End the session this many ms after start instead of at the last sample
    #[arg(long)]
    end_ms: Option<u64>,
    /// Submit the resulting report to the configured report store
    #[arg(long)]
    submit: bool,
}

/// One entry of a recorded sample file.
///
/// A skipped entry stands for a sampling period whose perception failed:
/// time passes, but nothing is observed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordedSample {
    at_ms: u64,
    #[serde(default)]
    skipped: bool,
    #[serde(default)]
    faces: Vec<FaceObservation>,
    #[serde(default)]
    objects: Vec<ObjectObservation>,
}

/// Instant `ms` after `start`, rejecting offsets chrono cannot represent.
fn offset(start: DateTime<Utc>, ms: u64) -> Result<DateTime<Utc>> {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| start.checked_add_signed(Duration::milliseconds(ms)))
        .ok_or_else(|| CoreError::Custom(format!("offset of {ms} ms is out of range")))
}

pub fn run(args: ReplayArgs) -> Result<()> {
    let config = load_config()?;
    let mut recorded: Vec<RecordedSample> = read_json(&args.file)?;
    recorded.sort_by_key(|s| s.at_ms);

    let start = args.start.unwrap_or_else(Utc::now);

    let mut session = MonitorSession::new(&config, start)?;
    tracing::debug!(samples = recorded.len(), %start, "replaying recorded samples");
    for entry in recorded.iter() {
        let now = offset(start, entry.at_ms)?;
        if entry.skipped {
            session.fire_due(now);
        } else {
            let sample = Sample::new(entry.faces.clone(), entry.objects.clone());
            session.observe(&sample, now);
        }
    }

    let last_ms = recorded.last().map(|s| s.at_ms).unwrap_or(0);
    let end = offset(start, args.end_ms.unwrap_or(last_ms).max(last_ms))?;
    session.fire_due(end);
    let outcome = session.terminate(end);

    let scorer = IntegrityScorer::from_config(&config.scoring);
    let report = Report::from_outcome(args.candidate, &outcome);

    let report_id = if args.submit {
        let client = HttpReportClient::from_config(&config.transport)?;
        let id = runtime()?.block_on(client.submit(&report))?;
        Some(id)
    } else {
        None
    };

    let output = json!({
        "sessionId": outcome.session_id,
        "events": outcome.events,
        "breakdown": scorer.breakdown(&outcome.events),
        "report": report,
        "reportId": report_id,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
