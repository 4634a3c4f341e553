use std::path::PathBuf;

use clap::Args;
use proctor_core::error::Result;
use proctor_core::{Event, IntegrityScorer, Report};
use serde::Deserialize;

use super::{load_config, read_json};

#[derive(Args)]
pub struct ScoreArgs {
    /// Event array, report, or stored report JSON
    file: PathBuf,
}

/// Accepted inputs. A stored report flattens into the report shape, so
/// its extra `id` is ignored.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreInput {
    Events(Vec<Event>),
    Report(Report),
}

impl ScoreInput {
    fn into_events(self) -> Vec<Event> {
        match self {
            ScoreInput::Events(events) => events,
            ScoreInput::Report(report) => report.events,
        }
    }
}

pub fn run(args: ScoreArgs) -> Result<()> {
    let config = load_config()?;
    let input: ScoreInput = read_json(&args.file)?;
    let scorer = IntegrityScorer::from_config(&config.scoring);
    let breakdown = scorer.breakdown(&input.into_events());
    println!("{}", serde_json::to_string_pretty(&breakdown)?);
    Ok(())
}
