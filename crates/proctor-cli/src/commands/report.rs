use std::path::PathBuf;

use clap::Subcommand;
use proctor_core::error::Result;
use proctor_core::{HttpReportClient, IntegrityScorer, Report, ReportId, ReportTransport};
use serde_json::json;

use super::{load_config, read_json, runtime};

#[derive(Subcommand)]
pub enum ReportAction {
    /// Submit a report file to the report store
    Submit {
        /// Report JSON
        file: PathBuf,
    },
    /// Fetch a stored report by id
    Fetch {
        /// Report id assigned by the store
        id: String,
        /// Include the score breakdown
        #[arg(long)]
        score: bool,
    },
}

pub fn run(action: ReportAction) -> Result<()> {
    let config = load_config()?;
    let client = HttpReportClient::from_config(&config.transport)?;
    let rt = runtime()?;

    match action {
        ReportAction::Submit { file } => {
            let report: Report = read_json(&file)?;
            let id = rt.block_on(client.submit(&report))?;
            println!("{}", serde_json::to_string_pretty(&json!({ "reportId": id }))?);
        }
        ReportAction::Fetch { id, score } => {
            let stored = rt.block_on(client.fetch(&ReportId(id)))?;
            let output = if score {
                let scorer = IntegrityScorer::from_config(&config.scoring);
                let breakdown = scorer.breakdown(&stored.report.events);
                json!({ "report": stored, "breakdown": breakdown })
            } else {
                serde_json::to_value(&stored)?
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
