use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "proctor", version, about = "Proctor attention monitoring CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Run a recorded sample file through a monitoring session
    Replay(commands::replay::ReplayArgs),
    /// Score an event log or report file
    Score(commands::score::ScoreArgs),
    /// Submit and fetch reports
    Report {
        #[command(subcommand)]
        action: commands::report::ReportAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Config { action } => commands::config::run(action),
        Commands::Replay(args) => commands::replay::run(args),
        Commands::Score(args) => commands::score::run(args),
        Commands::Report { action } => commands::report::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
