use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use jira_export::config::{ExportConfig, DEFAULT_CONFIG_FILE};
use jira_export::RunOutcome;

#[derive(Parser)]
#[command(
    name = "jira-export",
    about = "Export Jira search results to JSON files",
    version,
    long_about = None
)]
struct Cli {
    /// Configuration file (JSON, or TOML when it ends in .toml)
    #[arg(long, short, env = "JIRA_EXPORT_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Print an example configuration and exit
    #[arg(long)]
    print_example_config: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if cli.print_example_config {
        println!("{}", ExportConfig::example_json()?);
        return Ok(ExitCode::SUCCESS);
    }

    let outcome = jira_export::run(&cli.config).await;
    match &outcome {
        RunOutcome::Exported(report) => {
            println!("\n=== Jira Export ===");
            for file in &report.written {
                println!(" - {} ({} tickets)", file.path.display(), file.tickets);
            }
            for failure in &report.failures {
                println!(" ! {}", failure);
            }
            println!("Saved {} tickets.", report.tickets_written());
        }
        RunOutcome::NoTickets => println!("Ticket fetching returned no tickets."),
        RunOutcome::ExampleShown => {}
        RunOutcome::Failed(stage) => println!("Export stopped at the {} stage.", stage),
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
