//! jira-export -- batch export of Jira search results to JSON files.
//!
//! A run loads the configuration, pages through the search endpoint,
//! strips configured fields from every ticket and writes the result as
//! one or more JSON files.

pub mod config;
pub mod export;
pub mod fetch;
pub mod redact;
pub mod ticket;

use std::path::Path;

use tracing::{error, warn};

use crate::config::ExportConfig;
use crate::export::ExportReport;
use crate::fetch::{BearerToken, FetchError, SearchTransport};
use crate::ticket::TicketBatch;

/// Pipeline stage that stopped a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Fetch,
    Write,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Config => write!(f, "config"),
            Stage::Fetch => write!(f, "fetch"),
            Stage::Write => write!(f, "write"),
        }
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Tickets were written; the report lists every file attempt.
    Exported(ExportReport),
    /// The query matched nothing, so nothing was written.
    NoTickets,
    /// No configuration file existed; the example config was printed.
    ExampleShown,
    Failed(Stage),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            RunOutcome::Exported(report) => report.is_complete(),
            RunOutcome::NoTickets | RunOutcome::ExampleShown => true,
            RunOutcome::Failed(_) => false,
        }
    }
}

/// Run a full export using the configuration file at `config_path`.
pub async fn run(config_path: &Path) -> RunOutcome {
    if !config_path.exists() {
        warn!(
            path = %config_path.display(),
            "configuration file not found; create it with your Jira details"
        );
        return match ExportConfig::example_json() {
            Ok(example) => {
                println!("Example {}:", config_path.display());
                println!("{}", example);
                RunOutcome::ExampleShown
            }
            Err(e) => {
                error!(error = %e, "could not render example configuration");
                RunOutcome::Failed(Stage::Config)
            }
        };
    }

    let config = match ExportConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "could not load configuration");
            return RunOutcome::Failed(Stage::Config);
        }
    };

    let fetched = fetch::fetch(
        config.jira_base_url(),
        &BearerToken::new(config.access_token()),
        config.jql_query(),
        &config.fields,
        config.max_results,
        config.request_timeout(),
    )
    .await;

    deliver(&config, fetched)
}

/// Fetch, redact and write tickets through `transport`.
pub async fn run_with_transport<T>(config: &ExportConfig, transport: &T) -> RunOutcome
where
    T: SearchTransport + ?Sized,
{
    let fetched = fetch::paginate(
        transport,
        config.jql_query(),
        &config.fields,
        config.max_results,
    )
    .await;

    deliver(config, fetched)
}

/// Redact and write a fetched batch.
fn deliver(config: &ExportConfig, fetched: Result<TicketBatch, FetchError>) -> RunOutcome {
    let mut batch = match fetched {
        Ok(batch) => batch,
        Err(e) => {
            error!(error = %e, "ticket fetching failed");
            return RunOutcome::Failed(Stage::Fetch);
        }
    };

    if batch.is_empty() {
        warn!("ticket fetching returned no tickets; nothing to save");
        return RunOutcome::NoTickets;
    }

    redact::redact(&mut batch, &config.exclusion_spec());

    match export::write_batch(
        &batch,
        &config.export_filename,
        &config.export_format,
        config.tickets_per_file,
    ) {
        Ok(report) => {
            if !report.is_complete() {
                error!(
                    failed = report.failures.len(),
                    written = report.written.len(),
                    "some export files could not be written"
                );
            }
            RunOutcome::Exported(report)
        }
        Err(e) => {
            error!(error = %e, "could not save tickets");
            RunOutcome::Failed(Stage::Write)
        }
    }
}
