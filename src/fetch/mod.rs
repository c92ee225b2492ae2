//! Paginated ticket search.
//!
//! [`paginate`] walks the search endpoint page by page through any
//! [`SearchTransport`]; [`fetch`] wires it to the HTTP [`JiraClient`].

pub mod client;

pub use client::{BearerToken, JiraClient, DEFAULT_TIMEOUT};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::ticket::{Ticket, TicketBatch};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("missing critical input: {0}")]
    MissingInput(&'static str),

    #[error("page size must be a positive integer")]
    InvalidPageSize,

    #[error("timeout error occurred while requesting {url}")]
    Timeout { url: String },

    #[error("connection error occurred while requesting {url}: {message}")]
    Connection { url: String, message: String },

    #[error("an error occurred during the request: {0}")]
    Request(String),

    #[error("HTTP error occurred: status {status}")]
    Status { status: u16, body: String },

    #[error("could not decode JSON response from Jira: {reason}")]
    MalformedBody { reason: String, body: String },
}

impl FetchError {
    /// Raw response body, when the server sent one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            FetchError::Status { body, .. } | FetchError::MalformedBody { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

/// Body of one search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub jql: String,
    pub start_at: usize,
    pub max_results: u32,
    pub fields: Vec<String>,
}

/// One page of search results.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Ticket>,
    /// Total matches reported by the server. Absent means zero.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Anything that can answer a single search request.
#[async_trait::async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, FetchError>;
}

/// Collect every ticket matching `query`, one page at a time.
///
/// Stops once the running offset reaches the total reported by the first
/// page, or as soon as a page comes back empty. Any failure aborts the
/// whole walk; tickets from earlier pages are dropped with it.
pub async fn paginate<T>(
    transport: &T,
    query: &str,
    fields: &[String],
    page_size: u32,
) -> Result<TicketBatch, FetchError>
where
    T: SearchTransport + ?Sized,
{
    if query.trim().is_empty() {
        return Err(FetchError::MissingInput("jql_query"));
    }
    if page_size == 0 {
        return Err(FetchError::InvalidPageSize);
    }

    let mut batch = TicketBatch::new();
    let mut start_at = 0usize;
    let mut expected_total: Option<usize> = None;

    loop {
        let request = SearchRequest {
            jql: query.to_string(),
            start_at,
            max_results: page_size,
            fields: fields.to_vec(),
        };
        info!(
            from = start_at,
            to = start_at + page_size as usize - 1,
            "requesting issues"
        );

        let page = transport.search(&request).await?;

        let total = *expected_total.get_or_insert_with(|| {
            let total = page
                .total
                .map_or(0, |t| usize::try_from(t).unwrap_or(usize::MAX));
            info!(total, "total issues found by JQL");
            total
        });

        let on_page = page.issues.len();
        batch.extend(page.issues);
        start_at += on_page;
        info!(on_page, fetched = batch.len(), "fetched issues in this batch");

        if start_at >= total || on_page == 0 {
            info!(fetched = batch.len(), "all issues fetched or no more issues to fetch");
            break;
        }
    }

    Ok(batch)
}

/// Fetch every ticket matching `query` from the server at `endpoint`.
///
/// `timeout` bounds each search request, not the whole walk.
pub async fn fetch(
    endpoint: &str,
    credentials: &BearerToken,
    query: &str,
    requested_fields: &[String],
    page_size: u32,
    timeout: Duration,
) -> Result<TicketBatch, FetchError> {
    let client = JiraClient::new(endpoint, credentials.clone())?.with_timeout(timeout);
    info!(url = %client.search_url(), jql = %query, "fetching tickets");
    paginate(&client, query, requested_fields, page_size).await
}
