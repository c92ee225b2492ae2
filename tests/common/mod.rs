//! In-process stand-in for the Jira search endpoint.
//!
//! Not every test file uses every helper.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

pub const SEARCH_PATH: &str = "/rest/api/latest/search";

/// One request as the fake server saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
pub struct FakeJira {
    issues: Arc<Vec<Value>>,
    reported_total: Option<u64>,
    pub seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl FakeJira {
    pub fn with_issues(issues: Vec<Value>) -> Self {
        let total = issues.len() as u64;
        Self {
            issues: Arc::new(issues),
            reported_total: Some(total),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn reporting_total(mut self, total: u64) -> Self {
        self.reported_total = Some(total);
        self
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route(SEARCH_PATH, post(search))
            .with_state(self.clone())
    }
}

async fn search(
    State(fake): State<FakeJira>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let len = fake.issues.len();
    let start = (body["startAt"].as_u64().unwrap_or(0) as usize).min(len);
    let max = body["maxResults"].as_u64().unwrap_or(50) as usize;
    let end = (start + max).min(len);

    fake.seen.lock().unwrap().push(SeenRequest { headers, body });

    let mut page = json!({
        "startAt": start,
        "maxResults": max,
        "issues": fake.issues[start..end].to_vec(),
    });
    if let Some(total) = fake.reported_total {
        page["total"] = json!(total);
    }
    Json(page)
}

/// A search endpoint that always answers with `status` and `body`.
pub fn fixed_response(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(SEARCH_PATH, post(move || async move { (status, body) }))
}

/// A search endpoint that answers only after `delay`.
pub fn slow_response(delay: Duration) -> Router {
    Router::new().route(
        SEARCH_PATH,
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(json!({ "issues": [], "total": 0 }))
        }),
    )
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// `count` issues shaped like real search results.
pub fn sample_issues(count: usize) -> Vec<Value> {
    (1..=count)
        .map(|i| {
            json!({
                "expand": "operations,versionedRepresentations",
                "id": format!("{}", 10000 + i),
                "self": format!("https://jira.example.com/rest/api/2/issue/{}", 10000 + i),
                "key": format!("OPS-{i}"),
                "fields": {
                    "summary": format!("Ticket number {i}"),
                    "status": {
                        "self": "https://jira.example.com/rest/api/2/status/6",
                        "name": "Closed",
                        "statusCategory": {
                            "self": "https://jira.example.com/rest/api/2/statuscategory/3",
                            "key": "done"
                        }
                    },
                    "comment": {
                        "comments": [
                            { "self": "c1", "id": "1", "author": { "self": "u1", "name": "ann" } },
                            { "self": "c2", "id": "2", "author": { "self": "u2", "name": "bob" } }
                        ],
                        "total": 2
                    }
                }
            })
        })
        .collect()
}
