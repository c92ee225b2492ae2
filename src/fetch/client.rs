use std::fmt;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use tracing::{debug, error};

use super::{FetchError, SearchPage, SearchRequest, SearchTransport};

/// Search endpoint, relative to the server origin.
pub const SEARCH_PATH: &str = "/rest/api/latest/search";

/// Timeout applied to every search request unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Static personal access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// HTTP transport for `POST {base}/rest/api/latest/search`.
pub struct JiraClient {
    http: Client,
    base_url: String,
    token: BearerToken,
    timeout: Duration,
}

impl JiraClient {
    /// Build a client for the server at `base_url`.
    pub fn new(base_url: &str, token: BearerToken) -> Result<Self, FetchError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(FetchError::MissingInput("jira_base_url"));
        }
        if token.is_empty() {
            return Err(FetchError::MissingInput("access_token"));
        }

        let http = Client::builder()
            .build()
            .map_err(|e| FetchError::Request(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            token,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }

    fn classify(url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_connect() {
            FetchError::Connection {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            FetchError::Request(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl SearchTransport for JiraClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, FetchError> {
        let url = self.search_url();
        debug!(%url, start_at = request.start_at, "POST search");

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.token.expose())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| Self::classify(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::classify(&url, e))?;

        if !status.is_success() {
            error!(status = status.as_u16(), response = %body, "search request rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(response = %body, "search response is not valid JSON");
            FetchError::MalformedBody {
                reason: e.to_string(),
                body,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_is_fixed() {
        let client = JiraClient::new("https://jira.example.com/", BearerToken::new("t")).unwrap();
        assert_eq!(
            client.search_url(),
            "https://jira.example.com/rest/api/latest/search"
        );
    }

    #[test]
    fn test_token_debug_is_masked() {
        let token = BearerToken::new("super-secret");
        assert_eq!(format!("{:?}", token), "BearerToken(***)");
        assert_eq!(token.expose(), "super-secret");
    }

    #[test]
    fn test_blank_inputs_rejected() {
        assert!(matches!(
            JiraClient::new("  ", BearerToken::new("t")),
            Err(FetchError::MissingInput("jira_base_url"))
        ));
        assert!(matches!(
            JiraClient::new("https://jira.example.com", BearerToken::new(" ")),
            Err(FetchError::MissingInput("access_token"))
        ));
    }
}
