//! Export configuration: search credentials, query, output layout and
//! field exclusions.
//!
//! The file is JSON by default (`jira-config.json` in the working
//! directory). A path ending in `.toml` is read as TOML with the same keys.

mod example;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::redact::ExclusionSpec;

/// Configuration file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "jira-config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read configuration file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse configuration file '{}': {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("missing critical configuration: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    #[error("invalid configuration value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for one export run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Personal access token sent as `Authorization: Bearer`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// API origin, e.g. `https://jira.example.com`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jira_base_url: Option<String>,
    /// JQL passed verbatim to the search endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jql_query: Option<String>,
    /// Fields requested for every issue.
    pub fields: Vec<String>,
    /// Page size for each search request.
    pub max_results: u32,
    /// Output file stem; chunk indices are appended directly to it.
    pub export_filename: String,
    /// Output format. Only `json` is supported.
    pub export_format: String,
    /// Split output into files of at most this many tickets.
    ///
    /// Anything other than a positive integer means a single file.
    #[serde(
        deserialize_with = "lenient_positive",
        skip_serializing_if = "Option::is_none"
    )]
    pub tickets_per_file: Option<usize>,
    /// Top-level keys removed from every ticket.
    pub global_key_exclusions: BTreeSet<String>,
    /// `fields` sub-key -> dotted paths removed inside that sub-key.
    pub ticket_field_exclusions: BTreeMap<String, Vec<String>>,
    /// Per-request timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            jira_base_url: None,
            jql_query: None,
            fields: vec!["key".to_string(), "summary".to_string()],
            max_results: 100,
            export_filename: "jira_tickets".to_string(),
            export_format: "json".to_string(),
            tickets_per_file: None,
            global_key_exclusions: BTreeSet::new(),
            ticket_field_exclusions: BTreeMap::new(),
            request_timeout_secs: 30,
        }
    }
}

/// Source syntax of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Syntax {
    Json,
    Toml,
}

impl Syntax {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Syntax::Toml,
            _ => Syntax::Json,
        }
    }
}

impl ExportConfig {
    /// Load and validate configuration from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let syntax = Syntax::of(path);
        debug!(path = %path.display(), ?syntax, "parsing configuration");
        let config: Self = match syntax {
            Syntax::Json => serde_json::from_str(&content).map_err(|e| e.to_string()),
            Syntax::Toml => toml::from_str(&content).map_err(|e| e.to_string()),
        }
        .map_err(|reason| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        })?;

        config.validate()?;
        info!(path = %path.display(), "configuration loaded successfully");
        Ok(config)
    }

    /// Check required keys and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if is_blank(&self.access_token) {
            missing.push("access_token");
        }
        if is_blank(&self.jira_base_url) {
            missing.push("jira_base_url");
        }
        if is_blank(&self.jql_query) {
            missing.push("jql_query");
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired(missing));
        }

        if self.max_results == 0 {
            return Err(ConfigError::Invalid {
                key: "max_results",
                reason: "page size must be a positive integer".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    pub fn access_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or_default()
    }

    pub fn jira_base_url(&self) -> &str {
        self.jira_base_url.as_deref().unwrap_or_default()
    }

    pub fn jql_query(&self) -> &str {
        self.jql_query.as_deref().unwrap_or_default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Exclusions to apply to every fetched ticket.
    pub fn exclusion_spec(&self) -> ExclusionSpec {
        ExclusionSpec {
            global_keys: self.global_key_exclusions.clone(),
            field_paths: self.ticket_field_exclusions.clone(),
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Accept any value for `tickets_per_file`, keeping only positive integers.
fn lenient_positive<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Int(i64),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Int(n)) if n > 0 => usize::try_from(n).ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ExportConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = parse("{}");
        assert_eq!(cfg.fields, vec!["key", "summary"]);
        assert_eq!(cfg.max_results, 100);
        assert_eq!(cfg.export_filename, "jira_tickets");
        assert_eq!(cfg.export_format, "json");
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
        assert!(cfg.tickets_per_file.is_none());
        assert!(cfg.exclusion_spec().is_empty());
    }

    #[test]
    fn test_tickets_per_file_is_lenient() {
        assert_eq!(parse(r#"{"tickets_per_file": 20}"#).tickets_per_file, Some(20));
        assert_eq!(parse(r#"{"tickets_per_file": 0}"#).tickets_per_file, None);
        assert_eq!(parse(r#"{"tickets_per_file": -3}"#).tickets_per_file, None);
        assert_eq!(parse(r#"{"tickets_per_file": "ten"}"#).tickets_per_file, None);
        assert_eq!(parse(r#"{"tickets_per_file": 2.5}"#).tickets_per_file, None);
        assert_eq!(parse(r#"{"tickets_per_file": null}"#).tickets_per_file, None);
    }

    #[test]
    fn test_missing_required_keys_are_listed() {
        let cfg = parse(r#"{"access_token": "t", "jql_query": "  "}"#);
        match cfg.validate() {
            Err(ConfigError::MissingRequired(keys)) => {
                assert_eq!(keys, vec!["jira_base_url", "jql_query"]);
            }
            other => panic!("expected MissingRequired, got {:?}", other),
        }
    }

    #[test]
    fn test_api_version_key_is_ignored() {
        let cfg = parse(
            r#"{"access_token": "t", "jira_base_url": "http://x", "jql_query": "q", "jira_api_version": "3"}"#,
        );
        assert!(cfg.validate().is_ok());
        let round_trip = serde_json::to_value(&cfg).unwrap();
        assert!(round_trip.get("jira_api_version").is_none());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let cfg = parse(
            r#"{"access_token": "t", "jira_base_url": "http://x", "jql_query": "q", "max_results": 0}"#,
        );
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { key: "max_results", .. })
        ));
    }

    #[test]
    fn test_exclusion_spec_from_config() {
        let cfg = parse(
            r#"{
                "global_key_exclusions": ["self", "expand"],
                "ticket_field_exclusions": {"status": ["self", "statusCategory.self"]}
            }"#,
        );
        let spec = cfg.exclusion_spec();
        assert!(spec.global_keys.contains("self"));
        assert!(spec.global_keys.contains("expand"));
        assert_eq!(
            spec.field_paths["status"],
            vec!["self".to_string(), "statusCategory.self".to_string()]
        );
    }

    #[test]
    fn test_load_json_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("jira-config.json");
        std::fs::write(
            &path,
            r#"{
                "access_token": "secret",
                "jira_base_url": "https://jira.example.com",
                "jql_query": "project = OPS",
                "max_results": 50,
                "unknown_key": true
            }"#,
        )
        .unwrap();

        let cfg = ExportConfig::load(&path).unwrap();
        assert_eq!(cfg.jira_base_url(), "https://jira.example.com");
        assert_eq!(cfg.max_results, 50);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("jira-config.toml");
        std::fs::write(
            &path,
            r#"
access_token = "secret"
jira_base_url = "https://jira.example.com"
jql_query = "project = OPS"
tickets_per_file = 25
global_key_exclusions = ["self"]

[ticket_field_exclusions]
comment = ["comments.author.self"]
"#,
        )
        .unwrap();

        let cfg = ExportConfig::load(&path).unwrap();
        assert_eq!(cfg.jql_query(), "project = OPS");
        assert_eq!(cfg.tickets_per_file, Some(25));
        assert_eq!(
            cfg.ticket_field_exclusions["comment"],
            vec!["comments.author.self".to_string()]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let result = ExportConfig::load(Path::new("/nonexistent/jira-config.json"));
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_load_garbage_is_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("jira-config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ExportConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
