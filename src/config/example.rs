//! Sample configuration shown to first-time users.

use std::collections::{BTreeMap, BTreeSet};

use super::ExportConfig;

impl ExportConfig {
    /// A filled-in configuration with placeholder credentials.
    pub fn example() -> Self {
        let fields = [
            "key",
            "summary",
            "status",
            "assignee",
            "reporter",
            "priority",
            "issuetype",
            "created",
            "updated",
            "description",
            "resolution",
        ];

        let mut ticket_field_exclusions = BTreeMap::new();
        ticket_field_exclusions.insert(
            "status".to_string(),
            vec!["self".to_string(), "statusCategory.self".to_string()],
        );
        ticket_field_exclusions.insert(
            "assignee".to_string(),
            vec!["self".to_string(), "avatarUrls".to_string()],
        );

        Self {
            access_token: Some("YOUR_JIRA_ACCESS_TOKEN".to_string()),
            jira_base_url: Some("https://your-jira-instance.com".to_string()),
            jql_query: Some("project = YOUR_PROJECT AND status = Open".to_string()),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            max_results: 50,
            export_filename: "my_jira_tickets".to_string(),
            tickets_per_file: Some(500),
            global_key_exclusions: BTreeSet::from(["self".to_string(), "expand".to_string()]),
            ticket_field_exclusions,
            ..Self::default()
        }
    }

    /// The example configuration as pretty-printed JSON.
    pub fn example_json() -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::example())
    }
}
