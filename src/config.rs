//! Client configuration
//!
//! An explicit configuration record for the Workflow client, with an
//! environment variable loader for hosts that configure through the
//! process environment.

use crate::error::WorkflowError;
use std::env;
use std::fmt;

/// Environment variable holding the GraphQL endpoint URL
pub const ENV_API_URL: &str = "WORKFLOW_API_URL";
/// Environment variable holding the numeric application id
pub const ENV_API_ID: &str = "WORKFLOW_API_ID";
/// Environment variable holding the Base64-encoded RSA private key
pub const ENV_PRIVATE_TOKEN: &str = "WORKFLOW_API_PRIVATE_TOKEN";
/// Environment variable holding the host application's base URL
pub const ENV_APP_URL: &str = "APP_URL";

/// Workflow client configuration
#[derive(Clone, Default)]
pub struct WorkflowConfig {
    /// GraphQL endpoint URL
    pub endpoint: String,
    /// Application id registered with the Workflow service
    pub app_id: i64,
    /// Base64-encoded PEM private key used to sign tokens
    pub private_key: String,
    /// Base URL of the host application, used for approval links
    pub app_url: Option<String>,
}

impl WorkflowConfig {
    /// Create a configuration from its three required values
    pub fn new(endpoint: impl Into<String>, app_id: i64, private_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            app_id,
            private_key: private_key.into(),
            app_url: None,
        }
    }

    /// Set the host application's base URL
    pub fn with_app_url(mut self, app_url: impl Into<String>) -> Self {
        self.app_url = Some(app_url.into());
        self
    }

    /// Load configuration from environment variables
    ///
    /// A `WORKFLOW_API_ID` that does not parse as an integer is read as 0,
    /// which [`WorkflowConfig::validate`] reports as missing.
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var(ENV_API_URL).unwrap_or_default(),
            app_id: env::var(ENV_API_ID)
                .ok()
                .and_then(|id| id.trim().parse().ok())
                .unwrap_or(0),
            private_key: env::var(ENV_PRIVATE_TOKEN).unwrap_or_default(),
            app_url: env::var(ENV_APP_URL).ok().filter(|url| !url.is_empty()),
        }
    }

    /// Check that every required value is present
    ///
    /// # Returns
    /// * `Ok(())` - All required values are set
    /// * `Err(WorkflowError::Config)` - Lists every missing value, not just the first
    pub fn validate(&self) -> Result<(), WorkflowError> {
        let mut missing = Vec::new();

        if self.endpoint.trim().is_empty() {
            missing.push("endpoint (WORKFLOW_API_URL)");
        }
        if self.app_id <= 0 {
            missing.push("app_id (WORKFLOW_API_ID)");
        }
        if self.private_key.trim().is_empty() {
            missing.push("private_key (WORKFLOW_API_PRIVATE_TOKEN)");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::Config { missing })
        }
    }

    /// Link to the approval page for a request in the host application
    pub fn approval_link(&self, request_id: &str) -> String {
        let base = self.app_url.as_deref().unwrap_or("").trim_end_matches('/');
        format!("{}/approvals/{}", base, request_id)
    }
}

// Keeps the signing key out of logs
impl fmt::Debug for WorkflowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowConfig")
            .field("endpoint", &self.endpoint)
            .field("app_id", &self.app_id)
            .field("private_key", &"<redacted>")
            .field("app_url", &self.app_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn missing_of(config: &WorkflowConfig) -> Vec<&'static str> {
        match config.validate() {
            Err(WorkflowError::Config { missing }) => missing,
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_complete_config() {
        let config = WorkflowConfig::new("http://localhost/graphql", 7, "a2V5");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_lists_all_missing_values() {
        let config = WorkflowConfig::new("", 7, "");
        let missing = missing_of(&config);
        assert_eq!(missing.len(), 2);
        assert!(missing[0].contains("endpoint"));
        assert!(missing[1].contains("key"));
    }

    #[test]
    fn test_validate_rejects_non_positive_app_id() {
        let missing = missing_of(&WorkflowConfig::new("http://x", 0, "k"));
        assert_eq!(missing, vec!["app_id (WORKFLOW_API_ID)"]);

        let missing = missing_of(&WorkflowConfig::new("http://x", -3, "k"));
        assert_eq!(missing, vec!["app_id (WORKFLOW_API_ID)"]);
    }

    #[test]
    fn test_validate_blank_values_count_as_missing() {
        let missing = missing_of(&WorkflowConfig::new("   ", 0, "\n"));
        assert_eq!(missing.len(), 3);
    }

    #[test]
    fn test_approval_link() {
        let config = WorkflowConfig::new("http://x", 1, "k").with_app_url("https://pms.example.com/");
        assert_eq!(
            config.approval_link("R1"),
            "https://pms.example.com/approvals/R1"
        );

        let config = WorkflowConfig::new("http://x", 1, "k");
        assert_eq!(config.approval_link("R2"), "/approvals/R2");
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config = WorkflowConfig::new("http://x", 1, "super-secret-key");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-key"));
        assert!(debug.contains("http://x"));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(ENV_API_URL, "http://workflow.local/graphql");
        env::set_var(ENV_API_ID, "42");
        env::set_var(ENV_PRIVATE_TOKEN, "c2VjcmV0");
        env::set_var(ENV_APP_URL, "https://pms.local");

        let config = WorkflowConfig::from_env();
        assert_eq!(config.endpoint, "http://workflow.local/graphql");
        assert_eq!(config.app_id, 42);
        assert_eq!(config.private_key, "c2VjcmV0");
        assert_eq!(config.app_url.as_deref(), Some("https://pms.local"));

        env::remove_var(ENV_API_URL);
        env::remove_var(ENV_API_ID);
        env::remove_var(ENV_PRIVATE_TOKEN);
        env::remove_var(ENV_APP_URL);
    }

    #[test]
    #[serial]
    fn test_from_env_non_numeric_id_is_missing() {
        env::set_var(ENV_API_URL, "http://workflow.local/graphql");
        env::set_var(ENV_API_ID, "not-a-number");
        env::remove_var(ENV_PRIVATE_TOKEN);
        env::remove_var(ENV_APP_URL);

        let config = WorkflowConfig::from_env();
        assert_eq!(config.app_id, 0);
        assert_eq!(config.app_url, None);
        let missing = missing_of(&config);
        assert_eq!(
            missing,
            vec![
                "app_id (WORKFLOW_API_ID)",
                "private_key (WORKFLOW_API_PRIVATE_TOKEN)"
            ]
        );

        env::remove_var(ENV_API_URL);
        env::remove_var(ENV_API_ID);
    }
}
