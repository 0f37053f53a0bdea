//! Error types for the Workflow client
//!
//! Every failure a caller can see is one of the variants below, so callers
//! match on the kind instead of on message text.

use thiserror::Error;

/// Errors returned by [`crate::client::WorkflowClient`]
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// One or more required configuration values are missing
    #[error("Missing required workflow configuration: {}", .missing.join(", "))]
    Config {
        /// Every missing value, named as `field (ENV_VAR)`
        missing: Vec<&'static str>,
    },

    /// Token signing failed
    #[error("Token signing failed (invalid or non-Base64 private key?): {0}")]
    Signing(String),

    /// The service rejected the bearer token (HTTP 401/403)
    #[error("Workflow API authentication failed with HTTP {status} (invalid or unauthorized token)")]
    Authentication {
        /// HTTP status returned by the service
        status: u16,
    },

    /// Network failure, unexpected status, or malformed response body
    #[error("Failed to fetch data from Workflow API: {0}")]
    Fetch(String),

    /// Lookup by external reference id failed
    #[error("Failed to retrieve workflow request for reference {reference_id}: {source}")]
    RetrievalFailed {
        /// The reference id that was looked up
        reference_id: String,
        /// Underlying failure
        #[source]
        source: Box<WorkflowError>,
    },

    /// Building the pending-actions summary failed
    #[error("Workflow pending actions failed: {source}")]
    PendingActionsFailed {
        /// Underlying failure
        #[source]
        source: Box<WorkflowError>,
    },
}

impl WorkflowError {
    /// The innermost error, looking through the operation-level wrappers
    pub fn root(&self) -> &WorkflowError {
        match self {
            WorkflowError::RetrievalFailed { source, .. }
            | WorkflowError::PendingActionsFailed { source } => source.root(),
            other => other,
        }
    }

    /// True if the root cause is an HTTP 401/403 from the service
    pub fn is_authentication(&self) -> bool {
        matches!(self.root(), WorkflowError::Authentication { .. })
    }

    /// True if the root cause is a generic fetch failure
    pub fn is_fetch(&self) -> bool {
        matches!(self.root(), WorkflowError::Fetch(_))
    }
}
