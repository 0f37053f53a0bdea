//! Workflow API client
//!
//! HTTP client for the Workflow service's GraphQL endpoint. Every call signs
//! a fresh application token, POSTs one GraphQL operation and maps the
//! `data` payload into the records in [`crate::models`].

use crate::auth::sign_app_token;
use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::graphql_types::{GraphQLRequest, GraphQLResponse};
use crate::models::{
    self, CreatedRequest, NewWorkflowRequest, PendingAction, PendingActions, WorkflowApp,
    WorkflowAppRequest,
};
use crate::queries;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Application name reported in pending-action summaries
pub const PENDING_ACTIONS_APP_NAME: &str = "PMS";
/// Description of a pending approval action
pub const PENDING_APPROVAL_DESCRIPTION: &str = "Pending Approval";

/// Client for the Workflow service
///
/// Holds only immutable configuration and a pooled HTTP client, so clones
/// are cheap and calls may run concurrently.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    config: WorkflowConfig,
    http: reqwest::Client,
}

impl WorkflowClient {
    /// Create a client, validating the configuration
    ///
    /// # Errors
    /// * `WorkflowError::Config` - Listing every missing required value
    pub fn new(config: WorkflowConfig) -> Result<Self, WorkflowError> {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a client that shares an existing HTTP client (connection pooling)
    pub fn with_http_client(
        config: WorkflowConfig,
        http: reqwest::Client,
    ) -> Result<Self, WorkflowError> {
        config.validate().inspect_err(|e| {
            tracing::error!(error = %e, "Invalid Workflow client configuration");
        })?;
        Ok(Self { config, http })
    }

    /// Create a client from `WORKFLOW_API_*` environment variables
    pub fn from_env() -> Result<Self, WorkflowError> {
        Self::new(WorkflowConfig::from_env())
    }

    /// Configured application id
    pub fn app_id(&self) -> i64 {
        self.config.app_id
    }

    /// Configured GraphQL endpoint
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Sign a new application token
    ///
    /// Tokens are never cached; each outbound request gets its own.
    pub fn get_token(&self) -> Result<String, WorkflowError> {
        sign_app_token(self.config.app_id, &self.config.private_key)
    }

    /// Execute one GraphQL operation and return its `data` payload
    ///
    /// # Returns
    /// * `Ok(Value)` - The `data` object, or `Value::Null` when absent
    /// * `Err(WorkflowError)` - Signing, authentication or fetch failure
    ///
    /// # Errors
    /// * `Signing` - The private key could not be used; no request is sent
    /// * `Authentication` - The service answered 401 or 403
    /// * `Fetch` - Network failure, any other non-200 status, or a body
    ///   that is not a GraphQL JSON envelope
    pub async fn fetch_graphql(&self, request: &GraphQLRequest) -> Result<Value, WorkflowError> {
        let operation = request.operation_name;

        let token = self.get_token().inspect_err(|e| {
            tracing::error!(operation = %operation, error = %e, "Failed to sign Workflow API token");
        })?;

        tracing::debug!(
            operation = %operation,
            endpoint = %self.config.endpoint,
            app_id = self.config.app_id,
            "Calling Workflow API"
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(token)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(operation = %operation, error = %e, "GraphQL API Error");
                WorkflowError::Fetch(format!("failed to send HTTP request: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::error!(
                operation = %operation,
                status_code = status.as_u16(),
                "Workflow API rejected the application token"
            );
            return Err(WorkflowError::Authentication {
                status: status.as_u16(),
            });
        }

        if status != StatusCode::OK {
            let status_code = status.as_u16();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());

            tracing::error!(
                operation = %operation,
                status_code = status_code,
                error_body = %error_body,
                "Workflow API returned unexpected status"
            );

            return Err(WorkflowError::Fetch(format!(
                "unexpected response status {}: {}",
                status_code, error_body
            )));
        }

        let response_body = response.text().await.map_err(|e| {
            tracing::error!(operation = %operation, error = %e, "Failed to read Workflow API response");
            WorkflowError::Fetch(format!("failed to read response body: {}", e))
        })?;

        let envelope: GraphQLResponse = serde_json::from_str(&response_body).map_err(|e| {
            tracing::error!(
                operation = %operation,
                error = %e,
                response_body = %response_body,
                "Failed to parse Workflow API response"
            );
            WorkflowError::Fetch(format!("failed to parse JSON response: {}", e))
        })?;

        if let Some(errors) = envelope.errors.as_ref().filter(|errors| !errors.is_empty()) {
            tracing::warn!(
                operation = %operation,
                error_count = errors.len(),
                first_error = %errors[0].message,
                "Workflow API returned GraphQL errors"
            );
        }

        tracing::debug!(operation = %operation, "Received Workflow API response");

        Ok(envelope.data.unwrap_or(Value::Null))
    }

    /// Run `request` and map the result stored under its operation name
    async fn query<T: DeserializeOwned>(
        &self,
        request: GraphQLRequest,
    ) -> Result<Option<T>, WorkflowError> {
        let data = self.fetch_graphql(&request).await?;

        models::extract(&data, request.operation_name).map_err(|e| {
            tracing::error!(
                operation = %request.operation_name,
                error = %e,
                "Workflow API payload did not match the expected shape"
            );
            WorkflowError::Fetch(format!(
                "malformed {} payload: {}",
                request.operation_name, e
            ))
        })
    }

    /// List the workflows configured for this application
    pub async fn list_app_workflows(&self) -> Result<Vec<WorkflowApp>, WorkflowError> {
        let workflows: Option<Vec<WorkflowApp>> = self
            .query(queries::app_workflows(self.config.app_id))
            .await?;
        Ok(workflows.unwrap_or_default())
    }

    /// List the requests waiting on `user_id`'s approval
    pub async fn list_pending_requests(
        &self,
        user_id: &str,
    ) -> Result<Vec<WorkflowAppRequest>, WorkflowError> {
        let requests: Option<Vec<WorkflowAppRequest>> = self
            .query(queries::user_pending_approvals(user_id))
            .await?;
        Ok(requests.unwrap_or_default())
    }

    /// Fetch a request by its service-side id
    ///
    /// Returns an empty record when the service has none.
    pub async fn get_workflow_request(
        &self,
        request_id: i64,
    ) -> Result<WorkflowAppRequest, WorkflowError> {
        let request: Option<WorkflowAppRequest> =
            self.query(queries::workflow_request(request_id)).await?;
        Ok(request.unwrap_or_default())
    }

    /// Fetch a request by the host application's reference id
    ///
    /// # Returns
    /// * `Ok(Some(request))` - The matching request
    /// * `Ok(None)` - The service has no request with this reference
    /// * `Err(WorkflowError::RetrievalFailed)` - Wrapping the underlying failure
    pub async fn get_request_by_reference_id(
        &self,
        reference_id: &str,
    ) -> Result<Option<WorkflowAppRequest>, WorkflowError> {
        match self
            .query::<WorkflowAppRequest>(queries::workflow_request_by_reference(reference_id))
            .await
        {
            Ok(Some(request)) => Ok(Some(request)),
            Ok(None) => {
                tracing::warn!(reference_id = %reference_id, "Workflow request not found");
                Ok(None)
            }
            Err(e) => {
                tracing::error!(
                    reference_id = %reference_id,
                    error = %e,
                    "Failed to retrieve workflow request by reference id"
                );
                Err(WorkflowError::RetrievalFailed {
                    reference_id: reference_id.to_string(),
                    source: Box::new(e),
                })
            }
        }
    }

    /// Create a workflow request
    ///
    /// # Returns
    /// * `Ok(String)` - The new request's id, or an empty string if the
    ///   service did not return one
    pub async fn create_workflow_request(
        &self,
        request: &NewWorkflowRequest,
    ) -> Result<String, WorkflowError> {
        let created: Option<CreatedRequest> = self
            .query(queries::create_workflow_request(self.config.app_id, request))
            .await?;
        Ok(created.map(|c| c.id).unwrap_or_default())
    }

    /// Act on a request step (e.g. approve or reject it)
    ///
    /// Returns the updated request, or an empty record when the service
    /// returns none.
    pub async fn take_action(
        &self,
        workflow_step_id: i64,
        action: &str,
        remarks: &str,
        user_id: &str,
    ) -> Result<WorkflowAppRequest, WorkflowError> {
        let request: Option<WorkflowAppRequest> = self
            .query(queries::workflow_request_action(
                workflow_step_id,
                action,
                remarks,
                user_id,
            ))
            .await?;
        Ok(request.unwrap_or_default())
    }

    /// Summarise the approvals waiting on `user_id`
    ///
    /// One action per pending request, in the order the service lists them,
    /// each linking to the host application's approval page.
    pub async fn pending_actions_summary(
        &self,
        user_id: &str,
    ) -> Result<PendingActions, WorkflowError> {
        let requests = self.list_pending_requests(user_id).await.map_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Workflow pending actions failed");
            WorkflowError::PendingActionsFailed {
                source: Box::new(e),
            }
        })?;

        let actions = requests
            .iter()
            .map(|request| PendingAction {
                description: PENDING_APPROVAL_DESCRIPTION.to_string(),
                count: 1,
                link: self.config.approval_link(&request.request_id),
            })
            .collect();

        Ok(PendingActions {
            app_name: PENDING_ACTIONS_APP_NAME.to_string(),
            actions,
        })
    }
}
