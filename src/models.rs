//! Workflow data records
//!
//! Plain records returned by the Workflow service, plus the JSON mapping
//! used to build them. Every field the service leaves out (or sends as
//! `null`) falls back to its empty value instead of failing the call.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize `null` as the type's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Int(i64),
}

/// Accept string or integer ids, rendering integers as decimal text
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<IdRepr>::deserialize(deserializer)? {
        Some(IdRepr::Text(text)) => text,
        Some(IdRepr::Int(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Parse an `IdRepr` as an integer; numeric strings (GraphQL `ID`) are accepted
fn id_repr_to_int<E: serde::de::Error>(repr: IdRepr) -> Result<i64, E> {
    match repr {
        IdRepr::Int(n) => Ok(n),
        IdRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid integer id: {:?}", text))),
    }
}

/// Accept integer or numeric-string ids; `null` becomes 0
fn id_as_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<IdRepr>::deserialize(deserializer)?
        .map(id_repr_to_int::<D::Error>)
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Optional form of [`id_as_int`]
fn opt_id_as_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<IdRepr>::deserialize(deserializer)?
        .map(id_repr_to_int::<D::Error>)
        .transpose()
}

/// Map the `key` entry of a GraphQL `data` object into a record
///
/// # Returns
/// * `Ok(None)` - `data` has no `key`, or it is `null`
/// * `Ok(Some(T))` - The mapped record
/// * `Err` - The entry exists but its shape does not match `T`
pub fn extract<T: DeserializeOwned>(data: &Value, key: &str) -> Result<Option<T>, serde_json::Error> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value).map(Some),
    }
}

/// A workflow configured for the application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowApp {
    /// Workflow id
    #[serde(deserialize_with = "id_as_int")]
    pub id: i64,
    /// Display name
    #[serde(deserialize_with = "null_as_default")]
    pub workflow_name: String,
    /// Steps in approval order
    #[serde(deserialize_with = "null_as_default")]
    pub workflow_steps: Vec<WorkflowStep>,
}

/// One step of a workflow definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowStep {
    /// Step id
    #[serde(deserialize_with = "id_as_int")]
    pub id: i64,
    /// Display name
    #[serde(deserialize_with = "null_as_default")]
    pub step_name: String,
    /// Position within the workflow
    #[serde(deserialize_with = "null_as_default")]
    pub position: i64,
    /// Optional description
    pub description: Option<String>,
    /// Users allowed to act on this step
    #[serde(deserialize_with = "null_as_default")]
    pub workflow_step_action_allowed_users: Vec<AllowedApprover>,
}

/// A user allowed to act on a workflow step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AllowedApprover {
    /// Assignment id
    #[serde(deserialize_with = "id_as_int")]
    pub id: i64,
    /// Lower values are asked first
    #[serde(deserialize_with = "null_as_default")]
    pub approver_priority: i64,
    /// The approver
    #[serde(deserialize_with = "null_as_default")]
    pub user: ApproverUser,
}

/// User record embedded in an approver assignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApproverUser {
    /// Internal user id
    #[serde(deserialize_with = "id_as_int")]
    pub id: i64,
    /// External user id
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    /// Full name
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    /// Email address
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    /// Employee registration number
    pub rcno: Option<String>,
}

/// A user who acted on a request step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowUser {
    /// Internal user id
    #[serde(deserialize_with = "id_as_int")]
    pub id: i64,
    /// Full name
    #[serde(deserialize_with = "null_as_default")]
    pub full_name: String,
    /// External user id
    #[serde(deserialize_with = "null_as_default")]
    pub user_id: String,
    /// Email address
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    /// Employee registration number
    pub rcno: Option<String>,
}

/// Progress of a request through one workflow step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowRequestStep {
    /// Request step id
    #[serde(deserialize_with = "id_as_int")]
    pub id: i64,
    /// When the step was acted on
    pub action_taken_date: Option<String>,
    /// Workflow step this belongs to
    #[serde(deserialize_with = "opt_id_as_int")]
    pub workflow_step_id: Option<i64>,
    /// Request this belongs to
    #[serde(deserialize_with = "opt_id_as_int")]
    pub workflow_request_id: Option<i64>,
    /// Remarks left by the approver
    pub remarks: Option<String>,
    /// State tag as reported by the service (e.g. pending, approved)
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    /// Who acted on the step
    pub action_taken_by: Option<WorkflowUser>,
}

/// A request moving through an application workflow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkflowAppRequest {
    /// Service-side request id
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    /// Host application's reference for the request
    #[serde(deserialize_with = "id_as_string")]
    pub request_id: String,
    /// All steps have been completed
    #[serde(deserialize_with = "null_as_default")]
    pub is_completed: bool,
    /// The request has been received by the service
    #[serde(deserialize_with = "null_as_default")]
    pub is_received: bool,
    /// Request payload as submitted at creation
    pub request_details: Option<String>,
    /// Per-step progress, in workflow order
    pub workflow_request_steps: Option<Vec<WorkflowRequestStep>>,
}

/// Result of `createWorkflowRequest`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreatedRequest {
    /// Id of the new request
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
}

/// Input for creating a workflow request
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkflowRequest {
    /// Requesting user; ignored for employee requests
    pub user_id: Option<String>,
    /// Host application's reference for the request
    pub request_id: String,
    /// Workflow to run the request through
    pub workflow_id: i64,
    /// Request payload, usually serialized JSON
    pub request_details: String,
    /// Let the service resolve the requester from the signing application
    pub is_employee: bool,
}

impl NewWorkflowRequest {
    /// Employee request with no explicit user
    pub fn new(request_id: impl Into<String>, workflow_id: i64, request_details: impl Into<String>) -> Self {
        Self {
            user_id: None,
            request_id: request_id.into(),
            workflow_id,
            request_details: request_details.into(),
            is_employee: true,
        }
    }

    /// Set the requesting user
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Mark the request as coming from an employee (or not)
    pub fn with_employee(mut self, is_employee: bool) -> Self {
        self.is_employee = is_employee;
        self
    }
}

/// Summary of the actions waiting on a user in this application
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingActions {
    /// Name of the host application
    pub app_name: String,
    /// One entry per pending request
    pub actions: Vec<PendingAction>,
}

/// A single pending action
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingAction {
    /// What the user needs to do
    pub description: String,
    /// Number of items behind this action
    pub count: u32,
    /// Where the user can act on it
    pub link: String,
}
