//! GraphQL wire types
//!
//! Structs that mirror the GraphQL-over-HTTP request body and response
//! envelope exchanged with the Workflow service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body for a single GraphQL operation
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    /// Name of the operation inside `query` to execute
    pub operation_name: &'static str,
    /// Operation variables (always a JSON object)
    pub variables: Value,
    /// GraphQL document text
    pub query: &'static str,
}

/// Top-level GraphQL response envelope
#[derive(Deserialize, Debug, Default)]
pub struct GraphQLResponse {
    /// Operation result; absent or `null` when execution failed entirely
    #[serde(default)]
    pub data: Option<Value>,
    /// Errors reported by the service, passed through uninterpreted
    #[serde(default)]
    pub errors: Option<Vec<GraphQLErrorEntry>>,
}

/// A single entry of the response `errors` array
#[derive(Deserialize, Debug)]
pub struct GraphQLErrorEntry {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}
