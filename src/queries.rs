//! GraphQL documents and request builders
//!
//! Each supported operation has a fixed document, an operation name that is
//! also the top-level key of its result, and a builder that fills in the
//! variables.

use crate::graphql_types::GraphQLRequest;
use crate::models::NewWorkflowRequest;
use serde_json::json;

/// List the workflows configured for an application
pub const GET_WORKFLOWS_BY_APP_ID: &str = "getWorkflowsByAppID";
/// List requests waiting on a user's approval
pub const GET_USER_PENDING_APPROVALS: &str = "getUserPendingWorkflowRequestApproval";
/// Fetch a request by its internal id
pub const WORKFLOW_REQUEST: &str = "workflowRequest";
/// Fetch a request by its external reference id
pub const WORKFLOW_REQUEST_BY_ID: &str = "workflowRequestById";
/// Create a request
pub const CREATE_WORKFLOW_REQUEST: &str = "createWorkflowRequest";
/// Act on a request step
pub const WORKFLOW_REQUEST_ACTION: &str = "workflowRequestAction";

const GET_WORKFLOWS_BY_APP_ID_QUERY: &str = r#"
query getWorkflowsByAppID($id: Int!) {
  getWorkflowsByAppID(id: $id) {
    id
    workflowName
    workflowSteps {
      id
      stepName
      position
      description
      workflowStepActionAllowedUsers {
        id
        approverPriority
        user {
          id
          userId
          fullName
          email
          rcno
        }
      }
    }
  }
}
"#;

const GET_USER_PENDING_APPROVALS_QUERY: &str = r#"
query getUserPendingWorkflowRequestApproval($userId: String!) {
  getUserPendingWorkflowRequestApproval(userId: $userId) {
    id
    isCompleted
    isReceived
    requestId
  }
}
"#;

const WORKFLOW_REQUEST_QUERY: &str = r#"
query workflowRequest($id: Int!) {
  workflowRequest(id: $id) {
    id
    isCompleted
    isReceived
    requestId
    requestDetails
    workflowRequestSteps {
      id
      actionTakenDate
      workflowStepId
      workflowRequestId
      remarks
      state
      actionTakenBy {
        id
        fullName
        userId
        email
        rcno
      }
    }
  }
}
"#;

const WORKFLOW_REQUEST_BY_ID_QUERY: &str = r#"
query workflowRequestById($requestId: String!) {
  workflowRequestById(requestId: $requestId) {
    id
    isCompleted
    isReceived
    requestId
    requestDetails
    workflowRequestSteps {
      id
      actionTakenDate
      workflowStepId
      workflowRequestId
      remarks
      state
      actionTakenBy {
        id
        fullName
        userId
        email
        rcno
      }
    }
  }
}
"#;

const CREATE_WORKFLOW_REQUEST_MUTATION: &str = r#"
mutation createWorkflowRequest($createWorkflowRequestInput: CreateWorkflowRequestInput!, $isEmployee: Boolean) {
  createWorkflowRequest(createWorkflowRequestInput: $createWorkflowRequestInput, isEmployee: $isEmployee) {
    id
  }
}
"#;

const WORKFLOW_REQUEST_ACTION_MUTATION: &str = r#"
mutation workflowRequestAction($workflowStepId: Int!, $action: String!, $remarks: String, $userId: String!) {
  workflowRequestAction(workflowStepId: $workflowStepId, action: $action, remarks: $remarks, userId: $userId) {
    id
    isCompleted
    isReceived
    requestId
    workflowRequestSteps {
      id
      actionTakenDate
      workflowStepId
      workflowRequestId
      remarks
      state
      actionTakenBy {
        id
        fullName
        userId
        email
        rcno
      }
    }
  }
}
"#;

/// Build the `getWorkflowsByAppID` request
pub fn app_workflows(app_id: i64) -> GraphQLRequest {
    GraphQLRequest {
        operation_name: GET_WORKFLOWS_BY_APP_ID,
        variables: json!({ "id": app_id }),
        query: GET_WORKFLOWS_BY_APP_ID_QUERY,
    }
}

/// Build the `getUserPendingWorkflowRequestApproval` request
pub fn user_pending_approvals(user_id: &str) -> GraphQLRequest {
    GraphQLRequest {
        operation_name: GET_USER_PENDING_APPROVALS,
        variables: json!({ "userId": user_id }),
        query: GET_USER_PENDING_APPROVALS_QUERY,
    }
}

/// Build the `workflowRequest` request
pub fn workflow_request(request_id: i64) -> GraphQLRequest {
    GraphQLRequest {
        operation_name: WORKFLOW_REQUEST,
        variables: json!({ "id": request_id }),
        query: WORKFLOW_REQUEST_QUERY,
    }
}

/// Build the `workflowRequestById` request
pub fn workflow_request_by_reference(reference_id: &str) -> GraphQLRequest {
    GraphQLRequest {
        operation_name: WORKFLOW_REQUEST_BY_ID,
        variables: json!({ "requestId": reference_id }),
        query: WORKFLOW_REQUEST_BY_ID_QUERY,
    }
}

/// Build the `createWorkflowRequest` mutation
///
/// Employee requests never carry a caller-supplied `userId`: the service
/// resolves the requester from the signing application instead.
pub fn create_workflow_request(app_id: i64, request: &NewWorkflowRequest) -> GraphQLRequest {
    let user_id = if request.is_employee {
        None
    } else {
        request.user_id.as_deref()
    };

    GraphQLRequest {
        operation_name: CREATE_WORKFLOW_REQUEST,
        variables: json!({
            "createWorkflowRequestInput": {
                "appId": app_id,
                "requestDetails": request.request_details,
                "requestId": request.request_id,
                "userId": user_id,
                "workflowId": request.workflow_id,
            },
            "isEmployee": request.is_employee,
        }),
        query: CREATE_WORKFLOW_REQUEST_MUTATION,
    }
}

/// Build the `workflowRequestAction` mutation
pub fn workflow_request_action(
    workflow_step_id: i64,
    action: &str,
    remarks: &str,
    user_id: &str,
) -> GraphQLRequest {
    GraphQLRequest {
        operation_name: WORKFLOW_REQUEST_ACTION,
        variables: json!({
            "workflowStepId": workflow_step_id,
            "action": action,
            "remarks": remarks,
            "userId": user_id,
        }),
        query: WORKFLOW_REQUEST_ACTION_MUTATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn variable_keys(request: &GraphQLRequest) -> BTreeSet<String> {
        request
            .variables
            .as_object()
            .expect("variables must be an object")
            .keys()
            .cloned()
            .collect()
    }

    fn keys(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_operation_names_and_variable_keys() {
        let cases = vec![
            (app_workflows(9), GET_WORKFLOWS_BY_APP_ID, keys(&["id"])),
            (
                user_pending_approvals("u1"),
                GET_USER_PENDING_APPROVALS,
                keys(&["userId"]),
            ),
            (workflow_request(3), WORKFLOW_REQUEST, keys(&["id"])),
            (
                workflow_request_by_reference("REF-1"),
                WORKFLOW_REQUEST_BY_ID,
                keys(&["requestId"]),
            ),
            (
                create_workflow_request(9, &NewWorkflowRequest::new("R1", 5, "{}")),
                CREATE_WORKFLOW_REQUEST,
                keys(&["createWorkflowRequestInput", "isEmployee"]),
            ),
            (
                workflow_request_action(11, "APPROVE", "ok", "u1"),
                WORKFLOW_REQUEST_ACTION,
                keys(&["workflowStepId", "action", "remarks", "userId"]),
            ),
        ];

        for (request, operation, expected_keys) in cases {
            assert_eq!(request.operation_name, operation);
            assert_eq!(variable_keys(&request), expected_keys, "{}", operation);
            assert!(
                request.query.contains(&format!("{}(", operation)),
                "document for {} must select the {} field",
                operation,
                operation
            );
        }
    }

    #[test]
    fn test_create_input_keys() {
        let request = create_workflow_request(9, &NewWorkflowRequest::new("R1", 5, "{}"));
        let input = request.variables["createWorkflowRequestInput"]
            .as_object()
            .unwrap();
        let names: BTreeSet<String> = input.keys().cloned().collect();
        assert_eq!(
            names,
            keys(&["appId", "requestDetails", "requestId", "userId", "workflowId"])
        );
        assert_eq!(input["appId"], 9);
        assert_eq!(input["workflowId"], 5);
    }

    #[test]
    fn test_create_employee_request_drops_user_id() {
        let new_request = NewWorkflowRequest::new("R1", 5, "{}").with_user_id("u1");
        assert!(new_request.is_employee);

        let request = create_workflow_request(9, &new_request);
        assert!(request.variables["createWorkflowRequestInput"]["userId"].is_null());
        assert_eq!(request.variables["isEmployee"], true);
    }

    #[test]
    fn test_create_non_employee_request_keeps_user_id() {
        let new_request = NewWorkflowRequest::new("R1", 5, "{}")
            .with_user_id("u1")
            .with_employee(false);

        let request = create_workflow_request(9, &new_request);
        assert_eq!(
            request.variables["createWorkflowRequestInput"]["userId"],
            "u1"
        );
        assert_eq!(request.variables["isEmployee"], false);
    }
}
