//! Smoke-test binary for a live Workflow API
//! This is a utility binary, not part of the client library
//!
//! Reads `WORKFLOW_API_URL`, `WORKFLOW_API_ID`, `WORKFLOW_API_PRIVATE_TOKEN`
//! (and optionally `APP_URL`) from the environment. Pass a user id to also
//! list that user's pending approvals.

use std::env;
use tracing::info;
use workflow_app_client::WorkflowClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = WorkflowClient::from_env()?;
    info!(endpoint = %client.endpoint(), app_id = client.app_id(), "Workflow client configured");

    println!("1. Signing application token...");
    let token = client.get_token()?;
    println!("   ✓ Token signed ({} chars)", token.len());

    println!("\n2. Listing application workflows...");
    let workflows = client.list_app_workflows().await?;
    println!("   ✓ {} workflow(s)", workflows.len());
    for workflow in &workflows {
        println!(
            "   - [{}] {} ({} steps)",
            workflow.id,
            workflow.workflow_name,
            workflow.workflow_steps.len()
        );
    }

    if let Some(user_id) = env::args().nth(1) {
        println!("\n3. Pending actions for {}...", user_id);
        let summary = client.pending_actions_summary(&user_id).await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    println!("\n✓ All checks completed!");
    Ok(())
}
