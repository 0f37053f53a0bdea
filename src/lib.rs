//! Workflow App Client
//!
//! GraphQL client for the external Workflow approval service. Signs a
//! short-lived application token per call, runs one of a fixed set of
//! queries/mutations and maps the response into plain records.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod graphql_types;
pub mod models;
pub mod queries;

pub use client::WorkflowClient;
pub use config::WorkflowConfig;
pub use error::WorkflowError;
