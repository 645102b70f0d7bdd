//! The server operations a run depends on

use crate::error::AutomateResult;
use crate::results::AutomationStatus;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The user owning the token a run was started with
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A model version as described by the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    /// Id of the root object of the version's object graph
    #[serde(default)]
    pub referenced_object: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub source_application: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Raw objects of one version graph as downloaded from the server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectBundle {
    pub root: Value,
    /// Every other object of the graph, keyed by id
    pub children: HashMap<String, Value>,
}

/// Variables of the function run status mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatusReport {
    pub automation_id: String,
    pub automation_revision_id: String,
    pub automation_run_id: String,
    pub version_id: String,
    pub function_id: String,
    pub function_name: String,
    pub function_logo: Option<String>,
    pub run_status: AutomationStatus,
    pub elapsed: f64,
    pub context_view: Option<String>,
    pub result_version_ids: Vec<String>,
    pub status_message: Option<String>,
    /// Present only for terminal statuses of runs that loaded their data
    pub object_results: Option<Value>,
}

/// Server operations used by an [`crate::automation::AutomationContext`]
#[async_trait]
pub trait SpeckleApi: Send + Sync {
    /// Resolve the token's user; fails when the token is rejected
    async fn active_user(&self) -> AutomateResult<ActiveUser>;

    async fn get_version(&self, project_id: &str, version_id: &str) -> AutomateResult<Version>;

    /// Download an object and every object in its closure
    async fn download_objects(&self, project_id: &str, object_id: &str) -> AutomateResult<ObjectBundle>;

    async fn report_run_status(&self, report: &RunStatusReport) -> AutomateResult<()>;
}
