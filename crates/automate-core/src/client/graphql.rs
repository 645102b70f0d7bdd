//! GraphQL documents and response envelopes

use super::api::{ActiveUser, Version};
use crate::error::{AutomateError, AutomateResult};
use serde::Deserialize;

pub(crate) const ACTIVE_USER_QUERY: &str = r#"
query ActiveUser {
    activeUser {
        id
        name
        email
    }
}"#;

pub(crate) const VERSION_QUERY: &str = r#"
query ProjectVersion($projectId: String!, $versionId: String!) {
    project(id: $projectId) {
        version(id: $versionId) {
            id
            referencedObject
            message
            sourceApplication
            createdAt
        }
    }
}"#;

pub(crate) const RUN_STATUS_MUTATION: &str = r#"
mutation AutomateFunctionRunStatusReport(
    $automationId: String!
    $automationRevisionId: String!
    $automationRunId: String!
    $versionId: String!
    $functionId: String!
    $functionName: String!
    $functionLogo: String
    $runStatus: AutomationRunStatus!
    $elapsed: Float!
    $contextView: String
    $resultVersionIds: [String!]!
    $statusMessage: String
    $objectResults: JSONObject
) {
    automationMutations {
        functionRunStatusReport(input: {
            automationId: $automationId
            automationRevisionId: $automationRevisionId
            automationRunId: $automationRunId
            versionId: $versionId
            functionRuns: [{
                functionId: $functionId
                functionName: $functionName
                functionLogo: $functionLogo
                status: $runStatus
                contextView: $contextView
                elapsed: $elapsed
                resultVersionIds: $resultVersionIds
                statusMessage: $statusMessage
                results: $objectResults
            }]
        })
    }
}"#;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Turn the envelope into data, surfacing the first error
    pub fn into_data(self, operation: &str) -> AutomateResult<T> {
        if let Some(first) = self.errors.first() {
            let message = format!("{} failed: {}", operation, first.message);
            let lowered = first.message.to_lowercase();
            return Err(if lowered.contains("not found") {
                AutomateError::not_found(message)
            } else if lowered.contains("forbidden") || lowered.contains("unauthorized") {
                AutomateError::auth(message)
            } else {
                AutomateError::server(message)
            });
        }
        self.data
            .ok_or_else(|| AutomateError::server(format!("{} returned no data", operation)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActiveUserData {
    pub active_user: Option<ActiveUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectVersionData {
    pub project: Option<ProjectVersion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectVersion {
    pub version: Option<Version>,
}
