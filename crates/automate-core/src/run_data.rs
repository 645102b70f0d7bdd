//! The run context handed to a function by the orchestration platform

use crate::error::{AutomateError, AutomateResult};
use serde::{Deserialize, Serialize};
use url::Url;

/// Identifies the project, model version and automation run being executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationRunData {
    pub project_id: String,
    pub model_id: String,
    pub branch_name: String,
    pub version_id: String,
    pub speckle_server_url: String,
    pub automation_id: String,
    pub automation_revision_id: String,
    pub automation_run_id: String,
    pub function_id: String,
    pub function_name: String,
    #[serde(default)]
    pub function_logo: Option<String>,
}

impl AutomationRunData {
    /// Parse and validate the run context JSON
    pub fn from_json(json: &str) -> AutomateResult<Self> {
        let run_data: Self = serde_json::from_str(json).map_err(|e| {
            AutomateError::json_with_context(e.to_string(), "parsing automation run data")
        })?;
        run_data.validate()?;
        Ok(run_data)
    }

    /// Every identifier must be non-empty and the server url must be http(s)
    pub fn validate(&self) -> AutomateResult<()> {
        let required = [
            ("projectId", &self.project_id),
            ("modelId", &self.model_id),
            ("branchName", &self.branch_name),
            ("versionId", &self.version_id),
            ("speckleServerUrl", &self.speckle_server_url),
            ("automationId", &self.automation_id),
            ("automationRevisionId", &self.automation_revision_id),
            ("automationRunId", &self.automation_run_id),
            ("functionId", &self.function_id),
            ("functionName", &self.function_name),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AutomateError::invalid_input_field(
                    format!("{} must not be empty", field),
                    field,
                ));
            }
        }

        self.server_url().map(|_| ())
    }

    /// The server base url, always ending in `/` so relative joins keep its path
    pub fn server_url(&self) -> AutomateResult<Url> {
        let mut url = Url::parse(self.speckle_server_url.trim())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AutomateError::invalid_input_field(
                format!("unsupported server url scheme '{}'", url.scheme()),
                "speckleServerUrl",
            ));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    /// Viewer route of the triggering model version
    pub fn source_model_resource(&self) -> String {
        format!("{}@{}", self.model_id, self.version_id)
    }
}
