//! Run statuses and object result annotations

use crate::error::{AutomateError, AutomateResult};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Lifecycle status of a function run as understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationStatus {
    Initializing,
    Running,
    Succeeded,
    Failed,
    Exception,
}

impl AutomationStatus {
    /// Succeeded, failed and exception end a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Exception)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "INITIALIZING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Exception => "EXCEPTION",
        }
    }
}

impl fmt::Display for AutomationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an object result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectResultLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for ObjectResultLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// One annotation attached to a group of objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultCase {
    pub category: String,
    pub level: ObjectResultLevel,
    pub object_ids: Vec<String>,
    pub message: Option<String>,
    pub metadata: Option<Value>,
    pub visual_overrides: Option<Value>,
}

impl ResultCase {
    /// Build a result case; at least one object id is required
    pub fn new<I, S>(level: ObjectResultLevel, category: impl Into<String>, object_ids: I) -> AutomateResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let object_ids: Vec<String> = object_ids.into_iter().map(Into::into).collect();
        if object_ids.is_empty() {
            return Err(AutomateError::invalid_input_field(
                "Need at least one object_id to report",
                "objectIds",
            ));
        }
        Ok(Self {
            category: category.into(),
            level,
            object_ids,
            message: None,
            metadata: None,
            visual_overrides: None,
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_visual_overrides(mut self, overrides: Value) -> Self {
        self.visual_overrides = Some(overrides);
        self
    }
}

/// Everything a run reports back to the server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationResult {
    pub elapsed: f64,
    pub result_view: Option<String>,
    pub result_versions: Vec<String>,
    pub blobs: Vec<String>,
    pub run_status: AutomationStatus,
    pub status_message: Option<String>,
    pub object_results: Vec<ResultCase>,
}

impl Default for AutomationResult {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            result_view: None,
            result_versions: Vec::new(),
            blobs: Vec::new(),
            run_status: AutomationStatus::Running,
            status_message: None,
            object_results: Vec::new(),
        }
    }
}

impl AutomationResult {
    /// The `objectResults` payload of a status report
    pub fn object_results_payload(&self) -> Value {
        json!({
            "version": 1,
            "values": {
                "objectResults": self.object_results,
                "blobIds": self.blobs,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_value(AutomationStatus::Succeeded).unwrap(),
            json!("SUCCEEDED")
        );
        assert!(AutomationStatus::Exception.is_terminal());
        assert!(!AutomationStatus::Running.is_terminal());
    }

    #[test]
    fn test_result_case_requires_objects() {
        let empty: Vec<String> = Vec::new();
        assert!(ResultCase::new(ObjectResultLevel::Info, "none", empty).is_err());
    }

    #[test]
    fn test_result_case_serializes_camel_case() {
        let case = ResultCase::new(ObjectResultLevel::Warning, "Checks", ["a", "b"])
            .unwrap()
            .with_message("look here")
            .with_metadata(json!({"gradient": true}));
        let value = serde_json::to_value(&case).unwrap();
        assert_eq!(value["objectIds"], json!(["a", "b"]));
        assert_eq!(value["level"], json!("WARNING"));
        assert_eq!(value["visualOverrides"], Value::Null);
    }

    #[test]
    fn test_object_results_payload_shape() {
        let mut result = AutomationResult::default();
        result.object_results.push(
            ResultCase::new(ObjectResultLevel::Error, "Rule 1 Results", ["x"]).unwrap(),
        );
        let payload = result.object_results_payload();
        assert_eq!(payload["version"], json!(1));
        assert_eq!(payload["values"]["objectResults"][0]["category"], json!("Rule 1 Results"));
        assert_eq!(payload["values"]["blobIds"], json!([]));
    }
}
