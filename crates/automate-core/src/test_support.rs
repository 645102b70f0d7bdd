//! In-memory [`SpeckleApi`] used by unit tests

use crate::client::{ActiveUser, ObjectBundle, RunStatusReport, SpeckleApi, Version};
use crate::error::{AutomateError, AutomateResult};
use crate::run_data::AutomationRunData;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) fn sample_run_data() -> AutomationRunData {
    AutomationRunData {
        project_id: "p1".into(),
        model_id: "m1".into(),
        branch_name: "main".into(),
        version_id: "v1".into(),
        speckle_server_url: "http://localhost:3000".into(),
        automation_id: "a1".into(),
        automation_revision_id: "r1".into(),
        automation_run_id: "run1".into(),
        function_id: "f1".into(),
        function_name: "Test function".into(),
        function_logo: None,
    }
}

pub(crate) struct RecordingApi {
    user: Option<ActiveUser>,
    version: Option<Version>,
    bundle: ObjectBundle,
    reports: Mutex<Vec<RunStatusReport>>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self {
            user: Some(ActiveUser {
                id: "u1".into(),
                name: Some("Tester".into()),
                email: None,
            }),
            version: Some(Version {
                id: "v1".into(),
                referenced_object: Some("root".into()),
                message: None,
                source_application: None,
                created_at: None,
            }),
            bundle: ObjectBundle {
                root: json!({"id": "root", "speckle_type": "Base"}),
                children: HashMap::new(),
            },
            reports: Mutex::new(Vec::new()),
        }
    }

    pub fn without_user(mut self) -> Self {
        self.user = None;
        self
    }

    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }

    pub fn with_objects(mut self, root: Value, children: Vec<Value>) -> Self {
        let children = children
            .into_iter()
            .filter_map(|child| {
                let id = child.get("id")?.as_str()?.to_string();
                Some((id, child))
            })
            .collect();
        self.bundle = ObjectBundle { root, children };
        self
    }

    pub fn reports(&self) -> Vec<RunStatusReport> {
        self.reports.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeckleApi for RecordingApi {
    async fn active_user(&self) -> AutomateResult<ActiveUser> {
        self.user
            .clone()
            .ok_or_else(|| AutomateError::auth("token is not associated with an active user"))
    }

    async fn get_version(&self, _project_id: &str, version_id: &str) -> AutomateResult<Version> {
        self.version
            .clone()
            .ok_or_else(|| AutomateError::not_found(format!("version {} not found", version_id)))
    }

    async fn download_objects(&self, _project_id: &str, _object_id: &str) -> AutomateResult<ObjectBundle> {
        Ok(self.bundle.clone())
    }

    async fn report_run_status(&self, report: &RunStatusReport) -> AutomateResult<()> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }
}
