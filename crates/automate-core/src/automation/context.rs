//! Per-run state shared between the runner and a function

use crate::client::{ActiveUser, RunStatusReport, SpeckleApi, SpeckleClient, Version, receive_object};
use crate::config::RunnerConfig;
use crate::error::{AutomateError, AutomateResult};
use crate::objects::Base;
use crate::results::{AutomationResult, AutomationStatus, ObjectResultLevel, ResultCase};
use crate::run_data::AutomationRunData;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A live automation run.
///
/// Created once per invocation and consumed by the runner; nothing outlives
/// it, so two runs never share annotations or status.
pub struct AutomationContext {
    run_data: AutomationRunData,
    api: Arc<dyn SpeckleApi>,
    user: Option<ActiveUser>,
    version: Option<Version>,
    result: AutomationResult,
    started: Instant,
    data_loaded: bool,
    final_reported: bool,
}

impl std::fmt::Debug for AutomationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationContext")
            .field("run_data", &self.run_data)
            .field("result", &self.result)
            .field("data_loaded", &self.data_loaded)
            .field("final_reported", &self.final_reported)
            .finish_non_exhaustive()
    }
}

impl AutomationContext {
    /// Connect to the server named in `run_data` and authenticate with `token`
    pub async fn initialize(
        run_data: AutomationRunData,
        token: &str,
        config: &RunnerConfig,
    ) -> AutomateResult<Self> {
        run_data.validate()?;
        if token.trim().is_empty() {
            return Err(AutomateError::invalid_input_field(
                "authentication token must not be empty",
                "speckleToken",
            ));
        }
        let client = SpeckleClient::new(run_data.server_url()?, token.trim(), config)?;
        Self::connect(run_data, Arc::new(client)).await
    }

    /// Authenticate through an existing api handle
    pub async fn connect(run_data: AutomationRunData, api: Arc<dyn SpeckleApi>) -> AutomateResult<Self> {
        let user = api.active_user().await?;
        info!(
            "Authenticated as {} on {}",
            user.name.as_deref().unwrap_or(&user.id),
            run_data.speckle_server_url
        );
        let mut context = Self::with_api(run_data, api);
        context.user = Some(user);
        Ok(context)
    }

    /// Build a context without any network round trip
    pub fn with_api(run_data: AutomationRunData, api: Arc<dyn SpeckleApi>) -> Self {
        Self {
            run_data,
            api,
            user: None,
            version: None,
            result: AutomationResult::default(),
            started: Instant::now(),
            data_loaded: false,
            final_reported: false,
        }
    }

    pub fn run_data(&self) -> &AutomationRunData {
        &self.run_data
    }

    pub fn active_user(&self) -> Option<&ActiveUser> {
        self.user.as_ref()
    }

    /// The version received by [`Self::receive_version`], if any
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    pub fn result(&self) -> &AutomationResult {
        &self.result
    }

    /// Whether this run downloaded the version's objects
    pub fn data_loaded(&self) -> bool {
        self.data_loaded
    }

    pub fn final_reported(&self) -> bool {
        self.final_reported
    }

    pub fn run_status(&self) -> AutomationStatus {
        self.result.run_status
    }

    pub fn status_message(&self) -> Option<&str> {
        self.result.status_message.as_deref()
    }

    pub fn context_view(&self) -> Option<&str> {
        self.result.result_view.as_deref()
    }

    /// Seconds since the context was created
    pub fn elapsed(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Look up the triggering version and download its object graph
    pub async fn receive_version(&mut self) -> AutomateResult<Base> {
        let project_id = &self.run_data.project_id;
        let version = self
            .api
            .get_version(project_id, &self.run_data.version_id)
            .await?;
        let object_id = version.referenced_object.clone().ok_or_else(|| {
            AutomateError::not_found_resource(
                format!("version {} has no referenced object", version.id),
                "object",
            )
        })?;

        let download_started = Instant::now();
        let base = receive_object(self.api.as_ref(), project_id, &object_id).await?;
        info!(
            "It took {:.2} seconds to receive the speckle version {}",
            download_started.elapsed().as_secs_f64(),
            version.id
        );

        self.version = Some(version);
        self.data_loaded = true;
        Ok(base)
    }

    /// Add a prepared result case
    pub fn attach_result(&mut self, case: ResultCase) {
        info!(
            "Created new {} category: {} caused by: {}",
            case.level,
            case.category,
            case.message.as_deref().unwrap_or("")
        );
        self.result.object_results.push(case);
    }

    /// Attach a result to a set of objects; fails when `object_ids` is empty
    pub fn attach_result_to_objects<I, S>(
        &mut self,
        level: ObjectResultLevel,
        category: impl Into<String>,
        object_ids: I,
        message: Option<String>,
        metadata: Option<Value>,
        visual_overrides: Option<Value>,
    ) -> AutomateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut case = ResultCase::new(level, category, object_ids)?;
        case.message = message;
        case.metadata = metadata;
        case.visual_overrides = visual_overrides;
        self.attach_result(case);
        Ok(())
    }

    pub fn attach_info_to_objects<I, S>(
        &mut self,
        category: impl Into<String>,
        object_ids: I,
        message: impl Into<String>,
    ) -> AutomateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attach_result_to_objects(
            ObjectResultLevel::Info,
            category,
            object_ids,
            Some(message.into()),
            None,
            None,
        )
    }

    pub fn attach_warning_to_objects<I, S>(
        &mut self,
        category: impl Into<String>,
        object_ids: I,
        message: impl Into<String>,
    ) -> AutomateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attach_result_to_objects(
            ObjectResultLevel::Warning,
            category,
            object_ids,
            Some(message.into()),
            None,
            None,
        )
    }

    pub fn attach_error_to_objects<I, S>(
        &mut self,
        category: impl Into<String>,
        object_ids: I,
        message: impl Into<String>,
    ) -> AutomateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attach_result_to_objects(
            ObjectResultLevel::Error,
            category,
            object_ids,
            Some(message.into()),
            None,
            None,
        )
    }

    pub fn mark_run_success(&mut self, message: impl Into<String>) {
        self.mark_run(AutomationStatus::Succeeded, message.into());
    }

    pub fn mark_run_failed(&mut self, message: impl Into<String>) {
        self.mark_run(AutomationStatus::Failed, message.into());
    }

    pub fn mark_run_exception(&mut self, message: impl Into<String>) {
        self.mark_run(AutomationStatus::Exception, message.into());
    }

    fn mark_run(&mut self, status: AutomationStatus, message: String) {
        let elapsed = self.elapsed();
        info!("Automation run {} after {:.2} seconds.", status, elapsed);
        info!("{}", message);
        self.result.run_status = status;
        self.result.status_message = Some(message);
        self.result.elapsed = elapsed;
    }

    /// Point the viewer at the given resources, optionally prefixed with
    /// the triggering `model@version`
    pub fn set_context_view<I, S>(
        &mut self,
        resource_ids: I,
        include_source_model_version: bool,
    ) -> AutomateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut link_resources = Vec::new();
        if include_source_model_version {
            link_resources.push(self.run_data.source_model_resource());
        }
        link_resources.extend(resource_ids.into_iter().map(Into::into));

        if link_resources.is_empty() {
            return Err(AutomateError::invalid_input(
                "we do not have enough resource ids to compose a context view",
            ));
        }

        let view = format!(
            "/projects/{}/models/{}",
            self.run_data.project_id,
            link_resources.join(",")
        );
        self.result.result_view = Some(view);
        Ok(())
    }

    fn status_report(&self) -> RunStatusReport {
        let status = self.result.run_status;
        let object_results = (status.is_terminal() && self.data_loaded)
            .then(|| self.result.object_results_payload());
        RunStatusReport {
            automation_id: self.run_data.automation_id.clone(),
            automation_revision_id: self.run_data.automation_revision_id.clone(),
            automation_run_id: self.run_data.automation_run_id.clone(),
            version_id: self.run_data.version_id.clone(),
            function_id: self.run_data.function_id.clone(),
            function_name: self.run_data.function_name.clone(),
            function_logo: self.run_data.function_logo.clone(),
            run_status: status,
            elapsed: self.elapsed(),
            context_view: self.result.result_view.clone(),
            result_version_ids: self.result.result_versions.clone(),
            status_message: self.result.status_message.clone(),
            object_results,
        }
    }

    /// Send the current status to the server.
    ///
    /// A terminal status is written at most once; later calls are skipped.
    pub async fn report_run_status(&mut self) -> AutomateResult<()> {
        let status = self.result.run_status;
        if status.is_terminal() {
            if self.final_reported {
                warn!("Final run status was already reported, skipping {}", status);
                return Ok(());
            }
            self.final_reported = true;
        }

        let report = self.status_report();
        self.api.report_run_status(&report).await?;

        let message = match status {
            AutomationStatus::Succeeded => "succeeded",
            AutomationStatus::Failed => "failed",
            AutomationStatus::Exception => "raised an exception",
            AutomationStatus::Running | AutomationStatus::Initializing => "is running",
        };
        info!("Reported run status: the automation run {}", message);
        Ok(())
    }
}
