//! Function execution: parse, connect, run, report

use crate::automation::AutomationContext;
use crate::config::RunnerConfig;
use crate::error::{AutomateError, ErrorCategory};
use crate::inputs::{FunctionInputs, parse_inputs};
use crate::results::AutomationStatus;
use crate::run_data::AutomationRunData;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{error, info, warn};

/// Status message used when a function returns without marking its run
pub const ASSUMED_SUCCESS_MESSAGE: &str =
    "WARNING: Automate assumed a success status, but it was not marked as so by the function.";

/// Status message used when a function fails with its own error or panics
pub const FUNCTION_ERROR_MESSAGE: &str = "Function error. Check the automation run logs for details.";

/// A single transformation pass over a model version
#[async_trait]
pub trait AutomateFunction: Send + Sync {
    type Inputs: FunctionInputs;

    /// Name used to select the function from the command line
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    async fn run(
        &self,
        context: &mut AutomationContext,
        inputs: Self::Inputs,
    ) -> crate::error::AutomateResult<()>;
}

/// How an invocation ended
#[derive(Debug)]
pub struct RunOutcome {
    pub status: AutomationStatus,
    pub status_message: Option<String>,
    /// The error that ended the run, if any
    pub error: Option<AutomateError>,
    /// Whether the final status reached the server
    pub reported: bool,
}

impl RunOutcome {
    fn rejected(error: AutomateError) -> Self {
        error!("{} ({}): {}", error.category().display_name(), error.error_code(), error);
        Self {
            status: AutomationStatus::Failed,
            status_message: Some(error.to_string()),
            error: Some(error),
            reported: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AutomationStatus::Succeeded && self.reported
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/// Run `function` for one invocation.
///
/// Inputs are validated before any request is made. Once a session exists
/// every outcome, including a panic in the function, ends in exactly one
/// final status report.
pub async fn execute_automate_function<F: AutomateFunction>(
    function: &F,
    run_data_json: &str,
    inputs_json: &str,
    token: &str,
    config: &RunnerConfig,
) -> RunOutcome {
    let run_data = match AutomationRunData::from_json(run_data_json) {
        Ok(run_data) => run_data,
        Err(err) => return RunOutcome::rejected(err),
    };
    let inputs = match parse_inputs::<F::Inputs>(inputs_json) {
        Ok(inputs) => inputs,
        Err(err) => return RunOutcome::rejected(err),
    };

    let context = match AutomationContext::initialize(run_data, token, config).await {
        Ok(context) => context,
        Err(err) => return RunOutcome::rejected(err),
    };
    run_function(function, context, inputs).await
}

/// Run `function` against an already connected context
pub async fn run_function<F: AutomateFunction>(
    function: &F,
    mut context: AutomationContext,
    inputs: F::Inputs,
) -> RunOutcome {
    info!("Running automate function {}", function.name());
    if let Err(err) = context.report_run_status().await {
        warn!("Could not report the running status: {}", err);
    }

    let outcome = AssertUnwindSafe(function.run(&mut context, inputs))
        .catch_unwind()
        .await;

    let mut run_error = None;
    match outcome {
        Ok(Ok(())) => {
            if !context.run_status().is_terminal() {
                context.mark_run_success(ASSUMED_SUCCESS_MESSAGE);
            }
        }
        Ok(Err(err)) => {
            error!("Function {} failed ({}): {}", function.name(), err.error_code(), err);
            match err.category() {
                ErrorCategory::Transformation => context.mark_run_exception(FUNCTION_ERROR_MESSAGE),
                ErrorCategory::Input | ErrorCategory::Connectivity => {
                    context.mark_run_failed(err.to_string())
                }
            }
            run_error = Some(err);
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!("Function {} panicked: {}", function.name(), message);
            context.mark_run_exception(FUNCTION_ERROR_MESSAGE);
            run_error = Some(AutomateError::function(format!("function panicked: {}", message)));
        }
    }

    if context.context_view().is_none() {
        if let Err(err) = context.set_context_view(Vec::<String>::new(), true) {
            warn!("Could not set the default context view: {}", err);
        }
    }

    let reported = match context.report_run_status().await {
        Ok(()) => true,
        Err(err) => {
            error!("Could not report the final run status: {}", err);
            run_error.get_or_insert(err);
            false
        }
    };

    RunOutcome {
        status: context.run_status(),
        status_message: context.status_message().map(str::to_string),
        error: run_error,
        reported,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
