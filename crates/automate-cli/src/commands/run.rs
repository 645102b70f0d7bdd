//! Run command implementation

use crate::console::CliConsole;
use crate::functions::BundledFunction;
use anyhow::{Context, Result};
use automate_core::{RunOutcome, RunnerConfig};
use std::path::Path;
use tracing::{debug, info};

/// Inline JSON is used as is, anything else names a file to read
pub fn read_json_argument(argument: &str, what: &str) -> Result<String> {
    let trimmed = argument.trim_start();
    if trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }
    debug!("Reading {} from {}", what, argument);
    std::fs::read_to_string(Path::new(argument))
        .with_context(|| format!("failed to read {} from '{}'", what, argument))
}

/// Execute `function` once for the given run
pub async fn execute(
    function: BundledFunction,
    run_data: &str,
    function_inputs: &str,
    token: &str,
    config: &RunnerConfig,
) -> Result<RunOutcome> {
    let console = CliConsole::new(true);
    let run_data = read_json_argument(run_data, "run context")?;
    let function_inputs = read_json_argument(function_inputs, "function inputs")?;

    info!("Running function '{}'", function.name());
    let outcome = function.execute(&run_data, &function_inputs, token, config).await;
    console.print_outcome(&outcome);

    Ok(outcome)
}
