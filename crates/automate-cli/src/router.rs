//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands;
use anyhow::Result;
use automate_core::RunnerConfig;
use std::process::ExitCode;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli, config: &RunnerConfig) -> Result<ExitCode> {
    match &cli.command {
        Commands::Run {
            run_data,
            function_inputs,
            token,
        } => {
            let outcome = commands::run::execute(cli.function, run_data, function_inputs, token, config).await?;
            Ok(ExitCode::from(outcome.exit_code() as u8))
        }
        Commands::GenerateSchema { path } => {
            commands::schema::generate(cli.function, path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Functions => {
            commands::functions::list(cli.function);
            Ok(ExitCode::SUCCESS)
        }
    }
}
