//! Speckle Automate function runner
//!
//! One process handles one automation run: the platform starts the container
//! with the run context, the function inputs and a token, and reads the exit
//! code once the final status has been reported.
//!
//! ```bash
//! automate-function run "$RUN_CONTEXT" "$FUNCTION_INPUTS" "$SPECKLE_TOKEN"
//! ```
//!
//! Settings come from `AUTOMATE_*` environment variables, optionally loaded
//! from a `.env` file during development.

mod args;
mod commands;
mod console;
mod functions;
mod router;

use args::Cli;
use clap::Parser;
use console::CliConsole;
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let console = CliConsole::new(true);

    let config = match automate_core::RunnerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            console.error(&format!("Invalid configuration: {}", e));
            return ExitCode::FAILURE;
        }
    };
    config.logging().init();

    match router::route(cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            console.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
