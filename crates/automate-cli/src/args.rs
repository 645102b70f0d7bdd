//! CLI argument definitions using clap
//!
//! - automate-function run <context> <inputs> [token]   # one automation run
//! - automate-function generate-schema <path>           # inputs JSON schema
//! - automate-function functions                        # list bundled functions

use crate::functions::{BundledFunction, DEFAULT_FUNCTION};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "automate-function")]
#[command(about = "Speckle Automate function runner")]
#[command(
    long_about = r#"Speckle Automate function runner

USAGE:
  automate-function run '<run-context-json>' '<inputs-json>' <token>
  automate-function --function property-check run context.json inputs.json
  automate-function generate-schema schema.json
  automate-function functions

Run context and inputs are taken inline when they start with '{', otherwise
they are read from the named file."#
)]
#[command(version)]
pub struct Cli {
    /// Bundled function to run
    #[arg(long, short, global = true, value_enum, env = "AUTOMATE_FUNCTION", default_value = DEFAULT_FUNCTION)]
    pub function: BundledFunction,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute the function for one automation run
    Run {
        /// Automation run context (JSON text or path to a JSON file)
        run_data: String,

        /// Function inputs (JSON text or path to a JSON file)
        function_inputs: String,

        /// Speckle auth token
        #[arg(env = "SPECKLE_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Write the JSON schema of the function inputs
    GenerateSchema {
        /// Output file
        path: PathBuf,
    },

    /// List the bundled functions
    Functions,
}
