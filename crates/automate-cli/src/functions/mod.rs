//! Functions bundled with the binary
//!
//! Each function lives in its own module with its input record. The
//! [`BundledFunction`] enum is how the command line selects one.

mod property_check;
mod random_comment;
mod random_sample;
mod search;
mod spreadsheet_rules;

#[cfg(test)]
pub(crate) mod test_server;

pub use property_check::{PropertyCheck, PropertyCheckInputs};
pub use random_comment::{CommentInputs, RandomComment};
pub use random_sample::{RandomSample, SampleInputs};
pub use search::{Search, SearchInputs};
pub use spreadsheet_rules::{SpreadsheetRules, SpreadsheetRulesInputs};

use automate_core::runner::AutomateFunction;
use automate_core::{RunOutcome, RunnerConfig, execute_automate_function, input_schema};
use clap::ValueEnum;
use serde_json::Value;

/// Name of the function run when none is selected
pub const DEFAULT_FUNCTION: &str = "search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BundledFunction {
    /// Annotate objects containing a search phrase
    Search,
    /// Comment on one random displayable object
    RandomComment,
    /// Comment on a random sample of displayable objects
    RandomSample,
    /// Check that objects of a category carry a property
    PropertyCheck,
    /// Apply rules from a TSV spreadsheet
    SpreadsheetRules,
}

impl BundledFunction {
    pub fn all() -> &'static [BundledFunction] {
        Self::value_variants()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Search => Search.name(),
            Self::RandomComment => RandomComment.name(),
            Self::RandomSample => RandomSample.name(),
            Self::PropertyCheck => PropertyCheck.name(),
            Self::SpreadsheetRules => SpreadsheetRules::default().name(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Search => Search.description(),
            Self::RandomComment => RandomComment.description(),
            Self::RandomSample => RandomSample.description(),
            Self::PropertyCheck => PropertyCheck.description(),
            Self::SpreadsheetRules => SpreadsheetRules::default().description(),
        }
    }

    /// JSON schema of the function's inputs
    pub fn input_schema(&self) -> Value {
        match self {
            Self::Search => input_schema::<SearchInputs>(),
            Self::RandomComment => input_schema::<CommentInputs>(),
            Self::RandomSample => input_schema::<SampleInputs>(),
            Self::PropertyCheck => input_schema::<PropertyCheckInputs>(),
            Self::SpreadsheetRules => input_schema::<SpreadsheetRulesInputs>(),
        }
    }

    /// Run the function for one invocation
    pub async fn execute(
        &self,
        run_data_json: &str,
        inputs_json: &str,
        token: &str,
        config: &RunnerConfig,
    ) -> RunOutcome {
        match self {
            Self::Search => execute_automate_function(&Search, run_data_json, inputs_json, token, config).await,
            Self::RandomComment => {
                execute_automate_function(&RandomComment, run_data_json, inputs_json, token, config).await
            }
            Self::RandomSample => {
                execute_automate_function(&RandomSample, run_data_json, inputs_json, token, config).await
            }
            Self::PropertyCheck => {
                execute_automate_function(&PropertyCheck, run_data_json, inputs_json, token, config).await
            }
            Self::SpreadsheetRules => {
                let function = SpreadsheetRules::new(config.request_timeout());
                execute_automate_function(&function, run_data_json, inputs_json, token, config).await
            }
        }
    }
}
