//! Automate Function Core Library
//!
//! Everything a Speckle Automate function needs besides its own logic:
//! run-context and input parsing, the dynamic object model, the server
//! client, result annotations and the runner that ties them together.

pub mod automation;
pub mod client;
pub mod config;
pub mod error;
pub mod inputs;
pub mod objects;
pub mod results;
pub mod run_data;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use automation::AutomationContext;
pub use client::{SpeckleApi, SpeckleClient, Version};
pub use config::{LogFormat, LoggingConfig, RunnerConfig};
pub use error::{AutomateError, AutomateResult, ErrorCategory, ResultExt};
pub use inputs::{FunctionInputs, NoInputs, input_schema, parse_inputs};
pub use objects::{Base, Member};
pub use results::{AutomationResult, AutomationStatus, ObjectResultLevel, ResultCase};
pub use run_data::AutomationRunData;
pub use runner::{AutomateFunction, RunOutcome, execute_automate_function, run_function};
