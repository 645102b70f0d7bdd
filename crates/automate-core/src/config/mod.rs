//! Runner configuration
//!
//! Nothing here is required to run a function: every value has a default and
//! can be overridden through `AUTOMATE_*` environment variables (optionally
//! provided by a local `.env` file during development).

mod logging_config;
mod runner_config;
pub mod timeouts;

pub use logging_config::{LogFormat, LoggingConfig};
pub use runner_config::{ENV_PREFIX, RunnerConfig};
