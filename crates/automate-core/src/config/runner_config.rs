//! Environment-driven runner settings

use super::logging_config::{LogFormat, LoggingConfig};
use super::timeouts;
use crate::error::{AutomateError, AutomateResult};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Prefix of every environment variable read by [`RunnerConfig::from_env`]
pub const ENV_PREFIX: &str = "AUTOMATE";

/// Settings that shape how a run talks to the server and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Object ids per download batch
    pub object_batch_size: usize,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: timeouts::CONNECTION_SECS,
            request_timeout_secs: timeouts::REQUEST_SECS,
            object_batch_size: timeouts::OBJECT_BATCH_SIZE,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl RunnerConfig {
    /// Load from defaults overlaid with `AUTOMATE_*` environment variables
    pub fn from_env() -> AutomateResult<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from an explicit variable map instead of the process environment
    pub fn from_map(vars: HashMap<String, String>) -> AutomateResult<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    fn load(environment: Environment) -> AutomateResult<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("connect_timeout_secs", defaults.connect_timeout_secs as i64)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("object_batch_size", defaults.object_batch_size as i64)?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_format", "pretty")?
            .add_source(environment.try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AutomateResult<()> {
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(AutomateError::config("timeouts must be greater than zero"));
        }
        if self.object_batch_size == 0 {
            return Err(AutomateError::config(
                "object_batch_size must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format,
        }
    }
}
