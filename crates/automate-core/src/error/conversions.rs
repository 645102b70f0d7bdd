//! From trait implementations for AutomateError conversions

use super::types::AutomateError;

impl From<anyhow::Error> for AutomateError {
    fn from(error: anyhow::Error) -> Self {
        // Keep the original error when a function bubbled one of ours through anyhow
        match error.downcast::<AutomateError>() {
            Ok(inner) => inner,
            Err(other) => Self::function(format!("{:#}", other)),
        }
    }
}

impl From<std::io::Error> for AutomateError {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: error.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for AutomateError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<reqwest::Error> for AutomateError {
    fn from(error: reqwest::Error) -> Self {
        let status_code = error.status().map(|s| s.as_u16());
        let url = error.url().map(|u| u.to_string());
        let message = if error.is_timeout() {
            format!("request timed out: {}", error)
        } else if error.is_connect() {
            format!("could not connect to server: {}", error)
        } else {
            error.to_string()
        };
        Self::Http {
            message,
            url,
            status_code,
        }
    }
}

impl From<url::ParseError> for AutomateError {
    fn from(error: url::ParseError) -> Self {
        Self::invalid_input(format!("invalid url: {}", error))
    }
}

impl From<config::ConfigError> for AutomateError {
    fn from(error: config::ConfigError) -> Self {
        Self::config(error.to_string())
    }
}
