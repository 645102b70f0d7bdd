//! Constructor methods for AutomateError

use super::types::AutomateError;

impl AutomateError {
    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error for a named field
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn json(message: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: None,
        }
    }

    /// Create a JSON error noting which document failed to parse
    pub fn json_with_context(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Json {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
            url: None,
            status_code: None,
        }
    }

    /// Create an HTTP error for a non-success response
    pub fn http_status(message: impl Into<String>, url: impl Into<String>, status_code: u16) -> Self {
        Self::Http {
            message: message.into(),
            url: Some(url.into()),
            status_code: Some(status_code),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: None,
        }
    }

    /// Create a not found error with resource type
    pub fn not_found_resource(message: impl Into<String>, resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            resource_type: Some(resource_type.into()),
        }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout { seconds }
    }

    /// Create a new function error
    pub fn function(message: impl Into<String>) -> Self {
        Self::Function {
            message: message.into(),
        }
    }

    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rule {
            rule: rule.into(),
            message: message.into(),
        }
    }
}
